use tokio::time::Instant;

use crate::models::traits::IClock;

/// ティックごとに決まった時間だけ進む決定論的な時計
#[derive(Debug, Clone, Default)]
pub struct SteppedClock {
    elapsed_ms: u64,
}

impl SteppedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(elapsed_ms: u64) -> Self {
        Self { elapsed_ms }
    }
}

impl IClock for SteppedClock {
    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    fn advance(&mut self, dt_ms: u64) {
        self.elapsed_ms += dt_ms;
    }
}

/// 実時間の単調時計
///
/// tokio の時計を使うため、時間を停止したテストランタイム上では仮想時間で進みます。
#[derive(Debug, Clone)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl IClock for WallClock {
    fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
