use tracing::trace;

use crate::models::{
    checkpoint::CheckpointProgress,
    common::Position3D,
    traits::IFrameObserver,
    vehicle::VehicleState,
};

/// 速度ゲージの表示倍率（速度 × 25 = mph）
pub const GAUGE_MPH_PER_UNIT: f64 = 25.0;

/// 描画側へ公開する1ティック分の状態
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub time_ms: u64,
    pub position: Position3D,
    pub heading_deg: f64,
    pub wheel_angle_deg: f64,
    pub speed: f64,
    pub gauge_mph: f64,
    pub checkpoint: u8,
    pub timer_running: bool,
    /// 計測中ラップの経過時間（秒）
    pub current_lap_s: Option<f64>,
    pub lap_complete: bool,
    /// 完了したラップのタイム（秒）
    pub completed_lap_s: Option<f64>,
    /// スタートシグナルの点灯列（-1 は消灯）
    pub light_row: i8,
    pub bounced: bool,
}

impl FrameSnapshot {
    pub fn capture(
        tick: u64,
        time_ms: u64,
        vehicle: &VehicleState,
        progress: &CheckpointProgress,
        light_row: i8,
        bounced: bool,
    ) -> Self {
        Self {
            tick,
            time_ms,
            position: vehicle.position,
            heading_deg: vehicle.heading_deg,
            wheel_angle_deg: vehicle.wheel_angle_deg,
            speed: vehicle.speed,
            gauge_mph: vehicle.speed * GAUGE_MPH_PER_UNIT,
            checkpoint: progress.index,
            timer_running: progress.running,
            current_lap_s: progress.elapsed_ms(time_ms).map(|ms| ms as f64 / 1000.0),
            lap_complete: progress.lap_complete(),
            completed_lap_s: progress.lap_time_ms().map(|ms| ms as f64 / 1000.0),
            light_row,
            bounced,
        }
    }
}

/// フレームを trace ログへ出力するオブザーバー
#[derive(Debug, Default)]
pub struct FrameTracer;

impl IFrameObserver for FrameTracer {
    fn on_frame(&mut self, frame: &FrameSnapshot) {
        trace!(
            tick = frame.tick,
            time_ms = frame.time_ms,
            x = frame.position.x,
            z = frame.position.z,
            heading_deg = frame.heading_deg,
            speed = frame.speed,
            checkpoint = frame.checkpoint,
            "FRAME"
        );
    }
}

/// フレームをすべて保持するオブザーバー
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: Vec<FrameSnapshot>,
}

#[cfg(test)]
impl IFrameObserver for FrameRecorder {
    fn on_frame(&mut self, frame: &FrameSnapshot) {
        self.frames.push(*frame);
    }
}
