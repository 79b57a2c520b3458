use tracing::{debug, info};

/// 周回完了を表すチェックポイント番号
pub const LAP_COMPLETE: u8 = 7;

/// チェックポイント進行状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckpointProgress {
    /// 現在のチェックポイント番号（0〜7、7 は周回完了）
    pub index: u8,
    /// ラップタイマー計測中か
    pub running: bool,
    /// ラップ開始時刻（ミリ秒）。一度でもスタートラインを越えていれば Some
    pub lap_start_ms: Option<u64>,
    /// ラップ終了時刻（ミリ秒）
    pub lap_end_ms: Option<u64>,
}

impl CheckpointProgress {
    /// 周回が一度でも開始されたか
    pub fn lap_started(&self) -> bool {
        self.lap_start_ms.is_some()
    }

    pub fn lap_complete(&self) -> bool {
        self.index >= LAP_COMPLETE
    }

    /// 計測中ラップの経過時間（ミリ秒）
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.lap_start_ms.map(|start| now_ms.saturating_sub(start))
    }

    /// 完了したラップのタイム（ミリ秒）
    pub fn lap_time_ms(&self) -> Option<u64> {
        if !self.lap_complete() {
            return None;
        }
        match (self.lap_start_ms, self.lap_end_ms) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }
}

/// 完了したラップの記録
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapRecord {
    pub lap_number: u32,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl LapRecord {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }
}

/// チェックポイント遷移イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointEvent {
    LapStarted { at_ms: u64 },
    CheckpointPassed { index: u8 },
    LapCompleted { record: LapRecord },
}

/// チェックポイント・ラップ計測
///
/// 車両位置に対して1ティックに1回評価され、チェックポイントは必ず1つずつ進みます。
/// 判定閾値はコース形状に対応した固定値です。
#[derive(Debug, Clone, Default)]
pub struct CheckpointTracker {
    progress: CheckpointProgress,
    lap_history: Vec<LapRecord>,
}

impl CheckpointTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> &CheckpointProgress {
        &self.progress
    }

    pub fn lap_history(&self) -> &[LapRecord] {
        &self.lap_history
    }

    pub fn best_lap(&self) -> Option<&LapRecord> {
        self.lap_history.iter().min_by_key(|r| r.duration_ms())
    }

    /// 進行状況を初期化（ラップ履歴は保持）
    pub fn reset(&mut self) {
        self.progress = CheckpointProgress::default();
    }

    /// 現在のチェックポイントから次へ進む条件
    fn gate_open(&self, x: f64, z: f64) -> bool {
        match self.progress.index {
            0 => z > 0.0 && !self.progress.running,
            1 => z > 280.0,
            2 => x < -200.0,
            3 => z < -320.0,
            4 => x > 0.0 && z > 60.0,
            5 => x > 240.0,
            6 => z > 0.0,
            _ => false,
        }
    }

    /// 車両位置 (x, z) でチェックポイントを評価
    ///
    /// 遷移した場合はそのイベントを返します。1回の呼び出しで進むのは最大1段階です。
    pub fn update(&mut self, x: f64, z: f64, now_ms: u64) -> Option<CheckpointEvent> {
        if !self.gate_open(x, z) {
            return None;
        }

        self.progress.index += 1;

        match self.progress.index {
            1 => {
                self.progress.lap_start_ms = Some(now_ms);
                self.progress.lap_end_ms = None;
                self.progress.running = true;

                info!(at_ms = now_ms, x = x, z = z, "LAP_STARTED: ラップ計測を開始しました");

                Some(CheckpointEvent::LapStarted { at_ms: now_ms })
            }
            LAP_COMPLETE => {
                self.progress.running = false;
                self.progress.lap_end_ms = Some(now_ms);

                let record = LapRecord {
                    lap_number: self.lap_history.len() as u32 + 1,
                    start_ms: self.progress.lap_start_ms.unwrap_or(now_ms),
                    end_ms: now_ms,
                };
                self.lap_history.push(record);

                info!(
                    lap_number = record.lap_number,
                    lap_time_s = record.duration_s(),
                    "LAP_COMPLETED: {:.2}秒で周回しました",
                    record.duration_s()
                );

                Some(CheckpointEvent::LapCompleted { record })
            }
            index => {
                debug!(checkpoint = index, x = x, z = z, "CHECKPOINT_PASSED: チェックポイントを通過しました");

                Some(CheckpointEvent::CheckpointPassed { index })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 各チェックポイントを順に満たす代表位置
    const LAP_ROUTE: [(f64, f64); 7] = [
        (240.0, 1.0),
        (150.0, 290.0),
        (-240.0, 100.0),
        (-150.0, -330.0),
        (100.0, 80.0),
        (250.0, -100.0),
        (240.0, 10.0),
    ];

    #[test]
    fn test_full_lap_sequence() {
        let mut tracker = CheckpointTracker::new();

        for (i, (x, z)) in LAP_ROUTE.iter().enumerate() {
            let now = 1000 + i as u64 * 5000;
            let event = tracker.update(*x, *z, now);
            assert!(event.is_some(), "checkpoint {} did not fire", i);
            assert_eq!(tracker.progress().index, i as u8 + 1);
        }

        let progress = tracker.progress();
        assert!(progress.lap_complete());
        assert!(!progress.running);
        assert_eq!(progress.lap_time_ms(), Some(30_000));
        assert_eq!(tracker.lap_history().len(), 1);
        assert_eq!(tracker.best_lap().map(|r| r.duration_s()), Some(30.0));
    }

    #[test]
    fn test_lap_start_records_clock() {
        let mut tracker = CheckpointTracker::new();
        assert_eq!(tracker.update(240.0, -1.0, 100), None);
        assert!(!tracker.progress().lap_started());

        assert_eq!(
            tracker.update(240.0, 0.5, 1234),
            Some(CheckpointEvent::LapStarted { at_ms: 1234 })
        );
        assert!(tracker.progress().running);
        assert_eq!(tracker.progress().lap_start_ms, Some(1234));
        assert_eq!(tracker.progress().elapsed_ms(2234), Some(1000));
    }

    #[test]
    fn test_never_skips_checkpoints() {
        let mut tracker = CheckpointTracker::new();
        tracker.update(240.0, 1.0, 0);
        assert_eq!(tracker.progress().index, 1);

        // チェックポイント2と4の条件を同時に満たす位置
        let event = tracker.update(100.0, 300.0, 16);
        assert_eq!(event, Some(CheckpointEvent::CheckpointPassed { index: 2 }));
        assert_eq!(tracker.progress().index, 2);
    }

    #[test]
    fn test_never_regresses() {
        let mut tracker = CheckpointTracker::new();
        tracker.update(240.0, 1.0, 0);
        tracker.update(150.0, 290.0, 16);
        assert_eq!(tracker.progress().index, 2);

        // 後戻りしても番号は変わらない
        assert_eq!(tracker.update(240.0, -50.0, 32), None);
        assert_eq!(tracker.progress().index, 2);
    }

    #[test]
    fn test_lap_complete_is_terminal_until_reset() {
        let mut tracker = CheckpointTracker::new();
        for (x, z) in LAP_ROUTE {
            tracker.update(x, z, 0);
        }
        for (x, z) in LAP_ROUTE {
            assert_eq!(tracker.update(x, z, 10), None);
        }
        assert_eq!(tracker.progress().index, LAP_COMPLETE);

        tracker.reset();
        assert_eq!(tracker.progress().index, 0);
        assert!(!tracker.progress().running);
        assert!(!tracker.progress().lap_started());
        assert_eq!(tracker.lap_history().len(), 1);
    }
}
