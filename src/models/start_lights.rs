/// スタートシグナルの列数
pub const LIGHT_ROWS: i8 = 4;

/// スタートシグナルの点灯シーケンス
///
/// リセット直後に1列目が点灯し、以後 `interval_ms` ごとに1列ずつ点灯していきます。
/// 周回完了で消灯（-1）し、次のリセットまで再開しません。
#[derive(Debug, Clone, PartialEq)]
pub struct StartLights {
    /// 点灯中の最後の列（-1 は消灯）
    row: i8,
    next_change_ms: Option<u64>,
    interval_ms: u64,
}

impl StartLights {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            row: -1,
            next_change_ms: None,
            interval_ms,
        }
    }

    pub fn row(&self) -> i8 {
        self.row
    }

    /// 点灯している列数
    pub fn lit_rows(&self) -> u8 {
        (self.row + 1) as u8
    }

    pub fn is_sequence_active(&self) -> bool {
        self.next_change_ms.is_some()
    }

    /// シーケンスを最初から開始
    pub fn restart(&mut self, now_ms: u64) {
        self.row = 0;
        self.next_change_ms = Some(now_ms + self.interval_ms);
    }

    /// 消灯してシーケンスを止める
    pub fn extinguish(&mut self) {
        self.row = -1;
        self.next_change_ms = None;
    }

    /// 時刻 `now_ms` までに予定された点灯を進める
    pub fn update(&mut self, now_ms: u64) {
        while let Some(due) = self.next_change_ms {
            if due > now_ms {
                break;
            }
            self.row += 1;
            self.next_change_ms = if self.row < LIGHT_ROWS - 1 {
                Some(due + self.interval_ms)
            } else {
                None
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_lights_one_row_per_interval() {
        let mut lights = StartLights::new(1000);
        assert_eq!(lights.row(), -1);

        lights.restart(500);
        assert_eq!(lights.row(), 0);
        lights.update(1499);
        assert_eq!(lights.row(), 0);
        lights.update(1500);
        assert_eq!(lights.row(), 1);
        lights.update(3500);
        assert_eq!(lights.row(), 3);
        assert!(!lights.is_sequence_active());

        lights.update(10_000);
        assert_eq!(lights.row(), 3);
        assert_eq!(lights.lit_rows(), 4);
    }

    #[test]
    fn test_extinguish_stops_sequence() {
        let mut lights = StartLights::new(1000);
        lights.restart(0);
        lights.extinguish();
        lights.update(5000);
        assert_eq!(lights.row(), -1);
        assert_eq!(lights.lit_rows(), 0);
    }
}
