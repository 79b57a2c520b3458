use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::traits::IInputProvider;

/// 論理操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
}

/// 操舵方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerDirection {
    Left,
    Right,
    Straight,
}

/// 現在押されている操作の集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlInputState {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

impl ControlInputState {
    pub fn press(&mut self, control: Control) {
        self.set(control, true);
    }

    pub fn release(&mut self, control: Control) {
        self.set(control, false);
    }

    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Accelerate => self.accelerate,
            Control::Brake => self.brake,
            Control::SteerLeft => self.steer_left,
            Control::SteerRight => self.steer_right,
        }
    }

    /// 左右同時押しの場合は左を優先
    pub fn steer_direction(&self) -> SteerDirection {
        if self.steer_left {
            SteerDirection::Left
        } else if self.steer_right {
            SteerDirection::Right
        } else {
            SteerDirection::Straight
        }
    }

    fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Accelerate => self.accelerate = held,
            Control::Brake => self.brake = held,
            Control::SteerLeft => self.steer_left = held,
            Control::SteerRight => self.steer_right = held,
        }
    }
}

impl FromIterator<Control> for ControlInputState {
    fn from_iter<I: IntoIterator<Item = Control>>(iter: I) -> Self {
        let mut state = Self::default();
        for control in iter {
            state.press(control);
        }
        state
    }
}

/// 1ティック分の入力スナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub controls: ControlInputState,
    /// リセット要求（ティック開始時に適用される）
    pub reset_requested: bool,
}

/// 入力タイムラインの区間
///
/// `start_tick` 以上 `end_tick` 未満のティックで `controls` が押された状態になります。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputSegment {
    pub start_tick: u64,
    pub end_tick: u64,
    pub controls: Vec<Control>,
}

impl InputSegment {
    pub fn is_active(&self, tick: u64) -> bool {
        tick >= self.start_tick && tick < self.end_tick
    }
}

/// シナリオで定義された入力タイムラインを再生する入力提供元
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    segments: Vec<InputSegment>,
    resets: BTreeSet<u64>,
}

impl ScriptedInput {
    pub fn new(segments: Vec<InputSegment>, resets: impl IntoIterator<Item = u64>) -> Self {
        Self {
            segments,
            resets: resets.into_iter().collect(),
        }
    }

    /// 最後に入力が終わるティック
    pub fn last_tick(&self) -> u64 {
        let last_segment = self.segments.iter().map(|s| s.end_tick).max().unwrap_or(0);
        let last_reset = self.resets.iter().next_back().map(|t| t + 1).unwrap_or(0);
        last_segment.max(last_reset)
    }
}

impl IInputProvider for ScriptedInput {
    fn snapshot(&mut self, tick: u64) -> InputSnapshot {
        let controls = self
            .segments
            .iter()
            .filter(|s| s.is_active(tick))
            .flat_map(|s| s.controls.iter().copied())
            .collect();

        InputSnapshot {
            controls,
            reset_requested: self.resets.contains(&tick),
        }
    }
}
