use serde::{Deserialize, Serialize};

use crate::models::{
    common::{Position3D, math_utils},
    input::{ControlInputState, SteerDirection},
};

/// 車両の運動パラメータ
///
/// 速度・角度の各レートは1ティックあたりの値です。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleParams {
    /// 加速量（単位/ティック²）
    pub acceleration: f64,
    /// 減速量（ブレーキ・惰性走行共通）
    pub deceleration: f64,
    /// 前進最高速度（単位/ティック）
    pub max_speed: f64,
    /// 後退最高速度（絶対値）
    pub max_reverse_speed: f64,
    /// 基本旋回レート（度/ティック）
    pub base_turn_rate_deg: f64,
    /// この速度以下では旋回レートを半分に固定
    pub low_speed_threshold: f64,
    /// ステアリングホイールの最大表示角（度）
    pub max_wheel_angle_deg: f64,
    /// ステアリングホイール表示角の1ティックあたりの変化量（度）
    pub wheel_angle_step_deg: f64,
    /// 衝突時の反発係数
    pub elasticity: f64,
    /// 箱型障害物に対する接触半径
    pub box_footprint_radius: f64,
    /// 円環型障害物に対する接触半径
    pub ring_footprint_radius: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            acceleration: 0.05,
            deceleration: 0.02,
            max_speed: 3.0,
            max_reverse_speed: 3.0,
            base_turn_rate_deg: 3.0,
            low_speed_threshold: 2.0,
            max_wheel_angle_deg: 25.0,
            wheel_angle_step_deg: 5.0,
            elasticity: 0.25,
            box_footprint_radius: 5.0,
            ring_footprint_radius: 6.0,
        }
    }
}

/// 車両の状態
///
/// ヘディングは度単位で、0° が +Z 方向です。ステアリングホイール角は
/// 表示用でヘディングとは独立しています。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Position3D,
    pub heading_deg: f64,
    /// 符号付き速度（負は後退）
    pub speed: f64,
    pub wheel_angle_deg: f64,
}

impl VehicleState {
    /// 指定位置・ヘディングで停止状態の車両を作成
    pub fn at_rest(x: f64, z: f64, heading_deg: f64) -> Self {
        Self {
            position: Position3D::on_ground(x, z),
            heading_deg: math_utils::normalize_degrees(heading_deg),
            speed: 0.0,
            wheel_angle_deg: 0.0,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.speed != 0.0
    }
}

/// 車両運動学
///
/// 操作入力から速度・ヘディング・ステアリングホイール角を1ティック進めます。
/// 位置の更新は [`MotionIntegrator`](crate::models::motion::MotionIntegrator) が担当します。
#[derive(Debug, Clone)]
pub struct VehicleKinematics {
    pub params: VehicleParams,
}

impl VehicleKinematics {
    pub fn new(params: VehicleParams) -> Self {
        Self { params }
    }

    /// 1ティック分の運動学更新
    ///
    /// `lap_started` が偽の間は後退・旋回を受け付けません（スタートラインを越えるまでは直進のみ）。
    pub fn advance(&self, state: &mut VehicleState, input: &ControlInputState, lap_started: bool) {
        state.speed = self.next_speed(state.speed, input, lap_started);
        self.update_steering(state, input, lap_started);
    }

    /// 次ティックの速度
    pub fn next_speed(&self, speed: f64, input: &ControlInputState, lap_started: bool) -> f64 {
        let p = &self.params;

        if input.accelerate {
            (speed + p.acceleration).clamp(-p.max_reverse_speed, p.max_speed)
        } else if input.brake && lap_started {
            (speed - p.deceleration).clamp(-p.max_reverse_speed, p.max_speed)
        } else {
            let coasted = math_utils::step_toward_zero(speed, p.deceleration);
            if coasted.abs() < p.deceleration { 0.0 } else { coasted }
        }
    }

    /// 現在速度での旋回レート（度/ティック、速度の符号付き）
    pub fn turn_rate(&self, speed: f64) -> f64 {
        let p = &self.params;
        let magnitude = if speed.abs() <= p.low_speed_threshold {
            p.base_turn_rate_deg * 0.5
        } else {
            p.base_turn_rate_deg * (1.0 - 0.5 * (speed.abs() / p.max_speed))
        };
        magnitude * math_utils::sign(speed)
    }

    fn update_steering(&self, state: &mut VehicleState, input: &ControlInputState, lap_started: bool) {
        let p = &self.params;
        let step = p.wheel_angle_step_deg;
        let max = p.max_wheel_angle_deg;

        let steer = if state.is_moving() && lap_started {
            input.steer_direction()
        } else {
            SteerDirection::Straight
        };

        match steer {
            SteerDirection::Left => {
                state.heading_deg = math_utils::normalize_degrees(state.heading_deg + self.turn_rate(state.speed));
                state.wheel_angle_deg = (state.wheel_angle_deg + step).min(max);
            }
            SteerDirection::Right => {
                state.heading_deg = math_utils::normalize_degrees(state.heading_deg - self.turn_rate(state.speed));
                state.wheel_angle_deg = (state.wheel_angle_deg - step).max(-max);
            }
            SteerDirection::Straight => {
                state.wheel_angle_deg = math_utils::step_toward_zero(state.wheel_angle_deg, step);
            }
        }
    }
}
