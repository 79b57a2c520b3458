use tracing::debug;

use crate::models::{
    collision::{CollisionDetector, Footprint},
    common::{Position3D, math_utils},
    vehicle::VehicleState,
};

/// 位置更新の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionOutcome {
    /// 提案位置に移動した
    Moved,
    /// 衝突して跳ね返った
    Bounced {
        impact_speed: f64,
        rebound_speed: f64,
    },
}

/// 運動積分器
///
/// 速度とヘディングから次の位置を提案し、衝突する場合は反発処理を行います。
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    pub elasticity: f64,
    pub footprint: Footprint,
}

impl MotionIntegrator {
    pub fn new(elasticity: f64, footprint: Footprint) -> Self {
        Self {
            elasticity,
            footprint,
        }
    }

    /// 現在の速度で1ティック進んだ場合の位置
    pub fn propose(state: &VehicleState, speed: f64) -> Position3D {
        let (dx, dz) = math_utils::heading_to_unit(state.heading_deg);
        Position3D::on_ground(state.position.x + speed * dx, state.position.z + speed * dz)
    }

    /// 車両位置を1ティック進める
    ///
    /// 衝突時は速度を反転・減衰させ、衝突前の位置から新しい速度で1ティック分戻します。
    /// 戻した位置は再判定しません（高速・高反発では障害物をすり抜けることがあります）。
    pub fn integrate(&self, state: &mut VehicleState, detector: &CollisionDetector) -> MotionOutcome {
        let proposed = Self::propose(state, state.speed);

        if !detector.collides_with(proposed.x, proposed.z, &self.footprint) {
            state.position = proposed;
            return MotionOutcome::Moved;
        }

        let impact_speed = state.speed;
        state.speed = -impact_speed * self.elasticity;
        state.position = Self::propose(state, state.speed);

        debug!(
            impact_x = proposed.x,
            impact_z = proposed.z,
            heading_deg = state.heading_deg,
            impact_speed = impact_speed,
            rebound_speed = state.speed,
            "VEHICLE_BOUNCE: 障害物に衝突し跳ね返りました"
        );

        MotionOutcome::Bounced {
            impact_speed,
            rebound_speed: state.speed,
        }
    }
}
