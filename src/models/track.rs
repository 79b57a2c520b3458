use std::f64::consts::PI;

use crate::models::{
    common::{Position3D, math_utils},
    traits::IBarrier,
};

/// 軸平行の箱型障害物
///
/// 対角の2頂点で定義されます。描画上は有限の高さを持ちますが、
/// 衝突判定では XZ 平面の矩形として扱います。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBarrier {
    pub corner_a: Position3D,
    pub corner_b: Position3D,
}

impl AxisBarrier {
    /// 6要素タプル (x1, y1, z1, x2, y2, z2) から作成
    pub const fn from_tuple(t: [f64; 6]) -> Self {
        Self {
            corner_a: Position3D { x: t[0], y: t[1], z: t[2] },
            corner_b: Position3D { x: t[3], y: t[4], z: t[5] },
        }
    }

    /// XZ平面での矩形範囲 (x_min, x_max, z_min, z_max)
    pub fn bounds_xz(&self) -> (f64, f64, f64, f64) {
        (
            self.corner_a.x.min(self.corner_b.x),
            self.corner_a.x.max(self.corner_b.x),
            self.corner_a.z.min(self.corner_b.z),
            self.corner_a.z.max(self.corner_b.z),
        )
    }
}

impl IBarrier for AxisBarrier {
    fn intersects(&self, x: f64, z: f64, footprint_radius: f64) -> bool {
        let (x_min, x_max, z_min, z_max) = self.bounds_xz();
        x >= x_min - footprint_radius
            && x <= x_max + footprint_radius
            && z >= z_min - footprint_radius
            && z <= z_max + footprint_radius
    }
}

/// 円環（部分リング）型の障害物
///
/// 角度はラジアンで保持し、2π を超える終了角は 0° をまたぐ区間を表します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingBarrier {
    pub center: Position3D,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl RingBarrier {
    pub fn new(
        center: Position3D,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
        }
    }

    /// 7要素タプル (cx, cy, cz, outer, inner, start, end) から作成
    ///
    /// コースデータは外径を内径より先に並べる形式です。
    pub fn from_tuple(t: [f64; 7]) -> Self {
        Self::new(Position3D::new(t[0], t[1], t[2]), t[4], t[3], t[5], t[6])
    }

    /// 点の角度（度）が角度区間に含まれるか
    ///
    /// 開始・終了角をそれぞれ 360 で剰余し、開始 > 終了 の場合は 0° をまたぐ区間として扱います。
    pub fn contains_angle(&self, angle_deg: f64) -> bool {
        let start = self.start_angle.to_degrees() % 360.0;
        let end = self.end_angle.to_degrees() % 360.0;

        if start <= end {
            angle_deg >= start && angle_deg <= end
        } else {
            angle_deg >= start || angle_deg <= end
        }
    }
}

impl IBarrier for RingBarrier {
    fn intersects(&self, x: f64, z: f64, footprint_radius: f64) -> bool {
        // 内径が負になっても2乗で比較する（内径0の円環は中心に穴が残る）
        let inner = self.inner_radius - footprint_radius;
        let outer = self.outer_radius + footprint_radius;

        let point = Position3D::on_ground(x, z);
        let dist_sq = point.distance_sq_xz(&self.center);

        if dist_sq < inner * inner || dist_sq > outer * outer {
            return false;
        }

        self.contains_angle(point.angle_xz_from(&self.center))
    }
}

/// コース形状カタログ
///
/// 起動時に一度だけ構築され、以後変更されません。
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    axis_barriers: Vec<AxisBarrier>,
    ring_barriers: Vec<RingBarrier>,
}

const STANDARD_AXIS_BARRIERS: [[f64; 6]; 18] = [
    [-75.0, 0.0, -320.0, -200.0, 2.5, -325.0],
    [-80.0, 0.0, -112.5, -75.0, 2.5, -320.0],
    [-200.0, 0.0, -325.0, -205.0, 2.5, 200.0],
    [-205.0, 0.0, 200.0, -40.0, 2.5, 205.0],
    [-205.0, 0.0, 275.0, -35.0, 2.5, 280.0],
    [-275.0, 0.0, 200.0, -280.0, 2.5, -395.0],
    [2.5, 0.0, -55.0, -2.5, 2.5, -395.0],
    [80.0, 0.0, -112.5, 75.0, 2.5, -317.5],
    [125.0, 0.0, 200.0, 120.0, 2.5, 280.0],
    [160.0, 0.0, -235.0, 200.0, 2.5, -240.0],
    [160.0, 0.0, -240.0, 240.0, 2.5, -245.0],
    [160.0, 0.0, -160.0, 205.0, 2.5, -165.0],
    [200.0, 0.0, 195.0, 195.0, 2.5, 280.0],
    [200.0, 0.0, -160.0, 205.0, 2.5, 125.0],
    [280.0, 0.0, -160.0, 275.0, 2.5, 120.0],
    [240.0, 0.0, -400.0, -280.0, 2.5, -395.0],
    [240.0, 0.0, -322.5, 75.0, 2.5, -317.5],
    [240.0, 0.0, -322.5, 75.0, 2.5, -317.5],
];

fn standard_ring_barriers() -> [[f64; 7]; 13] {
    [
        [80.0, 2.5, 280.0, 120.0, 115.0, 0.0, PI],
        [80.0, 2.5, 280.0, 45.0, 40.0, 0.0, PI],
        [-40.0, 2.5, 280.0, 80.0, 75.0, 3.0 * PI / 2.0, 2.0 * PI],
        [-200.0, 2.5, 200.0, 80.0, 75.0, PI / 2.0, PI],
        [240.0, 2.5, -320.0, 80.0, 75.0, 3.0 * PI / 2.0, 5.0 * PI / 2.0],
        [160.0, 2.5, -240.0, 80.0, 75.0, PI / 2.0, PI],
        [200.0, 2.5, -160.0, 80.0, 75.0, 3.0 * PI / 2.0, 2.0 * PI],
        [0.0, 2.5, 0.0, 140.0, 135.0, 1.6875 * PI, 3.3125 * PI],
        [0.0, 2.5, 0.0, 60.0, 55.0, 1.5125 * PI, 3.4875 * PI],
        [200.0, 2.5, 120.0, 80.0, 75.0, 0.0, PI / 2.0],
        [200.0, 2.5, 200.0, 80.0, 75.0, PI, 3.0 * PI / 2.0],
        [80.0, 2.5, -240.0, 5.0, 0.0, 3.0 * PI / 2.0, 2.0 * PI],
        [160.0, 2.5, -240.0, 5.0, 0.0, PI / 2.0, 3.0 * PI / 2.0],
    ]
}

impl TrackCatalog {
    pub fn new(axis_barriers: Vec<AxisBarrier>, ring_barriers: Vec<RingBarrier>) -> Self {
        Self {
            axis_barriers,
            ring_barriers,
        }
    }

    /// 標準コースのカタログを構築
    pub fn standard() -> Self {
        let axis_barriers = STANDARD_AXIS_BARRIERS
            .iter()
            .map(|t| AxisBarrier::from_tuple(*t))
            .collect();
        let ring_barriers = standard_ring_barriers()
            .iter()
            .map(|t| RingBarrier::from_tuple(*t))
            .collect();

        Self::new(axis_barriers, ring_barriers)
    }

    pub fn axis_barriers(&self) -> &[AxisBarrier] {
        &self.axis_barriers
    }

    pub fn ring_barriers(&self) -> &[RingBarrier] {
        &self.ring_barriers
    }

    /// カタログの概要を表示
    pub fn print_summary(&self) {
        println!("=== コース形状カタログ ===");
        println!("箱型障害物: {}個", self.axis_barriers.len());
        for (i, barrier) in self.axis_barriers.iter().enumerate() {
            let (x_min, x_max, z_min, z_max) = barrier.bounds_xz();
            println!(
                "  B{:02}: x [{:.1}, {:.1}]  z [{:.1}, {:.1}]",
                i + 1,
                x_min,
                x_max,
                z_min,
                z_max
            );
        }
        println!("円環型障害物: {}個", self.ring_barriers.len());
        for (i, ring) in self.ring_barriers.iter().enumerate() {
            println!(
                "  R{:02}: 中心 ({:.1}, {:.1})  半径 [{:.1}, {:.1}]  角度 {:.2}°-{:.2}°",
                i + 1,
                ring.center.x,
                ring.center.z,
                ring.inner_radius,
                ring.outer_radius,
                math_utils::normalize_degrees(ring.start_angle.to_degrees()),
                math_utils::normalize_degrees(ring.end_angle.to_degrees())
            );
        }
    }
}
