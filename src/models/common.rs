use std::ops::{Add, Sub};

/// ワールド座標系の3次元位置
///
/// 地面は XZ 平面、Y は高さ方向です。車両の Y は常に 0（地面）に固定されます。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 地面上（y = 0）の位置を作成
    pub fn on_ground(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }

    /// XZ平面での距離の2乗
    pub fn distance_sq_xz(&self, other: &Position3D) -> f64 {
        (self.x - other.x).powi(2) + (self.z - other.z).powi(2)
    }

    /// `center` から見たこの点の角度（度、[0, 360)）
    ///
    /// +X 軸を 0°、+Z 方向を 90° とします（atan2(dz, dx)）。
    pub fn angle_xz_from(&self, center: &Position3D) -> f64 {
        let angle = (self.z - center.z).atan2(self.x - center.x).to_degrees();
        math_utils::normalize_degrees(angle)
    }
}

impl Add for Position3D {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Position3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// 角度を [0, 360) の範囲に正規化
    pub fn normalize_degrees(angle_deg: f64) -> f64 {
        let normalized = angle_deg.rem_euclid(360.0);
        // rem_euclid は -1e-15 のような値で 360.0 を返すことがある
        if normalized >= 360.0 { 0.0 } else { normalized }
    }

    /// ヘディング（度、0° = +Z）を単位変位ベクトル (dx, dz) に変換
    pub fn heading_to_unit(heading_deg: f64) -> (f64, f64) {
        let (sin, cos) = heading_deg.to_radians().sin_cos();
        (sin, cos)
    }

    /// 値を `step` ずつ0に近づける（0を越えない）
    pub fn step_toward_zero(value: f64, step: f64) -> f64 {
        if value > 0.0 {
            (value - step).max(0.0)
        } else if value < 0.0 {
            (value + step).min(0.0)
        } else {
            0.0
        }
    }

    /// 符号（0は正として扱う）
    pub fn sign(value: f64) -> f64 {
        if value < 0.0 { -1.0 } else { 1.0 }
    }
}
