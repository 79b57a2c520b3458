use crate::models::{
    track::TrackCatalog,
    traits::IBarrier,
};

/// 車両の接触半径
///
/// 箱型と円環型で異なる半径を使います。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub box_radius: f64,
    pub ring_radius: f64,
}

impl Footprint {
    /// 両方の障害物種別に同じ半径を使う
    pub fn uniform(radius: f64) -> Self {
        Self {
            box_radius: radius,
            ring_radius: radius,
        }
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            box_radius: 5.0,
            ring_radius: 6.0,
        }
    }
}

/// 衝突判定器
///
/// コース形状カタログに対する純粋な幾何判定のみを行い、副作用を持ちません。
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    catalog: TrackCatalog,
}

impl CollisionDetector {
    pub fn new(catalog: TrackCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// 点 (x, z) が半径 `footprint_radius` でいずれかの障害物に接触するか
    pub fn collides(&self, x: f64, z: f64, footprint_radius: f64) -> bool {
        self.collides_with(x, z, &Footprint::uniform(footprint_radius))
    }

    /// 障害物種別ごとの半径を指定して判定
    pub fn collides_with(&self, x: f64, z: f64, footprint: &Footprint) -> bool {
        self.collides_box(x, z, footprint.box_radius) || self.collides_ring(x, z, footprint.ring_radius)
    }

    /// 箱型障害物のみの判定
    pub fn collides_box(&self, x: f64, z: f64, footprint_radius: f64) -> bool {
        self.catalog
            .axis_barriers()
            .iter()
            .any(|b| b.intersects(x, z, footprint_radius))
    }

    /// 円環型障害物のみの判定
    pub fn collides_ring(&self, x: f64, z: f64, footprint_radius: f64) -> bool {
        self.catalog
            .ring_barriers()
            .iter()
            .any(|r| r.intersects(x, z, footprint_radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        common::Position3D,
        track::{AxisBarrier, RingBarrier},
    };

    fn wall() -> AxisBarrier {
        AxisBarrier::from_tuple([100.0, 0.0, -50.0, 105.0, 2.5, 50.0])
    }

    fn ring() -> RingBarrier {
        RingBarrier::new(
            Position3D::on_ground(-200.0, 0.0),
            75.0,
            80.0,
            350f64.to_radians(),
            10f64.to_radians(),
        )
    }

    #[test]
    fn test_union_of_barrier_families() {
        let detector = CollisionDetector::new(TrackCatalog::new(vec![wall()], vec![ring()]));

        assert!(detector.collides(102.0, 0.0, 0.0));
        assert!(detector.collides(-122.0, 0.0, 0.0));
        assert!(!detector.collides(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_box_hit_unaffected_by_ring_data() {
        let box_only = CollisionDetector::new(TrackCatalog::new(vec![wall()], vec![]));
        let both = CollisionDetector::new(TrackCatalog::new(vec![wall()], vec![ring()]));

        for x in [94.0, 96.0, 102.0, 109.0, 111.0] {
            assert_eq!(box_only.collides_box(x, 0.0, 5.0), both.collides_box(x, 0.0, 5.0));
            assert_eq!(box_only.collides(x, 0.0, 5.0), both.collides(x, 0.0, 5.0));
        }
    }

    #[test]
    fn test_ring_hit_unaffected_by_box_data() {
        let ring_only = CollisionDetector::new(TrackCatalog::new(vec![], vec![ring()]));
        let both = CollisionDetector::new(TrackCatalog::new(vec![wall()], vec![ring()]));

        for x in [-130.0, -122.0, -118.0, -110.0] {
            assert_eq!(ring_only.collides_ring(x, 0.0, 6.0), both.collides_ring(x, 0.0, 6.0));
            assert_eq!(ring_only.collides(x, 0.0, 6.0), both.collides(x, 0.0, 6.0));
        }
    }

    #[test]
    fn test_separate_footprints_per_family() {
        let detector = CollisionDetector::new(TrackCatalog::new(vec![wall()], vec![ring()]));
        let footprint = Footprint::default();

        // 箱の外側 5.5: 箱半径 5 では接触しない
        assert!(!detector.collides_with(94.5, 0.0, &footprint));
        // 円環の外側 5.5: 円環半径 6 では接触する
        assert!(detector.collides_with(-114.5, 0.0, &footprint));
    }

    #[test]
    fn test_standard_post_ring_has_center_hole() {
        let detector = CollisionDetector::new(TrackCatalog::standard());
        let footprint = Footprint::default();

        // (80, -240) の柱は内径0なので中心から半径6未満には穴がある
        assert!(!detector.collides_box(85.5, -241.0, footprint.box_radius));
        assert!(!detector.collides_ring(85.5, -241.0, footprint.ring_radius));
        assert!(!detector.collides_with(85.5, -241.0, &footprint));
        assert!(detector.collides_with(87.0, -241.0, &footprint));
    }

    #[test]
    fn test_standard_start_pose_is_clear() {
        let detector = CollisionDetector::new(TrackCatalog::standard());
        assert!(!detector.collides_with(240.0, -40.0, &Footprint::default()));
    }
}
