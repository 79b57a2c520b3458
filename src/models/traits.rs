use crate::models::{frame::FrameSnapshot, input::InputSnapshot};

/// コース境界（障害物）のインターフェース
pub trait IBarrier {
    /// 半径 `footprint_radius` の車両中心 (x, z) がこの障害物に接触するか
    ///
    /// 障害物は無限の高さを持つ壁として扱い、Y 軸は無視します。
    fn intersects(&self, x: f64, z: f64, footprint_radius: f64) -> bool;
}

/// 経過時間を提供する時計のインターフェース
pub trait IClock {
    /// 単調増加する経過時間（ミリ秒）
    fn elapsed_ms(&self) -> u64;

    /// 1ティック分時間を進める（実時間の時計では何もしない）
    fn advance(&mut self, _dt_ms: u64) {}
}

/// 操作入力の提供元インターフェース
///
/// ティック開始時に一度だけ呼ばれ、そのティックで使う入力のスナップショットを返します。
pub trait IInputProvider {
    fn snapshot(&mut self, tick: u64) -> InputSnapshot;
}

/// 毎ティックの公開状態を受け取る描画側のインターフェース
pub trait IFrameObserver {
    fn on_frame(&mut self, frame: &FrameSnapshot);
}
