// 基本的なデータ型と数学ユーティリティ
pub mod common;

// 協調コンポーネントとのインターフェース（trait）定義
pub mod traits;

// コース形状と衝突判定
pub mod track;
pub mod collision;

// 車両運動
pub mod input;
pub mod vehicle;
pub mod motion;

// 周回計測と付随する状態
pub mod checkpoint;
pub mod start_lights;

// 時計と描画側への公開状態
pub mod clock;
pub mod frame;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use track::TrackCatalog;
pub use collision::{CollisionDetector, Footprint};
pub use input::{InputSegment, InputSnapshot, ScriptedInput};
pub use vehicle::{VehicleKinematics, VehicleParams, VehicleState};
pub use motion::{MotionIntegrator, MotionOutcome};
pub use checkpoint::{CheckpointEvent, CheckpointTracker};
pub use start_lights::StartLights;
pub use clock::{SteppedClock, WallClock};
pub use frame::{FrameSnapshot, FrameTracer};

#[cfg(test)]
pub use checkpoint::LAP_COMPLETE;
#[cfg(test)]
pub use frame::FrameRecorder;
#[cfg(test)]
pub use input::Control;
