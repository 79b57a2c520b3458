use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::{InputSegment, ScriptedInput, VehicleParams};

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "default".to_string(),
            description: "入力なしの標準設定".to_string(),
        }
    }
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// ティック周期（ミリ秒）
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// 最大ティック数
    pub max_ticks: u64,
    /// 実時間に合わせて実行するか
    #[serde(default)]
    pub realtime: bool,
    /// この周回数を完了したら終了
    #[serde(default)]
    pub stop_after_laps: Option<u32>,
}

fn default_tick_ms() -> u64 {
    16
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            max_ticks: 3600,
            realtime: false,
            stop_after_laps: None,
        }
    }
}

/// スタート位置
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StartPose {
    pub x: f64,
    pub z: f64,
    pub heading_deg: f64,
}

impl Default for StartPose {
    fn default() -> Self {
        Self {
            x: 240.0,
            z: -40.0,
            heading_deg: 0.0,
        }
    }
}

/// スタートシグナル設定
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct StartLightsConfig {
    pub interval_ms: u64,
}

impl Default for StartLightsConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// 入力タイムライン設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InputScriptConfig {
    pub segments: Vec<InputSegment>,
    /// リセット要求を出すティック
    pub resets: Vec<u64>,
}

impl InputScriptConfig {
    pub fn to_provider(&self) -> ScriptedInput {
        ScriptedInput::new(self.segments.clone(), self.resets.iter().copied())
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    #[serde(default)]
    pub vehicle: VehicleParams,
    #[serde(default)]
    pub start_pose: StartPose,
    #[serde(default)]
    pub start_lights: StartLightsConfig,
    #[serde(default)]
    pub inputs: InputScriptConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        // 時間設定の検証
        if self.sim.tick_ms == 0 {
            return Err(ScenarioError::ValidationError("tick_ms must be positive".to_string()));
        }
        if self.sim.max_ticks == 0 {
            return Err(ScenarioError::ValidationError("max_ticks must be positive".to_string()));
        }
        if self.start_lights.interval_ms == 0 {
            return Err(ScenarioError::ValidationError("start_lights.interval_ms must be positive".to_string()));
        }

        // 車両パラメータの検証
        let v = &self.vehicle;
        let positive = [
            ("acceleration", v.acceleration),
            ("deceleration", v.deceleration),
            ("max_speed", v.max_speed),
            ("max_reverse_speed", v.max_reverse_speed),
            ("base_turn_rate_deg", v.base_turn_rate_deg),
            ("max_wheel_angle_deg", v.max_wheel_angle_deg),
            ("wheel_angle_step_deg", v.wheel_angle_step_deg),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ScenarioError::ValidationError(format!("vehicle.{} must be positive", name)));
            }
        }
        if v.low_speed_threshold < 0.0 {
            return Err(ScenarioError::ValidationError("vehicle.low_speed_threshold must not be negative".to_string()));
        }
        if !(0.0..=1.0).contains(&v.elasticity) {
            return Err(ScenarioError::ValidationError(format!(
                "vehicle.elasticity {} must be within [0, 1]",
                v.elasticity
            )));
        }
        if v.box_footprint_radius < 0.0 || v.ring_footprint_radius < 0.0 {
            return Err(ScenarioError::ValidationError("footprint radii must not be negative".to_string()));
        }

        // 入力タイムラインの検証
        for (i, segment) in self.inputs.segments.iter().enumerate() {
            if segment.start_tick >= segment.end_tick {
                return Err(ScenarioError::ValidationError(format!(
                    "input segment #{} has start_tick {} >= end_tick {}",
                    i + 1,
                    segment.start_tick,
                    segment.end_tick
                )));
            }
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("ティック周期: {}ms ({:.1}Hz)", self.sim.tick_ms, 1000.0 / self.sim.tick_ms as f64);
        println!(
            "最大ティック数: {} ({:.1}秒)",
            self.sim.max_ticks,
            (self.sim.max_ticks * self.sim.tick_ms) as f64 / 1000.0
        );
        println!("実時間実行: {}", if self.sim.realtime { "はい" } else { "いいえ" });
        if let Some(laps) = self.sim.stop_after_laps {
            println!("終了周回数: {}", laps);
        }
        println!();

        println!("=== 車両 ===");
        println!("最高速度: {:.2} (後退 {:.2})", self.vehicle.max_speed, self.vehicle.max_reverse_speed);
        println!("加速/減速: {:.3} / {:.3}", self.vehicle.acceleration, self.vehicle.deceleration);
        println!("反発係数: {:.2}", self.vehicle.elasticity);
        println!(
            "スタート位置: ({:.1}, {:.1}) ヘディング {:.1}°",
            self.start_pose.x, self.start_pose.z, self.start_pose.heading_deg
        );
        println!();

        println!("=== 入力タイムライン ===");
        println!("区間数: {}", self.inputs.segments.len());
        for segment in &self.inputs.segments {
            println!("  {:>6}-{:<6} {:?}", segment.start_tick, segment.end_tick, segment.controls);
        }
        if !self.inputs.resets.is_empty() {
            println!("リセット: {:?}", self.inputs.resets);
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(std::path::PathBuf),
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "シナリオファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}
