//! # Simulation モジュール
//!
//! レーシングシミュレーションの中核となるティック駆動エンジンを提供します。
//!
//! このモジュールは固定周期のシミュレーションループを管理し、車両運動学・
//! 運動積分（衝突応答）・チェックポイント判定を1ティックごとに決まった順序で
//! 実行します。1ティックの処理は外部から見て不可分で、描画側は各ティック終了時に
//! 公開される [`FrameSnapshot`] だけを参照します。
//!
//! ## シミュレーション処理順序
//!
//! 各ティックにおいて、以下の順序で処理が実行されます：
//!
//! 1. **入力スナップショット**: ティック開始時の操作入力を固定（リセット要求があれば先に適用）
//! 2. **車両運動学**: 速度・ヘディング・ステアリングホイール角の更新
//! 3. **運動積分**: 提案位置の衝突判定と反発処理
//! 4. **チェックポイント判定**: 新しい位置でのラップ進行判定
//! 5. **公開**: フレームスナップショットをオブザーバーへ通知
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use racesim::simulation::SimulationEngine;
//! use racesim::scenario::ScenarioConfig;
//!
//! let config = ScenarioConfig::from_file("scenarios/first_lap.yaml")?;
//! let mut input = config.inputs.to_provider();
//!
//! let mut engine = SimulationEngine::new(&config, 1);
//! let summary = engine.run(&mut input, &mut FrameTracer);
//! summary.print_summary();
//! ```

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::models::*;
use crate::scenario::{ScenarioConfig, StartPose};

pub struct SimulationEngine {
    pub tick_ms: u64,
    pub max_ticks: u64,
    pub stop_after_laps: Option<u32>,
    pub step_count: u64,
    pub last_time_ms: u64,

    pub vehicle: VehicleState,
    pub kinematics: VehicleKinematics,
    pub integrator: MotionIntegrator,
    pub detector: CollisionDetector,
    pub checkpoints: CheckpointTracker,
    pub lights: StartLights,
    pub start_pose: StartPose,

    pub bounce_count: u64,
    pub top_speed: f64,
    pub verbose_level: u8,
}

impl SimulationEngine {
    /// 標準コースでエンジンを作成
    pub fn new(scenario: &ScenarioConfig, verbose_level: u8) -> Self {
        Self::with_catalog(scenario, TrackCatalog::standard(), verbose_level)
    }

    /// 任意のコース形状カタログでエンジンを作成
    pub fn with_catalog(scenario: &ScenarioConfig, catalog: TrackCatalog, verbose_level: u8) -> Self {
        let params = scenario.vehicle;
        let footprint = Footprint {
            box_radius: params.box_footprint_radius,
            ring_radius: params.ring_footprint_radius,
        };
        let pose = scenario.start_pose;

        Self {
            tick_ms: scenario.sim.tick_ms,
            max_ticks: scenario.sim.max_ticks,
            stop_after_laps: scenario.sim.stop_after_laps,
            step_count: 0,
            last_time_ms: 0,
            vehicle: VehicleState::at_rest(pose.x, pose.z, pose.heading_deg),
            kinematics: VehicleKinematics::new(params),
            integrator: MotionIntegrator::new(params.elasticity, footprint),
            detector: CollisionDetector::new(catalog),
            checkpoints: CheckpointTracker::new(),
            lights: StartLights::new(scenario.start_lights.interval_ms),
            start_pose: pose,
            bounce_count: 0,
            top_speed: 0.0,
            verbose_level,
        }
    }

    /// ゲーム開始時の初期化（スタート位置への配置とシグナル点灯開始）
    pub fn initialize(&mut self, now_ms: u64) {
        self.reset(now_ms);

        if self.verbose_level > 0 {
            info!("初期化完了:");
            info!("  箱型障害物: {}個", self.detector.catalog().axis_barriers().len());
            info!("  円環型障害物: {}個", self.detector.catalog().ring_barriers().len());
            info!(
                "  スタート位置: ({:.1}, {:.1}) ヘディング {:.1}°",
                self.start_pose.x, self.start_pose.z, self.start_pose.heading_deg
            );
        }
    }

    /// 車両とチェックポイントをスタート状態に戻す
    pub fn reset(&mut self, now_ms: u64) {
        self.vehicle = VehicleState::at_rest(self.start_pose.x, self.start_pose.z, self.start_pose.heading_deg);
        self.checkpoints.reset();
        self.lights.restart(now_ms);

        info!(
            at_ms = now_ms,
            x = self.vehicle.position.x,
            z = self.vehicle.position.z,
            "VEHICLE_RESET: 車両をスタート位置に戻しました"
        );
    }

    /// 1ティック分のシミュレーションを実行
    pub fn tick(&mut self, input: InputSnapshot, now_ms: u64) -> FrameSnapshot {
        if input.reset_requested {
            self.reset(now_ms);
        }

        self.lights.update(now_ms);

        let lap_started = self.checkpoints.progress().lap_started();
        self.kinematics.advance(&mut self.vehicle, &input.controls, lap_started);

        let outcome = self.integrator.integrate(&mut self.vehicle, &self.detector);
        let bounced = matches!(outcome, MotionOutcome::Bounced { .. });
        if bounced {
            self.bounce_count += 1;
        }
        self.top_speed = self.top_speed.max(self.vehicle.speed.abs());

        let position = self.vehicle.position;
        if let Some(CheckpointEvent::LapCompleted { .. }) = self.checkpoints.update(position.x, position.z, now_ms) {
            self.lights.extinguish();
        }

        let frame = FrameSnapshot::capture(
            self.step_count,
            now_ms,
            &self.vehicle,
            self.checkpoints.progress(),
            self.lights.row(),
            bounced,
        );

        self.step_count += 1;
        self.last_time_ms = now_ms;

        frame
    }

    /// 終了条件（最大ティック数または指定周回数）に達したか
    pub fn is_finished(&self) -> bool {
        if self.step_count >= self.max_ticks {
            return true;
        }
        match self.stop_after_laps {
            Some(laps) => self.checkpoints.lap_history().len() as u32 >= laps,
            None => false,
        }
    }

    /// 決定論的な時計で最後まで実行
    pub fn run(&mut self, input: &mut dyn IInputProvider, observer: &mut dyn IFrameObserver) -> RunSummary {
        let mut clock = SteppedClock::new();
        self.run_with_clock(input, &mut clock, observer)
    }

    /// 指定した時計で最後まで実行
    pub fn run_with_clock(
        &mut self,
        input: &mut dyn IInputProvider,
        clock: &mut dyn IClock,
        observer: &mut dyn IFrameObserver,
    ) -> RunSummary {
        info!("=== シミュレーション実行開始 ===");
        self.initialize(clock.elapsed_ms());

        while !self.is_finished() {
            self.step(input, clock.elapsed_ms(), observer);
            clock.advance(self.tick_ms);
        }

        self.finish()
    }

    /// 実時間（`tick_ms` 周期）で最後まで実行
    ///
    /// 処理が遅れたティックは後ろへずらし、ティック同士が重なることはありません。
    pub async fn run_realtime(
        &mut self,
        input: &mut dyn IInputProvider,
        observer: &mut dyn IFrameObserver,
    ) -> RunSummary {
        info!("=== シミュレーション実行開始（実時間） ===");
        let clock = WallClock::start();
        let mut interval = tokio::time::interval(Duration::from_millis(self.tick_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.initialize(clock.elapsed_ms());

        while !self.is_finished() {
            interval.tick().await;
            self.step(input, clock.elapsed_ms(), observer);
        }

        self.finish()
    }

    fn step(&mut self, input: &mut dyn IInputProvider, now_ms: u64, observer: &mut dyn IFrameObserver) {
        let snapshot = input.snapshot(self.step_count);
        let frame = self.tick(snapshot, now_ms);
        observer.on_frame(&frame);

        if self.step_count % 100 == 0 && self.verbose_level > 0 {
            let progress = (self.step_count as f64 / self.max_ticks as f64) * 100.0;
            info!(
                "進行状況: {:.1}% ({}/{}ティック) チェックポイント {} 速度 {:.2}",
                progress, self.step_count, self.max_ticks, frame.checkpoint, frame.speed
            );
        }
    }

    fn finish(&self) -> RunSummary {
        let summary = self.summary();

        info!("=== シミュレーション完了 ===");
        info!("総ティック数: {}", summary.ticks);
        info!("完了周回数: {}", summary.laps_completed);
        debug!(bounces = summary.bounce_count, top_speed = summary.top_speed, "実行統計");

        summary
    }

    /// 現時点の実行結果
    pub fn summary(&self) -> RunSummary {
        let history = self.checkpoints.lap_history();

        RunSummary {
            ticks: self.step_count,
            simulated_ms: self.last_time_ms,
            laps_completed: history.len() as u32,
            best_lap_s: self.checkpoints.best_lap().map(|r| r.duration_s()),
            last_lap_s: history.last().map(|r| r.duration_s()),
            bounce_count: self.bounce_count,
            top_speed: self.top_speed,
            final_checkpoint: self.checkpoints.progress().index,
            final_position: self.vehicle.position,
        }
    }
}

/// 実行結果の統計
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub simulated_ms: u64,
    pub laps_completed: u32,
    pub best_lap_s: Option<f64>,
    pub last_lap_s: Option<f64>,
    pub bounce_count: u64,
    pub top_speed: f64,
    pub final_checkpoint: u8,
    pub final_position: Position3D,
}

impl RunSummary {
    pub fn print_summary(&self) {
        println!("=== 実行結果 ===");
        println!("総ティック数: {} ({:.2}秒)", self.ticks, self.simulated_ms as f64 / 1000.0);
        println!("完了周回数: {}", self.laps_completed);
        if let Some(best) = self.best_lap_s {
            println!("ベストラップ: {:.2}秒", best);
        }
        if let Some(last) = self.last_lap_s {
            println!("最終ラップ: {:.2}秒", last);
        }
        println!("衝突回数: {}", self.bounce_count);
        println!("最高速度: {:.2} ({:.0} mph)", self.top_speed, self.top_speed * frame::GAUGE_MPH_PER_UNIT);
        println!("最終チェックポイント: {}", self.final_checkpoint);
        println!("最終位置: ({:.1}, {:.1})", self.final_position.x, self.final_position.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioConfig {
        ScenarioConfig::default()
    }

    fn accelerate() -> InputSnapshot {
        let mut snapshot = InputSnapshot::default();
        snapshot.controls.press(Control::Accelerate);
        snapshot
    }

    #[test]
    fn test_straight_acceleration_from_start_pose() {
        let mut engine = SimulationEngine::new(&scenario(), 0);
        engine.initialize(0);

        let mut expected_z = -40.0;
        let mut expected_speed: f64 = 0.0;
        let mut lap_start_frame = None;

        for tick in 0..40u64 {
            let frame = engine.tick(accelerate(), tick * 16);
            expected_speed = (expected_speed + 0.05).min(3.0);
            expected_z += expected_speed;

            assert!(!frame.bounced);
            if frame.timer_running && lap_start_frame.is_none() {
                lap_start_frame = Some(frame);
            }
        }

        assert!((engine.vehicle.position.z - expected_z).abs() < 1e-9);
        assert_eq!(engine.vehicle.position.x, 240.0);
        assert!((engine.vehicle.speed - 2.0).abs() < 1e-9);

        // z が初めて正になったティックでラップが始まる
        let start = lap_start_frame.expect("lap should have started");
        assert!(start.position.z > 0.0);
        assert_eq!(start.checkpoint, 1);
        assert_eq!(engine.checkpoints.progress().lap_start_ms, Some(start.time_ms));
        assert_eq!(start.time_ms, 39 * 16);
    }

    #[test]
    fn test_head_on_bounce_against_track_wall() {
        let mut config = scenario();
        config.start_pose = StartPose { x: 268.0, z: 0.0, heading_deg: 90.0 };
        let mut engine = SimulationEngine::new(&config, 0);
        engine.initialize(0);
        engine.vehicle.speed = 3.0;

        let frame = engine.tick(accelerate(), 0);

        assert!(frame.bounced);
        assert_eq!(engine.vehicle.speed, -0.75);
        assert!((engine.vehicle.position.x - 267.25).abs() < 1e-9);
        assert!(engine.vehicle.position.z.abs() < 1e-9);
        assert_eq!(engine.bounce_count, 1);
    }

    #[test]
    fn test_reset_request_restores_start_state() {
        let mut engine = SimulationEngine::new(&scenario(), 0);
        engine.initialize(0);
        for tick in 0..60u64 {
            engine.tick(accelerate(), tick * 16);
        }
        assert_eq!(engine.checkpoints.progress().index, 1);

        let reset = InputSnapshot {
            reset_requested: true,
            ..InputSnapshot::default()
        };
        let frame = engine.tick(reset, 5000);

        assert_eq!(frame.position, Position3D::on_ground(240.0, -40.0));
        assert_eq!(frame.speed, 0.0);
        assert_eq!(frame.heading_deg, 0.0);
        assert_eq!(frame.wheel_angle_deg, 0.0);
        assert_eq!(frame.checkpoint, 0);
        assert!(!frame.timer_running);
        assert_eq!(frame.light_row, 0);
        assert!(!engine.checkpoints.progress().lap_started());
    }

    #[test]
    fn test_lap_completion_extinguishes_lights() {
        let mut engine = SimulationEngine::new(&scenario(), 0);
        engine.initialize(0);
        let route = [
            (240.0, 1.0),
            (150.0, 290.0),
            (-240.0, 100.0),
            (-150.0, -330.0),
            (100.0, 80.0),
            (250.0, -100.0),
        ];
        for (i, (x, z)) in route.iter().enumerate() {
            engine.checkpoints.update(*x, *z, 1000 + i as u64);
        }
        assert_eq!(engine.checkpoints.progress().index, 6);

        engine.vehicle = VehicleState::at_rest(240.0, 10.0, 0.0);
        let frame = engine.tick(InputSnapshot::default(), 61_000);

        assert!(frame.lap_complete);
        assert!(!frame.timer_running);
        assert_eq!(frame.completed_lap_s, Some(60.0));
        assert_eq!(frame.light_row, -1);

        // 周回完了後は次のリセットまでチェックポイントが進まない
        let frame = engine.tick(accelerate(), 61_016);
        assert_eq!(frame.checkpoint, LAP_COMPLETE);
    }

    #[test]
    fn test_run_publishes_every_tick() {
        let mut config = scenario();
        config.sim.max_ticks = 50;
        let mut input = ScriptedInput::new(
            vec![InputSegment { start_tick: 0, end_tick: 50, controls: vec![Control::Accelerate] }],
            [],
        );
        let mut recorder = FrameRecorder::default();

        let mut engine = SimulationEngine::new(&config, 0);
        let summary = engine.run(&mut input, &mut recorder);

        assert_eq!(recorder.frames.len(), 50);
        assert_eq!(summary.ticks, 50);
        assert_eq!(summary.simulated_ms, 49 * 16);
        assert_eq!(summary.final_checkpoint, 1);
        assert!((summary.top_speed - 2.5).abs() < 1e-9);
        assert!(recorder.frames.windows(2).all(|w| w[1].time_ms - w[0].time_ms == 16));
    }

    #[test]
    fn test_stop_after_laps() {
        let mut config = scenario();
        config.sim.stop_after_laps = Some(1);
        let mut engine = SimulationEngine::new(&config, 0);
        assert!(!engine.is_finished());

        for (x, z) in [
            (240.0, 1.0),
            (150.0, 290.0),
            (-240.0, 100.0),
            (-150.0, -330.0),
            (100.0, 80.0),
            (250.0, -100.0),
            (240.0, 10.0),
        ] {
            engine.checkpoints.update(x, z, 0);
        }
        assert!(engine.is_finished());
    }

    #[test]
    fn test_first_lap_scenario_completes_without_contact() {
        let config = ScenarioConfig::from_file("scenarios/first_lap.yaml").unwrap();
        let mut input = config.inputs.to_provider();
        let mut recorder = FrameRecorder::default();

        let mut engine = SimulationEngine::new(&config, 0);
        let summary = engine.run(&mut input, &mut recorder);

        assert_eq!(summary.laps_completed, 1);
        assert_eq!(summary.bounce_count, 0);
        assert_eq!(summary.final_checkpoint, LAP_COMPLETE);
        assert_eq!(summary.ticks, 1940);
        assert!((summary.best_lap_s.unwrap() - 30.4).abs() < 1e-9);

        // 7つのゲートを順番に通過している
        let mut seen = vec![0u8];
        for frame in &recorder.frames {
            if seen.last() != Some(&frame.checkpoint) {
                seen.push(frame.checkpoint);
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_run_paces_ticks() {
        let mut config = scenario();
        config.sim.max_ticks = 20;
        let mut input = ScriptedInput::default();
        let mut recorder = FrameRecorder::default();

        let mut engine = SimulationEngine::new(&config, 0);
        let summary = engine.run_realtime(&mut input, &mut recorder).await;

        assert_eq!(summary.ticks, 20);
        assert_eq!(recorder.frames.len(), 20);
        let last = recorder.frames.last().map(|f| f.time_ms).unwrap_or(0);
        assert!(last >= 19 * 16, "last tick at {}ms", last);
    }
}
