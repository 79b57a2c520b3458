mod logging;
mod models;
mod scenario;
mod simulation;

use std::str::FromStr;

use clap::{Arg, Command};
use logging::{init_logging, parse_log_level, LogConfig, LogOutput};
use models::{FrameTracer, TrackCatalog};
use scenario::*;
use simulation::SimulationEngine;

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("racesim")
        .version("0.1.0")
        .about("レーシングシミュレーション (Racing Simulation)")
        .long_about("1台の車両がコースを周回するレーシングゲームの物理・衝突判定コア\n\
                     固定周期のティック駆動で車両運動・障害物反発・ラップ計測を行います。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("実行するシナリオファイル(.yaml)のパスを指定します。\n\
                           入力タイムラインに従って車両を走らせ、結果を表示します。")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .requires("scenario")
        )
        .arg(
            Arg::new("catalog")
                .short('c')
                .long("catalog")
                .action(clap::ArgAction::SetTrue)
                .help("標準コースの障害物一覧を表示して終了")
                .conflicts_with("info")
        )
        .arg(
            Arg::new("realtime")
                .short('r')
                .long("realtime")
                .action(clap::ArgAction::SetTrue)
                .help("実時間に合わせてティックを実行（シナリオ設定より優先）")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: フレーム単位)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .help("ログファイルの出力ディレクトリ")
        )
        .get_matches();

    println!("レーシングシミュレーション (Racing Simulation) - racesim v0.1.0");
    println!();

    // 詳細レベルの設定
    let verbose_level = matches.get_count("verbose");

    // ログ設定（--log-level が指定されていれば -v より優先）
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| parse_log_level(s))
        .unwrap_or_else(|| LogConfig::level_for_verbosity(verbose_level));
    let output = match matches.get_one::<String>("log-output").map(|s| LogOutput::from_str(s)) {
        Some(Ok(output)) => output,
        Some(Err(e)) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        None => LogOutput::Console,
    };
    let log_config = LogConfig {
        level,
        output,
        log_dir: matches
            .get_one::<String>("log-dir")
            .cloned()
            .unwrap_or_else(|| "logs".to_string()),
        ..LogConfig::default()
    };

    // ファイル出力のガードはプログラム終了まで保持する
    let _log_guard = match init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("エラー: ログの初期化に失敗しました: {}", e);
            std::process::exit(1);
        }
    };

    if verbose_level > 0 {
        println!("詳細出力レベル: {}", verbose_level);
    }

    // 障害物一覧の表示
    if matches.get_flag("catalog") {
        TrackCatalog::standard().print_summary();
        return;
    }

    // シナリオファイルの処理
    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        let options = RunOptions {
            info_only: matches.get_flag("info"),
            realtime: matches.get_flag("realtime"),
            verbose_level,
        };
        match run_scenario(scenario_path, options) {
            Ok(_) => {
                if verbose_level > 0 {
                    println!("シナリオ実行が正常に完了しました。");
                }
            }
            Err(e) => {
                eprintln!("エラー: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        // デフォルト動作: 利用可能なシナリオ一覧を表示
        show_default_help();
    }
}

/// コマンドラインから決まる実行オプション
#[derive(Debug, Clone, Copy)]
struct RunOptions {
    info_only: bool,
    realtime: bool,
    verbose_level: u8,
}

/// シナリオファイルを読み込んで実行
fn run_scenario(scenario_path: &str, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    // シナリオファイルの読み込み
    let scenario = ScenarioConfig::from_file(scenario_path)?;

    if options.verbose_level > 0 {
        println!("シナリオファイル読み込み完了: {}", scenario_path);
    }

    // 情報表示のみの場合
    if options.info_only {
        scenario.print_summary();
        return Ok(());
    }

    // シナリオ実行
    execute_scenario(scenario, options)?;

    Ok(())
}

/// シナリオの実行
fn execute_scenario(scenario: ScenarioConfig, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    // 基本情報表示
    scenario.print_summary();
    println!();

    let mut input = scenario.inputs.to_provider();
    let mut observer = FrameTracer;
    let mut engine = SimulationEngine::new(&scenario, options.verbose_level);

    let summary = if options.realtime || scenario.sim.realtime {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(engine.run_realtime(&mut input, &mut observer))
    } else {
        engine.run(&mut input, &mut observer)
    };

    println!();
    summary.print_summary();

    Ok(())
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  racesim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>   シナリオファイルを指定して実行");
    println!("  -i, --info              シナリオ情報のみ表示");
    println!("  -c, --catalog           標準コースの障害物一覧を表示");
    println!("  -r, --realtime          実時間で実行");
    println!("  -v, --verbose           詳細出力 (複数指定で詳細レベル上昇)");
    println!("      --log-level <LEVEL> ログレベルを指定");
    println!("      --log-output <TARGET> ログ出力先 (console, file, both)");
    println!("      --log-dir <DIR>     ログファイルの出力ディレクトリ");
    println!("  -h, --help              このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/straight_line.yaml  - スタートからの直線加速");
    println!("  scenarios/wall_bounce.yaml    - 外周壁への衝突と反発");
    println!("  scenarios/reset_demo.yaml     - 走行中のリセット");
    println!("  scenarios/first_lap.yaml      - 操作入力による周回走行");
    println!();
    println!("例:");
    println!("  racesim -s scenarios/straight_line.yaml");
    println!("  racesim -s scenarios/first_lap.yaml -vv");
    println!("  racesim -s scenarios/wall_bounce.yaml -i");
    println!("  racesim -s scenarios/reset_demo.yaml --realtime --log-output both");
    println!("  racesim --catalog");
}
