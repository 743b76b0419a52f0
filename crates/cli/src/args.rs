// crates/cli/src/args.rs
use crate::options::OutputFormat;
use crate::parsers::{self, DateTimeArg, DurationArg};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueHint};
use enemeter_engine::inspect::DEFAULT_SAMPLE_SIZE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "enemeter",
    version,
    about = "ENEMETER 計測データ (電圧/電流/温度) の集計ツール"
)]
pub struct Args {
    /// ログの詳細度 (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 計測データを集計してレポートを出力
    Process(ProcessArgs),
    /// CSV の先頭を調べて値の範囲と単位を推定
    Inspect(InspectArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ProcessArgs {
    /// 入力 CSV ファイル
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub processing: ProcessingOptions,

    #[command(flatten)]
    pub time: TimeOptions,

    #[command(flatten)]
    pub values: ValueFilterOptions,
}

#[derive(ClapArgs, Debug)]
pub struct OutputOptions {
    /// 出力先ファイル (省略時は標準出力)
    #[arg(long, value_hint = ValueHint::FilePath, help_heading = "出力")]
    pub output: Option<PathBuf>,

    /// 出力フォーマット
    #[arg(long, value_enum, default_value = "text", help_heading = "出力")]
    pub format: OutputFormat,

    /// 特定のメトリクスのみ出力 (total_energy, average_power, peak_power,
    /// temperature, energy_by_hour, voltage_stats, current_stats,
    /// battery_discharge, solar_contribution)
    #[arg(long, help_heading = "出力")]
    pub metric: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct ProcessingOptions {
    /// ストリーミングモードで処理 (大きなファイル向け)
    #[arg(long, help_heading = "処理")]
    pub stream: bool,

    /// N 行に 1 行だけ処理
    #[arg(long, default_value_t = 1, value_parser = parsers::parse_positive_usize, help_heading = "処理")]
    pub sample: usize,

    /// 処理するレコード数の上限 (0 = 無制限)
    #[arg(long, default_value_t = 0, help_heading = "処理")]
    pub max: usize,

    /// 時間別集計の解像度 (例: 1h, 5m)
    #[arg(long, help_heading = "処理")]
    pub resolution: Option<DurationArg>,
}

#[derive(ClapArgs, Debug)]
pub struct TimeOptions {
    /// 計測開始時刻 兼 フィルタ下限 (YYYY-MM-DD[THH:MM[:SS]])
    #[arg(long, help_heading = "時間フィルタ")]
    pub start: Option<DateTimeArg>,

    /// フィルタ上限 (YYYY-MM-DD[THH:MM[:SS]])
    #[arg(long, help_heading = "時間フィルタ")]
    pub end: Option<DateTimeArg>,

    /// 時間窓 (例: 1h, 30m, 1h30m)。--end 未指定時のみ有効
    #[arg(long, help_heading = "時間フィルタ")]
    pub window: Option<DurationArg>,
}

#[derive(ClapArgs, Debug)]
pub struct ValueFilterOptions {
    /// 最低温度 (ミリ℃, 0 = 無効)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, help_heading = "値フィルタ")]
    pub min_temp: i64,

    /// 最低電圧 (µV, 0 = 未指定)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, help_heading = "値フィルタ")]
    pub volt_min: i64,

    /// 最高電圧 (µV, 0 = 未指定)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, help_heading = "値フィルタ")]
    pub volt_max: i64,

    /// 最低電流 (nA, 0 = 未指定)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, help_heading = "値フィルタ")]
    pub curr_min: i64,

    /// 最高電流 (nA, 0 = 未指定)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, help_heading = "値フィルタ")]
    pub curr_max: i64,
}

#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// 調査する CSV ファイル
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// 表示するサンプル行数
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE, value_parser = parsers::parse_positive_usize)]
    pub samples: usize,
}
