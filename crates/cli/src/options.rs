use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// レポートの出力形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 人間向けのテキストレポート
    #[default]
    Text,
    Json,
    /// セクション区切りの `Metric,Value` 形式
    Csv,
}
