use clap::{Parser, Subcommand};
use mokeke_common::ProgressMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mokeke")]
#[command(about = "モケケ収集リスト管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ファイルの文字コードを判定
    Decode {
        /// 判定するファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 全候補のスコアを表示
        #[arg(long)]
        candidates: bool,
    },

    /// リストを解析して内容を表示
    Parse {
        /// リストファイル（省略時は設定の候補をカレントディレクトリから探す）
        file: Option<PathBuf>,

        /// 画像一覧CSV（省略時は設定の catalog_path）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 項目をJSONで出力
        #[arg(long)]
        json: bool,

        /// JSONの出力先（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 入手状態を表示・更新
    Progress {
        /// リストファイル（省略時は設定の候補をカレントディレクトリから探す）
        file: Option<PathBuf>,

        /// 画像一覧CSV
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 読み込み時の扱い (merge/overwrite/unchecked)
        #[arg(short, long, default_value = "merge")]
        mode: ListMode,

        /// 入手状態を反転する項目ID（複数指定可）
        #[arg(short, long)]
        toggle: Vec<String>,

        /// すべて未入手に戻す
        #[arg(long)]
        reset: bool,

        /// 項目一覧を表示
        #[arg(short, long)]
        list: bool,
    },

    /// 画像の手動指定（候補の表示・選択）
    Override {
        /// リストファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 項目ID
        #[arg(required = true)]
        id: String,

        /// 候補のキーワード（アイテム名・ファイル名の一部）
        #[arg(required = true)]
        keyword: String,

        /// 画像一覧CSV
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 採用する候補の番号（1始まり、省略時は候補を表示するだけ）
        #[arg(short, long)]
        pick: Option<usize>,
    },

    /// 設定の表示・変更
    Config {
        /// 画像一覧CSVのパスを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 読み込み時の入手状態の扱い
#[derive(Clone, Copy, Debug, Default)]
pub enum ListMode {
    /// 保存済みの状態に入手日のある項目を追加
    #[default]
    Merge,
    /// 入手日のある項目だけで上書き
    Overwrite,
    /// すべて未入手
    Unchecked,
}

impl From<ListMode> for ProgressMode {
    fn from(mode: ListMode) -> Self {
        match mode {
            ListMode::Merge => ProgressMode::Merge,
            ListMode::Overwrite => ProgressMode::Overwrite,
            ListMode::Unchecked => ProgressMode::AllUnchecked,
        }
    }
}

impl std::str::FromStr for ListMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" | "m" => Ok(ListMode::Merge),
            "overwrite" | "o" => Ok(ListMode::Overwrite),
            "unchecked" | "all-unchecked" | "u" => Ok(ListMode::Unchecked),
            _ => Err(format!("Unknown mode: {}. Use merge, overwrite, or unchecked", s)),
        }
    }
}

impl std::fmt::Display for ListMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListMode::Merge => write!(f, "merge"),
            ListMode::Overwrite => write!(f, "overwrite"),
            ListMode::Unchecked => write!(f, "unchecked"),
        }
    }
}

/// 候補番号（1始まり）を範囲内に丸めてインデックスにする。候補が無ければ None
pub fn pick_index(pick: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(pick.clamp(1, len) - 1)
}
