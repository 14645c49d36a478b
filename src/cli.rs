use clap::{Parser, Subcommand};
use crate::export::ExportFormat;
use floor_assign_common::SwapPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "floor-assign")]
#[command(about = "フロア図面の部屋割り当て・入れ替えツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 参照データの取得元（ディレクトリまたはURL、設定より優先）
    #[arg(long, global = true)]
    pub assets: Option<String>,

    /// 状態ファイル（設定より優先）
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// フロアの部屋一覧を表示
    Show {
        /// フロア（省略時は設定の既定フロア）
        #[arg(short, long)]
        floor: Option<String>,

        /// 部署で絞り込み
        #[arg(long)]
        dept: Option<String>,

        /// 用途で絞り込み
        #[arg(long)]
        usage: Option<String>,
    },

    /// 部屋をドラッグ＆ドロップした扱いで入れ替える
    Assign {
        /// ドラッグした部屋
        #[arg(required = true)]
        dragged: String,

        /// ドロップ先の部屋
        #[arg(required = true)]
        target: String,

        /// ドロップ先のフロア
        #[arg(short, long)]
        floor: Option<String>,

        /// ドラッグ元のフロア（省略時はドロップ先と同じ）
        #[arg(long)]
        from_floor: Option<String>,
    },

    /// 対話的に部屋を入れ替え
    Interactive {
        /// 開始フロア
        #[arg(short, long)]
        floor: Option<String>,
    },

    /// 変更履歴を表示
    Log {
        /// 表示件数
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// 割り当てと変更履歴をJSON/Excelに出力
    Export {
        /// 出力形式 (json/excel/both)
        #[arg(short = 'F', long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 部屋名・部署の補完に使うフロア
        #[arg(short, long)]
        floor: Option<String>,

        /// ドキュメントタイトル
        #[arg(short, long, default_value = "部屋割り当て")]
        title: String,
    },

    /// 認識テキストと事務室データから room-mapping-<N>.json を作る
    Map {
        /// 位置データJSON（図面名 → 位置リスト、または位置リスト）
        #[arg(required = true)]
        positions: PathBuf,

        /// 事務室データ（CSV/Excel）
        #[arg(required = true)]
        offices: PathBuf,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// フロア（図面名から取れない場合に使用）
        #[arg(short, long)]
        floor: Option<String>,
    },

    /// 認識テキストと事務室データを結合して merged_room_data.json を作る
    Merge {
        /// 位置データJSON
        #[arg(required = true)]
        positions: PathBuf,

        /// 事務室データ（CSV/Excel）
        #[arg(required = true)]
        offices: PathBuf,

        /// 出力ファイル
        #[arg(short, long, default_value = "merged_room_data.json")]
        output: PathBuf,
    },

    /// 保存状態を表示
    State,

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 参照データの取得元を設定
        #[arg(long)]
        set_assets: Option<String>,

        /// 入れ替え方式を設定 (legacy/exclusive)
        #[arg(long)]
        set_policy: Option<SwapPolicy>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assign() {
        let cli = Cli::try_parse_from(["floor-assign", "assign", "101", "102", "-f", "4"]).unwrap();
        match cli.command {
            Commands::Assign { dragged, target, floor, from_floor } => {
                assert_eq!(dragged, "101");
                assert_eq!(target, "102");
                assert_eq!(floor.as_deref(), Some("4"));
                assert!(from_floor.is_none());
            }
            _ => panic!("assign expected"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["floor-assign", "log", "--assets", "https://example.com/", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.assets.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_parse_export_format() {
        let cli = Cli::try_parse_from(["floor-assign", "export", "-F", "xlsx"]).unwrap();
        match cli.command {
            Commands::Export { format, title, .. } => {
                assert_eq!(format, ExportFormat::Excel);
                assert_eq!(title, "部屋割り当て");
            }
            _ => panic!("export expected"),
        }
    }

    #[test]
    fn test_parse_policy() {
        let cli = Cli::try_parse_from(["floor-assign", "config", "--set-policy", "exclusive"]).unwrap();
        match cli.command {
            Commands::Config { set_policy, .. } => assert_eq!(set_policy, Some(SwapPolicy::Exclusive)),
            _ => panic!("config expected"),
        }
    }
}
