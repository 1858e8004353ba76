use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "food-scan")]
#[command(about = "食品写真AI解析・アレルゲン判定ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 食品写真を解析してアレルゲンを判定
    Scan {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 結果を履歴に保存
        #[arg(short, long)]
        save: bool,

        /// 有効なアレルゲン設定をリクエストに含める
        #[arg(long)]
        send_profile: bool,
    },

    /// アレルゲン設定の表示・変更
    Allergens {
        /// 指定indexの有効/無効を反転
        #[arg(short, long)]
        toggle: Option<usize>,

        /// カスタムアレルゲンを追加
        #[arg(short, long)]
        add: Option<String>,

        /// カタログの同義語も表示
        #[arg(long)]
        aliases: bool,
    },

    /// スキャン履歴の表示・削除
    History {
        /// 指定idのエントリを削除
        #[arg(short, long)]
        delete: Option<String>,

        /// 履歴を全削除
        #[arg(long)]
        clear: bool,
    },

    /// 設定の表示・変更
    Config {
        /// 分類エンドポイントURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}
