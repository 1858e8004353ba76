use clap::Parser;
use dialoguer::Confirm;
use food_scan::{catalog, cli, matcher, Classifier, Config, HistoryStore, KvStore, PreferenceStore};
use cli::{Cli, Commands};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn open_store(config: &Config) -> anyhow::Result<KvStore> {
    match &config.data_dir {
        Some(dir) => Ok(KvStore::new(dir.clone())),
        None => Ok(KvStore::open_default()?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Scan { image, save, send_profile } => {
            println!("📸 food-scan - 食品解析\n");

            let store = open_store(&config)?;
            let preferences = PreferenceStore::new(store.clone()).load().await;
            let enabled: Vec<_> = preferences.iter().filter(|p| p.enabled).cloned().collect();

            if cli.verbose {
                println!("  有効なアレルゲン設定: {}件", enabled.len());
            }

            // AI解析（リトライなし。失敗はそのままエラー表示）
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message("AI解析中...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let classifier = Classifier::new(&config)?;
            let profile = if send_profile { Some(enabled.as_slice()) } else { None };
            let result = classifier.classify_image(&image, profile).await;
            spinner.finish_and_clear();

            let analysis = result?;
            println!("✔ 解析完了: {}", analysis.food_name);
            if let Some(level) = analysis.confidence_level {
                println!("  確信度: {}", level.as_str());
            }

            for warning in &analysis.warnings {
                println!("  ⚠ {}", warning);
            }

            // ユーザー設定との照合
            let dangerous = matcher::filter_dangerous(&analysis.allergens, &preferences);

            println!("\n検出アレルゲン:");
            if analysis.allergens.is_empty() {
                println!("  なし（安全）");
            }
            for allergen in &analysis.allergens {
                if dangerous.contains(allergen) {
                    println!("  🚨 {} ← 設定に該当", allergen);
                } else {
                    println!("  - {}", allergen);
                }
            }

            println!("\n材料:");
            for ingredient in &analysis.ingredients {
                println!("  - {}", ingredient);
            }

            if save {
                let history = HistoryStore::new(store);
                let item = history.append(&analysis).await?;
                println!("\n✔ 履歴に保存しました (id: {})", item.id);
            }

            if !dangerous.is_empty() {
                println!("\n🚨 注意: 設定中のアレルゲンに{}件該当します", dangerous.len());
            } else {
                println!("\n✅ 設定中のアレルゲンへの該当はありません");
            }
        }

        Commands::Allergens { toggle, add, aliases } => {
            let store = open_store(&config)?;
            let prefs = PreferenceStore::new(store);

            if let Some(index) = toggle {
                let updated = prefs.toggle(index).await?;
                let entry = &updated[index];
                println!(
                    "✔ {} を{}にしました",
                    entry.name,
                    if entry.enabled { "有効" } else { "無効" }
                );
            }

            if let Some(name) = add {
                let updated = prefs.add_custom(&name).await?;
                if let Some(entry) = updated.last() {
                    println!("✔ カスタムアレルゲンを追加: {} (id: {})", entry.name, entry.id);
                }
            }

            println!("アレルゲン設定:");
            for (index, pref) in prefs.load().await.iter().enumerate() {
                let mark = if pref.enabled { "✔" } else { " " };
                println!("  [{}] {} {}", index, mark, pref.name);

                if aliases {
                    if let Some(def) = catalog::COMMON_ALLERGENS.iter().find(|d| d.id == pref.id) {
                        println!("        同義語: {}", def.aliases.join(", "));
                    }
                }
            }
        }

        Commands::History { delete, clear } => {
            let store = open_store(&config)?;
            let history = HistoryStore::new(store);

            if clear {
                let confirmed = Confirm::new()
                    .with_prompt("履歴をすべて削除しますか？")
                    .default(false)
                    .interact()?;

                if confirmed {
                    history.clear().await?;
                    println!("✔ 履歴を全削除しました");
                } else {
                    println!("キャンセルしました");
                }
                return Ok(());
            }

            if let Some(id) = delete {
                history.delete_immediate(&id).await?;
                println!("✔ 削除しました (id: {})", id);
            }

            let items = history.list().await;
            if items.is_empty() {
                println!("履歴はありません");
            } else {
                println!("スキャン履歴（新しい順、最大{}件）:", food_scan::storage::history::MAX_ENTRIES);
                for item in &items {
                    let mark = if item.safe { "✅" } else { "🚨" };
                    println!("  {} {} {} (id: {})", mark, item.date, item.product_name, item.id);
                    if cli.verbose && !item.allergens.is_empty() {
                        println!("      アレルゲン: {}", item.allergens.join(", "));
                    }
                }
            }
        }

        Commands::Config { set_api_url, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ エンドポイントを設定しました");
            }

            if show {
                println!("設定:");
                println!("  エンドポイント: {}", config.api_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                match &config.data_dir {
                    Some(dir) => println!("  データ保存先: {}", dir.display()),
                    None => println!("  データ保存先: デフォルト (~/.local/share/food-scan)"),
                }
            }
        }
    }

    Ok(())
}
