use anyhow::Context;
use clap::Parser;
use mokeke_common::encoding::{rank_candidates, select_best};
use mokeke_common::{ListFormat, ProgressMode, Session};
use mokeke_tracker::{cli, config, error, loader, output, store};
use cli::{Cli, Commands};
use config::Config;
use std::path::Path;
use store::FileStore;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Decode { file, candidates } => {
            println!("🔤 mokeke - 文字コード判定\n");

            let bytes = std::fs::read(&file)
                .with_context(|| format!("ファイルを読み込めません: {}", file.display()))?;
            let ranked = rank_candidates(&bytes, &config.scoring);

            if candidates {
                println!("{:<14} {:>8}  {}", "エンコーディング", "スコア", "備考");
                for cand in &ranked {
                    let mut notes = Vec::new();
                    if cand.bom_declared {
                        notes.push("BOM");
                    }
                    if cand.had_errors {
                        notes.push("置換文字あり");
                    }
                    println!("{:<14} {:>8}  {}", cand.encoding.label(), cand.score, notes.join(", "));
                }
                println!();
            }

            match select_best(&ranked) {
                Some(best) => println!("✔ 判定: {} (スコア {})", best.encoding, best.score),
                None => println!("✔ 判定: UTF-8 (候補なし)"),
            }
        }

        Commands::Parse { file, catalog, json, output } => {
            let list_path = loader::resolve_list_path(
                file.as_deref(),
                &config.list_candidates,
                Path::new("."),
            )?;
            let catalog_path = catalog.or_else(|| config.catalog_path.clone());
            let catalog = loader::load_catalog(catalog_path.as_deref());

            let decoded = loader::read_list(&list_path, &config.scoring)
                .with_context(|| format!("リストを読み込めません: {}", list_path.display()))?;
            let mut used = mokeke_common::UsedImages::new();
            let list = mokeke_common::parse_auto(&decoded.text, &catalog, &mut used);

            if list.is_unrecognized() {
                return Err(error::TrackerError::UnrecognizedList(
                    list_path.display().to_string(),
                )
                .into());
            }

            if json {
                let content = output::items_to_json(&list.items)?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, content)?;
                        println!("✔ 結果を保存: {}", path.display());
                    }
                    None => println!("{}", content),
                }
                return Ok(());
            }

            println!("📋 mokeke - リスト解析\n");
            println!("- ファイル: {} ({})", list_path.display(), decoded.encoding);
            let format = match list.format {
                ListFormat::Simple => "シンプル形式",
                ListFormat::Tabular => "TSV形式",
            };
            println!("- 形式: {}", format);
            println!("- 画像カタログ: {}件", catalog.len());
            println!();

            for category in &list.categories {
                let count = list
                    .items
                    .iter()
                    .filter(|item| match list.format {
                        ListFormat::Simple => &item.category == category,
                        ListFormat::Tabular => &item.major_category == category,
                    })
                    .count();
                println!("  {} ({}件)", category, count);
            }

            let with_image = list.items.iter().filter(|item| item.image.is_some()).count();
            let acquired = list.items.iter().filter(|item| item.is_acquired()).count();
            println!(
                "\n✅ {}件を読み込みました（入手日あり: {}件, 画像あり: {}件）",
                list.items.len(),
                acquired,
                with_image
            );
        }

        Commands::Progress { file, catalog, mode, toggle, reset, list } => {
            println!("✅ mokeke - 入手状態\n");

            let list_path = loader::resolve_list_path(
                file.as_deref(),
                &config.list_candidates,
                Path::new("."),
            )?;
            let catalog_path = catalog.or_else(|| config.catalog_path.clone());
            let catalog = loader::load_catalog(catalog_path.as_deref());

            let store_path = config.resolved_store_path()?;
            let mut store = FileStore::open(&store_path);

            let bytes = std::fs::read(&list_path)
                .with_context(|| format!("リストを読み込めません: {}", list_path.display()))?;
            println!("- ファイル: {} (モード: {})", list_path.display(), mode);
            let mut session = Session::load_bytes(
                &bytes,
                &config.scoring,
                &catalog,
                &mut store,
                ProgressMode::from(mode),
            )?;

            if session.list().is_unrecognized() {
                return Err(error::TrackerError::UnrecognizedList(
                    list_path.display().to_string(),
                )
                .into());
            }

            if reset {
                session.reset(&mut store)?;
                println!("✔ すべて未入手に戻しました");
            }

            for id in &toggle {
                let collected = session.toggle(id, &mut store)?;
                println!("✔ {} → {}", id, if collected { "入手済み" } else { "未入手" });
            }

            if list {
                for item in session.items() {
                    let mark = if session.is_collected(&item.id) { "☑" } else { "☐" };
                    println!("  {} {}  [{}] {}", mark, item.id, item.category, item.name);
                }
                println!();
            }

            for (category, count) in session.count_by_category() {
                println!("  {}: {}/{}", category, count.done, count.total);
            }

            let summary = session.summary();
            println!(
                "\n合計 {}件 / 入手済み {}件 / 未入手 {}件",
                summary.total, summary.done, summary.todo
            );
            println!("保存先: {}", store.path().display());
        }

        Commands::Override { file, id, keyword, catalog, pick } => {
            println!("🖼  mokeke - 画像の手動指定\n");

            let catalog_path = catalog.or_else(|| config.catalog_path.clone());
            let catalog = loader::load_catalog(catalog_path.as_deref());
            if catalog.is_empty() {
                return Err(error::TrackerError::Config(
                    "画像カタログが読み込まれていません（--catalog または config --set-catalog）".into(),
                )
                .into());
            }

            let store_path = config.resolved_store_path()?;
            let mut store = FileStore::open(&store_path);
            let bytes = std::fs::read(&file)
                .with_context(|| format!("リストを読み込めません: {}", file.display()))?;
            let mut session = Session::load_bytes(
                &bytes,
                &config.scoring,
                &catalog,
                &mut store,
                ProgressMode::Merge,
            )?;

            let candidates = session.override_candidates(&id, &keyword, &catalog)?;
            if candidates.is_empty() {
                println!("候補が見つかりません: {}", keyword);
                return Ok(());
            }

            for (i, img) in candidates.iter().enumerate() {
                println!("  {}: {} [{}] {}", i + 1, img.filename, img.region_name, img.item_name);
            }

            if let Some(pick) = pick {
                let chosen = cli::pick_index(pick, candidates.len())
                    .and_then(|i| candidates.get(i))
                    .map(|img| img.path.clone());
                if let Some(path) = chosen {
                    session.set_image_override(&id, &path, &mut store)?;
                    println!("\n✔ 画像を差し替えました: {} → {}", id, path);
                }
            }
        }

        Commands::Config { set_catalog, show } => {
            let mut config = config;

            if let Some(path) = set_catalog {
                config.set_catalog_path(path)?;
                println!("✔ 画像カタログを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  画像カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  リスト候補: {}", config.list_candidates.join(", "));
                println!("  進捗の保存先: {}", config.resolved_store_path()?.display());
                println!("  UTF-8優先ボーナス: {}", config.scoring.utf8_preference);
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` があればそれを使い、なければ `--verbose` で debug、通常は warn
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
