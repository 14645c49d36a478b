use clap::Parser;
use floor_assign::{cli, clock, config, error, export, interactive, join, loader, store, view};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use floor_assign_common::{DropOutcome, Gesture, OfficeDirectory, OfficeFilter, Session};
use loader::{load_floor, AssetSource};
use store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = Config::load()?;
    config.assets_override = cli.assets.clone();
    if let Some(state) = &cli.state {
        config.state_file = Some(state.clone());
    }

    match cli.command {
        Commands::Show { floor, dept, usage } => {
            let floor = floor.unwrap_or_else(|| config.default_floor.clone());
            let source = AssetSource::parse(&config.asset_base())?;
            let session = open_session(&config)?;

            let data = load_floor(&source, &floor, config.floors.get(&floor)?).await;
            view::print_floor(
                &data,
                session.assignments(),
                &OfficeFilter { department: dept, usage },
            );
        }

        Commands::Assign { dragged, target, floor, from_floor } => {
            println!("🔀 floor-assign - 部屋入れ替え\n");

            let floor = floor.unwrap_or_else(|| config.default_floor.clone());
            let from_floor = from_floor.unwrap_or_else(|| floor.clone());
            config.floors.get(&floor)?;
            config.floors.get(&from_floor)?;

            let mut session = open_session(&config)?;
            let mut gesture = Gesture::new();
            gesture.start(&from_floor, &dragged);
            gesture.hover(&target);

            let Some(intent) = gesture.drop_on(&floor, &target) else {
                return Err(error::FloorAssignError::InvalidInput(
                    "ドラッグする部屋を指定してください".into(),
                ));
            };

            match session.apply_drop(&intent, clock::now_millis())? {
                DropOutcome::Swapped(entry) => {
                    println!("✔ {} → {}", entry.from, entry.to);
                    if let Some(occupant) = session.assignments().get(&target) {
                        println!("  {} ← {}", target, occupant);
                    }
                    println!("\n✅ 保存しました（{}）", config.state_path()?.display());
                }
                DropOutcome::Ignored => println!("同じ部屋のため変更はありません"),
            }
        }

        Commands::Interactive { floor } => {
            println!("🏢 floor-assign - 対話モード\n");

            let floor = floor.unwrap_or_else(|| config.default_floor.clone());
            let source = AssetSource::parse(&config.asset_base())?;
            println!("- 取得元: {}", source.describe());
            let session = open_session(&config)?;

            let ui = interactive::Interactive::start(&source, &config.floors, session, &floor).await?;
            let session = ui.run().await?;
            println!(
                "\n✅ 終了（割り当て{}件 / 変更履歴{}件）",
                session.assignments().len(),
                session.change_log().len()
            );
        }

        Commands::Log { limit } => {
            let session = open_session(&config)?;
            view::print_change_log(session.change_log(), limit);
        }

        Commands::Export { format, output, floor, title } => {
            println!("📄 floor-assign - エクスポート\n");

            let floor = floor.unwrap_or_else(|| config.default_floor.clone());
            let session = open_session(&config)?;

            println!("- 事務室データを読み込み中...");
            let source = AssetSource::parse(&config.asset_base())?;
            let data = load_floor(&source, &floor, config.floors.get(&floor)?).await;
            if let Some(e) = &data.csv_error {
                println!("⚠ {}（部屋名なしで出力します）", e);
            }

            let report = export::Report::build(
                &title,
                &floor,
                session.assignments(),
                session.change_log(),
                &data.offices,
                clock::now_millis(),
            );
            let output = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            export::export_report(&report, &format, &output)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Map { positions, offices, output_dir, floor } => {
            println!("🗺 floor-assign - 部屋マッピング作成\n");

            println!("[1/3] 位置データを読み込み中...");
            let sets = join::read_position_sets(&positions)?;
            println!("✔ 図面{}件\n", sets.len());

            println!("[2/3] 事務室データを読み込み中...");
            let offices = read_offices_checked(&offices)?;
            println!("✔ 事務室{}件\n", offices.len());

            println!("[3/3] 結合中...");
            let written = join::write_room_mappings(&sets, &offices, &output_dir, floor.as_deref())?;
            for path in &written {
                println!("✔ 出力: {}", path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Merge { positions, offices, output } => {
            println!("🧩 floor-assign - 部屋データ結合\n");

            let sets = join::read_position_sets(&positions)?;
            let offices = read_offices_checked(&offices)?;

            let merged = join::merge_positions(&sets, &offices);
            let total: usize = merged.values().map(|v| v.len()).sum();
            join::write_merged(&merged, &output)?;
            println!("✔ {}件を出力: {}", total, output.display());

            println!("\n✅ 完了");
        }

        Commands::State => {
            let session = open_session(&config)?;
            let path = config.state_path()?;

            println!("状態:");
            println!("  パス: {}", path.display());
            println!("  入れ替え方式: {}", session.policy());
            println!("  割り当て: {}件", session.assignments().len());
            println!("  変更履歴: {}件", session.change_log().len());
            if let Some(last) = session.change_log().last() {
                println!(
                    "  最終変更: {} ({} → {})",
                    clock::format_timestamp(last.timestamp),
                    last.from,
                    last.to
                );
            }
            for conflict in session.assignments().conflicts() {
                println!("  ⚠ 重複: {} ← {}", conflict.slots.join(", "), conflict.occupant);
            }
        }

        Commands::Config { show, set_assets, set_policy } => {
            // グローバル指定を保存しないよう読み直す
            let mut config = Config::load()?;

            if let Some(base) = set_assets {
                AssetSource::parse(&base)?;
                config.set_asset_base(base)?;
                println!("✔ 取得元を設定しました");
            }

            if let Some(policy) = set_policy {
                config.set_swap_policy(policy)?;
                println!("✔ 入れ替え方式を {} に設定しました", policy);
            }

            if show {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  取得元: {}", config.asset_base());
                println!("  状態ファイル: {}", config.state_path()?.display());
                println!("  既定フロア: {}", config.default_floor);
                println!("  入れ替え方式: {}", config.swap_policy);
                println!("  フロア: {}", config.floors.floors().join(", "));
            }
        }
    }

    Ok(())
}

/// 保存状態からセッションを復元（読み込みの警告は表示する）
fn open_session(config: &Config) -> Result<Session<FileStore>> {
    let store = FileStore::open(&config.state_path()?);
    let session = Session::restore(store, config.swap_policy);
    for warning in session.warnings() {
        println!("⚠ {}", warning);
    }
    Ok(session)
}

fn read_offices_checked(path: &std::path::Path) -> Result<OfficeDirectory> {
    let offices = join::read_offices(path)?;
    if offices.is_empty() {
        println!("⚠ 事務室データが空です: {}", path.display());
    }
    Ok(offices)
}
