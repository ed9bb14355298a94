use clap::Parser;
use shop_scale::{capture, cli, client, config, error, kiosk, ledger, notify, render, session};
use capture::{CaptureController, CommandCamera};
use cli::{Cli, Commands};
use client::{ApiClient, ScaleBackend};
use config::Config;
use error::Result;
use notify::Level;
use session::KioskSession;
use shop_scale_common::ResultView;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// 終了時に未送信の取引記録を待つ上限
const LEDGER_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(&config.api_url, Duration::from_secs(config.timeout_seconds))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }

    match cli.command {
        Commands::Kiosk => {
            println!("⚖  shop-scale - kasa samoobsługowa\n");

            let client = build_client(&config)?;
            match client.health(&config.server_root()).await {
                Ok(status) if status.is_running() => {
                    notify::toast(Level::Success, "Backend połączony pomyślnie")
                }
                Ok(status) => notify::toast(Level::Info, &format!("Status backendu: {}", status.status)),
                Err(e) => notify::report(
                    "Nie można połączyć z backend. Upewnij się, że serwer działa.",
                    &e,
                ),
            }

            let (ledger_handle, ledger_worker) = ledger::spawn(client.clone());
            let capture = CaptureController::new(Box::new(CommandCamera), config.camera.clone());
            let mut session = KioskSession::new(client, capture, ledger_handle, &config);

            if let Err(e) = session.load_catalog().await {
                notify::report("Błąd ładowania produktów", &e);
            }

            let outcome = kiosk::run(&mut session).await;

            // ハンドルを落としてワーカーに残りを送らせる
            drop(session);
            match tokio::time::timeout(LEDGER_FLUSH_TIMEOUT, ledger_worker).await {
                Ok(Ok(recorded)) => tracing::info!(recorded, "transaction ledger flushed"),
                Ok(Err(e)) => tracing::warn!(error = %e, "transaction ledger worker failed"),
                Err(_) => tracing::warn!("transaction ledger flush timed out"),
            }

            outcome?;
            println!("\n✅ Do widzenia!");
        }

        Commands::Classify { image } => {
            let client = build_client(&config)?;
            let (ledger_handle, _) = ledger::LedgerHandle::channel();
            let capture = CaptureController::new(Box::new(CommandCamera), config.camera.clone());
            let mut session = KioskSession::new(client, capture, ledger_handle, &config);

            let spinner = notify::spinner("Analizowanie obrazu...");
            let outcome = session.upload_and_classify(&image).await.map(ResultView::new);
            spinner.finish_and_clear();

            let view = outcome?;
            render::print_result(&view, &config.currency);
        }

        Commands::Products => {
            let client = build_client(&config)?;
            let products = client.products().await?;
            render::print_products(&products);
        }

        Commands::Status => {
            let client = build_client(&config)?;
            let root = config.server_root();
            println!("API: {}", client.base_url());

            match client.health(&root).await {
                Ok(status) => println!("✔ {} ({})", root, status.status),
                Err(e) => println!("✖ {}: {}", root, e),
            }

            match client.model_info().await {
                Ok(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                Err(e) => println!("Model: {}", e),
            }
        }

        Commands::History { limit } => {
            let client = build_client(&config)?;
            let transactions = client.transactions(limit).await?;
            render::print_transactions(&transactions, &config.currency);
        }

        Commands::Config { set_api_url, show } => {
            // 上書き前のファイル内容を編集する
            let mut config = Config::load_from(&Config::config_path()?)?;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ Zapisano adres API");
            }

            if show {
                println!("Ustawienia:");
                println!("  API: {}", config.api_url);
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Domyślna waga: {} g", config.default_weight_grams);
                println!("  Waluta: {}", config.currency);
                println!(
                    "  Kamera: {} {}x{} (JPEG {})",
                    config.camera.device,
                    config.camera.width,
                    config.camera.height,
                    config.camera.jpeg_quality
                );
            }
        }
    }

    Ok(())
}
