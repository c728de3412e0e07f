use tracing::info;
use tracing_subscriber::EnvFilter;

use roombook::clock::SystemClock;
use roombook::config::Config;
use roombook::console::Terminal;
use roombook::engine::Engine;
use roombook::export::Exporter;
use roombook::flows::{Session, SessionEnd};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the menu
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    roombook::observability::init(config.metrics_port)?;

    std::fs::create_dir_all(&config.data_dir)?;

    let engine = Engine::open(config.wal_path(), config.compact_threshold)?;
    info!("roombook started");
    info!("  data_dir: {}", config.data_dir.display());
    info!("  export_dir: {}", config.export_dir.display());
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let session = Session::new(engine, Exporter::new(&config.export_dir), Box::new(SystemClock));
    let mut terminal = Terminal::stdio();

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let end = session.run_until(&mut terminal, shutdown).await?;
    info!("roombook stopped");
    if end == SessionEnd::Interrupted {
        // stdin's blocking read cannot be cancelled; runtime shutdown would wait on it
        std::process::exit(130);
    }
    Ok(())
}
