use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::backend::{Backend, HttpBackend};
use crate::config::KeyResolver;

mod app;
mod backend;
mod cli;
mod commands;
mod config;
mod modal;
mod page;
mod theme;
mod tui;
mod ui;
mod workflow;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting authdash");

    let args = cli::Args::parse();

    let mut config = config::load()?;
    config.apply_cli_args(&args);

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.backend)?);
    info!(url = %config.backend.base_url, "Using dashboard API");

    let mut app = App::new(
        backend,
        &config.backend.base_url,
        resolver,
        theme,
        args.page.unwrap_or_default(),
    );
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("authdash").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "authdash.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
