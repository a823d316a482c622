//! Main entrypoint for the mail trigger service.

use monitoring_engine::{Capabilities, Engine, TokioTimer};
use tracing_subscriber::EnvFilter;

/// Run the mail trigger service until Ctrl-C.
#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_load::Loaded { config, path } = config_load::with_default_env_var().await?;
    tracing::info!(config = %path.display(), "loaded config");

    let engine = Engine::new(
        &config,
        Capabilities {
            dialer: imap_session::Dialer,
            timer: TokioTimer,
            runner: command_runner::ShellRunner::default(),
        },
    )?;
    drop(config);

    let stop = engine.stop_handle();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "unable to listen for Ctrl-C");
            return;
        }
        tracing::info!("interrupted, stopping");
        stop.stop();
    });

    engine.run().await;

    Ok(())
}
