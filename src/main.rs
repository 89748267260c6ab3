use std::process::ExitCode;

use log::{error, info};

use crisp_relay::integration::{self, Config};
use crisp_relay::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("crisp_relay: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> integration::Result<()> {
    let config = Config::env()?;
    integration::init_logger()?;

    let addr = config.env.addr();
    info!(
        "Forwarding webhooks to {} (timeout {}s)",
        config.downstream.url(),
        config.downstream.timeout().as_secs()
    );

    let app = crisp_relay::app(AppState::init(config)?)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
