use std::sync::Arc;

use eyre::Context;
use pohod_weather::{
    forecast_service,
    options::Options,
    reporting, serve_http,
};
use tokio::{signal::unix::SignalKind, sync::broadcast};
use tracing_appender::rolling::Rotation;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let options = Options::initialize()
        .await
        .wrap_err("Error initializing options")?;

    let reporting_options = reporting::Options {
        data_dir: options.data_dir.clone(),
        log_rotation: Rotation::DAILY,
    };
    let _reporting_guard = reporting::setup_reporting(&reporting_options)?;

    let http_client = reqwest::Client::new();
    let forecast_service: Arc<dyn forecast_service::Port> = Arc::new(
        forecast_service::Gateway::new(http_client, options.api_url.clone()),
    );

    let (shutdown_tx, serve_http_shutdown_rx) = broadcast::channel::<()>(1);

    let ctrl_c_shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen to ctrl-c or SIGINT event: {:?}", error);
            return;
        }
        tracing::warn!("ctrl-c or SIGINT event detected, broadcasting shutdown");
        if ctrl_c_shutdown_tx.send(()).is_err() {
            tracing::error!("Failed to send shutdown broadcast");
        }
    });

    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())
        .wrap_err("Failed to create SIGTERM signal listener")?;
    tokio::spawn(async move {
        if sigterm.recv().await.is_some() {
            tracing::warn!("SIGTERM signal detected, broadcasting shutdown");
            if shutdown_tx.send(()).is_err() {
                tracing::error!("Failed to send shutdown broadcast");
            }
        }
    });

    let serve_http_options = serve_http::Options {
        listen_address: options.listen_address,
        img_dir: options.img_dir.clone(),
        forecast_service,
    };
    serve_http::serve_http(serve_http_shutdown_rx, serve_http_options).await;

    Ok(())
}
