//! Http server for the forecast page. See [`serve_http()`].

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, get_service},
    Router,
};
use eyre::Context;
use reqwest::StatusCode;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    city::City,
    forecast_service,
    page::{self, Page},
};

/// Options for running this application's http server.
pub struct Options {
    /// Address to listen on.
    pub listen_address: SocketAddr,
    /// Directory the weather icons are served from.
    pub img_dir: PathBuf,
    /// Service used to obtain forecasts for the selected city.
    pub forecast_service: Arc<dyn forecast_service::Port>,
}

#[derive(Clone)]
struct AppState {
    forecast_service: Arc<dyn forecast_service::Port>,
}

/// Query string of the forecast page, submitted by the city input form.
#[derive(Debug, Deserialize)]
struct CitySelection {
    city: Option<String>,
}

/// Work out what the page should show after a value has been submitted in the city input.
///
/// The forecast service is only called for a value that is one of the valid cities.
#[tracing::instrument(skip(forecast_service))]
pub async fn select_city(forecast_service: &dyn forecast_service::Port, value: &str) -> Page {
    let city: City = match value.parse() {
        Ok(city) => city,
        Err(error) => {
            tracing::debug!("Rejected city selection: {}", error);
            return Page {
                location: String::new(),
                error: Some(error.to_string()),
                forecast: None,
            };
        }
    };

    match forecast_service.obtain_forecast(&city).await {
        Ok(forecast) => Page {
            location: city.name().to_string(),
            error: None,
            forecast: Some(forecast),
        },
        Err(error) => {
            let error = eyre::Report::new(error);
            tracing::error!("Error obtaining forecast for {}: {:?}", city, error);
            Page {
                location: city.name().to_string(),
                error: Some(format!("Не вдалося одержати дані про погоду: {}", error)),
                forecast: None,
            }
        }
    }
}

async fn forecast_page(
    State(state): State<AppState>,
    Query(selection): Query<CitySelection>,
) -> Result<Html<String>, StatusCode> {
    let page = match &selection.city {
        Some(value) => select_city(state.forecast_service.as_ref(), value).await,
        None => Page::default(),
    };

    match page::render(&page) {
        Ok(html) => Ok(Html(html)),
        Err(error) => {
            tracing::error!("Error rendering forecast page: {:?}", error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn handle_io_error(error: std::io::Error) -> (StatusCode, String) {
    tracing::error!("Error serving file: {:?}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Construct the application's routes.
pub fn router(forecast_service: Arc<dyn forecast_service::Port>, img_dir: &Path) -> Router {
    Router::new()
        .route("/", get(forecast_page))
        .nest_service(
            "/img",
            get_service(ServeDir::new(img_dir)).handle_error(handle_io_error),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { forecast_service })
}

/// Run this service's http server until a shutdown message is broadcast.
#[tracing::instrument(skip(shutdown_rx, options))]
pub async fn serve_http(mut shutdown_rx: tokio::sync::broadcast::Receiver<()>, options: Options) {
    tokio::select! {
        result = shutdown_rx.recv() => {
            tracing::debug!("Received shutdown broadcast");
            let result = result.wrap_err("Error receiving shutdown message");
            if let Err(error) = &result {
                tracing::error!("{:?}", error);
            }
        }
        result = serve_http_impl(options) => {
            if let Err(error) = &result {
                tracing::error!("{:?}", error);
            }
        }
    }
}

async fn serve_http_impl(options: Options) -> eyre::Result<()> {
    let app = router(options.forecast_service, &options.img_dir);

    tracing::info!("Serving forecast page at http://{}/", options.listen_address);
    axum::Server::try_bind(&options.listen_address)
        .wrap_err_with(|| format!("Unable to bind to {}", options.listen_address))?
        .serve(app.into_make_service())
        .await
        .wrap_err("Error while serving http")
}
