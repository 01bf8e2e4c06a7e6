//! External weather forecasting service.
//! See [Port].

use async_trait::async_trait;
use weather_api::Forecast;

use crate::city::City;

/// Trait used to allow mocking the [weather_api] forecasting service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Port: Send + Sync {
    /// Obtain a weather forecast for a city using [weather_api::obtain_forecast()].
    async fn obtain_forecast(&self, city: &City) -> Result<Forecast, weather_api::Error>;
}

/// Concrete implementation of [Port].
pub struct Gateway {
    http_client: reqwest::Client,
    api_url: url::Url,
}

impl Gateway {
    /// Construct a new [Gateway] which requests forecasts from the backend at `api_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, api_url: url::Url) -> Self {
        Self {
            http_client,
            api_url,
        }
    }
}

#[async_trait]
impl Port for Gateway {
    #[tracing::instrument(skip(self))]
    async fn obtain_forecast(&self, city: &City) -> Result<Forecast, weather_api::Error> {
        tracing::debug!("Obtaining forecast from {}", self.api_url);
        let forecast =
            weather_api::obtain_forecast(&self.http_client, self.api_url.as_str(), city.name())
                .await?;
        tracing::info!("Successfully obtained forecast");
        Ok(forecast)
    }
}
