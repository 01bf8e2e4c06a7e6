//! Client for the city weather forecast backend used by the hiking club site.

use std::fmt::Display;

use once_cell::sync::Lazy;
use reqwest::{header::ACCEPT, Method, StatusCode};
use serde::{de::Visitor, Deserialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Url of the production forecast backend.
pub const DEFAULT_API_URL: &str = "https://pohodvsesvit.onrender.com/api/weather";

/// Number of forecast points the backend returns for a city, one for each part of the day over
/// two days.
pub const FORECAST_POINTS: usize = 8;

/// Main weather category of a forecast point, as reported by the backend.
#[derive(EnumIter, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainWeather {
    /// `Clear`
    Clear,
    /// `Clouds`
    Clouds,
    /// `Rain`
    Rain,
    /// `Drizzle`
    Drizzle,
    /// `Thunderstorm`
    Thunderstorm,
    /// `Snow`
    Snow,
    /// `Atmosphere` (mist, fog, haze, etc).
    Atmosphere,
    /// Any category not listed above.
    Unknown,
}

static MAIN_WEATHER_VARIANTS: Lazy<Vec<MainWeather>> = Lazy::new(|| MainWeather::iter().collect());

impl MainWeather {
    /// Enumerate all variants of MainWeather.
    pub fn enumerate() -> &'static [MainWeather] {
        MAIN_WEATHER_VARIANTS.as_slice()
    }

    /// Parse the category name used by the backend. Unrecognised names become
    /// [`MainWeather::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Clear" => MainWeather::Clear,
            "Clouds" => MainWeather::Clouds,
            "Rain" => MainWeather::Rain,
            "Drizzle" => MainWeather::Drizzle,
            "Thunderstorm" => MainWeather::Thunderstorm,
            "Snow" => MainWeather::Snow,
            "Atmosphere" => MainWeather::Atmosphere,
            _ => MainWeather::Unknown,
        }
    }

    /// The category name used by the backend.
    pub fn name(&self) -> &'static str {
        match self {
            MainWeather::Clear => "Clear",
            MainWeather::Clouds => "Clouds",
            MainWeather::Rain => "Rain",
            MainWeather::Drizzle => "Drizzle",
            MainWeather::Thunderstorm => "Thunderstorm",
            MainWeather::Snow => "Snow",
            MainWeather::Atmosphere => "Atmosphere",
            MainWeather::Unknown => "Unknown",
        }
    }
}

impl Display for MainWeather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MainWeather {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct MainWeatherVisitor;

        impl<'de> Visitor<'de> for MainWeatherVisitor {
            type Value = MainWeather;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a weather category name")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(MainWeather::from_name(v))
            }
        }

        deserializer.deserialize_str(MainWeatherVisitor)
    }
}

/// A single point in a city forecast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Air temperature in °C.
    pub temp: f64,
    /// Apparent temperature in °C.
    pub feels_like: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Wind speed, in the units the backend reports (m/s).
    pub wind_speed: f64,
    /// Cloud cover in %.
    pub clouds: f64,
    /// Main weather category.
    pub main_weather: MainWeather,
    /// Human readable description of the weather, localised by the backend. Empty if the
    /// backend omits it.
    #[serde(default)]
    pub description: String,
}

/// Forecast for a city, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Forecast {
    /// Name of the city the forecast is for.
    pub city: String,
    /// Forecast points, always [`FORECAST_POINTS`] long once obtained through
    /// [`obtain_forecast()`].
    pub forecast: Vec<ForecastPoint>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Назва міста не може бути порожньою")]
    EmptyCity,
    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Помилка HTTP {}: {message}", .code.as_u16())]
    ResponseStatusNotSuccessful { code: StatusCode, message: String },
    #[error("Некоректна структура прогнозу (очікується масив з {} точок)", FORECAST_POINTS)]
    InvalidStructure {
        #[source]
        source: Option<serde_json::Error>,
    },
    #[error("Error while seriazizing url query parameters")]
    SerdeUrlencoded(#[from] serde_urlencoded::ser::Error),
}

/// Message used when the backend reports an error without a usable body.
const SERVER_ERROR_MESSAGE: &str = "Помилка сервера";
/// Message used when the backend error body does not contain a message.
const UNKNOWN_ERROR_MESSAGE: &str = "Невідома помилка";

/// Extract the `message` of an error response body, falling back to [`UNKNOWN_ERROR_MESSAGE`]
/// when it is missing, empty, `0`, `false` or not a scalar.
fn error_message(body: &serde_json::Value) -> String {
    match body.get("message") {
        Some(serde_json::Value::String(message)) if !message.is_empty() => message.clone(),
        Some(serde_json::Value::Number(number)) if number.as_f64() != Some(0.0) => {
            number.to_string()
        }
        Some(serde_json::Value::Bool(true)) => true.to_string(),
        _ => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

pub async fn obtain_forecast_json(
    client: &reqwest::Client,
    api_url: &str,
    city: &str,
) -> Result<String, Error> {
    if city.is_empty() {
        return Err(Error::EmptyCity);
    }

    let query = serde_urlencoded::to_string([("city", city)])?;
    let url = format!("{}?{}", api_url, query);
    tracing::trace!("GET {}", url);

    let response = client
        .request(Method::GET, url)
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    if response.status().is_success() {
        response.text().await.map_err(Error::from)
    } else {
        let code = response.status();
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => error_message(&body),
            Err(_) => SERVER_ERROR_MESSAGE.to_string(),
        };
        Err(Error::ResponseStatusNotSuccessful { code, message })
    }
}

/// Parse a forecast document, checking that it contains exactly [`FORECAST_POINTS`] points.
pub fn parse_forecast(json: &str) -> Result<Forecast, Error> {
    let forecast: Forecast = serde_json::from_str(json)
        .map_err(|error| Error::InvalidStructure {
            source: Some(error),
        })?;

    if forecast.forecast.len() != FORECAST_POINTS {
        return Err(Error::InvalidStructure { source: None });
    }

    Ok(forecast)
}

pub async fn obtain_forecast(
    client: &reqwest::Client,
    api_url: &str,
    city: &str,
) -> Result<Forecast, Error> {
    obtain_forecast_json(client, api_url, city)
        .await
        .and_then(|json| parse_forecast(&json))
}
