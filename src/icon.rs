//! Mapping of forecast weather categories to the icon assets shown in the forecast table.

use std::fmt::Display;

use weather_api::{MainWeather, FORECAST_POINTS};

/// Part of the day a forecast point (and its table column) covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimePeriod {
    /// `ніч`
    Night,
    /// `ранок`
    Morning,
    /// `день`
    Day,
    /// `вечір`
    Evening,
}

impl TimePeriod {
    /// Label shown in the table header.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::Night => "ніч",
            TimePeriod::Morning => "ранок",
            TimePeriod::Day => "день",
            TimePeriod::Evening => "вечір",
        }
    }

    /// Whether an icon for this period should use the night variant.
    #[must_use]
    pub fn is_night(&self) -> bool {
        matches!(self, TimePeriod::Night)
    }
}

impl Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Time periods of the forecast points, in the order the backend returns them.
pub const FORECAST_TIME_PERIODS: [TimePeriod; FORECAST_POINTS] = [
    TimePeriod::Night,
    TimePeriod::Morning,
    TimePeriod::Day,
    TimePeriod::Evening,
    TimePeriod::Night,
    TimePeriod::Morning,
    TimePeriod::Day,
    TimePeriod::Evening,
];

/// Directory (relative to the page) the icon files are served from.
pub const ICON_DIR: &str = "img";

/// File name of the icon for a weather category at a given time of day.
///
/// Snow and atmosphere (fog, haze) don't have dedicated icons yet and share the rain and cloud
/// icons respectively.
#[must_use]
pub fn icon_file(main_weather: MainWeather, period: TimePeriod) -> &'static str {
    match main_weather {
        MainWeather::Clear => {
            if period.is_night() {
                "moon_stars_icon.svg"
            } else {
                "sun_icon.svg"
            }
        }
        MainWeather::Clouds => "moon_cloud_icon.svg",
        MainWeather::Rain | MainWeather::Drizzle => "rain_icon.svg",
        MainWeather::Thunderstorm => "cloud_strong_lightning_icon.svg",
        MainWeather::Snow => "rain_icon.svg",
        MainWeather::Atmosphere | MainWeather::Unknown => "moon_cloud_icon.svg",
    }
}

/// Page relative path of the icon, see [`icon_file()`].
#[must_use]
pub fn icon_path(main_weather: MainWeather, period: TimePeriod) -> String {
    format!("{}/{}", ICON_DIR, icon_file(main_weather, period))
}
