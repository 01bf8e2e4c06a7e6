//! Rendering of the forecast page.
//!
//! The document structure (element ids and classes) is what the site stylesheet and the icon
//! assets expect:
//!
//! + `#location` city input, with suggestions from `#city-suggestions`.
//! + `#error-message` shown only when there is something to report.
//! + `.city h2` name of the city the forecast is for.
//! + `.weather-table` with a `caption` and a `tbody` holding one row per [`Row`], the first cell
//!   of each row is its label and the following cells are the forecast points.

use std::fmt::Write;

use html_builder::Html5;
use weather_api::{Forecast, ForecastPoint, FORECAST_POINTS};

use crate::{
    city,
    icon::{icon_path, FORECAST_TIME_PERIODS},
};

/// Rows of the forecast table body, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    /// Weather icon.
    Icon,
    /// Cloud cover, `%`.
    Cloudiness,
    /// Temperature, `°C`.
    Temperature,
    /// Relative humidity, `%`.
    Humidity,
    /// Wind speed.
    Wind,
    /// Apparent temperature, `°C`.
    FeelsLike,
}

/// All table rows, the index in this array is the row index in the table body.
pub const ROWS: [Row; 6] = [
    Row::Icon,
    Row::Cloudiness,
    Row::Temperature,
    Row::Humidity,
    Row::Wind,
    Row::FeelsLike,
];

impl Row {
    fn label(self) -> &'static str {
        match self {
            Row::Icon => "Погода",
            Row::Cloudiness => "Хмарність",
            Row::Temperature => "Температура",
            Row::Humidity => "Вологість",
            Row::Wind => "Вітер, м/с",
            Row::FeelsLike => "Відчувається як",
        }
    }

    /// Text of this row's cell for a forecast point. [`Row::Icon`] has no text.
    #[must_use]
    pub fn cell_text(self, point: &ForecastPoint) -> String {
        match self {
            Row::Icon => String::new(),
            Row::Cloudiness => format!("{}%", point.clouds),
            Row::Temperature => format!("{}°C", round_half_up(point.temp)),
            Row::Humidity => format!("{}%", point.humidity),
            Row::Wind => format!("{}", point.wind_speed),
            Row::FeelsLike => format!("{}°C", round_half_up(point.feels_like)),
        }
    }
}

/// Round to the nearest integer, with halves rounded towards positive infinity (`-2.5` becomes
/// `-2`).
///
/// The fractional part is compared rather than adding `0.5` first, which would round values just
/// below a half (`0.49999999999999994`) up.
#[allow(clippy::cast_possible_truncation)]
fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// Contents of the forecast page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Page {
    /// Current value of the city input.
    pub location: String,
    /// Message to display in the error element.
    pub error: Option<String>,
    /// Forecast to display in the table.
    pub forecast: Option<Forecast>,
}

/// Escape text for use in html element content or a quoted attribute value.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the page to an html document.
///
/// `html_builder` puts a line break and indentation inside every element it opens, so elements
/// whose text content matters are written as complete markup into their parent instead.
pub fn render(page: &Page) -> Result<String, std::fmt::Error> {
    let mut buf = html_builder::Buffer::new();
    buf.doctype();
    let mut html = buf.html().attr(r#"lang="uk""#);

    let mut head = html.head();
    head.meta().attr(r#"charset="utf-8""#);
    head.meta()
        .attr(r#"name="viewport""#)
        .attr(r#"content="width=device-width, initial-scale=1""#);
    writeln!(head, "<title>Прогноз погоди</title>")?;
    head.link()
        .attr(r#"rel="stylesheet""#)
        .attr(r#"href="css/style.css""#);

    let mut body = html.body();

    let mut form = body
        .form()
        .attr(r#"class="search""#)
        .attr(r#"method="get""#)
        .attr(r#"action="/""#);
    writeln!(form, r#"<label for="location">Місто</label>"#)?;
    form.input()
        .attr(r#"id="location""#)
        .attr(r#"name="city""#)
        .attr(r#"list="city-suggestions""#)
        .attr(r#"autocomplete="off""#)
        .attr(&format!(r#"value="{}""#, escape(&page.location)));
    let mut datalist = form.datalist().attr(r#"id="city-suggestions""#);
    for city in city::suggestions() {
        datalist
            .option()
            .attr(&format!(r#"value="{}""#, escape(city.name())));
    }

    match &page.error {
        Some(message) => writeln!(
            body,
            r#"<div id="error-message" style="display: block">{}</div>"#,
            escape(message)
        )?,
        None => writeln!(body, r#"<div id="error-message" style="display: none"></div>"#)?,
    }

    let city_name: Option<&str> = page.forecast.as_ref().map(|forecast| forecast.city.as_str());

    let mut city_section = body.section().attr(r#"class="city""#);
    writeln!(
        city_section,
        "<h2>{}</h2>",
        escape(city_name.unwrap_or_default())
    )?;

    let mut table = body.table().attr(r#"class="weather-table""#);
    match city_name {
        Some(city_name) => writeln!(
            table,
            "<caption>Прогноз погоди для міста {}</caption>",
            escape(city_name)
        )?,
        None => writeln!(table, "<caption>Прогноз погоди</caption>")?,
    }

    let mut thead = table.thead();
    let mut header_row = thead.tr();
    write!(header_row, "<th></th>")?;
    for period in FORECAST_TIME_PERIODS {
        write!(header_row, r#"<th scope="col">{}</th>"#, period)?;
    }
    writeln!(header_row)?;

    let points: &[ForecastPoint] = page
        .forecast
        .as_ref()
        .map(|forecast| forecast.forecast.as_slice())
        .unwrap_or_default();

    let mut tbody = table.tbody();
    for row in ROWS {
        let mut tr = tbody.tr();
        write!(tr, r#"<th scope="row">{}</th>"#, row.label())?;
        for column in 0..FORECAST_POINTS {
            match (row, points.get(column)) {
                (Row::Icon, Some(point)) => write!(
                    tr,
                    r#"<td><img src="{}" alt="{}"></td>"#,
                    icon_path(point.main_weather, FORECAST_TIME_PERIODS[column]),
                    escape(&point.description)
                )?,
                (Row::Icon, None) => write!(tr, r#"<td><img alt=""></td>"#)?,
                (row, Some(point)) => write!(tr, "<td>{}</td>", escape(&row.cell_text(point)))?,
                (_, None) => write!(tr, "<td></td>")?,
            }
        }
        writeln!(tr)?;
    }

    Ok(buf.finish())
}

#[cfg(test)]
mod test {
    use scraper::{ElementRef, Html, Selector};
    use weather_api::{Forecast, ForecastPoint, MainWeather};

    use super::{escape, render, round_half_up, Page, Row};
    use crate::city::VALID_CITIES;

    fn selector(selectors: &str) -> Selector {
        Selector::parse(selectors).unwrap()
    }

    fn text(element: ElementRef) -> String {
        element.text().collect::<String>()
    }

    fn point(temp: f64, main_weather: MainWeather, description: &str) -> ForecastPoint {
        ForecastPoint {
            temp,
            feels_like: temp - 2.5,
            humidity: 75.0,
            wind_speed: 4.2,
            clouds: 20.0,
            main_weather,
            description: description.to_string(),
        }
    }

    fn forecast() -> Forecast {
        let main_weathers = [
            MainWeather::Clear,
            MainWeather::Clear,
            MainWeather::Clouds,
            MainWeather::Rain,
            MainWeather::Snow,
            MainWeather::Thunderstorm,
            MainWeather::Atmosphere,
            MainWeather::Drizzle,
        ];
        Forecast {
            city: "Стокгольм".to_string(),
            forecast: main_weathers
                .into_iter()
                .enumerate()
                .map(|(i, main_weather)| point(i as f64 + 0.5, main_weather, "ясно"))
                .collect(),
        }
    }

    /// Cells of a table body row, including the label cell.
    fn row_cells(document: &Html, row: usize) -> Vec<ElementRef<'_>> {
        let tr = document
            .select(&selector(".weather-table tbody tr"))
            .nth(row)
            .unwrap();
        tr.select(&selector("th, td")).collect()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(3, round_half_up(2.5));
        assert_eq!(2, round_half_up(2.4));
        assert_eq!(-2, round_half_up(-2.5));
        assert_eq!(-3, round_half_up(-2.6));
        assert_eq!(0, round_half_up(-0.4));
        assert_eq!(0, round_half_up(0.499_999_999_999_999_94));
        assert_eq!(1, round_half_up(0.5));
    }

    #[test]
    fn test_cell_text() {
        let point = ForecastPoint {
            temp: 12.6,
            feels_like: -0.5,
            humidity: 81.0,
            wind_speed: 3.5,
            clouds: 40.0,
            main_weather: MainWeather::Clouds,
            description: "хмарно".to_string(),
        };
        assert_eq!("40%", Row::Cloudiness.cell_text(&point));
        assert_eq!("13°C", Row::Temperature.cell_text(&point));
        assert_eq!("81%", Row::Humidity.cell_text(&point));
        assert_eq!("3.5", Row::Wind.cell_text(&point));
        assert_eq!("0°C", Row::FeelsLike.cell_text(&point));
        assert_eq!("", Row::Icon.cell_text(&point));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            "&lt;b&gt;Tom &amp; &quot;Jerry&#39;s&quot;&lt;/b&gt;",
            escape(r#"<b>Tom & "Jerry's"</b>"#)
        );
    }

    #[test]
    fn test_render_empty_page() {
        let html = render(&Page::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"uk\">"));
        let document = Html::parse_document(&html);

        let error = document.select(&selector("#error-message")).next().unwrap();
        assert_eq!("", text(error));
        assert_eq!(Some("display: none"), error.value().attr("style"));

        let options: Vec<&str> = document
            .select(&selector("#city-suggestions option"))
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(VALID_CITIES.to_vec(), options);

        let input = document.select(&selector("#location")).next().unwrap();
        assert_eq!(Some("city-suggestions"), input.value().attr("list"));
        assert_eq!(Some(""), input.value().attr("value"));

        assert_eq!(
            0,
            document
                .select(&selector(".weather-table tbody img[src]"))
                .count()
        );
        let cells = row_cells(&document, 2);
        assert_eq!(9, cells.len());
        assert_eq!("Температура", text(cells[0]));
        assert!(cells[1..].iter().all(|cell| text(*cell).is_empty()));
    }

    #[test]
    fn test_render_forecast() {
        let page = Page {
            location: "Стокгольм".to_string(),
            error: None,
            forecast: Some(forecast()),
        };
        let html = render(&page).unwrap();
        let document = Html::parse_document(&html);

        let h2 = document.select(&selector(".city h2")).next().unwrap();
        assert_eq!("Стокгольм", text(h2));
        let caption = document
            .select(&selector(".weather-table caption"))
            .next()
            .unwrap();
        assert_eq!("Прогноз погоди для міста Стокгольм", text(caption));

        let headers: Vec<String> = document
            .select(&selector(".weather-table thead th"))
            .map(text)
            .collect();
        assert_eq!(
            vec!["", "ніч", "ранок", "день", "вечір", "ніч", "ранок", "день", "вечір"],
            headers
        );

        let icons: Vec<&str> = document
            .select(&selector(".weather-table tbody img"))
            .filter_map(|img| img.value().attr("src"))
            .collect();
        assert_eq!(
            vec![
                "img/moon_stars_icon.svg",
                "img/sun_icon.svg",
                "img/moon_cloud_icon.svg",
                "img/rain_icon.svg",
                "img/rain_icon.svg",
                "img/cloud_strong_lightning_icon.svg",
                "img/moon_cloud_icon.svg",
                "img/rain_icon.svg",
            ],
            icons
        );
        let img = document
            .select(&selector(".weather-table tbody img"))
            .next()
            .unwrap();
        assert_eq!(Some("ясно"), img.value().attr("alt"));

        let expected_rows: [(&str, [&str; 8]); 5] = [
            ("Хмарність", ["20%"; 8]),
            (
                "Температура",
                ["1°C", "2°C", "3°C", "4°C", "5°C", "6°C", "7°C", "8°C"],
            ),
            ("Вологість", ["75%"; 8]),
            ("Вітер, м/с", ["4.2"; 8]),
            (
                "Відчувається як",
                ["-2°C", "-1°C", "0°C", "1°C", "2°C", "3°C", "4°C", "5°C"],
            ),
        ];
        for (i, (label, values)) in expected_rows.iter().enumerate() {
            let cells = row_cells(&document, i + 1);
            assert_eq!(*label, text(cells[0]));
            let cell_texts: Vec<String> = cells[1..].iter().map(|cell| text(*cell)).collect();
            assert_eq!(values.to_vec(), cell_texts);
        }
    }

    #[test]
    fn test_render_error_escaped() {
        let page = Page {
            location: String::new(),
            error: Some("<script>alert(1)</script>".to_string()),
            forecast: None,
        };
        let html = render(&page).unwrap();
        assert!(!html.contains("<script>"));

        let document = Html::parse_document(&html);
        let error = document.select(&selector("#error-message")).next().unwrap();
        assert_eq!("<script>alert(1)</script>", text(error));
        assert_eq!(Some("display: block"), error.value().attr("style"));
    }
}
