//! The fixed set of cities a forecast can be requested for.

use std::{fmt::Display, str::FromStr};

/// Cities offered in the city suggestions list, in display order.
pub static VALID_CITIES: [&str; 10] = [
    "Стокгольм",
    "Гетеборг",
    "Мальме",
    "Уппсала",
    "Вестерос",
    "Еребру",
    "Лінчепінг",
    "Гельсінборг",
    "Норчепінг",
    "Євле",
];

/// A city name that is a member of [`VALID_CITIES`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct City(&'static str);

impl City {
    /// Name of the city.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl AsRef<str> for City {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The selected value is empty or not one of [`VALID_CITIES`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Будь ласка, оберіть місто ВИКЛЮЧНО зі списку, що випадає.")]
pub struct InvalidCity;

impl FromStr for City {
    type Err = InvalidCity;

    /// Surrounding whitespace is ignored, the remaining name must match exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        VALID_CITIES
            .iter()
            .find(|city| **city == name)
            .map(|city| City(*city))
            .ok_or(InvalidCity)
    }
}

/// Cities used to populate the suggestions list of the city input.
pub fn suggestions() -> impl Iterator<Item = City> {
    VALID_CITIES.iter().map(|city| City(*city))
}

#[cfg(test)]
mod test {
    use super::{suggestions, City, InvalidCity, VALID_CITIES};

    #[test]
    fn test_parse_valid_city() {
        let city: City = "Стокгольм".parse().unwrap();
        assert_eq!("Стокгольм", city.name());

        let city: City = "  Євле \n".parse().unwrap();
        assert_eq!("Євле", city.name());
    }

    #[test]
    fn test_parse_invalid_city() {
        assert_eq!(Err(InvalidCity), "".parse::<City>());
        assert_eq!(Err(InvalidCity), "   ".parse::<City>());
        assert_eq!(Err(InvalidCity), "Київ".parse::<City>());
        assert_eq!(Err(InvalidCity), "стокгольм".parse::<City>());
        assert_eq!(Err(InvalidCity), "Stockholm".parse::<City>());
        assert_eq!(
            "Будь ласка, оберіть місто ВИКЛЮЧНО зі списку, що випадає.",
            InvalidCity.to_string()
        );
    }

    #[test]
    fn test_suggestions_in_order() {
        let names: Vec<&str> = suggestions().map(|city| city.name()).collect();
        assert_eq!(VALID_CITIES.to_vec(), names);
    }
}
