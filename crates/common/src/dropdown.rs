//! Dependent country → city selection
//!
//! The pair of selects is a small state machine:
//!
//! ```text
//!              select_country(c)                 select_city(x ∈ c)
//! NoCountry ───────────────────▶ Selected{c, None} ─────────────────▶ Selected{c, Some(x)}
//!     ▲                            ▲      │  ▲                               │
//!     └──── select_country("") ────┘      │  └──── select_country(c') ───────┘
//!                                         └──── select_city("") ◀────────────┘
//! ```
//!
//! Selecting a country always clears the city, even when the new country
//! has a city of the same name.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CountryCityCatalog;
use crate::error::{Error, Result};
use crate::types::SelectOption;

/// Current state of the country/city pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocationState {
    NoCountry,
    CountrySelected {
        /// Catalog key of the selected country
        country: String,
        city: Option<String>,
    },
}

impl Default for LocationState {
    fn default() -> Self {
        Self::NoCountry
    }
}

impl LocationState {
    /// Select a country by key or label. An empty key returns to
    /// [`LocationState::NoCountry`].
    pub fn select_country(&self, catalog: &CountryCityCatalog, key: &str) -> Result<Self> {
        if key.is_empty() {
            debug!("Country selection cleared");
            return Ok(Self::NoCountry);
        }

        let country = catalog
            .country(key)
            .ok_or_else(|| Error::UnknownCountry(key.to_string()))?;

        if let Some(previous) = self.city() {
            debug!("Country changed to {}, dropping city {}", country.label, previous);
        } else {
            debug!("Country changed to {}", country.label);
        }

        Ok(Self::CountrySelected {
            country: country.key.clone(),
            city: None,
        })
    }

    /// Select a city of the active country. An empty name clears the city.
    pub fn select_city(&self, catalog: &CountryCityCatalog, city: &str) -> Result<Self> {
        let Self::CountrySelected { country: key, .. } = self else {
            if city.is_empty() {
                return Ok(Self::NoCountry);
            }
            return Err(Error::InvalidCitySelection {
                country: "no country".to_string(),
                city: city.to_string(),
            });
        };

        if city.is_empty() {
            return Ok(Self::CountrySelected {
                country: key.clone(),
                city: None,
            });
        }

        let country = catalog
            .country(key)
            .ok_or_else(|| Error::UnknownCountry(key.clone()))?;

        if !country.has_city(city) {
            return Err(Error::InvalidCitySelection {
                country: country.label.clone(),
                city: city.to_string(),
            });
        }

        Ok(Self::CountrySelected {
            country: key.clone(),
            city: Some(city.to_string()),
        })
    }

    pub fn country(&self) -> Option<&str> {
        match self {
            Self::NoCountry => None,
            Self::CountrySelected { country, .. } => Some(country),
        }
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            Self::CountrySelected { city: Some(city), .. } => Some(city),
            _ => None,
        }
    }

    /// Both a country and one of its cities are selected
    pub fn is_complete(&self) -> bool {
        self.city().is_some()
    }

    /// Options currently offered by the city select
    pub fn city_options(&self, catalog: &CountryCityCatalog) -> Vec<SelectOption> {
        catalog.city_options(self.country())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Country;

    fn labels(options: &[SelectOption]) -> Vec<String> {
        options.iter().map(|o| o.label.clone()).collect()
    }

    #[test]
    fn test_spain_then_estonia() {
        let catalog = CountryCityCatalog::default();
        let state = LocationState::default()
            .select_country(&catalog, "Spain")
            .unwrap();
        assert_eq!(
            labels(&state.city_options(&catalog)),
            vec!["", "Malaga", "Madrid", "Valencia", "Corralejo"]
        );

        let state = state.select_city(&catalog, "Madrid").unwrap();
        assert_eq!(state.city(), Some("Madrid"));

        let state = state.select_country(&catalog, "Estonia").unwrap();
        assert_eq!(state.city(), None);
        let options = labels(&state.city_options(&catalog));
        assert_eq!(options, vec!["", "Tallinn", "Haapsalu", "Tartu"]);
        assert!(!options.contains(&"Madrid".to_string()));
    }

    #[test]
    fn test_city_from_other_country_is_rejected() {
        let catalog = CountryCityCatalog::default();
        let state = LocationState::default()
            .select_country(&catalog, "estonia")
            .unwrap();

        let err = state.select_city(&catalog, "Madrid").unwrap_err();
        assert!(matches!(err, Error::InvalidCitySelection { .. }));
        assert_eq!(state.city(), None);
    }

    #[test]
    fn test_city_without_country_is_rejected() {
        let catalog = CountryCityCatalog::default();
        let state = LocationState::default();
        assert!(state.select_city(&catalog, "Tallinn").is_err());
        assert_eq!(state.city_options(&catalog), vec![SelectOption::placeholder()]);
    }

    #[test]
    fn test_reselecting_same_country_clears_city() {
        let catalog = CountryCityCatalog::default();
        let state = LocationState::default()
            .select_country(&catalog, "Austria")
            .unwrap()
            .select_city(&catalog, "Vienna")
            .unwrap()
            .select_country(&catalog, "Austria")
            .unwrap();
        assert_eq!(state.country(), Some("austria"));
        assert_eq!(state.city(), None);
    }

    #[test]
    fn test_same_named_city_is_still_cleared() {
        let catalog = CountryCityCatalog::new(vec![
            Country::new("us", "United States", &["Paris", "Austin"]),
            Country::new("fr", "France", &["Paris", "Lyon"]),
        ])
        .unwrap();

        let state = LocationState::default()
            .select_country(&catalog, "us")
            .unwrap()
            .select_city(&catalog, "Paris")
            .unwrap()
            .select_country(&catalog, "fr")
            .unwrap();
        assert_eq!(state.city(), None);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_unknown_country() {
        let catalog = CountryCityCatalog::default();
        let err = LocationState::default()
            .select_country(&catalog, "Narnia")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCountry(_)));
    }

    #[test]
    fn test_placeholder_resets() {
        let catalog = CountryCityCatalog::default();
        let state = LocationState::default()
            .select_country(&catalog, "Spain")
            .unwrap()
            .select_city(&catalog, "Valencia")
            .unwrap();

        let cleared_city = state.select_city(&catalog, "").unwrap();
        assert_eq!(cleared_city.country(), Some("spain"));
        assert_eq!(cleared_city.city(), None);

        let cleared = state.select_country(&catalog, "").unwrap();
        assert_eq!(cleared, LocationState::NoCountry);
    }
}
