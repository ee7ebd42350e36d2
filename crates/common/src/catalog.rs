//! Country → city catalog
//!
//! Loaded once from configuration and never mutated afterwards; the dropdown
//! engine borrows it for every transition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::SelectOption;

/// One country and its cities, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub key: String,
    pub label: String,
    pub cities: Vec<String>,
}

impl Country {
    pub fn new(key: &str, label: &str, cities: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            cities: cities.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Whether `name` is one of this country's cities
    pub fn has_city(&self, name: &str) -> bool {
        self.cities.iter().any(|c| c == name)
    }

    fn matches(&self, key: &str) -> bool {
        self.key == key || self.label == key
    }
}

/// Ordered, read-only mapping from country to cities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCityCatalog {
    countries: Vec<Country>,
}

impl Default for CountryCityCatalog {
    fn default() -> Self {
        Self {
            countries: vec![
                Country::new("spain", "Spain", &["Malaga", "Madrid", "Valencia", "Corralejo"]),
                Country::new("estonia", "Estonia", &["Tallinn", "Haapsalu", "Tartu"]),
                Country::new("austria", "Austria", &["Vienna", "Salzburg", "Innsbruck"]),
            ],
        }
    }
}

impl CountryCityCatalog {
    /// Build a catalog, rejecting inconsistent data
    pub fn new(countries: Vec<Country>) -> Result<Self> {
        let catalog = Self { countries };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Find a country by key or label
    pub fn country(&self, key: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.matches(key))
    }

    /// Placeholder followed by every country, in catalog order
    pub fn country_options(&self) -> Vec<SelectOption> {
        std::iter::once(SelectOption::placeholder())
            .chain(
                self.countries
                    .iter()
                    .map(|c| SelectOption::new(c.key.clone(), c.label.clone())),
            )
            .collect()
    }

    /// Placeholder followed by the cities of `country`, in catalog order.
    /// Placeholder only when `country` is `None` or unknown.
    pub fn city_options(&self, country: Option<&str>) -> Vec<SelectOption> {
        let cities = country
            .and_then(|key| self.country(key))
            .map(|c| c.cities.as_slice())
            .unwrap_or(&[]);

        std::iter::once(SelectOption::placeholder())
            .chain(cities.iter().map(|c| SelectOption::new(c.clone(), c.clone())))
            .collect()
    }

    /// Check keys and city names for emptiness and duplicates
    pub fn validate(&self) -> Result<()> {
        let mut keys = BTreeSet::new();
        for country in &self.countries {
            if country.key.trim().is_empty() || country.label.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "country key and label must not be empty".to_string(),
                ));
            }
            // keys and labels share one namespace since either selects a country
            let names: BTreeSet<&str> = [country.key.as_str(), country.label.as_str()]
                .into_iter()
                .collect();
            for name in names {
                if !keys.insert(name) {
                    return Err(Error::InvalidConfig(format!("duplicate country: {}", name)));
                }
            }

            let mut cities = BTreeSet::new();
            for city in &country.cities {
                if city.trim().is_empty() {
                    return Err(Error::InvalidConfig(format!(
                        "empty city name in {}",
                        country.key
                    )));
                }
                if !cities.insert(city.as_str()) {
                    return Err(Error::InvalidConfig(format!(
                        "duplicate city '{}' in {}",
                        city, country.key
                    )));
                }
            }
        }
        Ok(())
    }
}
