//! Static form data configuration
//!
//! Country/city lists and the option sets of plain selects are inputs, read
//! from a TOML file once at start-up:
//!
//! ```toml
//! [[countries]]
//! key = "spain"
//! label = "Spain"
//! cities = ["Malaga", "Madrid", "Valencia", "Corralejo"]
//!
//! [[option_sets.cars]]
//! value = "volvo"
//! label = "Volvo"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::{Country, CountryCityCatalog};
use crate::error::{Error, Result};
use crate::types::SelectOption;

/// Form data configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Countries and their cities, in display order
    #[serde(default)]
    pub countries: Vec<Country>,

    /// Option lists for plain selects, keyed by select id
    #[serde(default)]
    pub option_sets: BTreeMap<String, Vec<SelectOption>>,
}

impl Default for FormConfig {
    fn default() -> Self {
        let mut option_sets = BTreeMap::new();
        option_sets.insert(
            "cars".to_string(),
            vec![
                SelectOption::new("volvo", "Volvo"),
                SelectOption::new("saab", "Saab"),
                SelectOption::new("opel", "Opel"),
                SelectOption::new("audi", "Audi"),
            ],
        );
        option_sets.insert(
            "animal".to_string(),
            vec![
                SelectOption::new("dog", "Dog"),
                SelectOption::new("cat", "Cat"),
                SelectOption::new("snake", "Snake"),
                SelectOption::new("hippo", "Hippo"),
                SelectOption::new("cow", "Cow"),
                SelectOption::new("mouse", "Mouse"),
            ],
        );

        Self {
            countries: CountryCityCatalog::default().countries().to_vec(),
            option_sets,
        }
    }
}

impl FormConfig {
    /// Load configuration from file, falling back to the built-in data when
    /// the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            info!("Loaded form config from {}", path.display());
            Ok(config)
        } else {
            debug!("No form config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject inconsistent catalog data and empty option sets
    pub fn validate(&self) -> Result<()> {
        self.catalog()?;

        for (id, options) in &self.option_sets {
            if options.is_empty() {
                return Err(Error::InvalidConfig(format!("option set '{}' is empty", id)));
            }
            let mut seen = std::collections::BTreeSet::new();
            for option in options {
                if !seen.insert(option.value.as_str()) {
                    return Err(Error::InvalidConfig(format!(
                        "duplicate option '{}' in {}",
                        option.value, id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the immutable country/city catalog
    pub fn catalog(&self) -> Result<CountryCityCatalog> {
        CountryCityCatalog::new(self.countries.clone())
    }

    /// Options of the plain select `id`
    pub fn options(&self, id: &str) -> Result<Vec<SelectOption>> {
        self.option_sets
            .get(id)
            .cloned()
            .ok_or_else(|| Error::InvalidConfig(format!("missing option set '{}'", id)))
    }
}
