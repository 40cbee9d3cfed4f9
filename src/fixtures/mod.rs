//! Fixtures
//!
//! YAML fixture sets under `./fixtures`: a catalog, allowance tables and cart configuration
//! sharing one set name.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    allowances::{AllowanceConfig, FreeAllowanceTable, MealTemplate},
    cart::Cart,
    catalog::{Catalog, CatalogError},
    config::{CartConfig, ConfigError},
    fixtures::catalog::CatalogFixture,
};

pub mod catalog;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price, percentage or currency
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Configuration currency differs from the already loaded catalog (catalog, config)
    #[error("Currency mismatch: catalog uses {0}, config uses {1}")]
    CurrencyMismatch(String, String),
}

/// Wrapper for allowance tables in YAML
#[derive(Debug, Deserialize)]
pub struct AllowancesFixture {
    /// Map of meal template -> category allowances
    pub allowances: FxHashMap<MealTemplate, FreeAllowanceTable>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Catalog<'a>,
    allowances: AllowanceConfig,
    config: CartConfig<'a>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        let config = CartConfig::default();

        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(config.currency),
            allowances: AllowanceConfig::default(),
            config,
        }
    }

    /// Load cart configuration from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its currency differs from
    /// an already loaded catalog.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("config").join(format!("{name}.yml"));
        let config = CartConfig::from_file(&file_path)?;

        if config.currency != self.catalog.currency() {
            if self.catalog.meals().next().is_some() || self.catalog.addons().next().is_some() {
                return Err(FixtureError::CurrencyMismatch(
                    self.catalog.currency().iso_alpha_code.to_string(),
                    config.currency.iso_alpha_code.to_string(),
                ));
            }

            self.catalog = Catalog::new(config.currency);
        }

        self.config = config;

        Ok(self)
    }

    /// Load meals and add-ons from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is invalid, or an entry
    /// is duplicated or priced in another currency.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (id, meal_fixture) in fixture.meals {
            self.catalog.insert_meal(meal_fixture.into_meal(id)?)?;
        }

        for (id, addon_fixture) in fixture.addons {
            self.catalog.insert_addon(addon_fixture.into_addon(id)?)?;
        }

        Ok(self)
    }

    /// Load allowance tables from a YAML fixture file, replacing the tables it names
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_allowances(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("allowances")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: AllowancesFixture = serde_norway::from_str(&contents)?;

        for (template, table) in fixture.allowances {
            self.allowances.insert(template, table);
        }

        Ok(self)
    }

    /// Load a complete fixture set (config, catalog and allowances with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_config(name)?
            .load_catalog(name)?
            .load_allowances(name)?;

        Ok(fixture)
    }

    /// The loaded catalog
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// The loaded allowance tables
    pub fn allowances(&self) -> &AllowanceConfig {
        &self.allowances
    }

    /// The loaded cart configuration
    pub fn config(&self) -> &CartConfig<'a> {
        &self.config
    }

    /// Create an empty cart using the loaded configuration
    pub fn cart(&self) -> Cart<'a> {
        Cart::with_config(&self.config)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
