//! Free Allowances
//!
//! A customisable meal includes a number of add-ons per category in its base price. Each meal
//! template has its own allowance table; categories that a table does not mention include
//! [`DEFAULT_FREE_QUANTITY`] free units.

use std::{fmt, str::FromStr};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free quantity for a category with no entry in an allowance table.
pub const DEFAULT_FREE_QUANTITY: u32 = 0;

/// Errors related to allowance configuration.
#[derive(Debug, Error, PartialEq)]
pub enum AllowanceError {
    /// The meal template name was not recognised.
    #[error("Unknown meal template: {0}")]
    UnknownTemplate(String),
}

/// The kind of meal an allowance table applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealTemplate {
    /// Build-your-own salad with greens, vegetables, protein and extras.
    RegularSalad,

    /// Fruit salad with fruits, toppings and syrups.
    FruitSalad,

    /// A fixed meal that cannot be customised.
    Fixed,
}

impl MealTemplate {
    /// Returns the template's configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            MealTemplate::RegularSalad => "regular_salad",
            MealTemplate::FruitSalad => "fruit_salad",
            MealTemplate::Fixed => "fixed",
        }
    }

    /// Whether meals of this template accept add-on selections.
    pub fn is_customizable(self) -> bool {
        !matches!(self, MealTemplate::Fixed)
    }
}

impl fmt::Display for MealTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealTemplate {
    type Err = AllowanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "regular_salad" => Ok(MealTemplate::RegularSalad),
            "fruit_salad" => Ok(MealTemplate::FruitSalad),
            "fixed" => Ok(MealTemplate::Fixed),
            other => Err(AllowanceError::UnknownTemplate(other.to_string())),
        }
    }
}

/// Category -> free quantity for a single meal template.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FreeAllowanceTable {
    allowances: FxHashMap<String, u32>,
}

impl FreeAllowanceTable {
    /// Create an empty table; every category is fully chargeable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a category's free quantity.
    #[must_use]
    pub fn with(mut self, category: &str, free: u32) -> Self {
        self.set(category, free);
        self
    }

    /// Set the free quantity for a category.
    pub fn set(&mut self, category: &str, free: u32) {
        self.allowances.insert(category.to_string(), free);
    }

    /// Free quantity for a category, falling back to [`DEFAULT_FREE_QUANTITY`].
    pub fn free_quantity(&self, category: &str) -> u32 {
        self.allowances
            .get(category)
            .copied()
            .unwrap_or(DEFAULT_FREE_QUANTITY)
    }

    /// Whether the table has an explicit entry for the category.
    pub fn contains(&self, category: &str) -> bool {
        self.allowances.contains_key(category)
    }

    /// Iterate over the configured categories and their free quantities.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.allowances
            .iter()
            .map(|(category, free)| (category.as_str(), *free))
    }

    /// Number of configured categories.
    pub fn len(&self) -> usize {
        self.allowances.len()
    }

    /// Check if no categories are configured.
    pub fn is_empty(&self) -> bool {
        self.allowances.is_empty()
    }

    /// Allowances for the regular build-your-own salad.
    #[must_use]
    pub fn regular_salad() -> Self {
        Self::new()
            .with("Leafy Greens", 1)
            .with("Vegetables", 4)
            .with("Protein", 1)
            .with("Cheese", 1)
            .with("Nuts", 1)
            .with("Dressings", 2)
            .with("Toppings", 2)
    }

    /// Allowances for the fruit salad.
    #[must_use]
    pub fn fruit_salad() -> Self {
        Self::new()
            .with("Fruits", 4)
            .with("Toppings", 2)
            .with("Syrups", 1)
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for FreeAllowanceTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            allowances: iter
                .into_iter()
                .map(|(category, free)| (category.into(), free))
                .collect(),
        }
    }
}

/// Allowance tables keyed by meal template.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowanceConfig {
    tables: FxHashMap<MealTemplate, FreeAllowanceTable>,
    empty: FreeAllowanceTable,
}

impl AllowanceConfig {
    /// Create a config with no tables.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tables: FxHashMap::default(),
            empty: FreeAllowanceTable::new(),
        }
    }

    /// Create a config from explicit tables.
    pub fn from_tables(tables: impl IntoIterator<Item = (MealTemplate, FreeAllowanceTable)>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
            empty: FreeAllowanceTable::new(),
        }
    }

    /// Replace the table for a template.
    pub fn insert(&mut self, template: MealTemplate, table: FreeAllowanceTable) {
        self.tables.insert(template, table);
    }

    /// Table for a template. Templates without a table get an empty one.
    pub fn table(&self, template: MealTemplate) -> &FreeAllowanceTable {
        self.tables.get(&template).unwrap_or(&self.empty)
    }
}

impl Default for AllowanceConfig {
    fn default() -> Self {
        Self::from_tables([
            (
                MealTemplate::RegularSalad,
                FreeAllowanceTable::regular_salad(),
            ),
            (MealTemplate::FruitSalad, FreeAllowanceTable::fruit_salad()),
        ])
    }
}
