//! Catalog Fixtures

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    allowances::MealTemplate,
    catalog::{Addon, Meal, Nutrition, allergens::AllergenSet},
    config::parse_price,
    fixtures::FixtureError,
};

/// Wrapper for meals and add-ons in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of meal id -> meal fixture
    #[serde(default)]
    pub meals: BTreeMap<String, MealFixture>,

    /// Map of add-on id -> add-on fixture
    #[serde(default)]
    pub addons: BTreeMap<String, AddonFixture>,
}

/// Meal Fixture
#[derive(Debug, Deserialize)]
pub struct MealFixture {
    /// Meal name
    pub name: String,

    /// Localised name
    #[serde(default)]
    pub name_arabic: Option<String>,

    /// Base price (e.g., "25.00 GBP")
    pub price: String,

    /// Meal template
    #[serde(default = "fixed_template")]
    pub template: MealTemplate,

    /// Availability, defaults to available
    #[serde(default = "available")]
    pub available: bool,

    /// Allergen tags
    #[serde(default)]
    pub allergens: AllergenSet,

    /// Nutritional values
    #[serde(default)]
    pub nutrition: Nutrition,
}

/// Add-on Fixture
#[derive(Debug, Deserialize)]
pub struct AddonFixture {
    /// Add-on name
    pub name: String,

    /// Localised name
    #[serde(default)]
    pub name_arabic: Option<String>,

    /// Allowance category (e.g., "Nuts")
    pub category: String,

    /// Unit price (e.g., "3.00 GBP")
    pub price: String,

    /// Availability, defaults to available
    #[serde(default = "available")]
    pub available: bool,

    /// Allergen tags
    #[serde(default)]
    pub allergens: AllergenSet,
}

fn fixed_template() -> MealTemplate {
    MealTemplate::Fixed
}

fn available() -> bool {
    true
}

impl MealFixture {
    /// Convert into a catalog meal with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_meal(self, id: String) -> Result<Meal<'static>, FixtureError> {
        Ok(Meal {
            id,
            name: self.name,
            name_arabic: self.name_arabic,
            base_price: parse_price(&self.price)?,
            template: self.template,
            is_available: self.available,
            allergens: self.allergens,
            nutrition: self.nutrition,
        })
    }
}

impl AddonFixture {
    /// Convert into a catalog add-on with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_addon(self, id: String) -> Result<Addon<'static>, FixtureError> {
        Ok(Addon {
            id,
            name: self.name,
            name_arabic: self.name_arabic,
            category: self.category,
            price: parse_price(&self.price)?,
            is_available: self.available,
            allergens: self.allergens,
        })
    }
}
