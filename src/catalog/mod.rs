//! Catalog
//!
//! Read-only meal and add-on reference data, fetched once per page load. Carts copy what they
//! need from here at selection time and never hold live references into it.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::allowances::MealTemplate;

pub mod allergens;

use allergens::AllergenSet;

new_key_type! {
    /// Meal Key
    pub struct MealKey;

    /// Add-on Key
    pub struct AddonKey;
}

/// Errors related to catalog construction and lookups.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// An entry with the same external id already exists.
    #[error("Duplicate catalog id: {0}")]
    DuplicateId(String),

    /// No entry exists for the external id.
    #[error("Catalog entry not found: {0}")]
    NotFound(String),

    /// An entry's currency differs from the catalog currency (id, entry currency, catalog currency).
    #[error("Entry {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Nutritional values copied onto cart lines when a meal is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Nutrition {
    /// Energy in kcal
    #[serde(default)]
    pub calories: u32,

    /// Protein in grams
    #[serde(default)]
    pub protein: u32,

    /// Carbohydrates in grams
    #[serde(default)]
    pub carbs: u32,

    /// Fat in grams
    #[serde(default)]
    pub fat: u32,
}

/// A selectable add-on ingredient.
#[derive(Debug, Clone, PartialEq)]
pub struct Addon<'a> {
    /// External catalog id
    pub id: String,

    /// Display name
    pub name: String,

    /// Localised (Arabic) display name
    pub name_arabic: Option<String>,

    /// Allowance category key, e.g. "Nuts"
    pub category: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Whether the add-on can currently be selected
    pub is_available: bool,

    /// Allergen tags
    pub allergens: AllergenSet,
}

/// A catalog meal.
#[derive(Debug, Clone, PartialEq)]
pub struct Meal<'a> {
    /// External catalog id
    pub id: String,

    /// Display name
    pub name: String,

    /// Localised (Arabic) display name
    pub name_arabic: Option<String>,

    /// Base price before any add-on charges
    pub base_price: Money<'a, Currency>,

    /// Template deciding which allowance table applies
    pub template: MealTemplate,

    /// Whether the meal can currently be ordered
    pub is_available: bool,

    /// Allergen tags
    pub allergens: AllergenSet,

    /// Nutritional values
    pub nutrition: Nutrition,
}

/// Meals and add-ons, addressable by external id.
#[derive(Debug)]
pub struct Catalog<'a> {
    meals: SlotMap<MealKey, Meal<'a>>,
    addons: SlotMap<AddonKey, Addon<'a>>,
    meal_keys: FxHashMap<String, MealKey>,
    addon_keys: FxHashMap<String, AddonKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            meals: SlotMap::with_key(),
            addons: SlotMap::with_key(),
            meal_keys: FxHashMap::default(),
            addon_keys: FxHashMap::default(),
            currency,
        }
    }

    /// Insert a meal.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is taken, or
    /// [`CatalogError::CurrencyMismatch`] if the meal is priced in another currency.
    pub fn insert_meal(&mut self, meal: Meal<'a>) -> Result<MealKey, CatalogError> {
        if self.meal_keys.contains_key(&meal.id) {
            return Err(CatalogError::DuplicateId(meal.id));
        }

        self.check_currency(&meal.id, &meal.base_price)?;

        let id = meal.id.clone();
        let key = self.meals.insert(meal);

        self.meal_keys.insert(id, key);

        Ok(key)
    }

    /// Insert an add-on.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is taken, or
    /// [`CatalogError::CurrencyMismatch`] if the add-on is priced in another currency.
    pub fn insert_addon(&mut self, addon: Addon<'a>) -> Result<AddonKey, CatalogError> {
        if self.addon_keys.contains_key(&addon.id) {
            return Err(CatalogError::DuplicateId(addon.id));
        }

        self.check_currency(&addon.id, &addon.price)?;

        let id = addon.id.clone();
        let key = self.addons.insert(addon);

        self.addon_keys.insert(id, key);

        Ok(key)
    }

    /// Look up a meal by external id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if there is no such meal.
    pub fn meal(&self, id: &str) -> Result<&Meal<'a>, CatalogError> {
        self.meal_keys
            .get(id)
            .and_then(|key| self.meals.get(*key))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Look up an add-on by external id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if there is no such add-on.
    pub fn addon(&self, id: &str) -> Result<&Addon<'a>, CatalogError> {
        self.addon_keys
            .get(id)
            .and_then(|key| self.addons.get(*key))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Look up a meal by key.
    pub fn meal_by_key(&self, key: MealKey) -> Option<&Meal<'a>> {
        self.meals.get(key)
    }

    /// Look up an add-on by key.
    pub fn addon_by_key(&self, key: AddonKey) -> Option<&Addon<'a>> {
        self.addons.get(key)
    }

    /// Iterate over all meals.
    pub fn meals(&self) -> impl Iterator<Item = &Meal<'a>> {
        self.meals.values()
    }

    /// Iterate over all add-ons.
    pub fn addons(&self) -> impl Iterator<Item = &Addon<'a>> {
        self.addons.values()
    }

    /// Available add-ons grouped by category, each group sorted by name.
    pub fn grouped_addons(&self) -> BTreeMap<&str, Vec<&Addon<'a>>> {
        let mut groups: BTreeMap<&str, Vec<&Addon<'a>>> = BTreeMap::new();

        for addon in self.addons.values().filter(|addon| addon.is_available) {
            groups.entry(addon.category.as_str()).or_default().push(addon);
        }

        for group in groups.values_mut() {
            group.sort_by(|a, b| a.name.cmp(&b.name));
        }

        groups
    }

    /// Get the currency of the catalog.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn check_currency(&self, id: &str, price: &Money<'a, Currency>) -> Result<(), CatalogError> {
        if price.currency() == self.currency {
            Ok(())
        } else {
            Err(CatalogError::CurrencyMismatch(
                id.to_string(),
                price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn addon(id: &str, category: &str, minor: i64, available: bool) -> Addon<'static> {
        Addon {
            id: id.to_string(),
            name: id.to_string(),
            name_arabic: None,
            category: category.to_string(),
            price: Money::from_minor(minor, GBP),
            is_available: available,
            allergens: AllergenSet::default(),
        }
    }

    fn meal(id: &str) -> Meal<'static> {
        Meal {
            id: id.to_string(),
            name: "Garden Salad".to_string(),
            name_arabic: Some("سلطة الحديقة".to_string()),
            base_price: Money::from_minor(2500, GBP),
            template: MealTemplate::RegularSalad,
            is_available: true,
            allergens: AllergenSet::default(),
            nutrition: Nutrition::default(),
        }
    }

    #[test]
    fn lookup_by_external_id() -> TestResult {
        let mut catalog = Catalog::new(GBP);

        let key = catalog.insert_meal(meal("garden"))?;
        catalog.insert_addon(addon("almonds", "Nuts", 300, true))?;

        assert_eq!(catalog.meal("garden")?.name, "Garden Salad");
        assert_eq!(catalog.meal_by_key(key).map(|m| m.id.as_str()), Some("garden"));
        assert_eq!(catalog.addon("almonds")?.category, "Nuts");

        Ok(())
    }

    #[test]
    fn missing_entry_returns_not_found() {
        let catalog = Catalog::new(GBP);

        assert_eq!(
            catalog.addon("walnuts").err(),
            Some(CatalogError::NotFound("walnuts".to_string()))
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() -> TestResult {
        let mut catalog = Catalog::new(GBP);

        catalog.insert_addon(addon("ranch", "Dressings", 100, true))?;
        let result = catalog.insert_addon(addon("ranch", "Dressings", 150, true));

        assert_eq!(result.err(), Some(CatalogError::DuplicateId("ranch".to_string())));

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() {
        let mut catalog = Catalog::new(GBP);
        let mut dollar_meal = meal("garden");
        dollar_meal.base_price = Money::from_minor(2500, USD);

        let result = catalog.insert_meal(dollar_meal);

        assert_eq!(
            result.err(),
            Some(CatalogError::CurrencyMismatch(
                "garden".to_string(),
                USD.iso_alpha_code,
                GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn grouped_addons_skips_unavailable_and_sorts_by_name() -> TestResult {
        let mut catalog = Catalog::new(GBP);

        catalog.insert_addon(addon("walnuts", "Nuts", 350, true))?;
        catalog.insert_addon(addon("almonds", "Nuts", 300, true))?;
        catalog.insert_addon(addon("pecans", "Nuts", 400, false))?;
        catalog.insert_addon(addon("ranch", "Dressings", 100, true))?;

        let groups = catalog.grouped_addons();
        let nuts: Vec<&str> = groups
            .get("Nuts")
            .map(|group| group.iter().map(|a| a.id.as_str()).collect())
            .unwrap_or_default();

        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["Dressings", "Nuts"]);
        assert_eq!(nuts, vec!["almonds", "walnuts"]);

        Ok(())
    }
}
