//! Cart Lines
//!
//! A line is one configured meal in the cart. The same catalog meal may appear on several
//! independently configured lines, so lines are addressed by a [`LineId`] generated per
//! add-to-cart action rather than by the catalog id.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    cart::CartError,
    catalog::{Addon, Meal, Nutrition},
    pricing::{SelectionEntry, extend_price, minor_units},
};

/// Cart-local line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// Generate a fresh, time-ordered line id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The parts of a catalog meal a cart line is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct MealRef<'a> {
    /// Catalog meal id
    pub id: String,

    /// Display name
    pub name: String,

    /// Catalog price
    pub price: Money<'a, Currency>,

    /// Nutrition snapshot
    pub nutrition: Nutrition,
}

impl<'a> From<&Meal<'a>> for MealRef<'a> {
    fn from(meal: &Meal<'a>) -> Self {
        Self {
            id: meal.id.clone(),
            name: meal.name.clone(),
            price: meal.base_price,
            nutrition: meal.nutrition,
        }
    }
}

/// An add-on as supplied by the caller, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddon<'a> {
    /// Catalog add-on id
    pub item_id: String,

    /// Display name
    pub name: String,

    /// Allowance category
    pub category: String,

    /// Requested quantity; defaults to 1
    pub quantity: Option<i64>,

    /// Unit price; defaults to zero
    pub unit_price: Option<Money<'a, Currency>>,
}

impl<'a> NewAddon<'a> {
    /// Snapshot a catalog add-on at the given quantity.
    pub fn from_addon(addon: &Addon<'a>, quantity: u32) -> Self {
        Self {
            item_id: addon.id.clone(),
            name: addon.name.clone(),
            category: addon.category.clone(),
            quantity: Some(i64::from(quantity)),
            unit_price: Some(addon.price),
        }
    }
}

impl<'a> From<&SelectionEntry<'_, 'a>> for NewAddon<'a> {
    fn from(entry: &SelectionEntry<'_, 'a>) -> Self {
        Self::from_addon(entry.item, entry.quantity)
    }
}

/// Request to add a meal to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLine<'a> {
    /// The meal being added
    pub meal: MealRef<'a>,

    /// Selected add-ons
    pub addons: Vec<NewAddon<'a>>,

    /// Unit price computed elsewhere (e.g. a customised meal price)
    pub price_override: Option<Money<'a, Currency>>,

    /// Number of identical meals
    pub quantity: u32,

    /// Free-form customisation notes
    pub notes: String,
}

impl<'a> NewLine<'a> {
    /// Start a request for a single meal with no add-ons.
    pub fn new(meal: impl Into<MealRef<'a>>) -> Self {
        Self {
            meal: meal.into(),
            addons: Vec::new(),
            price_override: None,
            quantity: 1,
            notes: String::new(),
        }
    }

    /// Attach add-ons.
    #[must_use]
    pub fn with_addons(mut self, addons: impl IntoIterator<Item = NewAddon<'a>>) -> Self {
        self.addons.extend(addons);
        self
    }

    /// Use an already computed unit price instead of the meal price.
    #[must_use]
    pub fn with_price(mut self, price: Money<'a, Currency>) -> Self {
        self.price_override = Some(price);
        self
    }

    /// Set the number of meals.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set customisation notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// An add-on attached to a cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAddon<'a> {
    item_id: String,
    line_id: LineId,
    name: String,
    category: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    total_price: Money<'a, Currency>,
}

impl<'a> SelectedAddon<'a> {
    fn normalize(
        new_addon: NewAddon<'a>,
        line_id: LineId,
        currency: &'static Currency,
    ) -> Result<Option<Self>, CartError> {
        let quantity = new_addon.quantity.unwrap_or(1);

        if quantity <= 0 {
            return Ok(None);
        }

        let quantity = u32::try_from(quantity).map_err(|_err| CartError::InvalidQuantity(quantity))?;
        let unit_price = new_addon
            .unit_price
            .unwrap_or_else(|| Money::from_minor(0, currency));

        if unit_price.currency() != currency {
            return Err(CartError::CurrencyMismatch(
                unit_price.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let mut addon = Self {
            item_id: new_addon.item_id,
            line_id,
            name: new_addon.name,
            category: new_addon.category,
            quantity,
            unit_price,
            total_price: unit_price,
        };

        addon.set_quantity(quantity)?;

        Ok(Some(addon))
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) -> Result<(), CartError> {
        self.total_price = extend_price(&self.unit_price, quantity)?;
        self.quantity = quantity;

        Ok(())
    }

    /// Catalog add-on id
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Owning line
    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allowance category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Selected quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price at selection time
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Quantity times unit price
    pub fn total_price(&self) -> &Money<'a, Currency> {
        &self.total_price
    }
}

/// A meal line in the cart.
///
/// When the meal was customised, add-on charges are already part of the unit price; the
/// attached add-ons describe what was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    id: LineId,
    meal_id: String,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    total_price: Money<'a, Currency>,
    addons: Vec<SelectedAddon<'a>>,
    notes: String,
    nutrition: Nutrition,
}

impl<'a> CartLine<'a> {
    /// Validate and normalise a new line request.
    pub(crate) fn build(
        id: LineId,
        new_line: NewLine<'a>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let NewLine {
            meal,
            addons,
            price_override,
            quantity,
            notes,
        } = new_line;

        if meal.id.trim().is_empty() || meal.name.trim().is_empty() {
            return Err(CartError::InvalidMeal);
        }

        let unit_price = price_override.unwrap_or(meal.price);

        if unit_price.currency() != currency {
            return Err(CartError::CurrencyMismatch(
                unit_price.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let minor = minor_units(&unit_price)?;

        if minor <= 0 {
            return Err(CartError::InvalidPrice(minor));
        }

        let addons = addons
            .into_iter()
            .filter_map(|addon| SelectedAddon::normalize(addon, id, currency).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        let quantity = quantity.max(1);

        Ok(Self {
            id,
            meal_id: meal.id,
            name: meal.name,
            unit_price,
            quantity,
            total_price: extend_price(&unit_price, quantity)?,
            addons,
            notes,
            nutrition: meal.nutrition,
        })
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) -> Result<(), CartError> {
        self.total_price = extend_price(&self.unit_price, quantity)?;
        self.quantity = quantity;

        Ok(())
    }

    pub(crate) fn addon_mut(&mut self, item_id: &str) -> Option<&mut SelectedAddon<'a>> {
        self.addons.iter_mut().find(|addon| addon.item_id == item_id)
    }

    /// Remove an add-on, returning whether it was present.
    pub(crate) fn remove_addon(&mut self, item_id: &str) -> bool {
        let before = self.addons.len();

        self.addons.retain(|addon| addon.item_id != item_id);

        self.addons.len() != before
    }

    /// Line id
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Catalog meal id
    pub fn meal_id(&self) -> &str {
        &self.meal_id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of meals
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Quantity times unit price
    pub fn total_price(&self) -> &Money<'a, Currency> {
        &self.total_price
    }

    /// Selected add-ons in selection order
    pub fn addons(&self) -> &[SelectedAddon<'a>] {
        &self.addons
    }

    /// Look up an add-on on this line.
    pub fn addon(&self, item_id: &str) -> Option<&SelectedAddon<'a>> {
        self.addons.iter().find(|addon| addon.item_id == item_id)
    }

    /// Customisation notes
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Nutrition snapshot taken when the line was added
    pub fn nutrition(&self) -> Nutrition {
        self.nutrition
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn meal_ref(minor: i64) -> MealRef<'static> {
        MealRef {
            id: "garden".to_string(),
            name: "Garden Salad".to_string(),
            price: Money::from_minor(minor, GBP),
            nutrition: Nutrition {
                calories: 320,
                protein: 12,
                carbs: 30,
                fat: 14,
            },
        }
    }

    fn new_addon(id: &str, quantity: Option<i64>, minor: Option<i64>) -> NewAddon<'static> {
        NewAddon {
            item_id: id.to_string(),
            name: id.to_string(),
            category: "Nuts".to_string(),
            quantity,
            unit_price: minor.map(|minor| Money::from_minor(minor, GBP)),
        }
    }

    #[test]
    fn build_computes_totals() -> TestResult {
        let line = CartLine::build(
            LineId::generate(),
            NewLine::new(meal_ref(1000)).with_quantity(2),
            GBP,
        )?;

        assert_eq!(line.total_price(), &Money::from_minor(2000, GBP));
        assert_eq!(line.nutrition().calories, 320);

        Ok(())
    }

    #[test]
    fn price_override_replaces_meal_price() -> TestResult {
        let line = CartLine::build(
            LineId::generate(),
            NewLine::new(meal_ref(0)).with_price(Money::from_minor(300, GBP)),
            GBP,
        )?;

        assert_eq!(line.unit_price(), &Money::from_minor(300, GBP));

        Ok(())
    }

    #[test]
    fn missing_name_is_invalid_meal() {
        let mut meal = meal_ref(1000);
        meal.name = "  ".to_string();

        let result = CartLine::build(LineId::generate(), NewLine::new(meal), GBP);

        assert_eq!(result.err(), Some(CartError::InvalidMeal));
    }

    #[test]
    fn zero_price_is_invalid() {
        let result = CartLine::build(LineId::generate(), NewLine::new(meal_ref(0)), GBP);

        assert_eq!(result.err(), Some(CartError::InvalidPrice(0)));
    }

    #[test]
    fn foreign_currency_is_rejected() {
        let result = CartLine::build(
            LineId::generate(),
            NewLine::new(meal_ref(1000)).with_price(Money::from_minor(1000, USD)),
            GBP,
        );

        assert_eq!(
            result.err(),
            Some(CartError::CurrencyMismatch(
                USD.iso_alpha_code,
                GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn addons_are_normalized() -> TestResult {
        let id = LineId::generate();
        let line = CartLine::build(
            id,
            NewLine::new(meal_ref(1000)).with_addons([
                new_addon("almonds", Some(2), Some(300)),
                new_addon("walnuts", None, None),
                new_addon("pecans", Some(0), Some(400)),
                new_addon("cashews", Some(-3), Some(400)),
            ]),
            GBP,
        )?;

        let ids: Vec<&str> = line.addons().iter().map(SelectedAddon::item_id).collect();

        assert_eq!(ids, vec!["almonds", "walnuts"]);

        let almonds = line.addon("almonds").ok_or("missing almonds")?;
        let walnuts = line.addon("walnuts").ok_or("missing walnuts")?;

        assert_eq!(almonds.total_price(), &Money::from_minor(600, GBP));
        assert_eq!(almonds.line_id(), id);
        assert_eq!(walnuts.quantity(), 1);
        assert_eq!(walnuts.total_price(), &Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: Vec<LineId> = (0..1000).map(|_| LineId::generate()).collect();
        let mut deduped = ids.clone();

        deduped.sort();
        deduped.dedup();

        assert_eq!(deduped.len(), ids.len());
    }
}
