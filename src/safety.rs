//! Allergy Safety
//!
//! Advisory allergy checks. Unsafe items are reported so they can be flagged to the customer;
//! they are never blocked from the cart.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{
    cart::{Cart, line::LineId},
    catalog::{Catalog, allergens::AllergenSet},
};

/// Decides whether catalog items are safe for the current customer.
pub trait SafetyFilter {
    /// Whether the meal or add-on with this id is safe.
    fn is_safe(&self, item_id: &str) -> bool;

    /// Ids of every unsafe meal and add-on, sorted.
    fn unsafe_item_ids(&self) -> Vec<String>;
}

/// Flags catalog entries that contain any of the customer's allergens.
#[derive(Debug, Clone, Default)]
pub struct AllergenFilter {
    allergies: AllergenSet,
    unsafe_ids: FxHashSet<String>,
}

impl AllergenFilter {
    /// Build a filter for a customer's allergies over a catalog.
    pub fn new(allergies: AllergenSet, catalog: &Catalog<'_>) -> Self {
        let meals = catalog
            .meals()
            .filter(|meal| meal.allergens.intersects(&allergies))
            .map(|meal| meal.id.clone());

        let addons = catalog
            .addons()
            .filter(|addon| addon.allergens.intersects(&allergies))
            .map(|addon| addon.id.clone());

        let unsafe_ids: FxHashSet<String> = meals.chain(addons).collect();

        debug!(
            allergies = allergies.len(),
            flagged = unsafe_ids.len(),
            "built allergen filter"
        );

        Self {
            allergies,
            unsafe_ids,
        }
    }

    /// The customer's allergies.
    pub fn allergies(&self) -> &AllergenSet {
        &self.allergies
    }
}

impl SafetyFilter for AllergenFilter {
    fn is_safe(&self, item_id: &str) -> bool {
        !self.unsafe_ids.contains(item_id)
    }

    fn unsafe_item_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.unsafe_ids.iter().cloned().collect();

        ids.sort();

        ids
    }
}

/// An unsafe meal or add-on found in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllergyWarning {
    /// Line containing the item
    pub line_id: LineId,

    /// Catalog id of the unsafe meal or add-on
    pub item_id: String,

    /// Display name
    pub name: String,
}

/// List every unsafe meal and add-on in the cart, in cart order.
pub fn allergy_warnings<F>(cart: &Cart<'_>, filter: &F) -> Vec<AllergyWarning>
where
    F: SafetyFilter + ?Sized,
{
    let mut warnings = Vec::new();

    for line in cart.iter() {
        if !filter.is_safe(line.meal_id()) {
            warnings.push(AllergyWarning {
                line_id: line.id(),
                item_id: line.meal_id().to_string(),
                name: line.name().to_string(),
            });
        }

        warnings.extend(
            line.addons()
                .iter()
                .filter(|addon| !filter.is_safe(addon.item_id()))
                .map(|addon| AllergyWarning {
                    line_id: line.id(),
                    item_id: addon.item_id().to_string(),
                    name: addon.name().to_string(),
                }),
        );
    }

    warnings
}
