//! Mealcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allowances::{AllowanceConfig, DEFAULT_FREE_QUANTITY, FreeAllowanceTable, MealTemplate},
    cart::{
        AddLineOutcome, Cart, CartError,
        line::{CartLine, LineId, MealRef, NewAddon, NewLine, SelectedAddon},
        metadata::OrderMetadata,
    },
    catalog::{Addon, Catalog, CatalogError, Meal, Nutrition, allergens::AllergenSet},
    config::{CartConfig, ConfigError, parse_percentage, parse_price},
    fixtures::{Fixture, FixtureError},
    orders::{
        CheckoutError, checkout,
        payload::{OrderDetails, OrderPayload, PaymentMethod},
        service::{OrderRecord, OrderService, OrderServiceError, OrderStatus},
    },
    pricing::{
        PriceBreakdown, PricingError, Selection, SelectionEntry, customized_price,
        price_breakdown,
    },
    safety::{AllergenFilter, AllergyWarning, SafetyFilter, allergy_warnings},
    summary::{CartSummary, SummaryError},
};
