//! Customised meal pricing against the salads fixture set.

use mealcart::prelude::*;
use proptest::prelude::*;
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

fn addon(id: &str, category: &str, minor: i64) -> Addon<'static> {
    Addon {
        id: id.to_string(),
        name: id.to_string(),
        name_arabic: None,
        category: category.to_string(),
        price: Money::from_minor(minor, GBP),
        is_available: true,
        allergens: AllergenSet::default(),
    }
}

#[test]
fn nuts_and_dressing_example() -> TestResult {
    let almonds = addon("almonds", "Nuts", 300);
    let ranch = addon("ranch", "Dressings", 100);
    let table = FreeAllowanceTable::new().with("Nuts", 1).with("Dressings", 2);

    let mut selection = Selection::new();

    selection.set_quantity(&almonds, 2);
    selection.set_quantity(&ranch, 1);

    let price = customized_price(Money::from_minor(0, GBP), selection.entries(), &table)?;

    assert_eq!(price, Money::from_minor(300, GBP));

    Ok(())
}

#[test]
fn allowance_boundary_charges_most_expensive_unit() -> TestResult {
    let fixture = Fixture::from_set("salads")?;
    let catalog = fixture.catalog();
    let meal = catalog.meal("garden_salad")?;
    let table = fixture.allowances().table(meal.template);

    let cucumber = catalog.addon("cucumber")?;
    let tomatoes = catalog.addon("cherry_tomatoes")?;
    let sweetcorn = catalog.addon("sweetcorn")?;

    // Vegetables: 4 free.
    let mut selection = Selection::new();

    selection.set_quantity(cucumber, 2);
    selection.set_quantity(sweetcorn, 1);
    selection.set_quantity(tomatoes, 1);

    assert_eq!(
        customized_price(meal.base_price, selection.entries(), table)?,
        meal.base_price
    );
    assert_eq!(selection.remaining_free("Vegetables", table), 0);

    selection.increment(cucumber);

    let expected = meal.base_price.add(tomatoes.price)?;

    assert_eq!(
        customized_price(meal.base_price, selection.entries(), table)?,
        expected
    );

    Ok(())
}

#[test]
fn fruit_bowl_uses_fruit_table() -> TestResult {
    let fixture = Fixture::from_set("salads")?;
    let catalog = fixture.catalog();
    let meal = catalog.meal("fruit_bowl")?;
    let table = fixture.allowances().table(meal.template);

    let mango = catalog.addon("mango")?;
    let kiwi = catalog.addon("kiwi")?;
    let honey = catalog.addon("honey")?;

    let mut selection = Selection::new();

    selection.set_quantity(mango, 3);
    selection.set_quantity(kiwi, 2);
    selection.set_quantity(honey, 2);

    let breakdown = price_breakdown(meal.base_price, selection.entries(), table)?;

    // One fruit over (mango at 2.50) and one syrup over (honey at 1.50).
    assert_eq!(breakdown.extras()?, Money::from_minor(400, GBP));
    assert_eq!(breakdown.charges.len(), 2);

    Ok(())
}

#[test]
fn fixed_meals_have_no_allowances() -> TestResult {
    let fixture = Fixture::from_set("salads")?;
    let catalog = fixture.catalog();
    let caesar = catalog.meal("caesar")?;
    let croutons = catalog.addon("croutons")?;

    assert!(!caesar.template.is_customizable());

    let table = fixture.allowances().table(caesar.template);
    let mut selection = Selection::new();

    selection.increment(croutons);

    let price = customized_price(caesar.base_price, selection.entries(), table)?;

    assert_eq!(price, caesar.base_price.add(croutons.price)?);

    Ok(())
}

#[test]
fn customised_price_becomes_line_unit_price() -> TestResult {
    let fixture = Fixture::from_set("salads")?;
    let catalog = fixture.catalog();
    let meal = catalog.meal("garden_salad")?;
    let table = fixture.allowances().table(meal.template);

    let almonds = catalog.addon("almonds")?;
    let walnuts = catalog.addon("walnuts")?;

    let mut selection = Selection::new();

    selection.increment(almonds);
    selection.increment(walnuts);

    let price = customized_price(meal.base_price, selection.entries(), table)?;

    let mut cart = fixture.cart();
    let line = cart
        .add_line(
            NewLine::new(MealRef::from(meal))
                .with_price(price)
                .with_addons(selection.entries().iter().map(NewAddon::from)),
        )
        .into_result()?;

    // Almonds are the cheaper nut, so they ride free and walnuts are charged.
    assert_eq!(line.unit_price(), &meal.base_price.add(walnuts.price)?);
    assert_eq!(line.addons().len(), 2);
    assert_eq!(cart.subtotal(), price);

    Ok(())
}

#[test]
fn unavailable_items_are_hidden_from_groups() -> TestResult {
    let fixture = Fixture::from_set("salads")?;
    let groups = fixture.catalog().grouped_addons();

    let fruits: Vec<&str> = groups
        .get("Fruits")
        .ok_or("missing fruits")?
        .iter()
        .map(|addon| addon.id.as_str())
        .collect();

    assert!(!fruits.contains(&"blueberries"));
    assert_eq!(fruits, vec!["kiwi", "mango", "strawberries"]);

    Ok(())
}

fn nut_prices() -> impl Strategy<Value = Vec<(i64, u32)>> {
    prop::collection::vec((0..2_000i64, 0..5u32), 1..6)
}

proptest! {
    #[test]
    fn adding_a_unit_never_lowers_the_price(
        items in nut_prices(),
        bump in 0..6usize,
        free in 0..4u32,
    ) {
        let addons: Vec<Addon<'static>> = items
            .iter()
            .enumerate()
            .map(|(idx, (price, _))| addon(&format!("nut-{idx}"), "Nuts", *price))
            .collect();

        let table = FreeAllowanceTable::new().with("Nuts", free);
        let base = Money::from_minor(1_000, GBP);

        let mut selection = Selection::new();

        for (addon, (_, quantity)) in addons.iter().zip(&items) {
            selection.set_quantity(addon, *quantity);
        }

        let before = customized_price(base, selection.entries(), &table);

        if let Some(target) = addons.get(bump % addons.len()) {
            selection.increment(target);
        }

        let after = customized_price(base, selection.entries(), &table);

        prop_assert!(before.is_ok() && after.is_ok());

        if let (Ok(before), Ok(after)) = (before, after) {
            prop_assert!(after.to_minor_units() >= before.to_minor_units());
        }
    }

    #[test]
    fn exactly_free_units_cost_nothing(
        prices in prop::collection::vec(0..2_000i64, 1..5),
        free in 1..5u32,
    ) {
        let addons: Vec<Addon<'static>> = prices
            .iter()
            .enumerate()
            .map(|(idx, price)| addon(&format!("nut-{idx}"), "Nuts", *price))
            .collect();

        let table = FreeAllowanceTable::new().with("Nuts", free);
        let base = Money::from_minor(0, GBP);

        // Spread exactly `free` units across the add-ons.
        let mut selection = Selection::new();

        for unit in 0..free {
            if let Some(item) = addons.get(unit as usize % addons.len()) {
                selection.increment(item);
            }
        }

        prop_assert_eq!(customized_price(base, selection.entries(), &table).ok(), Some(base));

        // One more unit charges the most expensive selected item.
        let most_expensive = selection
            .entries()
            .iter()
            .map(|entry| entry.item.price.to_minor_units())
            .max()
            .unwrap_or(0);

        let cheapest = addons
            .iter()
            .min_by_key(|addon| addon.price.to_minor_units());

        if let Some(cheapest) = cheapest {
            selection.increment(cheapest);

            let expected = most_expensive.max(cheapest.price.to_minor_units());

            prop_assert_eq!(
                customized_price(base, selection.entries(), &table).ok(),
                Some(Money::from_minor(expected, GBP))
            );
        }
    }
}
