//! Cart totals invariants across arbitrary mutation sequences.

use mealcart::prelude::*;
use proptest::prelude::*;
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

#[derive(Debug, Clone)]
enum Op {
    Add { price: i64, quantity: u32, nuts: i64 },
    Remove(usize),
    UpdateQuantity(usize, i64),
    UpdateNuts(usize, i64),
    RemoveNuts(usize),
    Discount(i64),
    DeliveryFee(i64),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1..5_000i64, 1..5u32, -1..4i64)
            .prop_map(|(price, quantity, nuts)| Op::Add { price, quantity, nuts }),
        1 => (0..8usize).prop_map(Op::Remove),
        2 => (0..8usize, -2..6i64).prop_map(|(idx, qty)| Op::UpdateQuantity(idx, qty)),
        2 => (0..8usize, -2..6i64).prop_map(|(idx, qty)| Op::UpdateNuts(idx, qty)),
        1 => (0..8usize).prop_map(Op::RemoveNuts),
        1 => (0..2_000i64).prop_map(Op::Discount),
        1 => (0..3_000i64).prop_map(Op::DeliveryFee),
        1 => Just(Op::Clear),
    ]
}

fn meal(minor: i64) -> MealRef<'static> {
    MealRef {
        id: "garden_salad".to_string(),
        name: "Garden Salad".to_string(),
        price: Money::from_minor(minor, GBP),
        nutrition: Nutrition::default(),
    }
}

fn nuts(quantity: i64) -> NewAddon<'static> {
    NewAddon {
        item_id: "almonds".to_string(),
        name: "Almonds".to_string(),
        category: "Nuts".to_string(),
        quantity: Some(quantity),
        unit_price: Some(Money::from_minor(300, GBP)),
    }
}

fn line_id_at(cart: &Cart<'_>, idx: usize) -> LineId {
    cart.lines()
        .get(idx)
        .map_or_else(LineId::generate, CartLine::id)
}

fn apply(cart: &mut Cart<'static>, op: Op) -> Result<(), CartError> {
    match op {
        Op::Add {
            price,
            quantity,
            nuts: count,
        } => {
            let _outcome = cart.add_line(
                NewLine::new(meal(price))
                    .with_quantity(quantity)
                    .with_addons([nuts(count)]),
            );
        }
        Op::Remove(idx) => {
            cart.remove_line(line_id_at(cart, idx))?;
        }
        Op::UpdateQuantity(idx, quantity) => {
            cart.update_line_quantity(line_id_at(cart, idx), quantity)?;
        }
        Op::UpdateNuts(idx, quantity) => {
            cart.update_addon_quantity(line_id_at(cart, idx), "almonds", quantity)?;
        }
        Op::RemoveNuts(idx) => {
            cart.remove_addon(line_id_at(cart, idx), "almonds")?;
        }
        Op::Discount(minor) => cart.apply_discount(Money::from_minor(minor, GBP))?,
        Op::DeliveryFee(minor) => cart.set_delivery_fee(Money::from_minor(minor, GBP))?,
        Op::Clear => cart.clear(),
    }

    Ok(())
}

proptest! {
    #[test]
    fn totals_always_match_lines(ops in prop::collection::vec(op(), 0..40)) {
        let mut cart = Cart::new(GBP);

        for op in ops {
            prop_assert!(apply(&mut cart, op).is_ok());

            let metadata = cart.metadata();
            let lines: i64 = cart.iter().map(|line| line.total_price().to_minor_units()).sum();

            prop_assert_eq!(metadata.subtotal().to_minor_units(), lines);
            prop_assert_eq!(
                metadata.total_amount().to_minor_units(),
                metadata.subtotal().to_minor_units()
                    + metadata.tax_amount().to_minor_units()
                    + metadata.delivery_fee().to_minor_units()
                    - metadata.discount_amount().to_minor_units()
            );

            for line in cart.iter() {
                prop_assert!(line.quantity() >= 1);
                prop_assert_eq!(
                    line.total_price().to_minor_units(),
                    line.unit_price().to_minor_units() * i64::from(line.quantity())
                );

                for addon in line.addons() {
                    prop_assert!(addon.quantity() >= 1);
                    prop_assert_eq!(addon.line_id(), line.id());
                }
            }
        }
    }
}

#[test]
fn add_then_remove_restores_subtotal() -> TestResult {
    let mut cart = Cart::new(GBP);

    cart.add_line(NewLine::new(meal(1000))).into_result()?;

    let before = cart.subtotal();
    let line = cart
        .add_line(NewLine::new(meal(1250)).with_quantity(3))
        .into_result()?;

    assert_ne!(cart.subtotal(), before);
    assert!(cart.remove_line(line.id())?);
    assert_eq!(cart.subtotal(), before);
    assert!(cart.line(line.id()).is_none());

    Ok(())
}

#[test]
fn two_lines_with_delivery_fee() -> TestResult {
    let mut cart = Cart::new(GBP);

    cart.add_line(NewLine::new(meal(1000)).with_quantity(2))
        .into_result()?;
    cart.add_line(NewLine::new(meal(500))).into_result()?;
    cart.set_delivery_fee(Money::from_minor(1500, GBP))?;

    assert_eq!(cart.subtotal(), Money::from_minor(2500, GBP));
    assert_eq!(cart.total(), Money::from_minor(4000, GBP));

    Ok(())
}

#[test]
fn updating_quantity_to_zero_removes_line() -> TestResult {
    let mut cart = Cart::new(GBP);
    let line = cart.add_line(NewLine::new(meal(1000))).into_result()?;

    assert!(cart.update_line_quantity(line.id(), 0)?);
    assert!(cart.line(line.id()).is_none());
    assert!(cart.is_empty());
    assert_eq!(cart.subtotal(), Money::from_minor(0, GBP));

    Ok(())
}

#[test]
fn removing_last_addon_keeps_line() -> TestResult {
    let mut cart = Cart::new(GBP);
    let line = cart
        .add_line(NewLine::new(meal(2500)).with_addons([nuts(1)]))
        .into_result()?;

    assert!(cart.remove_addon(line.id(), "almonds")?);

    let kept = cart.line(line.id()).ok_or("line should survive")?;

    assert!(kept.addons().is_empty());
    assert_eq!(kept.total_price(), &Money::from_minor(2500, GBP));

    Ok(())
}

#[test]
fn stale_ids_are_no_ops() -> TestResult {
    let mut cart = Cart::new(GBP);
    let line = cart.add_line(NewLine::new(meal(1000))).into_result()?;

    assert!(cart.remove_line(line.id())?);
    assert!(!cart.remove_line(line.id())?);
    assert!(!cart.update_line_quantity(line.id(), 4)?);
    assert!(!cart.update_addon_quantity(line.id(), "almonds", 2)?);

    Ok(())
}

#[test]
fn invalid_meals_are_rejected_as_values() {
    let mut cart = Cart::new(GBP);

    let free = cart.add_line(NewLine::new(meal(0)));
    let negative = cart.add_line(NewLine::new(meal(-100)));

    assert_eq!(free.error(), Some(&CartError::InvalidPrice(0)));
    assert_eq!(negative.error(), Some(&CartError::InvalidPrice(-100)));
    assert!(cart.is_empty());
}
