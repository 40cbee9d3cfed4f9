//! Cart Example
//!
//! Customises a salad and a fruit bowl, fills a cart, prints a summary and submits the order to
//! an in-process order service.
//!
//! Use `-f` to load a fixture set by name
//! Use `-a` to list allergies to warn about (e.g. `-a nuts,dairy`)
//! Use `-d` to apply a discount (e.g. `-d "2.50 GBP"`)
//! Use `-o` to write the order payload JSON to `target/orders`

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use jiff::{Timestamp, Zoned};
use mealcart::{orders::payable, prelude::*, utils::ExampleCartArgs};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Accepts every order.
#[derive(Debug)]
struct AcceptingOrderService;

impl OrderService for AcceptingOrderService {
    fn create_order(&self, payload: &OrderPayload) -> Result<OrderRecord, OrderServiceError> {
        Ok(OrderRecord {
            id: Uuid::now_v7(),
            status: OrderStatus::Confirmed,
            total_amount: payload.total_amount,
            created_at: Timestamp::now(),
        })
    }
}

/// Cart Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mealcart=info")),
        )
        .init();

    let args = ExampleCartArgs::parse();
    let fixture = Fixture::from_set(&args.fixture)?;
    let catalog = fixture.catalog();
    let mut cart = fixture.cart();

    let salad = customise(
        catalog,
        fixture.allowances(),
        "garden_salad",
        &[
            ("romaine", 1),
            ("spinach", 1),
            ("cucumber", 2),
            ("grilled_chicken", 1),
            ("almonds", 2),
            ("ranch", 1),
        ],
    )?;

    cart.add_line(salad.with_notes("dressing on the side"))
        .into_result()?;

    let fruit = customise(
        catalog,
        fixture.allowances(),
        "fruit_bowl",
        &[("mango", 3), ("strawberries", 2), ("honey", 1)],
    )?;

    cart.add_line(fruit).into_result()?;

    let caesar = catalog.meal("caesar")?;

    cart.add_line(NewLine::new(MealRef::from(caesar)).with_quantity(2))
        .into_result()?;

    if let Some(discount) = args.discount.as_deref() {
        cart.apply_discount(parse_price(discount)?)?;
    }

    cart.set_client_instructions("Call on arrival");

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    CartSummary::new(&cart).write_to(&mut handle)?;

    if !args.allergies.is_empty() {
        let allergies: Vec<&str> = args.allergies.iter().map(String::as_str).collect();
        let filter = AllergenFilter::new(AllergenSet::from_strs(&allergies), catalog);

        for warning in allergy_warnings(&cart, &filter) {
            println!("Allergy warning: {} (line {})", warning.name, warning.line_id);
        }
    }

    let details = OrderDetails {
        delivery_address: "12 Palm Street".to_string(),
        contact_phone: "+971500000000".to_string(),
        payment_method: PaymentMethod::CashOnDelivery,
        delivery_date: Zoned::now().date().tomorrow()?,
    };

    let payload = OrderPayload::from_cart(&cart, &details);

    if let Some(out) = args.out.as_deref() {
        let output_dir = PathBuf::from("target").join("orders");
        fs::create_dir_all(&output_dir)?;

        fs::write(output_dir.join(out), payload.to_json()?)?;
    } else {
        println!("{}", payload.to_json()?);
    }

    let due = payable(&cart);
    let record = checkout(&mut cart, &details, &AcceptingOrderService)?;

    println!(
        "\nOrder {} is {} ({due} charged); cart now has {} lines",
        record.id,
        record.status,
        cart.len()
    );

    Ok(())
}

/// Build a cart line for a customised meal from `(add-on id, quantity)` pairs.
#[expect(clippy::print_stdout, reason = "Example code")]
fn customise<'a>(
    catalog: &Catalog<'a>,
    allowances: &AllowanceConfig,
    meal_id: &str,
    choices: &[(&str, u32)],
) -> Result<NewLine<'a>> {
    let meal = catalog.meal(meal_id)?;
    let table = allowances.table(meal.template);
    let mut selection = Selection::new();

    for &(addon_id, quantity) in choices {
        let addon = catalog.addon(addon_id)?;

        selection.set_quantity(addon, quantity);
    }

    let breakdown = price_breakdown(meal.base_price, selection.entries(), table)
        .with_context(|| format!("pricing {meal_id}"))?;

    for charge in &breakdown.charges {
        println!(
            "{meal_id}: {} {}/{} free, {} charged for {}",
            charge.category, charge.free, charge.selected, charge.charged_units, charge.extra
        );
    }

    Ok(NewLine::new(MealRef::from(meal))
        .with_price(breakdown.total)
        .with_addons(selection.entries().iter().map(NewAddon::from)))
}
