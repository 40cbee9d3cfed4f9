//! Cart Summary
//!
//! Renders a cart as a table of lines and add-ons followed by the order totals.

use std::io;

use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::cart::{
    Cart,
    line::{CartLine, SelectedAddon},
};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error
    #[error("Failed to write summary: {0}")]
    Io(#[from] io::Error),
}

/// Printable view of a cart.
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'c, 'a> {
    cart: &'c Cart<'a>,
}

impl<'c, 'a> CartSummary<'c, 'a> {
    /// Summarise a cart.
    pub fn new(cart: &'c Cart<'a>) -> Self {
        Self { cart }
    }

    /// Write the lines table and totals.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Io`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        if self.cart.is_empty() {
            writeln!(out, "\nCart is empty")?;
        } else {
            let mut builder = Builder::default();
            let mut line_boundary_rows: SmallVec<[usize; 16]> = smallvec![];

            builder.push_record(["", "Meal", "Qty", "Unit Price", "Total", "Notes"]);

            let mut row = 1;

            for (idx, line) in self.cart.iter().enumerate() {
                line_boundary_rows.push(row);

                builder.push_record(line_record(idx, line));
                row += 1;

                for addon in line.addons() {
                    builder.push_record(addon_record(addon));
                    row += 1;
                }
            }

            let mut table = builder.build();
            let mut theme = Theme::from(Style::modern_rounded());
            let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

            theme.remove_horizontal_lines();
            theme.insert_horizontal_line(1, separator);

            for &row in &line_boundary_rows {
                if row > 1 {
                    theme.insert_horizontal_line(row, separator);
                }
            }

            table.with(theme);
            table.modify(Rows::first(), Alignment::center());
            table.modify(Columns::new(2..5), Alignment::right());

            writeln!(out, "\n{table}")?;
        }

        self.write_totals(&mut out)
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let metadata = self.cart.metadata();

        let rows = [
            ("Subtotal:", metadata.subtotal().to_string()),
            ("Tax:", metadata.tax_amount().to_string()),
            ("Delivery:", metadata.delivery_fee().to_string()),
            ("Discount:", format!("-{}", metadata.discount_amount())),
            ("Total:", metadata.total_amount().to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.chars().count()).max().unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        if !metadata.client_instructions().is_empty() {
            writeln!(out, "\n Instructions: {}", metadata.client_instructions())?;
        }

        writeln!(out)?;

        Ok(())
    }
}

fn line_record(idx: usize, line: &CartLine<'_>) -> [String; 6] {
    [
        format!("#{}", idx + 1),
        line.name().to_string(),
        line.quantity().to_string(),
        line.unit_price().to_string(),
        line.total_price().to_string(),
        line.notes().to_string(),
    ]
}

fn addon_record(addon: &SelectedAddon<'_>) -> [String; 6] {
    [
        String::new(),
        format!("  + {} ({})", addon.name(), addon.category()),
        addon.quantity().to_string(),
        addon.unit_price().to_string(),
        addon.total_price().to_string(),
        String::new(),
    ]
}
