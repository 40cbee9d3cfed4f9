//! Cart Configuration
//!
//! Currency, delivery fee and tax rate for new carts. Amounts are written as `"15.00 GBP"`
//! strings and tax rates as `"5%"` or `"0.05"`.

use std::{fs, path::Path, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{AED, Currency, EUR, GBP, SAR, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::pricing::money_from_decimal;

/// Errors related to loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An amount is in a different currency to the configuration (expected, found)
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Settings applied to every new cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig<'a> {
    /// Cart-wide currency
    pub currency: &'static Currency,

    /// Delivery fee a new or cleared cart starts with
    pub delivery_fee: Money<'a, Currency>,

    /// Tax rate applied to the subtotal
    pub tax_rate: Percentage,
}

impl CartConfig<'_> {
    /// Default configuration for a currency: no delivery fee and no tax.
    #[must_use]
    pub fn for_currency(currency: &'static Currency) -> Self {
        Self {
            currency,
            delivery_fee: Money::from_minor(0, currency),
            tax_rate: Percentage::from(Decimal::ZERO),
        }
    }

    /// Parse configuration from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or an amount, rate or currency is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let raw: CartConfigFixture = serde_norway::from_str(yaml)?;

        raw.try_into()
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}

impl Default for CartConfig<'_> {
    fn default() -> Self {
        Self::for_currency(GBP)
    }
}

impl FromStr for CartConfig<'_> {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml_str(s)
    }
}

/// Cart configuration as written in YAML
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartConfigFixture {
    /// ISO currency code, e.g. "GBP"
    pub currency: Option<String>,

    /// Delivery fee, e.g. "15.00 GBP"
    pub delivery_fee: Option<String>,

    /// Tax rate, e.g. "5%" or "0.05"
    pub tax_rate: Option<String>,
}

impl TryFrom<CartConfigFixture> for CartConfig<'_> {
    type Error = ConfigError;

    fn try_from(fixture: CartConfigFixture) -> Result<Self, Self::Error> {
        let delivery_fee = fixture.delivery_fee.as_deref().map(parse_price).transpose()?;

        let currency = match (fixture.currency.as_deref(), delivery_fee) {
            (Some(code), Some(fee)) => {
                let currency = parse_currency(code)?;

                if fee.currency() != currency {
                    return Err(ConfigError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        fee.currency().iso_alpha_code.to_string(),
                    ));
                }

                currency
            }
            (Some(code), None) => parse_currency(code)?,
            (None, Some(fee)) => fee.currency(),
            (None, None) => GBP,
        };

        let mut config = CartConfig::for_currency(currency);

        if let Some(fee) = delivery_fee {
            config.delivery_fee = fee;
        }

        if let Some(rate) = fixture.tax_rate.as_deref() {
            config.tax_rate = parse_percentage(rate)?;
        }

        Ok(config)
    }
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for codes the storefront does not trade in.
pub fn parse_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "AED" => Ok(AED),
        "SAR" => Ok(SAR),
        other => Err(ConfigError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a price string (e.g. "2.99 GBP") into money.
///
/// Amounts with more than two decimal places are rounded half away from zero.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", the amount is not a
/// number, or the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, ConfigError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(code)?;

    money_from_decimal(amount, currency).map_err(|_err| ConfigError::InvalidPrice(s.to_string()))
}

/// Parse a percentage string (e.g. "15%" or "0.15") into a [`Percentage`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPercentage`] if the value cannot be parsed or is negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let value = match trimmed.strip_suffix('%') {
        Some(percent) => percent
            .trim()
            .parse::<Decimal>()
            .ok()
            .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED)),
        None => trimmed.parse::<Decimal>().ok(),
    }
    .filter(|value| !value.is_sign_negative())
    .ok_or_else(|| ConfigError::InvalidPercentage(s.to_string()))?;

    Ok(Percentage::from(value))
}
