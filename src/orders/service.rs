//! Order service.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::orders::payload::OrderPayload;

/// Errors returned by an order service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderServiceError {
    /// The service refused the order.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("order service unavailable: {0}")]
    Unavailable(String),
}

/// Status string that is not a known [`OrderStatus`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

/// Lifecycle of a persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet accepted
    Pending,

    /// Accepted by the kitchen
    Confirmed,

    /// Being prepared
    Preparing,

    /// With the courier
    OutForDelivery,

    /// Handed to the customer
    Delivered,

    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the order can still change status.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// An order as persisted by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Server-assigned id
    pub id: Uuid,

    /// Current status
    pub status: OrderStatus,

    /// Amount charged
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// When the order was created
    pub created_at: Timestamp,
}

/// Persists orders.
#[automock]
pub trait OrderService: Send + Sync {
    /// Create an order from a payload.
    fn create_order(&self, payload: &OrderPayload) -> Result<OrderRecord, OrderServiceError>;
}
