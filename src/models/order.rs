use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

use crate::models::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Completed,
  Shipped,
  Cancelled,
}

impl OrderStatus {
  pub const NAMES: [&'static str; 5] = ["pending", "processing", "completed", "shipped", "cancelled"];

  /// No transition graph: any member of the enumeration is settable at any
  /// time, only membership is checked.
  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "pending" => Some(Self::Pending),
      "processing" => Some(Self::Processing),
      "completed" => Some(Self::Completed),
      "shipped" => Some(Self::Shipped),
      "cancelled" => Some(Self::Cancelled),
      _ => None,
    }
  }
}

/// Immutable snapshot of a placed cart; only `status` changes afterwards.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub status: OrderStatus,
  pub total_amount_cents: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Line item frozen at conversion time; `price_cents` is the product price
/// when the order was placed, never the live price.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
  #[serde(flatten)]
  pub item: OrderItem,
  pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
  #[serde(flatten)]
  pub order: Order,
  pub order_items: Vec<OrderItemView>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_accepts_every_listed_status() {
    for name in OrderStatus::NAMES {
      assert!(OrderStatus::parse(name).is_some(), "{name} should parse");
    }
    assert!(OrderStatus::parse("refunded").is_none());
    assert!(OrderStatus::parse("Pending").is_none());
  }

  #[test]
  fn serializes_lowercase() {
    assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), "\"pending\"");
    assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
  }
}
