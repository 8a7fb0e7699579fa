use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::product::Product;

/// One per user, created lazily on first cart access.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A line in a cart. The (cart_id, product_id) pair is unique; adding the
/// same product again increments `quantity` instead of inserting a new row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Cart line with its product embedded, as the frontend consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: Product,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
  #[serde(flatten)]
  pub cart: Cart,
  pub cart_items: Vec<CartItemView>,
}
