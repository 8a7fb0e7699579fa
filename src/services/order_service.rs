//! Order placement and retrieval.
//!
//! Placement converts the user's cart into an immutable order inside a single
//! transaction: any failure rolls back to no order and an untouched cart.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItem, OrderItemView, OrderStatus, OrderView, Product};

/// Sum of quantity × unit price over (price_cents, quantity) pairs.
pub fn total_cents(lines: &[(i64, i32)]) -> i64 {
  lines.iter().map(|&(price, qty)| price * i64::from(qty)).sum()
}

/// Converts the user's cart into a pending order.
///
/// Prices are captured from the products at this instant; the cart and its
/// lines are deleted in the same transaction. An empty or missing cart fails
/// with [`AppError::EmptyCart`] before anything is written.
#[instrument(name = "order_service::place_order", skip(pool), fields(user_id = %user_id))]
pub async fn place_order(pool: &PgPool, user_id: Uuid) -> Result<OrderView> {
  let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

  let cart_id: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM carts WHERE user_id = $1")
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
  let Some((cart_id,)) = cart_id else {
    return Err(AppError::EmptyCart);
  };

  // Each line with the product's current price; this is the snapshot.
  let lines: Vec<(Uuid, i32, i64)> = sqlx::query_as(
    "SELECT ci.product_id, ci.quantity, p.price_cents \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id \
     WHERE ci.cart_id = $1 ORDER BY ci.created_at ASC",
  )
  .bind(cart_id)
  .fetch_all(&mut *tx)
  .await?;
  if lines.is_empty() {
    return Err(AppError::EmptyCart);
  }

  let total: i64 = total_cents(&lines.iter().map(|&(_, qty, price)| (price, qty)).collect::<Vec<_>>());

  let order: Order = sqlx::query_as(
    "INSERT INTO orders (id, user_id, status, total_amount_cents) VALUES ($1, $2, $3, $4) \
     RETURNING id, user_id, status, total_amount_cents, created_at, updated_at",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .bind(OrderStatus::Pending)
  .bind(total)
  .fetch_one(&mut *tx)
  .await?;

  let mut items = Vec::with_capacity(lines.len());
  for (product_id, quantity, price_cents) in lines {
    let item: OrderItem = sqlx::query_as(
      "INSERT INTO order_items (id, order_id, product_id, quantity, price_cents) \
       VALUES ($1, $2, $3, $4, $5) \
       RETURNING id, order_id, product_id, quantity, price_cents",
    )
    .bind(Uuid::new_v4())
    .bind(order.id)
    .bind(product_id)
    .bind(quantity)
    .bind(price_cents)
    .fetch_one(&mut *tx)
    .await?;
    items.push(item);
  }

  sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
    .bind(cart_id)
    .execute(&mut *tx)
    .await?;
  sqlx::query("DELETE FROM carts WHERE id = $1")
    .bind(cart_id)
    .execute(&mut *tx)
    .await?;

  tx.commit().await?;
  info!(order_id = %order.id, total_cents = order.total_amount_cents, "Order placed, cart cleared.");

  let order_items = attach_products(pool, items).await?;
  Ok(OrderView { order, order_items })
}

/// All of the caller's orders, newest first, with items embedded.
#[instrument(name = "order_service::list_orders", skip(pool), fields(user_id = %user_id))]
pub async fn list_orders(pool: &PgPool, user_id: Uuid) -> Result<Vec<OrderView>> {
  let orders: Vec<Order> = sqlx::query_as(
    "SELECT id, user_id, status, total_amount_cents, created_at, updated_at \
     FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let mut views = Vec::with_capacity(orders.len());
  for order in orders {
    let items = items_for(pool, order.id).await?;
    let order_items = attach_products(pool, items).await?;
    views.push(OrderView { order, order_items });
  }
  Ok(views)
}

/// One order, 404 when absent, 403 when owned by another user.
#[instrument(name = "order_service::get_order", skip(pool), fields(user_id = %user_id, order_id = %order_id))]
pub async fn get_order(pool: &PgPool, user_id: Uuid, order_id: Uuid) -> Result<OrderView> {
  let order = owned_order(pool, user_id, order_id).await?;
  let items = items_for(pool, order.id).await?;
  let order_items = attach_products(pool, items).await?;
  Ok(OrderView { order, order_items })
}

/// Sets the status. Any member of the enumeration is accepted at any time.
/// Ownership is resolved before the status string is validated, so a
/// non-owner gets 403 even with a bad payload.
#[instrument(name = "order_service::update_status", skip(pool), fields(user_id = %user_id, order_id = %order_id, status))]
pub async fn update_status(pool: &PgPool, user_id: Uuid, order_id: Uuid, status: &str) -> Result<OrderView> {
  owned_order(pool, user_id, order_id).await?;

  let Some(status) = OrderStatus::parse(status) else {
    return Err(AppError::invalid_field(
      "status",
      format!("must be one of: {}", OrderStatus::NAMES.join(", ")),
    ));
  };

  let order: Order = sqlx::query_as(
    "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 \
     RETURNING id, user_id, status, total_amount_cents, created_at, updated_at",
  )
  .bind(order_id)
  .bind(status)
  .fetch_one(pool)
  .await?;

  let items = items_for(pool, order.id).await?;
  let order_items = attach_products(pool, items).await?;
  Ok(OrderView { order, order_items })
}

#[instrument(name = "order_service::delete_order", skip(pool), fields(user_id = %user_id, order_id = %order_id))]
pub async fn delete_order(pool: &PgPool, user_id: Uuid, order_id: Uuid) -> Result<()> {
  owned_order(pool, user_id, order_id).await?;
  sqlx::query("DELETE FROM orders WHERE id = $1")
    .bind(order_id)
    .execute(pool)
    .await?;
  Ok(())
}

async fn owned_order(pool: &PgPool, user_id: Uuid, order_id: Uuid) -> Result<Order> {
  let order: Option<Order> = sqlx::query_as(
    "SELECT id, user_id, status, total_amount_cents, created_at, updated_at FROM orders WHERE id = $1",
  )
  .bind(order_id)
  .fetch_optional(pool)
  .await?;
  let Some(order) = order else {
    return Err(AppError::NotFound(format!("Order {order_id} not found.")));
  };
  if order.user_id != user_id {
    return Err(AppError::Forbidden("order belongs to another user".to_string()));
  }
  Ok(order)
}

async fn items_for(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>> {
  let items: Vec<OrderItem> = sqlx::query_as(
    "SELECT id, order_id, product_id, quantity, price_cents FROM order_items WHERE order_id = $1",
  )
  .bind(order_id)
  .fetch_all(pool)
  .await?;
  Ok(items)
}

async fn attach_products(pool: &PgPool, items: Vec<OrderItem>) -> Result<Vec<OrderItemView>> {
  let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
  let products: Vec<Product> = sqlx::query_as(
    "SELECT id, name, slug, description, price_cents, stock_quantity, image_url, handmade_by, \
            featured, category_id, created_at, updated_at \
     FROM products WHERE id = ANY($1)",
  )
  .bind(&product_ids)
  .fetch_all(pool)
  .await?;

  Ok(
    items
      .into_iter()
      .map(|item| {
        let product = products.iter().find(|p| p.id == item.product_id).cloned();
        OrderItemView { item, product }
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_matches_item_sum() {
    // Product A at 10.00 x2, Product B at 5.50 x1 => 25.50
    assert_eq!(total_cents(&[(1000, 2), (550, 1)]), 2550);
  }

  #[test]
  fn total_of_no_lines_is_zero() {
    assert_eq!(total_cents(&[]), 0);
  }

  #[test]
  fn total_survives_large_quantities() {
    assert_eq!(total_cents(&[(99_99, 100_000)]), 999_900_000);
  }
}
