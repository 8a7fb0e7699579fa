//! Per-user cart persistence: lazy cart creation, add-or-increment lines,
//! absolute quantity updates, and line removal with ownership checks.

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Cart, CartItem, CartItemView, CartView, Product};

/// Returns the user's cart, creating it on first access.
#[instrument(name = "cart_service::fetch_or_create_cart", skip(pool), fields(user_id = %user_id))]
pub async fn fetch_or_create_cart(pool: &PgPool, user_id: Uuid) -> Result<Cart> {
  // DO UPDATE on a no-op column makes RETURNING yield the existing row too.
  let cart: Cart = sqlx::query_as(
    "INSERT INTO carts (id, user_id) VALUES ($1, $2) \
     ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
     RETURNING id, user_id, created_at, updated_at",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .fetch_one(pool)
  .await?;
  Ok(cart)
}

/// The cart with each line's product embedded.
#[instrument(name = "cart_service::cart_view", skip(pool), fields(user_id = %user_id))]
pub async fn cart_view(pool: &PgPool, user_id: Uuid) -> Result<CartView> {
  let cart = fetch_or_create_cart(pool, user_id).await?;
  let items: Vec<CartItem> = sqlx::query_as(
    "SELECT id, cart_id, product_id, quantity, created_at, updated_at \
     FROM cart_items WHERE cart_id = $1 ORDER BY created_at ASC",
  )
  .bind(cart.id)
  .fetch_all(pool)
  .await?;

  let cart_items = attach_products(pool, items).await?;
  Ok(CartView { cart, cart_items })
}

/// Adds a product to the cart, or increments the existing line's quantity.
/// The upsert is atomic, so two concurrent adds both land.
#[instrument(name = "cart_service::add_item", skip(pool), fields(user_id = %user_id, product_id = %product_id))]
pub async fn add_item(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartItemView> {
  let product: Option<Product> = sqlx::query_as(
    "SELECT id, name, slug, description, price_cents, stock_quantity, image_url, handmade_by, \
            featured, category_id, created_at, updated_at \
     FROM products WHERE id = $1",
  )
  .bind(product_id)
  .fetch_optional(pool)
  .await?;
  let Some(product) = product else {
    return Err(AppError::invalid_field("product_id", "the selected product does not exist"));
  };

  let cart = fetch_or_create_cart(pool, user_id).await?;
  let item: CartItem = sqlx::query_as(
    "INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
     ON CONFLICT (cart_id, product_id) \
     DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = now() \
     RETURNING id, cart_id, product_id, quantity, created_at, updated_at",
  )
  .bind(Uuid::new_v4())
  .bind(cart.id)
  .bind(product_id)
  .bind(quantity)
  .fetch_one(pool)
  .await?;

  info!(item_id = %item.id, quantity = item.quantity, "Cart line upserted.");
  Ok(CartItemView { item, product })
}

/// Sets an absolute quantity on a line the user owns.
#[instrument(name = "cart_service::update_item", skip(pool), fields(user_id = %user_id, item_id = %item_id))]
pub async fn update_item(pool: &PgPool, user_id: Uuid, item_id: Uuid, quantity: i32) -> Result<CartItemView> {
  owned_item(pool, user_id, item_id).await?;

  let item: CartItem = sqlx::query_as(
    "UPDATE cart_items SET quantity = $2, updated_at = now() WHERE id = $1 \
     RETURNING id, cart_id, product_id, quantity, created_at, updated_at",
  )
  .bind(item_id)
  .bind(quantity)
  .fetch_one(pool)
  .await?;

  let product: Product = sqlx::query_as(
    "SELECT id, name, slug, description, price_cents, stock_quantity, image_url, handmade_by, \
            featured, category_id, created_at, updated_at \
     FROM products WHERE id = $1",
  )
  .bind(item.product_id)
  .fetch_one(pool)
  .await?;
  Ok(CartItemView { item, product })
}

/// Deletes a line the user owns.
#[instrument(name = "cart_service::remove_item", skip(pool), fields(user_id = %user_id, item_id = %item_id))]
pub async fn remove_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<()> {
  owned_item(pool, user_id, item_id).await?;
  sqlx::query("DELETE FROM cart_items WHERE id = $1")
    .bind(item_id)
    .execute(pool)
    .await?;
  Ok(())
}

/// 404 for a missing line, 403 when the owning cart belongs to someone else.
async fn owned_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<CartItem> {
  let item: Option<CartItem> = sqlx::query_as(
    "SELECT id, cart_id, product_id, quantity, created_at, updated_at FROM cart_items WHERE id = $1",
  )
  .bind(item_id)
  .fetch_optional(pool)
  .await?;
  let Some(item) = item else {
    return Err(AppError::NotFound(format!("Cart item {item_id} not found.")));
  };

  let (owner_id,): (Uuid,) = sqlx::query_as("SELECT user_id FROM carts WHERE id = $1")
    .bind(item.cart_id)
    .fetch_one(pool)
    .await?;
  if owner_id != user_id {
    return Err(AppError::Forbidden("cart item belongs to another user".to_string()));
  }
  Ok(item)
}

pub(crate) async fn attach_products(pool: &PgPool, items: Vec<CartItem>) -> Result<Vec<CartItemView>> {
  let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
  let products: Vec<Product> = sqlx::query_as(
    "SELECT id, name, slug, description, price_cents, stock_quantity, image_url, handmade_by, \
            featured, category_id, created_at, updated_at \
     FROM products WHERE id = ANY($1)",
  )
  .bind(&product_ids)
  .fetch_all(pool)
  .await?;

  items
    .into_iter()
    .map(|item| {
      let product = products
        .iter()
        .find(|p| p.id == item.product_id)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("product {} missing for cart item {}", item.product_id, item.id)))?;
      Ok(CartItemView { item, product })
    })
    .collect()
}
