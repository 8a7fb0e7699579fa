//! Cart and order invariants against a real Postgres instance.
//!
//! These tests need a database; set `TEST_DATABASE_URL` to run them. Without
//! it each test logs a skip notice and passes vacuously.

use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

use craftroots::errors::AppError;
use craftroots::models::OrderStatus;
use craftroots::services::{cart_service, order_service};

async fn test_pool() -> Option<PgPool> {
  let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
    eprintln!("TEST_DATABASE_URL not set; skipping database test.");
    return None;
  };
  let pool = PgPool::connect(&url).await.expect("connect to test database");
  sqlx::raw_sql(include_str!("../schema.sql"))
    .execute(&pool)
    .await
    .expect("apply schema");
  Some(pool)
}

async fn create_user(pool: &PgPool) -> Uuid {
  let id = Uuid::new_v4();
  sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, 'x')")
    .bind(id)
    .bind(format!("user-{id}@example.com"))
    .execute(pool)
    .await
    .expect("insert user");
  id
}

async fn create_product(pool: &PgPool, price_cents: i64) -> Uuid {
  let id = Uuid::new_v4();
  sqlx::query(
    "INSERT INTO products (id, name, slug, price_cents, stock_quantity) VALUES ($1, $2, $3, $4, 10)",
  )
  .bind(id)
  .bind(format!("Product {id}"))
  .bind(format!("product-{id}"))
  .bind(price_cents)
  .execute(pool)
  .await
  .expect("insert product");
  id
}

#[tokio::test]
#[serial]
async fn placing_order_snapshots_prices_and_clears_cart() {
  let Some(pool) = test_pool().await else { return };
  let user_id = create_user(&pool).await;
  let product_a = create_product(&pool, 1000).await; // 10.00
  let product_b = create_product(&pool, 550).await; // 5.50

  cart_service::add_item(&pool, user_id, product_a, 2).await.unwrap();
  cart_service::add_item(&pool, user_id, product_b, 1).await.unwrap();

  let view = order_service::place_order(&pool, user_id).await.unwrap();
  assert_eq!(view.order.total_amount_cents, 2550);
  assert_eq!(view.order.status, OrderStatus::Pending);
  assert_eq!(view.order_items.len(), 2);
  let total_from_items: i64 = view
    .order_items
    .iter()
    .map(|oi| oi.item.price_cents * i64::from(oi.item.quantity))
    .sum();
  assert_eq!(view.order.total_amount_cents, total_from_items);

  // The cart no longer exists after conversion.
  let cart: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM carts WHERE user_id = $1")
    .bind(user_id)
    .fetch_optional(&pool)
    .await
    .unwrap();
  assert!(cart.is_none(), "cart should be deleted after order placement");

  // A later price change must not leak into the stored order.
  sqlx::query("UPDATE products SET price_cents = 1200 WHERE id = $1")
    .bind(product_a)
    .execute(&pool)
    .await
    .unwrap();
  let refetched = order_service::get_order(&pool, user_id, view.order.id).await.unwrap();
  assert_eq!(refetched.order.total_amount_cents, 2550);
  let line_a = refetched
    .order_items
    .iter()
    .find(|oi| oi.item.product_id == product_a)
    .unwrap();
  assert_eq!(line_a.item.price_cents, 1000);
}

#[tokio::test]
#[serial]
async fn empty_cart_places_no_order() {
  let Some(pool) = test_pool().await else { return };
  let user_id = create_user(&pool).await;

  // No cart at all.
  assert!(matches!(
    order_service::place_order(&pool, user_id).await,
    Err(AppError::EmptyCart)
  ));

  // A cart with no lines behaves the same.
  cart_service::fetch_or_create_cart(&pool, user_id).await.unwrap();
  assert!(matches!(
    order_service::place_order(&pool, user_id).await,
    Err(AppError::EmptyCart)
  ));

  let orders = order_service::list_orders(&pool, user_id).await.unwrap();
  assert!(orders.is_empty(), "no order should exist after failed conversions");
}

#[tokio::test]
#[serial]
async fn adding_same_product_twice_merges_lines() {
  let Some(pool) = test_pool().await else { return };
  let user_id = create_user(&pool).await;
  let product_id = create_product(&pool, 2000).await;

  cart_service::add_item(&pool, user_id, product_id, 2).await.unwrap();
  let merged = cart_service::add_item(&pool, user_id, product_id, 3).await.unwrap();
  assert_eq!(merged.item.quantity, 5);

  let view = cart_service::cart_view(&pool, user_id).await.unwrap();
  assert_eq!(view.cart_items.len(), 1, "one row per (cart, product)");
  assert_eq!(view.cart_items[0].item.quantity, 5);
}

#[tokio::test]
#[serial]
async fn cart_item_updates_are_owner_scoped() {
  let Some(pool) = test_pool().await else { return };
  let owner = create_user(&pool).await;
  let intruder = create_user(&pool).await;
  let product_id = create_product(&pool, 1500).await;

  let line = cart_service::add_item(&pool, owner, product_id, 1).await.unwrap();

  assert!(matches!(
    cart_service::update_item(&pool, intruder, line.item.id, 4).await,
    Err(AppError::Forbidden(_))
  ));
  assert!(matches!(
    cart_service::remove_item(&pool, intruder, line.item.id).await,
    Err(AppError::Forbidden(_))
  ));

  // The owner still can.
  let updated = cart_service::update_item(&pool, owner, line.item.id, 4).await.unwrap();
  assert_eq!(updated.item.quantity, 4);
  cart_service::remove_item(&pool, owner, line.item.id).await.unwrap();
  assert!(matches!(
    cart_service::update_item(&pool, owner, line.item.id, 1).await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
#[serial]
async fn orders_are_owner_scoped() {
  let Some(pool) = test_pool().await else { return };
  let owner = create_user(&pool).await;
  let intruder = create_user(&pool).await;
  let product_id = create_product(&pool, 3000).await;

  cart_service::add_item(&pool, owner, product_id, 1).await.unwrap();
  let placed = order_service::place_order(&pool, owner).await.unwrap();

  assert!(matches!(
    order_service::get_order(&pool, intruder, placed.order.id).await,
    Err(AppError::Forbidden(_))
  ));
  assert!(matches!(
    order_service::update_status(&pool, intruder, placed.order.id, "cancelled").await,
    Err(AppError::Forbidden(_))
  ));
  assert!(matches!(
    order_service::delete_order(&pool, intruder, placed.order.id).await,
    Err(AppError::Forbidden(_))
  ));

  // Ownership outranks payload validation: a non-owner with a bad status
  // still gets the ownership failure, not the field error.
  assert!(matches!(
    order_service::update_status(&pool, intruder, placed.order.id, "refunded").await,
    Err(AppError::Forbidden(_))
  ));
  assert!(matches!(
    order_service::update_status(&pool, owner, placed.order.id, "refunded").await,
    Err(AppError::Validation(_))
  ));

  // Any status in the enumeration is accepted at any time.
  let shipped = order_service::update_status(&pool, owner, placed.order.id, "shipped").await.unwrap();
  assert_eq!(shipped.order.status, OrderStatus::Shipped);
  let back = order_service::update_status(&pool, owner, placed.order.id, "pending").await.unwrap();
  assert_eq!(back.order.status, OrderStatus::Pending);
}

#[tokio::test]
#[serial]
async fn stock_is_not_decremented_on_placement() {
  let Some(pool) = test_pool().await else { return };
  let user_id = create_user(&pool).await;
  let product_id = create_product(&pool, 1000).await;

  cart_service::add_item(&pool, user_id, product_id, 3).await.unwrap();
  order_service::place_order(&pool, user_id).await.unwrap();

  let (stock,): (i32,) = sqlx::query_as("SELECT stock_quantity FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_one(&pool)
    .await
    .unwrap();
  assert_eq!(stock, 10, "placement leaves stock untouched");
}
