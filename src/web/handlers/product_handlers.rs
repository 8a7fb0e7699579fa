use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors, Result};
use crate::models::Product;
use crate::state::AppState;
use crate::validation;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  /// Category slug filter.
  pub category: Option<String>,
  pub featured: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct CreateProductPayload {
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub stock_quantity: i32,
  pub image_url: Option<String>,
  pub handmade_by: Option<String>,
  #[serde(default)]
  pub featured: bool,
  pub category_id: Option<Uuid>,
}

impl CreateProductPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::required(&mut errors, "name", &self.name);
    validation::max_len(&mut errors, "name", &self.name, 255);
    validation::required(&mut errors, "slug", &self.slug);
    validation::max_len(&mut errors, "slug", &self.slug, 255);
    validation::min_i64(&mut errors, "price_cents", self.price_cents, 0);
    validation::min_i32(&mut errors, "stock_quantity", self.stock_quantity, 0);
    errors.into_result()
  }
}

#[derive(Deserialize, Debug)]
pub struct UpdateProductPayload {
  pub name: Option<String>,
  pub slug: Option<String>,
  // Nullable columns: an explicit JSON null clears the stored value.
  #[serde(default, deserialize_with = "super::double_option")]
  pub description: Option<Option<String>>,
  pub price_cents: Option<i64>,
  pub stock_quantity: Option<i32>,
  #[serde(default, deserialize_with = "super::double_option")]
  pub image_url: Option<Option<String>>,
  #[serde(default, deserialize_with = "super::double_option")]
  pub handmade_by: Option<Option<String>>,
  pub featured: Option<bool>,
  #[serde(default, deserialize_with = "super::double_option")]
  pub category_id: Option<Option<Uuid>>,
}

impl UpdateProductPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    if let Some(name) = &self.name {
      validation::required(&mut errors, "name", name);
      validation::max_len(&mut errors, "name", name, 255);
    }
    if let Some(slug) = &self.slug {
      validation::required(&mut errors, "slug", slug);
      validation::max_len(&mut errors, "slug", slug, 255);
    }
    if let Some(price_cents) = self.price_cents {
      validation::min_i64(&mut errors, "price_cents", price_cents, 0);
    }
    if let Some(stock_quantity) = self.stock_quantity {
      validation::min_i32(&mut errors, "stock_quantity", stock_quantity, 0);
    }
    errors.into_result()
  }
}

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price_cents, stock_quantity, image_url, \
                               handmade_by, featured, category_id, created_at, updated_at";

async fn slug_taken(app_state: &AppState, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
  let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE slug = $1")
    .bind(slug)
    .fetch_optional(&app_state.db_pool)
    .await?;
  Ok(matches!(existing, Some((id,)) if Some(id) != exclude))
}

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse> {
  let products: Vec<Product> = sqlx::query_as(
    "SELECT p.id, p.name, p.slug, p.description, p.price_cents, p.stock_quantity, p.image_url, \
            p.handmade_by, p.featured, p.category_id, p.created_at, p.updated_at \
     FROM products p \
     LEFT JOIN categories c ON c.id = p.category_id \
     WHERE ($1::text IS NULL OR c.slug = $1) \
       AND ($2::boolean IS NULL OR p.featured = $2) \
     ORDER BY p.name ASC",
  )
  .bind(&query.category)
  .bind(query.featured)
  .fetch_all(&app_state.db_pool)
  .await?;

  info!("Fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let product: Option<Product> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;

  match product {
    Some(product) => Ok(HttpResponse::Ok().json(product)),
    None => {
      warn!("Product {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {product_id} not found.")))
    }
  }
}

#[instrument(name = "handler::create_product", skip(app_state, payload), fields(slug = %payload.slug))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateProductPayload>,
) -> Result<HttpResponse> {
  payload.validate()?;
  if slug_taken(&app_state, &payload.slug, None).await? {
    return Err(AppError::invalid_field("slug", "has already been taken"));
  }

  let product: Product = sqlx::query_as(&format!(
    "INSERT INTO products \
     (id, name, slug, description, price_cents, stock_quantity, image_url, handmade_by, featured, category_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
     RETURNING {PRODUCT_COLUMNS}"
  ))
  .bind(Uuid::new_v4())
  .bind(&payload.name)
  .bind(&payload.slug)
  .bind(&payload.description)
  .bind(payload.price_cents)
  .bind(payload.stock_quantity)
  .bind(&payload.image_url)
  .bind(&payload.handmade_by)
  .bind(payload.featured)
  .bind(payload.category_id)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateProductPayload>,
) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  payload.validate()?;
  if let Some(slug) = &payload.slug {
    if slug_taken(&app_state, slug, Some(product_id)).await? {
      return Err(AppError::invalid_field("slug", "has already been taken"));
    }
  }

  let current: Option<Product> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let Some(mut product) = current else {
    return Err(AppError::NotFound(format!("Product with ID {product_id} not found.")));
  };

  if let Some(name) = &payload.name {
    product.name = name.clone();
  }
  if let Some(slug) = &payload.slug {
    product.slug = slug.clone();
  }
  if let Some(description) = &payload.description {
    product.description = description.clone();
  }
  if let Some(price_cents) = payload.price_cents {
    product.price_cents = price_cents;
  }
  if let Some(stock_quantity) = payload.stock_quantity {
    product.stock_quantity = stock_quantity;
  }
  if let Some(image_url) = &payload.image_url {
    product.image_url = image_url.clone();
  }
  if let Some(handmade_by) = &payload.handmade_by {
    product.handmade_by = handmade_by.clone();
  }
  if let Some(featured) = payload.featured {
    product.featured = featured;
  }
  if let Some(category_id) = payload.category_id {
    product.category_id = category_id;
  }

  let product: Product = sqlx::query_as(&format!(
    "UPDATE products SET \
       name = $2, slug = $3, description = $4, price_cents = $5, stock_quantity = $6, \
       image_url = $7, handmade_by = $8, featured = $9, category_id = $10, updated_at = now() \
     WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
  ))
  .bind(product_id)
  .bind(&product.name)
  .bind(&product.slug)
  .bind(&product.description)
  .bind(product.price_cents)
  .bind(product.stock_quantity)
  .bind(&product.image_url)
  .bind(&product.handmade_by)
  .bind(product.featured)
  .bind(product.category_id)
  .fetch_one(&app_state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let result = sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(product_id)
    .execute(&app_state.db_pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Product with ID {product_id} not found.")));
  }
  Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn update_payload_distinguishes_null_from_absent() {
    let payload: UpdateProductPayload = serde_json::from_str(r#"{"name": "Woven Basket"}"#).unwrap();
    assert_eq!(payload.image_url, None);
    assert_eq!(payload.category_id, None);

    let payload: UpdateProductPayload =
      serde_json::from_str(r#"{"image_url": null, "category_id": null}"#).unwrap();
    assert_eq!(payload.image_url, Some(None));
    assert_eq!(payload.category_id, Some(None));

    let payload: UpdateProductPayload = serde_json::from_str(r#"{"image_url": "/img/basket.jpg"}"#).unwrap();
    assert_eq!(payload.image_url, Some(Some("/img/basket.jpg".into())));
  }

  #[test]
  fn negative_price_is_rejected() {
    let payload: UpdateProductPayload = serde_json::from_str(r#"{"price_cents": -1}"#).unwrap();
    match payload.validate() {
      Err(AppError::Validation(errors)) => assert!(errors.contains("price_cents")),
      other => panic!("expected validation error, got {other:?}"),
    }
  }
}
