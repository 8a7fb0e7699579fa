use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{FieldErrors, Result};
use crate::services::cart_service;
use crate::state::AppState;
use crate::validation;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

impl AddToCartPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::min_i32(&mut errors, "quantity", self.quantity, 1);
    errors.into_result()
  }
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemPayload {
  pub quantity: i32,
}

impl UpdateCartItemPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::min_i32(&mut errors, "quantity", self.quantity, 1);
    errors.into_result()
  }
}

/// The authenticated user's cart, created lazily on first access.
#[instrument(name = "handler::show_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn show_cart_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> Result<HttpResponse> {
  let view = cart_service::cart_view(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id(), product_id = %payload.product_id, quantity = payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddToCartPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  payload.validate()?;
  let view = cart_service::add_item(&app_state.db_pool, auth_user.user_id(), payload.product_id, payload.quantity).await?;
  info!(item_id = %view.item.id, "Item added to cart.");
  Ok(HttpResponse::Created().json(view))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user_id(), item_id = %path.as_ref())
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateCartItemPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  payload.validate()?;
  let view = cart_service::update_item(&app_state.db_pool, auth_user.user_id(), path.into_inner(), payload.quantity).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id(), item_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  cart_service::remove_item(&app_state.db_pool, auth_user.user_id(), path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
