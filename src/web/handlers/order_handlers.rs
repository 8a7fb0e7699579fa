use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::services::order_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct UpdateOrderPayload {
  pub status: String,
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> Result<HttpResponse> {
  let orders = order_service::list_orders(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(orders))
}

/// Converts the caller's cart into a new pending order.
#[instrument(name = "handler::place_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn place_order_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> Result<HttpResponse> {
  let view = order_service::place_order(&app_state.db_pool, auth_user.user_id()).await?;
  info!(order_id = %view.order.id, "Order placed from cart.");
  Ok(HttpResponse::Created().json(view))
}

#[instrument(
  name = "handler::get_order",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id(), order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let view = order_service::get_order(&app_state.db_pool, auth_user.user_id(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
  name = "handler::update_order",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user_id(), order_id = %path.as_ref(), status = %payload.status)
)]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateOrderPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let view =
    order_service::update_status(&app_state.db_pool, auth_user.user_id(), path.into_inner(), &payload.status).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
  name = "handler::delete_order",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id(), order_id = %path.as_ref())
)]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  order_service::delete_order(&app_state.db_pool, auth_user.user_id(), path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
