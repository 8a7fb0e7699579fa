use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors, Result};
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;
use crate::validation;
use crate::web::extractors::{AuthenticatedUser, SESSION_COOKIE};

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub email: String,
  pub password: String,
}

impl RegisterPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::required(&mut errors, "email", &self.email);
    validation::email(&mut errors, "email", &self.email);
    validation::max_len(&mut errors, "email", &self.email, 255);
    validation::required(&mut errors, "password", &self.password);
    validation::min_len(&mut errors, "password", &self.password, 8);
    errors.into_result()
  }
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

fn session_cookie(token: String, ttl_hours: i64) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, token)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(CookieDuration::hours(ttl_hours))
    .finish()
}

#[instrument(name = "handler::register", skip(app_state, payload), fields(req_email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse> {
  payload.validate()?;

  let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
    .bind(&payload.email)
    .fetch_optional(&app_state.db_pool)
    .await?;
  if taken.is_some() {
    return Err(AppError::invalid_field("email", "has already been taken"));
  }

  let password_hash = auth_service::hash_password(&payload.password)?;
  let user: User = sqlx::query_as(
    "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) \
     RETURNING id, email, password_hash, created_at, updated_at",
  )
  .bind(Uuid::new_v4())
  .bind(&payload.email)
  .bind(&password_hash)
  .fetch_one(&app_state.db_pool)
  .await?;

  let session = auth_service::create_session(&app_state.db_pool, user.id, app_state.config.session_ttl_hours).await?;
  info!(user_id = %user.id, "User registered.");

  Ok(
    HttpResponse::Created()
      .cookie(session_cookie(session.token.clone(), app_state.config.session_ttl_hours))
      .json(json!({"user": user, "token": session.token})),
  )
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(req_email = %payload.email))]
pub async fn login_handler(app_state: web::Data<AppState>, payload: web::Json<LoginPayload>) -> Result<HttpResponse> {
  let user: Option<User> = sqlx::query_as(
    "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
  )
  .bind(&payload.email)
  .fetch_optional(&app_state.db_pool)
  .await?;

  let Some(user) = user else {
    warn!("Login attempt for unknown email.");
    return Err(AppError::Auth("These credentials do not match our records.".to_string()));
  };
  if !auth_service::verify_password(&user.password_hash, &payload.password)? {
    warn!(user_id = %user.id, "Login attempt with wrong password.");
    return Err(AppError::Auth("These credentials do not match our records.".to_string()));
  }

  let session = auth_service::create_session(&app_state.db_pool, user.id, app_state.config.session_ttl_hours).await?;
  info!(user_id = %user.id, "User logged in.");

  Ok(
    HttpResponse::Ok()
      .cookie(session_cookie(session.token.clone(), app_state.config.session_ttl_hours))
      .json(json!({"user": user, "token": session.token})),
  )
}

#[instrument(name = "handler::logout", skip_all)]
pub async fn logout_handler(app_state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
  if let Some(token) = crate::web::extractors::token_from_request(&req) {
    auth_service::revoke_session(&app_state.db_pool, &token).await?;
  }

  let mut expired = Cookie::build(SESSION_COOKIE, "").path("/").finish();
  expired.make_removal();
  Ok(HttpResponse::NoContent().cookie(expired).finish())
}

#[instrument(name = "handler::current_user", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn current_user_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse> {
  Ok(HttpResponse::Ok().json(auth_user.user))
}
