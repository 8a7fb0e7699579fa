//! Request extractors shared by the auth-scoped handlers.

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_token";

/// Resolves the session token (bearer header or cookie) to a user row.
/// Missing or expired tokens fail the request with 401 before the handler runs.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl AuthenticatedUser {
  pub fn user_id(&self) -> Uuid {
    self.user.id
  }
}

/// Bearer header first, `session_token` cookie as fallback.
pub(crate) fn token_from_request(req: &HttpRequest) -> Option<String> {
  if let Some(header) = req.headers().get("Authorization") {
    if let Ok(value) = header.to_str() {
      if let Some(token) = value.strip_prefix("Bearer ") {
        return Some(token.trim().to_string());
      }
    }
  }
  req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("AppState missing from request".to_string()))?;

      let Some(token) = token_from_request(&req) else {
        return Err(AppError::Auth("User authentication required.".to_string()));
      };

      match auth_service::user_for_token(&state.db_pool, &token).await? {
        Some(user) => Ok(AuthenticatedUser { user }),
        None => {
          warn!("Rejected request with unknown or expired session token.");
          Err(AppError::Auth("Invalid or expired session token.".to_string()))
        }
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn bearer_header_wins_over_cookie() {
    let req = TestRequest::default()
      .insert_header(("Authorization", "Bearer header-token"))
      .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "cookie-token"))
      .to_http_request();
    assert_eq!(token_from_request(&req).as_deref(), Some("header-token"));
  }

  #[test]
  fn cookie_is_used_without_header() {
    let req = TestRequest::default()
      .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "cookie-token"))
      .to_http_request();
    assert_eq!(token_from_request(&req).as_deref(), Some("cookie-token"));
  }

  #[test]
  fn absent_credentials_yield_none() {
    let req = TestRequest::default().to_http_request();
    assert_eq!(token_from_request(&req), None);

    // Non-bearer header alone does not count.
    let req = TestRequest::default()
      .insert_header(("Authorization", "Basic abc"))
      .to_http_request();
    assert_eq!(token_from_request(&req), None);
  }
}
