use std::collections::BTreeMap;
use std::fmt;

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Field-name → messages accumulator behind every 422 response.
///
/// Serialized as the `errors` object of the validation envelope:
/// `{"message": "Validation Error", "errors": {"amount": ["..."]}}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_string()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn contains(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  /// Err(AppError::Validation) when any field failed, Ok otherwise.
  pub fn into_result(self) -> Result<(), AppError> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(AppError::Validation(self))
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
    write!(f, "invalid fields: {}", fields.join(", "))
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(FieldErrors),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Unauthorized: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Your cart is empty.")]
  EmptyCart,

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Single-field validation failure, for checks that live outside a schema.
  pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
    let mut errors = FieldErrors::new();
    errors.push(field, message);
    AppError::Validation(errors)
  }
}

// Handlers occasionally use `?` on anyhow-returning helpers.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().expect("checked downcast"));
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(errors) => {
        HttpResponse::UnprocessableEntity().json(json!({"message": "Validation Error", "errors": errors}))
      }
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"message": m})),
      AppError::Forbidden(_) => HttpResponse::Forbidden().json(json!({"message": "Unauthorized"})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"message": m})),
      AppError::EmptyCart => HttpResponse::BadRequest().json(json!({"message": "Your cart is empty."})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"message": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"message": "Database operation failed"})),
      AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(json!({"message": "An internal error occurred"}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;

  #[test]
  fn field_errors_accumulate_per_field() {
    let mut errors = FieldErrors::new();
    errors.push("amount", "must be at least 1");
    errors.push("amount", "must be numeric");
    errors.push("donor_email", "is required");

    assert!(errors.contains("amount"));
    assert!(errors.contains("donor_email"));
    let body = serde_json::to_value(&errors).unwrap();
    assert_eq!(body["amount"].as_array().unwrap().len(), 2);
    assert_eq!(body["donor_email"][0], "is required");
  }

  #[test]
  fn empty_field_errors_are_ok() {
    assert!(FieldErrors::new().into_result().is_ok());
    assert!(matches!(
      AppError::invalid_field("slug", "taken"),
      AppError::Validation(_)
    ));
  }

  #[test]
  fn errors_map_to_expected_status_codes() {
    let cases = [
      (AppError::invalid_field("name", "is required"), StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::Auth("no session".into()), StatusCode::UNAUTHORIZED),
      (AppError::Forbidden("not yours".into()), StatusCode::FORBIDDEN),
      (AppError::NotFound("no such product".into()), StatusCode::NOT_FOUND),
      (AppError::EmptyCart, StatusCode::BAD_REQUEST),
      (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
      assert_eq!(err.error_response().status(), expected, "{err}");
    }
  }
}
