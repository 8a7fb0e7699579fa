//! Password hashing and server-side session management.

use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Session, User};

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip_all, err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(AppError::invalid_field("password", "is required"));
  }
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?;
  Ok(hash.to_string())
}

/// Verifies a plain-text password against a stored Argon2 hash.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool> {
  let parsed = PasswordHash::new(stored_hash)
    .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {e}")))?;
  match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => Err(AppError::Internal(format!("Password verification failed: {e}"))),
  }
}

/// 256-bit random token, hex-encoded. Opaque to clients.
fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[instrument(name = "auth_service::create_session", skip(pool), fields(user_id = %user_id))]
pub async fn create_session(pool: &PgPool, user_id: Uuid, ttl_hours: i64) -> Result<Session> {
  let session: Session = sqlx::query_as(
    "INSERT INTO sessions (id, user_id, token, expires_at) VALUES ($1, $2, $3, $4) \
     RETURNING id, user_id, token, expires_at, created_at",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .bind(generate_token())
  .bind(Utc::now() + Duration::hours(ttl_hours))
  .fetch_one(pool)
  .await?;

  debug!(session_id = %session.id, "Session created.");
  Ok(session)
}

/// Resolves a presented token to its user; `None` for unknown or expired tokens.
#[instrument(name = "auth_service::user_for_token", skip_all)]
pub async fn user_for_token(pool: &PgPool, token: &str) -> Result<Option<User>> {
  let user: Option<User> = sqlx::query_as(
    "SELECT u.id, u.email, u.password_hash, u.created_at, u.updated_at \
     FROM sessions s JOIN users u ON u.id = s.user_id \
     WHERE s.token = $1 AND s.expires_at > now()",
  )
  .bind(token)
  .fetch_optional(pool)
  .await?;
  Ok(user)
}

#[instrument(name = "auth_service::revoke_session", skip_all)]
pub async fn revoke_session(pool: &PgPool, token: &str) -> Result<()> {
  sqlx::query("DELETE FROM sessions WHERE token = $1")
    .bind(token)
    .execute(pool)
    .await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify_round_trip() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    assert!(!verify_password(&hash, "wrong password").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn tokens_are_long_and_unique() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), 64);
    assert_ne!(a, b);
  }

  #[test]
  fn garbage_stored_hash_is_an_internal_error() {
    assert!(matches!(
      verify_password("not-a-phc-string", "anything"),
      Err(AppError::Internal(_))
    ));
  }
}
