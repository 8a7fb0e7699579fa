use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side session row backing the opaque auth token. Never serialized
/// to clients; only the token string leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
  pub id: Uuid,
  pub user_id: Uuid,
  pub token: String,
  pub expires_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}
