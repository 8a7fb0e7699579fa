use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Frontend origins allowed to make credentialed requests.
  pub allowed_origins: Vec<String>,

  /// Session lifetime in hours.
  pub session_ttl_hours: i64,

  /// Insert the built-in catalog on startup.
  pub seed_db: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let allowed_origins = get_env("ALLOWED_ORIGINS")
      .unwrap_or_else(|_| "http://localhost:5174,http://127.0.0.1:5174".to_string())
      .split(',')
      .map(|origin| origin.trim().to_string())
      .filter(|origin| !origin.is_empty())
      .collect::<Vec<_>>();
    if allowed_origins.is_empty() {
      return Err(AppError::Config("ALLOWED_ORIGINS must list at least one origin".to_string()));
    }

    let session_ttl_hours = get_env("SESSION_TTL_HOURS")
      .unwrap_or_else(|_| "168".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_HOURS: {}", e)))?;

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      allowed_origins,
      session_ttl_hours,
      seed_db,
    })
  }
}
