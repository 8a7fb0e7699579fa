//! Donation endpoints against a real Postgres instance.
//!
//! These tests need a database; set `TEST_DATABASE_URL` to run them. Without
//! it each test logs a skip notice and passes vacuously.

use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;
use serial_test::serial;
use sqlx::PgPool;

use craftroots::config::AppConfig;
use craftroots::state::AppState;
use craftroots::web::routes::configure_app_routes;

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

fn test_state(pool: PgPool) -> AppState {
  AppState {
    db_pool: pool.clone(),
    config: Arc::new(AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: String::new(),
      allowed_origins: vec![],
      session_ttl_hours: 1,
      seed_db: false,
    }),
  }
}

#[actix_web::test]
#[serial]
async fn zero_cent_donation_is_rejected() {
  let Some(pool) = test_pool().await else { return };
  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(test_state(pool)))
      .configure(configure_app_routes),
  )
  .await;

  let req = test::TestRequest::post()
    .uri("/api/donations")
    .set_json(json!({
      "donor_name": "Asha Rao",
      "donor_email": "asha@example.com",
      "amount_cents": 0,
      "donation_type": "one-time"
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 422);

  let body: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Validation Error");
  assert!(body["errors"]["amount_cents"].is_array());
}

#[actix_web::test]
#[serial]
async fn one_dollar_donation_round_trips() {
  let Some(pool) = test_pool().await else { return };
  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(test_state(pool)))
      .configure(configure_app_routes),
  )
  .await;

  let req = test::TestRequest::post()
    .uri("/api/donations")
    .set_json(json!({
      "donor_name": "Asha Rao",
      "donor_email": "asha@example.com",
      "amount_cents": 100,
      "message": "Keep it up!",
      "donation_type": "one-time"
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 201);
  let created: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(created["amount_cents"], 100);

  let req = test::TestRequest::get()
    .uri(&format!("/api/donations/{}", created["id"].as_str().unwrap()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 200);
  let fetched: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(fetched["amount_cents"], 100);
  assert_eq!(fetched["donor_name"], "Asha Rao");
  assert_eq!(fetched["donor_email"], "asha@example.com");
  assert_eq!(fetched["message"], "Keep it up!");
  assert_eq!(fetched["donation_type"], "one-time");
}

#[actix_web::test]
#[serial]
async fn explicit_null_clears_message_but_absent_keeps_it() {
  let Some(pool) = test_pool().await else { return };
  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(test_state(pool)))
      .configure(configure_app_routes),
  )
  .await;

  let req = test::TestRequest::post()
    .uri("/api/donations")
    .set_json(json!({
      "donor_name": "Asha Rao",
      "donor_email": "asha@example.com",
      "amount_cents": 500,
      "message": "In memory of Nana",
      "donation_type": "one-time"
    }))
    .to_request();
  let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
  let uri = format!("/api/donations/{}", created["id"].as_str().unwrap());

  // An update that omits `message` leaves it untouched.
  let req = test::TestRequest::put()
    .uri(&uri)
    .set_json(json!({ "anonymous": true }))
    .to_request();
  let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(updated["message"], "In memory of Nana");
  assert_eq!(updated["anonymous"], true);

  // An explicit null clears it.
  let req = test::TestRequest::put()
    .uri(&uri)
    .set_json(json!({ "message": null }))
    .to_request();
  let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
  assert!(updated["message"].is_null());
}
