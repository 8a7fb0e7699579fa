use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors, Result};
use crate::models::Category;
use crate::state::AppState;
use crate::validation;

#[derive(Deserialize, Debug)]
pub struct CreateCategoryPayload {
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
}

impl CreateCategoryPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::required(&mut errors, "name", &self.name);
    validation::max_len(&mut errors, "name", &self.name, 255);
    validation::required(&mut errors, "slug", &self.slug);
    validation::max_len(&mut errors, "slug", &self.slug, 255);
    errors.into_result()
  }
}

#[derive(Deserialize, Debug)]
pub struct UpdateCategoryPayload {
  pub name: Option<String>,
  pub slug: Option<String>,
  pub description: Option<String>,
}

impl UpdateCategoryPayload {
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
    errors.into_result()
  }
}

async fn slug_taken(app_state: &AppState, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
  let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
    .bind(slug)
    .fetch_optional(&app_state.db_pool)
    .await?;
  Ok(matches!(existing, Some((id,)) if Some(id) != exclude))
}

#[instrument(name = "handler::list_categories", skip_all)]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let categories: Vec<Category> = sqlx::query_as(
    "SELECT id, name, slug, description, created_at, updated_at FROM categories ORDER BY name ASC",
  )
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(HttpResponse::Ok().json(categories))
}

#[instrument(name = "handler::get_category", skip(app_state, path), fields(category_id = %path.as_ref()))]
pub async fn get_category_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let category_id = path.into_inner();
  let category: Option<Category> = sqlx::query_as(
    "SELECT id, name, slug, description, created_at, updated_at FROM categories WHERE id = $1",
  )
  .bind(category_id)
  .fetch_optional(&app_state.db_pool)
  .await?;

  match category {
    Some(category) => Ok(HttpResponse::Ok().json(category)),
    None => Err(AppError::NotFound(format!("Category with ID {category_id} not found."))),
  }
}

#[instrument(name = "handler::create_category", skip(app_state, payload), fields(slug = %payload.slug))]
pub async fn create_category_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateCategoryPayload>,
) -> Result<HttpResponse> {
  payload.validate()?;
  if slug_taken(&app_state, &payload.slug, None).await? {
    return Err(AppError::invalid_field("slug", "has already been taken"));
  }

  let category: Category = sqlx::query_as(
    "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4) \
     RETURNING id, name, slug, description, created_at, updated_at",
  )
  .bind(Uuid::new_v4())
  .bind(&payload.name)
  .bind(&payload.slug)
  .bind(&payload.description)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(category_id = %category.id, "Category created.");
  Ok(HttpResponse::Created().json(category))
}

#[instrument(name = "handler::update_category", skip(app_state, path, payload), fields(category_id = %path.as_ref()))]
pub async fn update_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateCategoryPayload>,
) -> Result<HttpResponse> {
  let category_id = path.into_inner();
  payload.validate()?;
  if let Some(slug) = &payload.slug {
    if slug_taken(&app_state, slug, Some(category_id)).await? {
      return Err(AppError::invalid_field("slug", "has already been taken"));
    }
  }

  let category: Option<Category> = sqlx::query_as(
    "UPDATE categories SET \
       name = COALESCE($2, name), \
       slug = COALESCE($3, slug), \
       description = COALESCE($4, description), \
       updated_at = now() \
     WHERE id = $1 RETURNING id, name, slug, description, created_at, updated_at",
  )
  .bind(category_id)
  .bind(&payload.name)
  .bind(&payload.slug)
  .bind(&payload.description)
  .fetch_optional(&app_state.db_pool)
  .await?;

  match category {
    Some(category) => Ok(HttpResponse::Ok().json(category)),
    None => Err(AppError::NotFound(format!("Category with ID {category_id} not found."))),
  }
}

#[instrument(name = "handler::delete_category", skip(app_state, path), fields(category_id = %path.as_ref()))]
pub async fn delete_category_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let category_id = path.into_inner();
  let result = sqlx::query("DELETE FROM categories WHERE id = $1")
    .bind(category_id)
    .execute(&app_state.db_pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Category with ID {category_id} not found.")));
  }
  Ok(HttpResponse::NoContent().finish())
}
