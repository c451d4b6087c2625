//! Catalog API routes.
//!
//! Category list and per-category sidebar filters.

use axum::{
    Json, Router,
    extract::Path,
    routing::get,
};
use serde::Serialize;

use crate::catalog::{CATEGORIES, Category, FilterConfig, category, filters};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Create the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/filters/{category}", get(category_filters))
}

#[derive(Serialize)]
struct CategoryFiltersResponse {
    category: &'static Category,
    filters: &'static [FilterConfig],
}

async fn list_categories() -> Json<&'static [Category]> {
    Json(CATEGORIES)
}

async fn category_filters(Path(slug): Path<String>) -> AppResult<Json<CategoryFiltersResponse>> {
    let category = category::by_slug(&slug).ok_or(AppError::NotFound)?;
    Ok(Json(CategoryFiltersResponse {
        category,
        filters: filters::for_category(category.slug),
    }))
}
