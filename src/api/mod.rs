//! HTTP surface: storefront routes under `/api/v1`, back-office routes under
//! `/api/v1/admin`.

pub mod analytics;
pub mod cart;
pub mod checkout;
pub mod kits;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod settings;
pub mod suppliers;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).min(100)
    }

    pub fn limit(&self) -> i64 {
        self.per_page() as i64
    }

    pub fn offset(&self) -> i64 {
        ((self.page() - 1) * self.per_page()) as i64
    }

    /// `%search%` pattern for ILIKE filters, None when absent.
    pub fn like_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("%{}%", s.trim()))
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Storefront
        .route("/api/v1/products", get(products::list))
        .route("/api/v1/products/:id", get(products::get))
        .route("/api/v1/kits", get(kits::list))
        .route("/api/v1/kits/:id", get(kits::get))
        .route(
            "/api/v1/cart/:session",
            get(cart::view).post(cart::add_item).delete(cart::clear),
        )
        .route(
            "/api/v1/cart/:session/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/v1/checkout", post(checkout::checkout))
        // Back-office
        .route("/api/v1/admin/products", post(products::create))
        .route(
            "/api/v1/admin/products/:id",
            put(products::update).delete(products::deactivate),
        )
        .route("/api/v1/admin/kits", post(kits::create))
        .route(
            "/api/v1/admin/kits/:id",
            put(kits::update).delete(kits::deactivate),
        )
        .route(
            "/api/v1/admin/suppliers",
            get(suppliers::list).post(suppliers::create),
        )
        .route(
            "/api/v1/admin/suppliers/:id",
            get(suppliers::get).put(suppliers::update).delete(suppliers::deactivate),
        )
        .route(
            "/api/v1/admin/promotions",
            get(promotions::list).post(promotions::create),
        )
        .route(
            "/api/v1/admin/promotions/:id",
            put(promotions::update).delete(promotions::remove),
        )
        .route("/api/v1/admin/orders", get(orders::list))
        .route("/api/v1/admin/orders/:id", get(orders::get))
        .route("/api/v1/admin/orders/:id/status", put(orders::update_status))
        .route(
            "/api/v1/admin/settings",
            get(settings::get).put(settings::update),
        )
        .route("/api/v1/admin/analytics", get(analytics::summary))
        .route("/api/v1/admin/analytics/export", get(analytics::export_csv))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "acougue" }))
}
