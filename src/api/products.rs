//! Product catalog: public listing plus admin CRUD. Deleting a product only
//! deactivates it, so past orders keep their references.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ListParams, PaginatedResponse};
use crate::domain::weight::round_weight;
use crate::domain::WeightUnit;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>> {
    let like = p.like_pattern();
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products \
         WHERE active AND ($1::text IS NULL OR name ILIKE $1) AND ($2::text IS NULL OR category = $2) \
         ORDER BY name LIMIT $3 OFFSET $4",
    )
    .bind(&like)
    .bind(&p.category)
    .bind(p.limit())
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products \
         WHERE active AND ($1::text IS NULL OR name ILIKE $1) AND ($2::text IS NULL OR category = $2)",
    )
    .bind(&like)
    .bind(&p.category)
    .fetch_one(&s.db)
    .await?;
    Ok(Json(PaginatedResponse {
        data: products,
        total: total.0,
        page: p.page(),
    }))
}

pub async fn get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND active")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("produto"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub price_weight_amount: Decimal,
    pub price_weight_unit: String,
    pub stock: Decimal,
    pub supplier_id: Option<Uuid>,
}

impl ProductPayload {
    fn check(&self) -> Result<WeightUnit> {
        self.validate()?;
        if self.price < Decimal::ZERO {
            return Err(AppError::Invalid("preco nao pode ser negativo".into()));
        }
        if self.price_weight_amount <= Decimal::ZERO {
            return Err(AppError::Invalid(
                "quantidade de referencia deve ser positiva".into(),
            ));
        }
        if self.stock < Decimal::ZERO {
            return Err(AppError::Invalid("estoque nao pode ser negativo".into()));
        }
        Ok(self.price_weight_unit.parse()?)
    }
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    let unit = r.check()?;
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products \
         (id, name, description, category, price, price_weight_amount, price_weight_unit, stock, supplier_id, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&r.description)
    .bind(&r.category)
    .bind(r.price)
    .bind(round_weight(r.price_weight_amount))
    .bind(unit.as_str())
    .bind(round_weight(r.stock))
    .bind(r.supplier_id)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let unit = r.check()?;
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, description = $3, category = $4, price = $5, \
         price_weight_amount = $6, price_weight_unit = $7, stock = $8, supplier_id = $9, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.description)
    .bind(&r.category)
    .bind(r.price)
    .bind(round_weight(r.price_weight_amount))
    .bind(unit.as_str())
    .bind(round_weight(r.stock))
    .bind(r.supplier_id)
    .fetch_optional(&s.db)
    .await?
    .ok_or(AppError::NotFound("produto"))?;
    Ok(Json(product))
}

pub async fn deactivate(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("produto"));
    }
    Ok(StatusCode::NO_CONTENT)
}
