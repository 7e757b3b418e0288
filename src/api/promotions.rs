//! Promotions, admin CRUD. A promotion is a time-boxed percentage discount,
//! optionally tied to a single product.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ListParams, PaginatedResponse};
use crate::error::{AppError, Result};
use crate::models::Promotion;
use crate::state::AppState;

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Promotion>>> {
    let like = p.like_pattern();
    let promotions = sqlx::query_as::<_, Promotion>(
        "SELECT * FROM promotions WHERE ($1::text IS NULL OR name ILIKE $1) \
         ORDER BY starts_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(&like)
    .bind(p.limit())
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM promotions WHERE ($1::text IS NULL OR name ILIKE $1)")
            .bind(&like)
            .fetch_one(&s.db)
            .await?;
    Ok(Json(PaginatedResponse {
        data: promotions,
        total: total.0,
        page: p.page(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PromotionPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub product_id: Option<Uuid>,
    pub discount_pct: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: Option<bool>,
}

impl PromotionPayload {
    fn check(&self) -> Result<()> {
        self.validate()?;
        if self.discount_pct <= Decimal::ZERO || self.discount_pct > Decimal::ONE_HUNDRED {
            return Err(AppError::Invalid("desconto deve estar entre 0 e 100".into()));
        }
        if self.ends_at <= self.starts_at {
            return Err(AppError::Invalid("periodo da promocao e invalido".into()));
        }
        Ok(())
    }
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<PromotionPayload>,
) -> Result<(StatusCode, Json<Promotion>)> {
    r.check()?;
    let promotion = sqlx::query_as::<_, Promotion>(
        "INSERT INTO promotions (id, name, product_id, discount_pct, starts_at, ends_at, active, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(r.product_id)
    .bind(r.discount_pct)
    .bind(r.starts_at)
    .bind(r.ends_at)
    .bind(r.active.unwrap_or(true))
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<PromotionPayload>,
) -> Result<Json<Promotion>> {
    r.check()?;
    let promotion = sqlx::query_as::<_, Promotion>(
        "UPDATE promotions SET name = $2, product_id = $3, discount_pct = $4, starts_at = $5, \
         ends_at = $6, active = $7 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(r.product_id)
    .bind(r.discount_pct)
    .bind(r.starts_at)
    .bind(r.ends_at)
    .bind(r.active.unwrap_or(true))
    .fetch_optional(&s.db)
    .await?
    .ok_or(AppError::NotFound("promocao"))?;
    Ok(Json(promotion))
}

pub async fn remove(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("promocao"));
    }
    Ok(StatusCode::NO_CONTENT)
}
