//! Supplier registry, admin CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ListParams, PaginatedResponse};
use crate::error::{AppError, Result};
use crate::models::Supplier;
use crate::state::AppState;

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Supplier>>> {
    let like = p.like_pattern();
    let suppliers = sqlx::query_as::<_, Supplier>(
        "SELECT * FROM suppliers WHERE active AND ($1::text IS NULL OR name ILIKE $1) \
         ORDER BY name LIMIT $2 OFFSET $3",
    )
    .bind(&like)
    .bind(p.limit())
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM suppliers WHERE active AND ($1::text IS NULL OR name ILIKE $1)",
    )
    .bind(&like)
    .fetch_one(&s.db)
    .await?;
    Ok(Json(PaginatedResponse {
        data: suppliers,
        total: total.0,
        page: p.page(),
    }))
}

pub async fn get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Supplier>> {
    sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("fornecedor"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SupplierPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cnpj: Option<String>,
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<SupplierPayload>,
) -> Result<(StatusCode, Json<Supplier>)> {
    r.validate()?;
    let supplier = sqlx::query_as::<_, Supplier>(
        "INSERT INTO suppliers (id, name, contact_name, email, phone, cnpj, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&r.contact_name)
    .bind(&r.email)
    .bind(&r.phone)
    .bind(&r.cnpj)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<SupplierPayload>,
) -> Result<Json<Supplier>> {
    r.validate()?;
    let supplier = sqlx::query_as::<_, Supplier>(
        "UPDATE suppliers SET name = $2, contact_name = $3, email = $4, phone = $5, cnpj = $6, \
         updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.contact_name)
    .bind(&r.email)
    .bind(&r.phone)
    .bind(&r.cnpj)
    .fetch_optional(&s.db)
    .await?
    .ok_or(AppError::NotFound("fornecedor"))?;
    Ok(Json(supplier))
}

pub async fn deactivate(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result =
        sqlx::query("UPDATE suppliers SET active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&s.db)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("fornecedor"));
    }
    Ok(StatusCode::NO_CONTENT)
}
