//! Server-side session cart. The storefront holds a session id and every
//! mutation re-validates the fractional-weight quantity against the minimum
//! increment and the product's current stock.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{pricing, Cart, CartLine};
use crate::error::{AppError, Result};
use crate::models::{CartItemRow, Product, StoreSettings};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub price_weight_amount: Decimal,
    pub price_weight_unit: String,
    pub quantity: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: Decimal,
    /// Preview only; the PIX discount is applied at checkout.
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

fn to_line(product: &Product, quantity: Decimal) -> Result<CartLine> {
    Ok(CartLine {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        price_weight_amount: product.price_weight_amount,
        unit: product.price_weight_unit.parse()?,
        available_stock: product.stock,
        quantity,
    })
}

async fn load_cart(db: &sqlx::PgPool, session: &str, settings: &StoreSettings) -> Result<Cart> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT * FROM cart_items WHERE session_id = $1 ORDER BY created_at",
    )
    .bind(session)
    .fetch_all(db)
    .await?;

    let mut cart = Cart::new(settings.min_cart_weight_kg);
    for row in rows {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(row.product_id)
            .fetch_optional(db)
            .await?
            .ok_or(AppError::NotFound("produto"))?;
        // Stored rows were validated on write; rebuild without re-checking so a
        // later stock reduction surfaces at checkout, not when viewing.
        let mut line = to_line(&product, row.quantity)?;
        line.available_stock = line.available_stock.max(row.quantity);
        cart.add_line(line)?;
    }
    Ok(cart)
}

fn render(cart: &Cart, settings: &StoreSettings) -> CartView {
    let items = cart
        .lines()
        .iter()
        .map(|l| CartLineView {
            product_id: l.product_id,
            name: l.name.clone(),
            unit_price: l.unit_price,
            price_weight_amount: l.price_weight_amount,
            price_weight_unit: l.unit.to_string(),
            quantity: l.quantity,
            line_total: l.line_total(),
        })
        .collect();
    let subtotal = pricing::round_money(cart.subtotal());
    let delivery_fee = if cart.is_empty() {
        Decimal::ZERO
    } else {
        pricing::delivery_fee(subtotal, &settings.pricing())
    };
    CartView {
        items,
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    }
}

pub async fn view(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>> {
    let settings = StoreSettings::load(&s.db).await?;
    let cart = load_cart(&s.db, &session, &settings).await?;
    Ok(Json(render(&cart, &settings)))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

pub async fn add_item(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let settings = StoreSettings::load(&s.db).await?;
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND active")
        .bind(r.product_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(AppError::NotFound("produto"))?;

    let existing: Option<CartItemRow> = sqlx::query_as(
        "SELECT * FROM cart_items WHERE session_id = $1 AND product_id = $2",
    )
    .bind(&session)
    .bind(r.product_id)
    .fetch_optional(&s.db)
    .await?;

    // The aggregate does the merge + bounds check.
    let mut cart = Cart::new(settings.min_cart_weight_kg);
    if let Some(row) = &existing {
        cart.add_line(to_line(&product, row.quantity)?)?;
    }
    cart.add_line(to_line(&product, r.quantity)?)?;
    let quantity = cart.lines()[0].quantity;

    sqlx::query(
        "INSERT INTO cart_items (id, session_id, product_id, quantity, created_at) \
         VALUES ($1, $2, $3, $4, NOW()) \
         ON CONFLICT (session_id, product_id) DO UPDATE SET quantity = $4",
    )
    .bind(Uuid::now_v7())
    .bind(&session)
    .bind(r.product_id)
    .bind(quantity)
    .execute(&s.db)
    .await?;

    let cart = load_cart(&s.db, &session, &settings).await?;
    Ok((StatusCode::CREATED, Json(render(&cart, &settings))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: Decimal,
}

pub async fn update_item(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
    Json(r): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let settings = StoreSettings::load(&s.db).await?;
    if r.quantity.is_zero() {
        return remove_row(&s, &session, product_id, &settings).await;
    }
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND active")
        .bind(product_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(AppError::NotFound("produto"))?;

    let mut cart = Cart::new(settings.min_cart_weight_kg);
    cart.add_line(to_line(&product, r.quantity)?)?;
    let quantity = cart.lines()[0].quantity;

    let result = sqlx::query(
        "UPDATE cart_items SET quantity = $3 WHERE session_id = $1 AND product_id = $2",
    )
    .bind(&session)
    .bind(product_id)
    .bind(quantity)
    .execute(&s.db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("item do carrinho"));
    }

    let cart = load_cart(&s.db, &session, &settings).await?;
    Ok(Json(render(&cart, &settings)))
}

pub async fn remove_item(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
) -> Result<Json<CartView>> {
    let settings = StoreSettings::load(&s.db).await?;
    remove_row(&s, &session, product_id, &settings).await
}

async fn remove_row(
    s: &AppState,
    session: &str,
    product_id: Uuid,
    settings: &StoreSettings,
) -> Result<Json<CartView>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE session_id = $1 AND product_id = $2")
        .bind(session)
        .bind(product_id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("item do carrinho"));
    }
    let cart = load_cart(&s.db, session, settings).await?;
    Ok(Json(render(&cart, settings)))
}

pub async fn clear(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&session)
        .execute(&s.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
