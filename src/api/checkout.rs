//! Checkout: turns a session cart into an order.
//!
//! Everything is recomputed server-side from the current product rows inside
//! one transaction: line totals, delivery fee, PIX discount and the order
//! total (which includes the fee). Product rows are locked so the stock
//! decrement cannot go negative under concurrent checkouts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{pricing, Cart, CartLine, OrderStatus, PaymentMethod};
use crate::error::{AppError, Result};
use crate::models::{CartItemRow, Customer, Order, OrderItem, Product, StoreSettings};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(length(min = 1, max = 120))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn checkout(
    State(s): State<AppState>,
    Json(r): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    r.validate()?;
    let settings = StoreSettings::load(&s.db).await?;
    let mut tx = s.db.begin().await?;

    let rows: Vec<CartItemRow> =
        sqlx::query_as("SELECT * FROM cart_items WHERE session_id = $1 ORDER BY created_at")
            .bind(&r.session_id)
            .fetch_all(&mut *tx)
            .await?;
    if rows.is_empty() {
        return Err(AppError::Invalid("carrinho vazio".into()));
    }

    let mut cart = Cart::new(settings.min_cart_weight_kg);
    for row in &rows {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND active FOR UPDATE",
        )
        .bind(row.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("produto"))?;
        cart.add_line(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            price_weight_amount: product.price_weight_amount,
            unit: product.price_weight_unit.parse()?,
            available_stock: product.stock,
            quantity: row.quantity,
        })?;
    }

    let quote = pricing::quote(cart.subtotal(), r.payment_method, &settings.pricing());

    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (id, name, email, phone, created_at) \
         VALUES ($1, $2, $3, $4, NOW()) \
         ON CONFLICT (email) DO UPDATE \
         SET name = EXCLUDED.name, phone = COALESCE(EXCLUDED.phone, customers.phone) \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.customer_name)
    .bind(&r.customer_email)
    .bind(&r.customer_phone)
    .fetch_one(&mut *tx)
    .await?;

    let order_number = format!("PED-{:08}", rand::random::<u32>());
    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders \
         (id, order_number, customer_id, customer_name, customer_email, customer_phone, \
          delivery_address, status, payment_method, subtotal, delivery_fee, discount, total, \
          note, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&order_number)
    .bind(customer.id)
    .bind(&r.customer_name)
    .bind(&r.customer_email)
    .bind(&r.customer_phone)
    .bind(&r.delivery_address)
    .bind(OrderStatus::Preparando.as_str())
    .bind(r.payment_method.as_str())
    .bind(quote.subtotal)
    .bind(quote.delivery_fee)
    .bind(quote.discount)
    .bind(quote.total)
    .bind(&r.note)
    .fetch_one(&mut *tx)
    .await?;

    for line in cart.lines() {
        sqlx::query(
            "INSERT INTO order_items \
             (id, order_id, product_id, name, unit_price, price_weight_amount, \
              price_weight_unit, quantity, total) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::now_v7())
        .bind(order.id)
        .bind(line.product_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(line.price_weight_amount)
        .bind(line.unit.as_str())
        .bind(line.quantity)
        .bind(line.line_total())
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1")
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&r.session_id)
        .execute(&mut *tx)
        .await?;

    let items: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY name")
            .bind(order.id)
            .fetch_all(&mut *tx)
            .await?;

    tx.commit().await?;
    tracing::info!(
        order_number = %order.order_number,
        total = %order.total,
        payment = %order.payment_method,
        "order placed"
    );
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            success: true,
            order,
            items,
        }),
    ))
}
