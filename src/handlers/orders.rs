use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Language, Order, OrderItem, OrderStatus};
use crate::state::AppState;

// POST /api/orders
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub table_id: String,
    pub items: Vec<OrderItem>,
    pub language: Option<String>,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let now = Utc::now().naive_utc();
    let order = Order {
        id: uuid::Uuid::new_v4().to_string(),
        table_id: req.table_id.clone(),
        items: req.items,
        language: Language::parse(req.language.as_deref().unwrap_or("en")),
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_order(&db, &order)?;
        // placing the order empties the table's cart
        queries::clear_cart(&db, &req.table_id)?;
    }

    tracing::info!(order_id = %order.id, table_id = %order.table_id, "order placed");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Order placed successfully",
            "order": order,
        })),
    ))
}

// GET /api/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, AppError> {
    let db = state.db.lock().unwrap();
    let orders = queries::list_orders(&db)?;
    Ok(Json(orders))
}

// POST /api/orders/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = match req.status.as_str() {
        "pending" => OrderStatus::Pending,
        "in_progress" => OrderStatus::InProgress,
        "completed" => OrderStatus::Completed,
        other => {
            return Err(AppError::BadRequest(format!("unknown status: {other}")));
        }
    };

    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_order_status(&db, &id, &status)?
    };

    if !updated {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    Ok(Json(serde_json::json!({
        "message": "Order updated",
        "status": status.as_str(),
    })))
}
