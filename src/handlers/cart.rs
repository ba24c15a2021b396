use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Cart, CartItem, MenuItem};
use crate::state::AppState;

/// Cart with each line's menu item looked up, the shape clients render.
#[derive(Serialize)]
pub struct CartView {
    pub table_id: String,
    pub items: Vec<CartItemView>,
}

#[derive(Serialize)]
pub struct CartItemView {
    pub menu_item: Option<MenuItem>,
    pub quantity: u32,
    pub customizations: Vec<String>,
}

fn cart_view(conn: &Connection, cart: Cart) -> anyhow::Result<CartView> {
    let mut items = Vec::with_capacity(cart.items.len());
    for line in cart.items {
        items.push(CartItemView {
            menu_item: queries::get_menu_item(conn, &line.menu_item_id)?,
            quantity: line.quantity,
            customizations: line.customizations,
        });
    }
    Ok(CartView {
        table_id: cart.table_id,
        items,
    })
}

// POST /api/cart/add
#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub table_id: String,
    pub menu_item_id: Option<String>,
    pub item_name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub customizations: Vec<String>,
}

fn default_quantity() -> u32 {
    1
}

pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();

    let menu_item_id = match (&req.menu_item_id, &req.item_name) {
        (Some(id), _) => id.clone(),
        (None, Some(name)) => match queries::find_menu_item_by_name(&db, name)? {
            Some(item) => {
                tracing::info!(name = %name, id = %item.id, "resolved item name for cart");
                item.id
            }
            None => {
                return Err(AppError::NotFound(format!(
                    "menu item not found with name: {name}"
                )))
            }
        },
        (None, None) => {
            return Err(AppError::BadRequest(
                "either menu_item_id or item_name is required".to_string(),
            ))
        }
    };

    let mut cart = queries::get_cart(&db, &req.table_id)?
        .unwrap_or_else(|| Cart::empty(req.table_id.clone()));

    match cart.items.iter_mut().find(|i| i.menu_item_id == menu_item_id) {
        Some(line) => {
            line.quantity += req.quantity;
            if !req.customizations.is_empty() {
                line.customizations = req.customizations;
            }
        }
        None => cart.items.push(CartItem {
            menu_item_id,
            quantity: req.quantity,
            customizations: req.customizations,
        }),
    }

    queries::save_cart(&db, &cart)?;
    let view = cart_view(&db, cart)?;

    Ok(Json(serde_json::json!({
        "message": "Cart updated",
        "cart": view,
    })))
}

// GET /api/cart/:table_id
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<CartView>, AppError> {
    let db = state.db.lock().unwrap();
    let cart = queries::get_cart(&db, &table_id)?.unwrap_or_else(|| Cart::empty(table_id));
    Ok(Json(cart_view(&db, cart)?))
}

// POST /api/cart/remove — drop one unit, drop the line at zero
#[derive(Deserialize)]
pub struct RemoveFromCartRequest {
    pub table_id: String,
    pub menu_item_id: String,
}

pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();

    let mut cart = queries::get_cart(&db, &req.table_id)?
        .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

    let index = cart
        .items
        .iter()
        .position(|i| i.menu_item_id == req.menu_item_id)
        .ok_or_else(|| AppError::NotFound("item not found in cart".to_string()))?;

    if cart.items[index].quantity > 1 {
        cart.items[index].quantity -= 1;
    } else {
        cart.items.remove(index);
    }

    queries::save_cart(&db, &cart)?;
    let view = cart_view(&db, cart)?;

    Ok(Json(serde_json::json!({
        "message": "Item updated",
        "cart": view,
    })))
}

// POST /api/cart/remove-item — drop the whole line
pub async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();

    let mut cart = queries::get_cart(&db, &req.table_id)?
        .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

    let index = cart
        .items
        .iter()
        .position(|i| i.menu_item_id == req.menu_item_id)
        .ok_or_else(|| AppError::NotFound("item not found in cart".to_string()))?;

    cart.items.remove(index);

    queries::save_cart(&db, &cart)?;
    let view = cart_view(&db, cart)?;

    Ok(Json(serde_json::json!({
        "message": "Item removed",
        "cart": view,
    })))
}
