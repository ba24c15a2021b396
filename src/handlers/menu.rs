use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Category, LocalizedName, LocalizedText, MenuItem};
use crate::state::AppState;

// GET /api/menu-items
pub async fn list_menu_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    let db = state.db.lock().unwrap();
    let items = queries::list_menu_items(&db)?;
    Ok(Json(items))
}

// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let db = state.db.lock().unwrap();
    let categories = queries::list_categories(&db)?;
    Ok(Json(categories))
}

// POST /api/menu-items/bulk-insert
#[derive(Deserialize)]
pub struct BulkMenuItem {
    #[serde(alias = "itemName")]
    pub name: LocalizedName,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

pub async fn bulk_insert(
    State(state): State<Arc<AppState>>,
    Json(incoming): Json<Vec<BulkMenuItem>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if incoming.is_empty() {
        return Err(AppError::BadRequest("no menu items supplied".to_string()));
    }

    let db = state.db.lock().unwrap();
    let now = Utc::now().naive_utc();
    let mut inserted = Vec::with_capacity(incoming.len());

    for entry in incoming {
        let category_id = queries::find_or_create_category(&db, &entry.category)?;
        let item = MenuItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: entry.name,
            description: entry.description,
            price: entry.price,
            category_id,
            tags: entry.tags,
            ingredients: entry
                .ingredients
                .into_iter()
                .map(|i| i.trim().to_lowercase())
                .collect(),
            allergens: entry.allergens,
            available: entry.available,
            created_at: now,
            updated_at: now,
        };
        queries::insert_menu_item(&db, &item)?;
        inserted.push(item);
    }

    tracing::info!(count = inserted.len(), "bulk-inserted menu items");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Menu items inserted",
            "data": inserted,
        })),
    ))
}
