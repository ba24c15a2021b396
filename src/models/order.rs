use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::chat::Language;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" => OrderStatus::InProgress,
            "completed" => OrderStatus::Completed,
            _ => OrderStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<String>,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub customizations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub table_id: String,
    pub items: Vec<OrderItem>,
    pub language: Language,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
