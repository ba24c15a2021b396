use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub menu_item_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub customizations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub table_id: String,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            items: vec![],
        }
    }
}
