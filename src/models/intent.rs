use serde::{Deserialize, Serialize};

use crate::models::menu::MenuCategory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientFilter {
    pub ingredients: Vec<String>,
    pub mode: FilterMode,
}

impl IngredientFilter {
    pub fn exclude(ingredients: Vec<String>) -> Self {
        Self {
            ingredients,
            mode: FilterMode::Exclude,
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// Models sometimes answer `"quantity": "2"` or `null`; anything that is
/// not a positive integer becomes 1.
fn de_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(1).clamp(1, u32::MAX as u64) as u32,
        serde_json::Value::String(s) => s.trim().parse::<u32>().unwrap_or(1).max(1),
        _ => 1,
    })
}

/// One line the user asked for. Before enrichment only `name`, `quantity`
/// and `special_instructions` are populated; enrichment fills in the store
/// id, canonical name and price when the name resolves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestedItem {
    pub name: String,
    #[serde(default = "default_quantity", deserialize_with = "de_quantity")]
    pub quantity: u32,
    #[serde(
        default,
        alias = "specialInstructions",
        skip_serializing_if = "String::is_empty"
    )]
    pub special_instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl RequestedItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            special_instructions: String::new(),
            menu_item_id: None,
            price: None,
        }
    }
}

/// What the user wants, as a tagged union over the fixed intent set so each
/// branch carries exactly the fields that intent requires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ChatAction {
    OrderItem {
        items: Vec<RequestedItem>,
    },
    CancelOrder {
        #[serde(default)]
        items: Vec<RequestedItem>,
    },
    AskPrice {
        items: Vec<RequestedItem>,
    },
    CustomizeOrder {
        items: Vec<RequestedItem>,
    },
    MenuBrowsing {
        #[serde(default)]
        categories: Vec<MenuCategory>,
    },
    IngredientQuery {
        ingredient: String,
        #[serde(default)]
        items: Vec<RequestedItem>,
    },
    FilterByIngredients {
        filter: IngredientFilter,
        #[serde(default)]
        categories: Vec<MenuCategory>,
    },
    Greeting,
    Bye,
    Fallback,
}

impl ChatAction {
    pub fn intent(&self) -> &'static str {
        match self {
            ChatAction::OrderItem { .. } => "order_item",
            ChatAction::CancelOrder { .. } => "cancel_order",
            ChatAction::AskPrice { .. } => "ask_price",
            ChatAction::CustomizeOrder { .. } => "customize_order",
            ChatAction::MenuBrowsing { .. } => "menu_browsing",
            ChatAction::IngredientQuery { .. } => "ingredient_query",
            ChatAction::FilterByIngredients { .. } => "filter_by_ingredients",
            ChatAction::Greeting => "greeting",
            ChatAction::Bye => "bye",
            ChatAction::Fallback => "fallback",
        }
    }

    pub fn items(&self) -> &[RequestedItem] {
        match self {
            ChatAction::OrderItem { items }
            | ChatAction::CancelOrder { items }
            | ChatAction::AskPrice { items }
            | ChatAction::CustomizeOrder { items }
            | ChatAction::IngredientQuery { items, .. } => items,
            _ => &[],
        }
    }

    pub fn items_mut(&mut self) -> Option<&mut Vec<RequestedItem>> {
        match self {
            ChatAction::OrderItem { items }
            | ChatAction::CancelOrder { items }
            | ChatAction::AskPrice { items }
            | ChatAction::CustomizeOrder { items }
            | ChatAction::IngredientQuery { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn categories(&self) -> &[MenuCategory] {
        match self {
            ChatAction::MenuBrowsing { categories }
            | ChatAction::FilterByIngredients { categories, .. } => categories,
            _ => &[],
        }
    }
}

/// The resolver's output: always well-formed, always carries a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentResult {
    #[serde(flatten)]
    pub action: ChatAction,
    pub reply: String,
}

impl IntentResult {
    pub fn new(action: ChatAction, reply: impl Into<String>) -> Self {
        Self {
            action,
            reply: reply.into(),
        }
    }

    pub fn fallback(reply: impl Into<String>) -> Self {
        Self {
            action: ChatAction::Fallback,
            reply: reply.into(),
        }
    }

    pub fn intent(&self) -> &'static str {
        self.action.intent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_intent_tag() {
        let result = IntentResult::new(
            ChatAction::OrderItem {
                items: vec![RequestedItem::new("Masala Dosa", 2)],
            },
            "Two Masala Dosa coming up!",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intent"], "order_item");
        assert_eq!(json["items"][0]["name"], "Masala Dosa");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["reply"], "Two Masala Dosa coming up!");
    }

    #[test]
    fn test_fallback_has_no_items() {
        let result = IntentResult::fallback("Sorry, could you rephrase that?");
        assert_eq!(result.intent(), "fallback");
        assert!(result.action.items().is_empty());
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let item: RequestedItem = serde_json::from_str(r#"{"name":"Idli"}"#).unwrap();
        assert_eq!(item.quantity, 1);
        assert!(item.special_instructions.is_empty());
    }

    #[test]
    fn test_special_instructions_camel_case_alias() {
        let item: RequestedItem =
            serde_json::from_str(r#"{"name":"Idli","specialInstructions":"extra sambar"}"#)
                .unwrap();
        assert_eq!(item.special_instructions, "extra sambar");
    }

    #[test]
    fn test_quantity_tolerates_strings_and_null() {
        let item: RequestedItem =
            serde_json::from_str(r#"{"name":"Idli","quantity":"3"}"#).unwrap();
        assert_eq!(item.quantity, 3);
        let item: RequestedItem =
            serde_json::from_str(r#"{"name":"Idli","quantity":null}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_filter_mode_wire_format() {
        assert_eq!(serde_json::to_string(&FilterMode::Exclude).unwrap(), "\"exclude\"");
        assert_eq!(serde_json::to_string(&FilterMode::Include).unwrap(), "\"include\"");
    }
}
