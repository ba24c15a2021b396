use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The fixed category set. Chat-side category references must resolve into
/// this enumeration; anything else is rejected rather than invented.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MenuCategory {
    #[serde(rename = "South Indian")]
    SouthIndian,
    Chinese,
    #[serde(rename = "Main Course")]
    MainCourse,
    Breads,
    Dessert,
    Beverages,
    Appetizers,
    Specials,
}

pub const ALL_CATEGORIES: [MenuCategory; 8] = [
    MenuCategory::SouthIndian,
    MenuCategory::Chinese,
    MenuCategory::MainCourse,
    MenuCategory::Breads,
    MenuCategory::Dessert,
    MenuCategory::Beverages,
    MenuCategory::Appetizers,
    MenuCategory::Specials,
];

impl MenuCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuCategory::SouthIndian => "South Indian",
            MenuCategory::Chinese => "Chinese",
            MenuCategory::MainCourse => "Main Course",
            MenuCategory::Breads => "Breads",
            MenuCategory::Dessert => "Dessert",
            MenuCategory::Beverages => "Beverages",
            MenuCategory::Appetizers => "Appetizers",
            MenuCategory::Specials => "Specials",
        }
    }

    /// Case-insensitive exact match; `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        ALL_CATEGORIES
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalizedName {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: LocalizedName,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: f64,
    pub category_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lowercase ingredient strings, used for ingredient filters.
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_case_insensitive() {
        assert_eq!(MenuCategory::parse("south indian"), Some(MenuCategory::SouthIndian));
        assert_eq!(MenuCategory::parse("MAIN COURSE"), Some(MenuCategory::MainCourse));
        assert_eq!(MenuCategory::parse(" Breads "), Some(MenuCategory::Breads));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(MenuCategory::parse("pizza"), None);
        assert_eq!(MenuCategory::parse("South"), None);
        assert_eq!(MenuCategory::parse(""), None);
    }

    #[test]
    fn test_serializes_display_name() {
        let json = serde_json::to_string(&MenuCategory::SouthIndian).unwrap();
        assert_eq!(json, "\"South Indian\"");
    }
}
