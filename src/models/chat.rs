use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "hi" => Language::Hi,
            _ => Language::En,
        }
    }
}

/// One turn of the conversation as supplied by the caller. The assistant
/// side may carry the dish names it offered, which is what vague references
/// like "yeh" resolve against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_items: Vec<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            suggested_items: vec![],
        }
    }

    pub fn assistant(content: impl Into<String>, suggested_items: Vec<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            suggested_items,
        }
    }
}
