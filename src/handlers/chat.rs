use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::menu::MenuCategory;
use crate::models::{ChatAction, ConversationTurn, IntentResult, Language, MenuItem};
use crate::services::ai::resolver::{self, ChatContext};
use crate::services::language::detect_language;
use crate::services::menu::{enrich_items, filter_menu, resolve_categories};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "languageCode", alias = "lang")]
    pub language: Option<String>,
    #[serde(default, alias = "conversationHistory")]
    pub history: Vec<ConversationTurn>,
    #[serde(default, alias = "suggestedItemNames")]
    pub suggested_items: Vec<String>,
    #[serde(default, alias = "tableId")]
    pub table_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: IntentResult,
    pub language: Language,
}

#[derive(Serialize)]
pub struct AiOrderResponse {
    #[serde(flatten)]
    pub result: IntentResult,
    /// Menu rows satisfying a browse or filter intent.
    pub matches: Vec<MenuItem>,
    pub table_id: String,
    pub language: Language,
}

/// Runs the resolver for one request: snapshot the menu, resolve, enrich.
/// The store lock is never held across the model call.
async fn resolve_for_request(
    state: &Arc<AppState>,
    req: &ChatRequest,
) -> Result<(IntentResult, Vec<MenuItem>, Language), AppError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_string()));
    }

    let language = match req.language.as_deref() {
        Some(code) => Language::parse(code),
        None => detect_language(&message),
    };

    let (menu, categories) = {
        let db = state.db.lock().unwrap();
        (queries::list_menu_items(&db)?, queries::list_categories(&db)?)
    };

    let ctx = ChatContext {
        menu: &menu,
        categories: &categories,
        history: &req.history,
        suggested_items: &req.suggested_items,
        language,
    };
    let mut result = resolver::resolve_intent(state.llm.as_ref(), &ctx, &message).await;

    tracing::info!(intent = result.intent(), language = language.as_str(), "chat resolved");

    if let Some(items) = result.action.items_mut() {
        let db = state.db.lock().unwrap();
        enrich_items(&db, items)?;
    }

    Ok((result, menu, language))
}

// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let (result, _menu, language) = resolve_for_request(&state, &req).await?;
    Ok(Json(ChatResponse {
        response: result,
        language,
    }))
}

// POST /api/ai-order
pub async fn ai_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<AiOrderResponse>, AppError> {
    let table_id = req.table_id.clone().unwrap_or_default();
    let (mut result, menu, language) = resolve_for_request(&state, &req).await?;

    let matches = {
        let db = state.db.lock().unwrap();
        match &result.action {
            ChatAction::MenuBrowsing { categories } => {
                browse_matches(&db, &menu, categories, None, language, &mut result.reply)?
            }
            ChatAction::FilterByIngredients { filter, categories } => {
                let filter = filter.clone();
                browse_matches(&db, &menu, categories, Some(&filter), language, &mut result.reply)?
            }
            _ => vec![],
        }
    };

    Ok(Json(AiOrderResponse {
        result,
        matches,
        table_id,
        language,
    }))
}

/// Store matches for a browse/filter intent. An unresolvable or empty
/// category answer reports "nothing found" instead of guessing.
fn browse_matches(
    db: &rusqlite::Connection,
    menu: &[MenuItem],
    categories: &[MenuCategory],
    filter: Option<&crate::models::IngredientFilter>,
    language: Language,
    reply: &mut String,
) -> Result<Vec<MenuItem>, AppError> {
    let category_ids: Vec<i64> = resolve_categories(db, categories)?
        .into_iter()
        .map(|c| c.id)
        .collect();

    if !categories.is_empty() && category_ids.is_empty() {
        *reply = nothing_found_reply(categories, language);
        return Ok(vec![]);
    }

    let matches = filter_menu(menu, filter, &category_ids);
    if matches.is_empty() && !categories.is_empty() {
        *reply = nothing_found_reply(categories, language);
    }
    Ok(matches)
}

fn nothing_found_reply(categories: &[MenuCategory], language: Language) -> String {
    let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    let list = names.join(", ");
    match language {
        Language::En => format!("Sorry, nothing found under {list}."),
        Language::Hi => format!("माफ़ कीजिए, {list} में कुछ नहीं मिला।"),
    }
}
