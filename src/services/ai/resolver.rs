//! Chat intent resolution: local text analysis around a single model call.
//!
//! The pipeline is a pure transformation of its inputs apart from the one
//! gateway await: normalize the message, run the detection tables, annotate
//! vague references from the conversation history, call the model, then
//! parse, validate and deterministically correct its JSON answer. Gateway
//! and parse failures degrade to a fallback result; this function never
//! returns an error.

use serde::Deserialize;

use crate::models::menu::MenuCategory;
use crate::models::{
    Category, ChatAction, ConversationTurn, IngredientFilter, IntentResult, Language, MenuItem,
    RequestedItem,
};
use crate::services::ai::patterns::{
    detect_excluded_ingredients, detect_ingredient_question, is_vague_reference,
    strip_emoji_shortcodes,
};
use crate::services::ai::prompt::{build_messages, build_system_prompt};
use crate::services::ai::LlmProvider;

pub struct ChatContext<'a> {
    pub menu: &'a [MenuItem],
    pub categories: &'a [Category],
    pub history: &'a [ConversationTurn],
    pub suggested_items: &'a [String],
    pub language: Language,
}

pub async fn resolve_intent(
    llm: &dyn LlmProvider,
    ctx: &ChatContext<'_>,
    message: &str,
) -> IntentResult {
    let cleaned = strip_emoji_shortcodes(message);
    let excluded = detect_excluded_ingredients(&cleaned);
    let question_hint = detect_ingredient_question(&cleaned);

    let candidates = last_suggested(ctx.history, ctx.suggested_items);
    let annotated = annotate_vague_reference(&cleaned, &candidates);

    let system = build_system_prompt(ctx.menu, ctx.categories);
    let messages = build_messages(ctx.history, &annotated);

    let raw = match llm.chat(&system, &messages).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "LLM gateway call failed, using fallback");
            return IntentResult::fallback(apology(ctx.language));
        }
    };

    match parse_model_reply(&raw) {
        Some(reply) => {
            let validated = validate_reply(reply, question_hint.as_deref(), ctx.language);
            apply_exclusion_override(validated, &excluded, ctx.language)
        }
        None => {
            tracing::warn!("model reply was not valid intent JSON, using fallback");
            let text = raw.trim();
            if text.is_empty() {
                IntentResult::fallback(apology(ctx.language))
            } else {
                IntentResult::fallback(text.to_string())
            }
        }
    }
}

/// Dishes a vague reference may point at: the most recent assistant turn
/// that suggested anything wins; the caller-supplied hint only applies when
/// the history yields nothing.
pub fn last_suggested(history: &[ConversationTurn], hint: &[String]) -> Vec<String> {
    for turn in history.iter().rev() {
        if turn.role == "assistant" && !turn.suggested_items.is_empty() {
            return turn.suggested_items.clone();
        }
    }
    hint.to_vec()
}

fn annotate_vague_reference(message: &str, candidates: &[String]) -> String {
    if !is_vague_reference(message) {
        return message.to_string();
    }
    match candidates {
        [only] => format!(
            "{message}\n(The guest is referring to \"{only}\" from the earlier suggestions; treat it as the requested dish.)"
        ),
        [] => format!(
            "{message}\n(The guest used a vague reference but nothing was suggested earlier; ask them to name the dish explicitly.)"
        ),
        _ => format!(
            "{message}\n(The guest used a vague reference; earlier suggestions were: {}. Ask which one they mean.)",
            candidates.join(", ")
        ),
    }
}

// ── Model reply parsing ──

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// The model's answer as it comes off the wire, before validation.
#[derive(Debug, Deserialize)]
struct ModelReply {
    intent: Option<String>,
    #[serde(default)]
    items: Vec<RequestedItem>,
    #[serde(default)]
    ingredient: Option<OneOrMany>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    category: Option<OneOrMany>,
    reply: Option<String>,
}

/// Direct decode, then markdown fences stripped, then the outermost brace
/// slice. `None` only when all three fail.
fn parse_model_reply(response: &str) -> Option<ModelReply> {
    if let Ok(reply) = serde_json::from_str::<ModelReply>(response) {
        return Some(reply);
    }

    let cleaned = response
        .trim()
        .strip_prefix("```json")
        .or_else(|| response.trim().strip_prefix("```"))
        .unwrap_or(response.trim());
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(reply) = serde_json::from_str::<ModelReply>(cleaned) {
        return Some(reply);
    }

    if let Some(start) = cleaned.find('{') {
        if let Some(end) = cleaned.rfind('}') {
            if let Ok(reply) = serde_json::from_str::<ModelReply>(&cleaned[start..=end]) {
                return Some(reply);
            }
        }
    }

    None
}

// ── Validation ──

/// Collapses the duck-typed wire shape into the tagged union, enforcing
/// each intent's required fields. Categories outside the fixed enumeration
/// are dropped, never invented; an ingredient question hint fills a
/// missing `ingredient` field.
fn validate_reply(reply: ModelReply, question_hint: Option<&str>, language: Language) -> IntentResult {
    let reply_text = match reply.reply.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => apology(language),
    };

    let categories = parse_categories(reply.category);
    let ingredients: Vec<String> = reply
        .ingredient
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .collect();
    let items = reply.items;

    let action = match reply.intent.as_deref() {
        Some("order_item") if !items.is_empty() => ChatAction::OrderItem { items },
        Some("order_item") => ChatAction::Fallback,
        Some("cancel_order") => ChatAction::CancelOrder { items },
        Some("ask_price") if !items.is_empty() => ChatAction::AskPrice { items },
        Some("customize_order") if !items.is_empty() => ChatAction::CustomizeOrder { items },
        Some("menu_browsing") => ChatAction::MenuBrowsing { categories },
        Some("ingredient_query") => {
            let ingredient = ingredients
                .into_iter()
                .next()
                .or_else(|| question_hint.map(|h| h.to_string()));
            match ingredient {
                Some(ingredient) => ChatAction::IngredientQuery { ingredient, items },
                None => ChatAction::MenuBrowsing { categories },
            }
        }
        Some("filter_by_ingredients") => {
            let ingredients = if ingredients.is_empty() {
                question_hint.map(|h| vec![h.to_string()]).unwrap_or_default()
            } else {
                ingredients
            };
            if ingredients.is_empty() {
                ChatAction::MenuBrowsing { categories }
            } else {
                let mode = match reply.mode.as_deref() {
                    Some("include") => crate::models::FilterMode::Include,
                    _ => crate::models::FilterMode::Exclude,
                };
                ChatAction::FilterByIngredients {
                    filter: IngredientFilter { ingredients, mode },
                    categories,
                }
            }
        }
        Some("greeting") | Some("greet") => ChatAction::Greeting,
        Some("bye") | Some("goodbye") => ChatAction::Bye,
        _ => ChatAction::Fallback,
    };

    IntentResult::new(action, reply_text)
}

fn parse_categories(raw: Option<OneOrMany>) -> Vec<MenuCategory> {
    raw.map(OneOrMany::into_vec)
        .unwrap_or_default()
        .iter()
        .filter_map(|name| MenuCategory::parse(name))
        .collect()
}

// ── Deterministic override ──

/// Local exclusion detection beats the model when the model proposed
/// nothing actionable: a browse answer (or a model-declared fallback) with
/// an exclusion phrase in the message becomes an exclusion filter. Answers
/// carrying order lines keep their intent, the phrase is a per-item
/// customization there. A parse failure is never overridden; that fallback
/// contract stays intact.
fn apply_exclusion_override(
    result: IntentResult,
    excluded: &[String],
    language: Language,
) -> IntentResult {
    if excluded.is_empty() {
        return result;
    }

    match result.action {
        ChatAction::MenuBrowsing { categories } => IntentResult::new(
            ChatAction::FilterByIngredients {
                filter: IngredientFilter::exclude(excluded.to_vec()),
                categories,
            },
            exclusion_reply(excluded, language),
        ),
        ChatAction::Fallback => IntentResult::new(
            ChatAction::FilterByIngredients {
                filter: IngredientFilter::exclude(excluded.to_vec()),
                categories: vec![],
            },
            exclusion_reply(excluded, language),
        ),
        ChatAction::FilterByIngredients {
            mut filter,
            categories,
        } if filter.mode == crate::models::FilterMode::Exclude => {
            for ingredient in excluded {
                if !filter.ingredients.iter().any(|i| i == ingredient) {
                    filter.ingredients.push(ingredient.clone());
                }
            }
            IntentResult::new(
                ChatAction::FilterByIngredients { filter, categories },
                result.reply,
            )
        }
        other => IntentResult::new(other, result.reply),
    }
}

fn apology(language: Language) -> String {
    match language {
        Language::En => "Sorry, I had trouble with that. Could you please try again?".to_string(),
        Language::Hi => "माफ़ कीजिए, कुछ गड़बड़ हो गई। कृपया दोबारा कोशिश करें।".to_string(),
    }
}

fn exclusion_reply(excluded: &[String], language: Language) -> String {
    let list = excluded.join(", ");
    match language {
        Language::En => format!("Here are our dishes without {list}."),
        Language::Hi => format!("बिना {list} के व्यंजन ये रहे।"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterMode;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticLlm {
        response: String,
    }

    #[async_trait]
    impl LlmProvider for StaticLlm {
        async fn chat(
            &self,
            _system_prompt: &str,
            _messages: &[crate::services::ai::Message],
        ) -> anyhow::Result<String> {
            Ok(self.response.clone())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn chat(
            &self,
            _system_prompt: &str,
            _messages: &[crate::services::ai::Message],
        ) -> anyhow::Result<String> {
            anyhow::bail!("connection timed out")
        }
    }

    struct RecordingLlm {
        response: String,
        seen: Mutex<Vec<crate::services::ai::Message>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn chat(
            &self,
            _system_prompt: &str,
            messages: &[crate::services::ai::Message],
        ) -> anyhow::Result<String> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok(self.response.clone())
        }
    }

    fn ctx<'a>(
        history: &'a [ConversationTurn],
        suggested: &'a [String],
        language: Language,
    ) -> ChatContext<'a> {
        ChatContext {
            menu: &[],
            categories: &[],
            history,
            suggested_items: suggested,
            language,
        }
    }

    #[tokio::test]
    async fn test_exclusion_overrides_menu_browsing() {
        let llm = StaticLlm {
            response: r#"{"intent":"menu_browsing","reply":"Here is our menu."}"#.to_string(),
        };
        let result = resolve_intent(&llm, &ctx(&[], &[], Language::En), "show me dishes without onion").await;

        match result.action {
            ChatAction::FilterByIngredients { filter, .. } => {
                assert_eq!(filter.mode, FilterMode::Exclude);
                assert!(filter.ingredients.iter().any(|i| i == "onion"));
            }
            other => panic!("expected filter_by_ingredients, got {other:?}"),
        }
        assert!(result.reply.contains("without onion"));
    }

    #[tokio::test]
    async fn test_devanagari_exclusion_overrides_regardless_of_model() {
        let llm = StaticLlm {
            response: r#"{"intent":"menu_browsing","category":"Chinese","reply":"ये रहा मेन्यू।"}"#
                .to_string(),
        };
        let result = resolve_intent(
            &llm,
            &ctx(&[], &[], Language::Hi),
            "बिना लहसुन प्याज़ के ऑप्शंस दिखाओ",
        )
        .await;

        match result.action {
            ChatAction::FilterByIngredients { filter, categories } => {
                assert_eq!(filter.mode, FilterMode::Exclude);
                assert!(filter.ingredients.iter().any(|i| i == "onion"));
                assert!(filter.ingredients.iter().any(|i| i == "garlic"));
                // the model's own (valid) category answer is kept
                assert_eq!(categories, vec![MenuCategory::Chinese]);
            }
            other => panic!("expected filter_by_ingredients, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exclusion_does_not_override_order() {
        let llm = StaticLlm {
            response: r#"{"intent":"order_item","items":[{"name":"Paneer Tikka","quantity":1,"specialInstructions":"without onion"}],"reply":"One Paneer Tikka without onion."}"#
                .to_string(),
        };
        let result = resolve_intent(
            &llm,
            &ctx(&[], &[], Language::En),
            "1 paneer tikka without onion",
        )
        .await;

        assert_eq!(result.intent(), "order_item");
        let items = result.action.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].special_instructions, "without onion");
    }

    #[tokio::test]
    async fn test_multi_item_order_extraction() {
        let llm = StaticLlm {
            response: r#"{"intent":"order_item","items":[{"name":"Masala Dosa","quantity":2,"specialInstructions":"less spicy"},{"name":"Paneer Tikka","quantity":1,"specialInstructions":"without onion"}],"reply":"Coming right up!"}"#
                .to_string(),
        };
        let result = resolve_intent(
            &llm,
            &ctx(&[], &[], Language::En),
            "I want 2 masala dosa less spicy and 1 paneer tikka without onion",
        )
        .await;

        assert_eq!(result.intent(), "order_item");
        let items = result.action.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Masala Dosa");
        assert_eq!(items[0].quantity, 2);
        assert!(items[0].special_instructions.contains("less spicy"));
        assert_eq!(items[1].name, "Paneer Tikka");
        assert_eq!(items[1].quantity, 1);
        assert!(items[1].special_instructions.contains("without onion"));
    }

    #[tokio::test]
    async fn test_invalid_json_becomes_fallback() {
        let llm = StaticLlm {
            response: "I'm not sure what you mean by that.".to_string(),
        };
        let result = resolve_intent(&llm, &ctx(&[], &[], Language::En), "blorp").await;

        assert_eq!(result.intent(), "fallback");
        assert!(result.action.items().is_empty());
        assert_eq!(result.reply, "I'm not sure what you mean by that.");
    }

    #[tokio::test]
    async fn test_gateway_failure_becomes_fallback() {
        let result = resolve_intent(&FailingLlm, &ctx(&[], &[], Language::En), "hello").await;

        assert_eq!(result.intent(), "fallback");
        assert!(result.action.items().is_empty());
        assert!(!result.reply.is_empty());
    }

    #[tokio::test]
    async fn test_vague_reference_asserts_single_candidate() {
        let history = vec![
            ConversationTurn::user("kuch halka suggest karo"),
            ConversationTurn::assistant("How about Idli?", vec!["Idli".to_string()]),
        ];
        let llm = RecordingLlm {
            response:
                r#"{"intent":"order_item","items":[{"name":"Idli","quantity":1}],"reply":"One Idli!"}"#
                    .to_string(),
            seen: Mutex::new(vec![]),
        };

        let result = resolve_intent(
            &llm,
            &ctx(&history, &[], Language::Hi),
            "mujhe yeh order karna hai",
        )
        .await;

        let seen = llm.seen.lock().unwrap();
        let outbound = &seen.last().unwrap().content;
        assert!(outbound.contains("Idli"), "prompt not annotated: {outbound}");
        assert!(outbound.contains("requested dish"));

        assert_eq!(result.intent(), "order_item");
        assert_eq!(result.action.items()[0].name, "Idli");
    }

    #[tokio::test]
    async fn test_vague_reference_multiple_candidates_asks_to_choose() {
        let history = vec![ConversationTurn::assistant(
            "Idli or Masala Dosa?",
            vec!["Idli".to_string(), "Masala Dosa".to_string()],
        )];
        let llm = RecordingLlm {
            response: r#"{"intent":"fallback","reply":"Which one would you like, Idli or Masala Dosa?"}"#
                .to_string(),
            seen: Mutex::new(vec![]),
        };

        resolve_intent(&llm, &ctx(&history, &[], Language::En), "order this").await;

        let seen = llm.seen.lock().unwrap();
        let outbound = &seen.last().unwrap().content;
        assert!(outbound.contains("Ask which one"), "got: {outbound}");
    }

    #[tokio::test]
    async fn test_vague_reference_without_candidates_asks_for_name() {
        let llm = RecordingLlm {
            response: r#"{"intent":"fallback","reply":"Which dish do you mean?"}"#.to_string(),
            seen: Mutex::new(vec![]),
        };

        resolve_intent(&llm, &ctx(&[], &[], Language::En), "order this").await;

        let seen = llm.seen.lock().unwrap();
        let outbound = &seen.last().unwrap().content;
        assert!(outbound.contains("name the dish explicitly"), "got: {outbound}");
    }

    #[test]
    fn test_last_suggested_prefers_history_over_hint() {
        let history = vec![
            ConversationTurn::assistant("Try the Spring Rolls!", vec!["Spring Rolls".to_string()]),
            ConversationTurn::user("kuch aur?"),
            ConversationTurn::assistant("How about Idli?", vec!["Idli".to_string()]),
        ];
        let hint = vec!["Cold Coffee".to_string()];
        assert_eq!(last_suggested(&history, &hint), ["Idli"]);
    }

    #[test]
    fn test_last_suggested_falls_back_to_hint() {
        let history = vec![ConversationTurn::assistant("Hello!", vec![])];
        let hint = vec!["Cold Coffee".to_string()];
        assert_eq!(last_suggested(&history, &hint), ["Cold Coffee"]);
        assert!(last_suggested(&history, &[]).is_empty());
    }

    #[test]
    fn test_parse_fenced_reply() {
        let fenced = "```json\n{\"intent\":\"greeting\",\"reply\":\"Namaste!\"}\n```";
        let reply = parse_model_reply(fenced).unwrap();
        assert_eq!(reply.intent.as_deref(), Some("greeting"));
    }

    #[test]
    fn test_parse_reply_embedded_in_prose() {
        let prose = "Sure! Here you go: {\"intent\":\"bye\",\"reply\":\"Goodbye!\"} Anything else?";
        let reply = parse_model_reply(prose).unwrap();
        assert_eq!(reply.intent.as_deref(), Some("bye"));
    }

    #[test]
    fn test_validate_drops_invented_categories() {
        let reply = ModelReply {
            intent: Some("menu_browsing".to_string()),
            items: vec![],
            ingredient: None,
            mode: None,
            category: Some(OneOrMany::Many(vec![
                "Pizza".to_string(),
                "south indian".to_string(),
            ])),
            reply: Some("Sure.".to_string()),
        };
        let result = validate_reply(reply, None, Language::En);
        assert_eq!(result.action.categories(), [MenuCategory::SouthIndian]);
    }

    #[test]
    fn test_validate_fills_ingredient_from_question_hint() {
        let reply = ModelReply {
            intent: Some("ingredient_query".to_string()),
            items: vec![RequestedItem::new("Masala Dosa", 1)],
            ingredient: None,
            mode: None,
            category: None,
            reply: Some("Let me check.".to_string()),
        };
        let result = validate_reply(reply, Some("onion"), Language::En);
        match result.action {
            ChatAction::IngredientQuery { ingredient, items } => {
                assert_eq!(ingredient, "onion");
                assert_eq!(items[0].name, "Masala Dosa");
            }
            other => panic!("expected ingredient_query, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_unknown_intent_is_fallback() {
        let reply = ModelReply {
            intent: Some("make_reservation".to_string()),
            items: vec![],
            ingredient: None,
            mode: None,
            category: None,
            reply: Some("We don't take reservations.".to_string()),
        };
        let result = validate_reply(reply, None, Language::En);
        assert_eq!(result.intent(), "fallback");
        assert_eq!(result.reply, "We don't take reservations.");
    }

    #[test]
    fn test_validate_order_without_items_is_fallback() {
        let reply = ModelReply {
            intent: Some("order_item".to_string()),
            items: vec![],
            ingredient: None,
            mode: None,
            category: None,
            reply: Some("What would you like?".to_string()),
        };
        let result = validate_reply(reply, None, Language::En);
        assert_eq!(result.intent(), "fallback");
    }

    #[test]
    fn test_validate_empty_reply_gets_apology() {
        let reply = ModelReply {
            intent: Some("greeting".to_string()),
            items: vec![],
            ingredient: None,
            mode: None,
            category: None,
            reply: Some("   ".to_string()),
        };
        let result = validate_reply(reply, None, Language::En);
        assert_eq!(result.intent(), "greeting");
        assert!(!result.reply.trim().is_empty());
    }
}
