use crate::models::menu::ALL_CATEGORIES;
use crate::models::{Category, ConversationTurn, MenuItem};
use crate::services::ai::knowledge::knowledge_prompt_section;
use crate::services::ai::Message;

/// Turns of history sent to the model; older turns are dropped.
pub const MAX_HISTORY_TURNS: usize = 4;

const SYSTEM_PROMPT: &str = r#"You are the AI waiter for the Shrimaya restaurant. You help guests browse the menu, answer ingredient questions and take orders, in English or Hindi, matching the guest's language.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "intent": "order_item|cancel_order|ask_price|customize_order|menu_browsing|ingredient_query|filter_by_ingredients|greeting|bye|fallback",
  "items": [{ "name": "Item Name", "quantity": 2, "specialInstructions": "less spicy" }],
  "ingredient": "onion",
  "mode": "include|exclude",
  "category": "South Indian",
  "reply": "Your response to the guest."
}

Intent rules:
- "order_item": the guest wants to order one or more dishes; extract every dish with its quantity and any special instructions.
- "cancel_order": the guest wants to cancel an order or drop a dish.
- "ask_price": the guest asks what a dish costs.
- "customize_order": the guest wants to change a dish they already ordered.
- "menu_browsing": the guest wants to see the menu or a category of it.
- "ingredient_query": the guest asks whether a dish contains an ingredient; set "ingredient".
- "filter_by_ingredients": the guest wants dishes with or without an ingredient; set "ingredient" and "mode".
- "greeting" / "bye": salutations only.
- "fallback": you cannot determine what the guest wants.

Only use dish names from the menu below. Only use categories from the category list. Omit "items", "ingredient", "mode" and "category" when they do not apply. Quantities default to 1. Keep replies short and warm."#;

/// System prompt: fixed rules + category enumeration + ingredient
/// knowledge + the live menu grouped by category.
pub fn build_system_prompt(menu: &[MenuItem], categories: &[Category]) -> String {
    let category_names: Vec<&str> = ALL_CATEGORIES.iter().map(|c| c.as_str()).collect();

    let mut menu_lines = Vec::new();
    for category in categories {
        let mut items: Vec<&MenuItem> = menu
            .iter()
            .filter(|i| i.category_id == category.id && i.available)
            .collect();
        if items.is_empty() {
            continue;
        }
        items.sort_by(|a, b| a.name.en.cmp(&b.name.en));

        menu_lines.push(format!("{}:", category.name));
        for item in items {
            let name = match &item.name.hi {
                Some(hi) => format!("{} / {hi}", item.name.en),
                None => item.name.en.clone(),
            };
            menu_lines.push(format!("- {name}: ₹{:.0}", item.price));
        }
    }

    format!(
        "{SYSTEM_PROMPT}\n\nCategories: {}.\n\nIngredient knowledge:\n{}\n\nMenu:\n{}",
        category_names.join(", "),
        knowledge_prompt_section(),
        menu_lines.join("\n"),
    )
}

/// Role-tagged history (most recent [`MAX_HISTORY_TURNS`] turns) followed by
/// the current, possibly annotated, user message.
pub fn build_messages(history: &[ConversationTurn], user_message: &str) -> Vec<Message> {
    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut messages: Vec<Message> = history[start..]
        .iter()
        .map(|turn| Message {
            role: turn.role.clone(),
            content: turn.content.clone(),
        })
        .collect();

    messages.push(Message {
        role: "user".to_string(),
        content: user_message.to_string(),
    });

    messages
}
