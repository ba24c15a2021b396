//! Static dish-to-ingredients knowledge handed to the model as prompt
//! context. Loaded once, never mutated.

pub const INGREDIENT_KNOWLEDGE: &[(&str, &[&str])] = &[
    (
        "Masala Dosa",
        &[
            "rice",
            "urad dal",
            "fenugreek seeds",
            "poha",
            "potatoes",
            "onion",
            "mustard seeds",
            "curry leaves",
            "green chili",
            "turmeric",
            "salt",
            "ginger",
            "oil",
        ],
    ),
    (
        "Paneer Butter Masala",
        &[
            "paneer",
            "tomatoes",
            "cashew paste",
            "ginger",
            "garlic",
            "butter",
            "fresh cream",
            "turmeric",
            "red chili powder",
            "garam masala",
            "kasuri methi",
            "salt",
            "olive oil",
        ],
    ),
    (
        "Szechwan Noodles",
        &[
            "whole wheat noodles",
            "garlic",
            "ginger",
            "spring onion",
            "carrot",
            "capsicum",
            "cabbage",
            "soy sauce",
            "vinegar",
            "szechwan sauce",
            "olive oil",
        ],
    ),
    (
        "Spring Rolls",
        &[
            "whole wheat wrappers",
            "cabbage",
            "carrot",
            "beans",
            "spring onion",
            "soy sauce",
            "black pepper",
            "olive oil",
        ],
    ),
    (
        "Idli",
        &["rice", "urad dal", "fenugreek seeds", "poha", "water", "salt"],
    ),
    (
        "Chole Bhature",
        &[
            "chickpeas",
            "onion",
            "tomato",
            "garlic",
            "ginger",
            "chole masala",
            "whole wheat flour",
            "curd",
            "baking soda",
            "salt",
            "olive oil",
        ],
    ),
    ("Cold Coffee", &["milk", "coffee", "jaggery", "ice cubes"]),
    (
        "Veg Biryani",
        &[
            "brown basmati rice",
            "carrot",
            "beans",
            "peas",
            "potatoes",
            "curd",
            "mint",
            "coriander",
            "biryani masala",
            "saffron",
            "olive oil",
        ],
    ),
];

/// Renders the table as a prompt section.
pub fn knowledge_prompt_section() -> String {
    let mut lines = Vec::with_capacity(INGREDIENT_KNOWLEDGE.len());
    for (dish, ingredients) in INGREDIENT_KNOWLEDGE {
        lines.push(format!("- {dish}: {}", ingredients.join(", ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_section_lists_every_dish() {
        let section = knowledge_prompt_section();
        for (dish, _) in INGREDIENT_KNOWLEDGE {
            assert!(section.contains(dish), "missing {dish}");
        }
        assert!(section.contains("- Idli: rice, urad dal"));
    }
}
