//! Menu-side post-processing of a resolved intent: attaching store data to
//! item references and turning category/ingredient filters into matches.

use rusqlite::Connection;

use crate::db::queries;
use crate::models::{
    Category, FilterMode, IngredientFilter, MenuCategory, MenuItem, RequestedItem,
};

/// Resolves each requested item against the store by localized name,
/// attaching the store id, canonical English name and price. Names that
/// match nothing pass through unchanged so the caller can still present
/// them. Running this twice yields the same items.
pub fn enrich_items(conn: &Connection, items: &mut [RequestedItem]) -> anyhow::Result<()> {
    for item in items.iter_mut() {
        match queries::find_menu_item_by_name(conn, &item.name)? {
            Some(menu_item) => {
                item.menu_item_id = Some(menu_item.id);
                item.name = menu_item.name.en;
                item.price = Some(menu_item.price);
            }
            None => {
                tracing::warn!(name = %item.name, "menu item not found during enrichment");
            }
        }
    }
    Ok(())
}

/// Maps fixed-enumeration categories to their store rows. Categories with
/// no store row are skipped, which surfaces as zero matches downstream.
pub fn resolve_categories(
    conn: &Connection,
    categories: &[MenuCategory],
) -> anyhow::Result<Vec<Category>> {
    let mut resolved = Vec::with_capacity(categories.len());
    for category in categories {
        if let Some(row) = queries::get_category_by_name(conn, category.as_str())? {
            resolved.push(row);
        }
    }
    Ok(resolved)
}

/// Available menu items under the given categories (all when empty) that
/// satisfy the ingredient filter. Exclude keeps items containing none of
/// the listed ingredients; include keeps items containing all of them.
pub fn filter_menu(
    menu: &[MenuItem],
    filter: Option<&IngredientFilter>,
    category_ids: &[i64],
) -> Vec<MenuItem> {
    menu.iter()
        .filter(|item| item.available)
        .filter(|item| category_ids.is_empty() || category_ids.contains(&item.category_id))
        .filter(|item| match filter {
            None => true,
            Some(f) => {
                let has = |wanted: &str| {
                    item.ingredients
                        .iter()
                        .any(|i| i.to_lowercase().contains(&wanted.to_lowercase()))
                };
                match f.mode {
                    FilterMode::Exclude => !f.ingredients.iter().any(|w| has(w)),
                    FilterMode::Include => f.ingredients.iter().all(|w| has(w)),
                }
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::menu::{LocalizedName, LocalizedText};
    use chrono::Utc;

    fn seeded_conn() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        let dosa = menu_item("Masala Dosa", Some("मसाला डोसा"), 120.0, 1, &["rice", "onion"]);
        let idli = menu_item("Idli", Some("इडली"), 60.0, 1, &["rice", "urad dal"]);
        queries::insert_menu_item(&conn, &dosa).unwrap();
        queries::insert_menu_item(&conn, &idli).unwrap();
        conn
    }

    fn menu_item(
        name_en: &str,
        name_hi: Option<&str>,
        price: f64,
        category_id: i64,
        ingredients: &[&str],
    ) -> MenuItem {
        let now = Utc::now().naive_utc();
        MenuItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: LocalizedName {
                en: name_en.to_string(),
                hi: name_hi.map(|s| s.to_string()),
            },
            description: LocalizedText::default(),
            price,
            category_id,
            tags: vec![],
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            allergens: vec![],
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_enrich_exact_match_attaches_store_data() {
        let conn = seeded_conn();
        let mut items = vec![RequestedItem::new("masala dosa", 2)];
        enrich_items(&conn, &mut items).unwrap();

        assert_eq!(items[0].name, "Masala Dosa");
        assert!(items[0].menu_item_id.is_some());
        assert_eq!(items[0].price, Some(120.0));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_enrich_substring_and_hindi_match() {
        let conn = seeded_conn();
        let mut items = vec![RequestedItem::new("dosa", 1), RequestedItem::new("इडली", 1)];
        enrich_items(&conn, &mut items).unwrap();

        assert_eq!(items[0].name, "Masala Dosa");
        assert_eq!(items[1].name, "Idli");
        assert_eq!(items[1].price, Some(60.0));
    }

    #[test]
    fn test_enrich_unmatched_passes_through() {
        let conn = seeded_conn();
        let mut items = vec![RequestedItem::new("Sushi Platter", 1)];
        enrich_items(&conn, &mut items).unwrap();

        assert_eq!(items[0].name, "Sushi Platter");
        assert!(items[0].menu_item_id.is_none());
        assert!(items[0].price.is_none());
    }

    #[test]
    fn test_enrich_is_idempotent() {
        let conn = seeded_conn();
        let mut items = vec![RequestedItem::new("Masala Dosa", 1), RequestedItem::new("Sushi", 1)];
        enrich_items(&conn, &mut items).unwrap();
        let first_pass = items.clone();
        enrich_items(&conn, &mut items).unwrap();
        assert_eq!(items, first_pass);
    }

    #[test]
    fn test_resolve_categories_only_seeded_rows() {
        let conn = db::init_db(":memory:").unwrap();
        let resolved =
            resolve_categories(&conn, &[MenuCategory::SouthIndian, MenuCategory::Chinese]).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "South Indian");
    }

    #[test]
    fn test_filter_menu_exclude_mode() {
        let menu = vec![
            menu_item("Masala Dosa", None, 120.0, 1, &["rice", "onion"]),
            menu_item("Idli", None, 60.0, 1, &["rice", "urad dal"]),
        ];
        let filter = IngredientFilter::exclude(vec!["onion".to_string()]);
        let matches = filter_menu(&menu, Some(&filter), &[]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name.en, "Idli");
    }

    #[test]
    fn test_filter_menu_exclude_matches_compound_ingredients() {
        let menu = vec![menu_item(
            "Spring Rolls",
            None,
            90.0,
            2,
            &["cabbage", "spring onion"],
        )];
        let filter = IngredientFilter::exclude(vec!["onion".to_string()]);
        assert!(filter_menu(&menu, Some(&filter), &[]).is_empty());
    }

    #[test]
    fn test_filter_menu_include_mode() {
        let menu = vec![
            menu_item("Masala Dosa", None, 120.0, 1, &["rice", "onion"]),
            menu_item("Idli", None, 60.0, 1, &["rice", "urad dal"]),
        ];
        let filter = IngredientFilter {
            ingredients: vec!["rice".to_string(), "onion".to_string()],
            mode: FilterMode::Include,
        };
        let matches = filter_menu(&menu, Some(&filter), &[]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name.en, "Masala Dosa");
    }

    #[test]
    fn test_filter_menu_by_category() {
        let menu = vec![
            menu_item("Masala Dosa", None, 120.0, 1, &[]),
            menu_item("Szechwan Noodles", None, 150.0, 2, &[]),
        ];
        let matches = filter_menu(&menu, None, &[2]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name.en, "Szechwan Noodles");
    }

    #[test]
    fn test_filter_menu_skips_unavailable() {
        let mut sold_out = menu_item("Masala Dosa", None, 120.0, 1, &[]);
        sold_out.available = false;
        assert!(filter_menu(&[sold_out], None, &[]).is_empty());
    }
}
