use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Cart, CartItem, Category, LocalizedName, LocalizedText, Language, MenuItem, Order, OrderItem,
    OrderStatus,
};

// ── Categories ──

pub fn list_categories(conn: &Connection) -> anyhow::Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM categories ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    })?;

    let mut categories = vec![];
    for row in rows {
        categories.push(row?);
    }
    Ok(categories)
}

pub fn get_category_by_name(conn: &Connection, name: &str) -> anyhow::Result<Option<Category>> {
    let result = conn.query_row(
        "SELECT id, name, description FROM categories WHERE lower(name) = lower(?1)",
        params![name.trim()],
        |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        },
    );

    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_or_create_category(conn: &Connection, name: &str) -> anyhow::Result<i64> {
    if let Some(existing) = get_category_by_name(conn, name)? {
        return Ok(existing.id);
    }
    conn.execute(
        "INSERT INTO categories (name) VALUES (?1)",
        params![name.trim()],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Menu items ──

pub fn insert_menu_item(conn: &Connection, item: &MenuItem) -> anyhow::Result<()> {
    let created_at = item.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = item.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO menu_items (id, name_en, name_hi, description_en, description_hi, price, category_id, tags, ingredients, allergens, available, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            item.id,
            item.name.en,
            item.name.hi,
            item.description.en,
            item.description.hi,
            item.price,
            item.category_id,
            serde_json::to_string(&item.tags)?,
            serde_json::to_string(&item.ingredients)?,
            serde_json::to_string(&item.allergens)?,
            item.available as i32,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

const MENU_ITEM_COLUMNS: &str = "id, name_en, name_hi, description_en, description_hi, price, category_id, tags, ingredients, allergens, available, created_at, updated_at";

pub fn list_menu_items(conn: &Connection) -> anyhow::Result<Vec<MenuItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MENU_ITEM_COLUMNS} FROM menu_items ORDER BY category_id ASC, name_en ASC",
    ))?;
    let rows = stmt.query_map([], |row| Ok(parse_menu_item_row(row)))?;

    let mut items = vec![];
    for row in rows {
        items.push(row??);
    }
    Ok(items)
}

pub fn get_menu_item(conn: &Connection, id: &str) -> anyhow::Result<Option<MenuItem>> {
    let result = conn.query_row(
        &format!("SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = ?1"),
        params![id],
        |row| Ok(parse_menu_item_row(row)),
    );

    match result {
        Ok(item) => Ok(Some(item?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Localized-name lookup: case-insensitive exact match first, then
/// substring, English then Hindi.
pub fn find_menu_item_by_name(conn: &Connection, name: &str) -> anyhow::Result<Option<MenuItem>> {
    let wanted = name.trim();
    if wanted.is_empty() {
        return Ok(None);
    }

    let exact = conn.query_row(
        &format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items
             WHERE lower(name_en) = lower(?1) OR name_hi = ?1",
        ),
        params![wanted],
        |row| Ok(parse_menu_item_row(row)),
    );
    match exact {
        Ok(item) => return Ok(Some(item?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => {}
        Err(e) => return Err(e.into()),
    }

    let partial = conn.query_row(
        &format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items
             WHERE instr(lower(name_en), lower(?1)) > 0 OR instr(name_hi, ?1) > 0
             ORDER BY name_en ASC",
        ),
        params![wanted],
        |row| Ok(parse_menu_item_row(row)),
    );
    match partial {
        Ok(item) => Ok(Some(item?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_menu_item_row(row: &rusqlite::Row) -> anyhow::Result<MenuItem> {
    let id: String = row.get(0)?;
    let name_en: String = row.get(1)?;
    let name_hi: Option<String> = row.get(2)?;
    let description_en: Option<String> = row.get(3)?;
    let description_hi: Option<String> = row.get(4)?;
    let price: f64 = row.get(5)?;
    let category_id: i64 = row.get(6)?;
    let tags_json: String = row.get(7)?;
    let ingredients_json: String = row.get(8)?;
    let allergens_json: String = row.get(9)?;
    let available: bool = row.get::<_, i32>(10)? != 0;
    let created_at_str: String = row.get(11)?;
    let updated_at_str: String = row.get(12)?;

    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(MenuItem {
        id,
        name: LocalizedName {
            en: name_en,
            hi: name_hi,
        },
        description: LocalizedText {
            en: description_en,
            hi: description_hi,
        },
        price,
        category_id,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        ingredients: serde_json::from_str(&ingredients_json).unwrap_or_default(),
        allergens: serde_json::from_str(&allergens_json).unwrap_or_default(),
        available,
        created_at,
        updated_at,
    })
}

// ── Carts ──

pub fn get_cart(conn: &Connection, table_id: &str) -> anyhow::Result<Option<Cart>> {
    let result = conn.query_row(
        "SELECT table_id, items FROM carts WHERE table_id = ?1",
        params![table_id],
        |row| {
            let table_id: String = row.get(0)?;
            let items_json: String = row.get(1)?;
            Ok((table_id, items_json))
        },
    );

    match result {
        Ok((table_id, items_json)) => {
            let items: Vec<CartItem> = serde_json::from_str(&items_json).unwrap_or_default();
            Ok(Some(Cart { table_id, items }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_cart(conn: &Connection, cart: &Cart) -> anyhow::Result<()> {
    let items_json = serde_json::to_string(&cart.items)?;
    conn.execute(
        "INSERT INTO carts (table_id, items, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(table_id) DO UPDATE SET
           items = excluded.items,
           updated_at = excluded.updated_at",
        params![cart.table_id, items_json],
    )?;
    Ok(())
}

pub fn clear_cart(conn: &Connection, table_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE carts SET items = '[]', updated_at = datetime('now') WHERE table_id = ?1",
        params![table_id],
    )?;
    Ok(())
}

// ── Orders ──

pub fn create_order(conn: &Connection, order: &Order) -> anyhow::Result<()> {
    let items_json = serde_json::to_string(&order.items)?;
    let created_at = order.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = order.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO orders (id, table_id, items, language, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            order.id,
            order.table_id,
            items_json,
            order.language.as_str(),
            order.status.as_str(),
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn list_orders(conn: &Connection) -> anyhow::Result<Vec<Order>> {
    let mut stmt = conn.prepare(
        "SELECT id, table_id, items, language, status, created_at, updated_at
         FROM orders ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_order_row(row)))?;

    let mut orders = vec![];
    for row in rows {
        orders.push(row??);
    }
    Ok(orders)
}

pub fn get_order(conn: &Connection, id: &str) -> anyhow::Result<Option<Order>> {
    let result = conn.query_row(
        "SELECT id, table_id, items, language, status, created_at, updated_at
         FROM orders WHERE id = ?1",
        params![id],
        |row| Ok(parse_order_row(row)),
    );

    match result {
        Ok(order) => Ok(Some(order?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_order_status(conn: &Connection, id: &str, status: &OrderStatus) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_order_row(row: &rusqlite::Row) -> anyhow::Result<Order> {
    let id: String = row.get(0)?;
    let table_id: String = row.get(1)?;
    let items_json: String = row.get(2)?;
    let language_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    let items: Vec<OrderItem> = serde_json::from_str(&items_json).unwrap_or_default();
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Order {
        id,
        table_id,
        items,
        language: Language::parse(&language_str),
        status: OrderStatus::parse(&status_str),
        created_at,
        updated_at,
    })
}
