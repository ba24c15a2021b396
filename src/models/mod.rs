pub mod cart;
pub mod chat;
pub mod intent;
pub mod menu;
pub mod order;

pub use cart::{Cart, CartItem};
pub use chat::{ConversationTurn, Language};
pub use intent::{ChatAction, FilterMode, IngredientFilter, IntentResult, RequestedItem};
pub use menu::{Category, LocalizedName, LocalizedText, MenuCategory, MenuItem};
pub use order::{Order, OrderItem, OrderStatus};
