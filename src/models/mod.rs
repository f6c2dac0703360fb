pub mod capital;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod store;
pub mod user;
