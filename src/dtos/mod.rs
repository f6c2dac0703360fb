pub mod auth;
pub mod capital;
pub mod employee;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod role;
pub mod store;
pub mod user;
