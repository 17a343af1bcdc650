pub mod drivers;
pub mod health;
pub mod menus;
pub mod merchants;
pub mod users;
