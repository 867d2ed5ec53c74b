pub mod auth;
pub mod categories;
pub mod goals;
pub mod health;
pub mod moods;
pub mod theme;
