pub mod category;
pub mod goal;
pub mod mood;
pub mod theme;
pub mod timestamp;
pub mod user;
