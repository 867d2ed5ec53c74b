pub mod jwt;
pub mod middleware;
pub mod submission_guard;
