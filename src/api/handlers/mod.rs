pub mod auth;
pub mod targets;
