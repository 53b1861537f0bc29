pub mod filter;
pub mod listing;
pub mod scalar;
pub mod target;
pub mod target_list;
pub mod user;
