pub mod grant;
pub mod target;
pub mod target_list;
pub mod user;
