pub mod ops;
pub mod schema;
