use bitcode::{Decode, Encode};
use redb::TableDefinition;
use std::collections::BTreeSet;

// Key: username, Value: bitcode UserSchema
pub const USER_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct UserSchema {
    pub username: String,
    /// blake3 digest of the password
    pub password_hash: [u8; 32],
    pub is_superuser: bool,
    pub permissions: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}
