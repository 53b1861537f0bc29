use std::collections::BTreeSet;

use crate::database::schema::grant::{group_principal, user_principal};
use crate::database::schema::user::UserSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub is_superuser: bool,
    pub permissions: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}

impl User {
    /// Superusers implicitly hold every capability.
    pub fn has_perm(&self, capability: &str) -> bool {
        self.is_superuser || self.permissions.contains(capability)
    }

    /// Every grant principal this user acts as.
    pub fn principals(&self) -> Vec<String> {
        std::iter::once(user_principal(&self.username))
            .chain(self.groups.iter().map(|group| group_principal(group)))
            .collect()
    }
}

impl From<UserSchema> for User {
    fn from(schema: UserSchema) -> Self {
        User {
            username: schema.username,
            is_superuser: schema.is_superuser,
            permissions: schema.permissions,
            groups: schema.groups,
        }
    }
}

pub fn hash_password(password: &str) -> [u8; 32] {
    *blake3::hash(password.as_bytes()).as_bytes()
}

impl UserSchema {
    pub fn verify_password(&self, password: &str) -> bool {
        blake3::Hash::from(self.password_hash) == blake3::hash(password.as_bytes())
    }
}
