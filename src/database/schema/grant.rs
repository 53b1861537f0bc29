use redb::TableDefinition;

// Key: (principal, target id), Value: ()
// A principal is either `user:<name>` or `group:<name>`.
pub const TARGET_GRANT_TABLE: TableDefinition<(&str, u64), ()> =
    TableDefinition::new("target_grants");

pub fn user_principal(username: &str) -> String {
    format!("user:{}", username)
}

pub fn group_principal(group: &str) -> String {
    format!("group:{}", group)
}
