use bitcode::{Decode, Encode};
use redb::TableDefinition;

// Key: target list id, Value: bitcode TargetListSchema
pub const TARGET_LIST_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("target_lists");

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TargetListSchema {
    pub id: u64,
    pub name: String,
    pub created_ms: i64,
    pub targets: Vec<u64>,
}
