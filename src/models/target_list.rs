use chrono::{DateTime, Utc};

use crate::database::schema::target_list::TargetListSchema;
use crate::models::target::millis_to_datetime;

/// A named grouping of targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetList {
    pub id: u64,
    pub name: String,
    pub created: DateTime<Utc>,
    pub targets: Vec<u64>,
}

impl From<TargetListSchema> for TargetList {
    fn from(schema: TargetListSchema) -> Self {
        TargetList {
            id: schema.id,
            name: schema.name,
            created: millis_to_datetime(schema.created_ms),
            targets: schema.targets,
        }
    }
}
