use bitcode::{Decode, Encode};
use redb::TableDefinition;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// Key: target id (insertion sequence), Value: bitcode TargetSchema
pub const TARGET_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("targets");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum TargetKind {
    Sidereal,
    NonSidereal,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Sidereal => write!(f, "SIDEREAL"),
            TargetKind::NonSidereal => write!(f, "NON_SIDEREAL"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIDEREAL" => Ok(TargetKind::Sidereal),
            "NON_SIDEREAL" => Ok(TargetKind::NonSidereal),
            _ => Err(format!("Invalid TargetKind: {}", s)),
        }
    }
}

/// Stored form of a target extra; dates are kept as unix milliseconds.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum ExtraValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateMs(i64),
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct TargetSchema {
    pub id: u64,
    pub name: String,
    pub kind: TargetKind,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub epoch: Option<f64>,
    pub created_ms: i64,
    pub modified_ms: i64,
    pub aliases: Vec<String>,
    pub extra: BTreeMap<String, ExtraValue>,
}
