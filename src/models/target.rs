use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::database::schema::target::{ExtraValue, TargetKind, TargetSchema};
use crate::models::scalar::Scalar;

/// Column names every target answers to, independent of its extras.
pub const BUILTIN_COLUMNS: &[&str] = &[
    "id", "name", "type", "ra", "dec", "epoch", "created", "modified", "aliases",
];

/// Prefix addressing a target extra as a column, e.g. `extra.redshift`.
pub const EXTRA_PREFIX: &str = "extra.";

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: u64,
    pub name: String,
    pub kind: TargetKind,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub epoch: Option<f64>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub aliases: Vec<String>,
    pub extra: BTreeMap<String, Scalar>,
}

impl Target {
    /// Whether `column` names a built-in column or an `extra.<key>` column.
    pub fn is_column(column: &str) -> bool {
        BUILTIN_COLUMNS.contains(&column)
            || column
                .strip_prefix(EXTRA_PREFIX)
                .is_some_and(|key| !key.is_empty())
    }

    /// Look up a built-in column or an `extra.<key>` column.
    pub fn field(&self, column: &str) -> Option<Scalar> {
        match column {
            "id" => Some(Scalar::Int(self.id as i64)),
            "name" => Some(Scalar::from(self.name.as_str())),
            "type" => Some(Scalar::Str(self.kind.to_string())),
            "ra" => Some(Scalar::from(self.ra)),
            "dec" => Some(Scalar::from(self.dec)),
            "epoch" => Some(Scalar::from(self.epoch)),
            "created" => Some(Scalar::Date(self.created)),
            "modified" => Some(Scalar::Date(self.modified)),
            "aliases" => Some(Scalar::Str(self.aliases.join(", "))),
            other => other
                .strip_prefix(EXTRA_PREFIX)
                .and_then(|key| self.extra.get(key).cloned()),
        }
    }

    pub fn matches_name(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_lowercase().contains(needle_lower))
    }
}

pub fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

impl From<ExtraValue> for Scalar {
    fn from(value: ExtraValue) -> Self {
        match value {
            ExtraValue::Null => Scalar::Null,
            ExtraValue::Bool(value) => Scalar::Bool(value),
            ExtraValue::Int(value) => Scalar::Int(value),
            ExtraValue::Float(value) => Scalar::Float(value),
            ExtraValue::Str(value) => Scalar::Str(value),
            ExtraValue::DateMs(ms) => Scalar::Date(millis_to_datetime(ms)),
        }
    }
}

impl From<Scalar> for ExtraValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Null => ExtraValue::Null,
            Scalar::Bool(value) => ExtraValue::Bool(value),
            Scalar::Int(value) => ExtraValue::Int(value),
            Scalar::Float(value) => ExtraValue::Float(value),
            Scalar::Str(value) => ExtraValue::Str(value),
            Scalar::Date(value) => ExtraValue::DateMs(value.timestamp_millis()),
        }
    }
}

impl From<TargetSchema> for Target {
    fn from(schema: TargetSchema) -> Self {
        Target {
            id: schema.id,
            name: schema.name,
            kind: schema.kind,
            ra: schema.ra,
            dec: schema.dec,
            epoch: schema.epoch,
            created: millis_to_datetime(schema.created_ms),
            modified: millis_to_datetime(schema.modified_ms),
            aliases: schema.aliases,
            extra: schema
                .extra
                .into_iter()
                .map(|(key, value)| (key, Scalar::from(value)))
                .collect(),
        }
    }
}

/// A target that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewTarget {
    pub name: String,
    pub kind: TargetKind,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub epoch: Option<f64>,
    pub created: Option<DateTime<Utc>>,
    pub aliases: Vec<String>,
    pub extra: BTreeMap<String, Scalar>,
}

impl NewTarget {
    pub fn sidereal(name: impl Into<String>, ra: f64, dec: f64) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::Sidereal,
            ra: Some(ra),
            dec: Some(dec),
            epoch: Some(2000.0),
            created: None,
            aliases: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn non_sidereal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::NonSidereal,
            ra: None,
            dec: None,
            epoch: None,
            created: None,
            aliases: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_schema(self, id: u64, now: DateTime<Utc>) -> TargetSchema {
        let created = self.created.unwrap_or(now);
        TargetSchema {
            id,
            name: self.name,
            kind: self.kind,
            ra: self.ra,
            dec: self.dec,
            epoch: self.epoch,
            created_ms: created.timestamp_millis(),
            modified_ms: now.timestamp_millis(),
            aliases: self.aliases,
            extra: self
                .extra
                .into_iter()
                .map(|(key, value)| (key, ExtraValue::from(value)))
                .collect(),
        }
    }
}
