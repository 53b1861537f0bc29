use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::VisualizationError;
use crate::models::scalar::Scalar;
use crate::models::target::Target;

/// Name of the implicit row-number column every source exposes.
pub const INDEX_COLUMN: &str = "index";

/// Column-oriented table shared by the widgets built on it.
///
/// Widgets hold the source behind an `Arc`; two widgets holding the same
/// source are linked (selection and edits) once embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDataSource {
    id: String,
    columns: Vec<(String, Vec<Scalar>)>,
    len: usize,
}

impl ColumnDataSource {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            columns: Vec::new(),
            len: 0,
        }
    }

    pub fn from_columns<N: Into<String>>(
        columns: Vec<(N, Vec<Scalar>)>,
    ) -> Result<Self, VisualizationError> {
        let mut source = Self::empty();
        for (name, values) in columns {
            source.push_column(name, values)?;
        }
        Ok(source)
    }

    /// One column per declared name; a target without an `extra.<key>`
    /// column gets `Null`. Names that are not target columns fail with
    /// `FieldNotFound`.
    pub fn from_targets<S: AsRef<str>>(
        targets: &[Target],
        columns: &[S],
    ) -> Result<Self, VisualizationError> {
        let mut source = Self::empty();
        source.len = targets.len();
        source.columns = columns
            .iter()
            .map(|column| {
                let column = column.as_ref();
                if !Target::is_column(column) {
                    return Err(VisualizationError::FieldNotFound {
                        model: "Target".to_string(),
                        field: column.to_string(),
                    });
                }
                let values = targets
                    .iter()
                    .map(|target| target.field(column).unwrap_or(Scalar::Null))
                    .collect();
                Ok((column.to_string(), values))
            })
            .collect::<Result<_, _>>()?;
        Ok(source)
    }

    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Scalar>,
    ) -> Result<(), VisualizationError> {
        let name = name.into();
        if self.columns.is_empty() {
            self.len = values.len();
        } else if values.len() != self.len {
            return Err(VisualizationError::RaggedColumn {
                column: name,
                len: values.len(),
                expected: self.len,
            });
        }
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(INDEX_COLUMN).chain(self.columns.iter().map(|(name, _)| name.as_str()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        name == INDEX_COLUMN || self.columns.iter().any(|(existing, _)| existing == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Sorted distinct non-null values of `name`, computed from the current
    /// contents on every call.
    pub fn distinct_sorted(&self, name: &str) -> Result<Vec<Scalar>, VisualizationError> {
        if name == INDEX_COLUMN {
            return Ok((0..self.len as i64).map(Scalar::Int).collect());
        }
        let values = self
            .column(name)
            .ok_or_else(|| VisualizationError::FieldNotFound {
                model: "ColumnDataSource".to_string(),
                field: name.to_string(),
            })?;
        let distinct: BTreeSet<&Scalar> = values.iter().filter(|value| !value.is_null()).collect();
        Ok(distinct.into_iter().cloned().collect())
    }

    /// [`Self::distinct_sorted`] rendered as strings, as select editors expect.
    pub fn distinct_strings(&self, name: &str) -> Result<Vec<String>, VisualizationError> {
        Ok(self
            .distinct_sorted(name)?
            .iter()
            .map(ToString::to_string)
            .collect())
    }
}

impl Serialize for ColumnDataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        let index: Vec<usize> = (0..self.len).collect();
        map.serialize_entry(INDEX_COLUMN, &index)?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}
