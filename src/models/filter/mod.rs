use anyhow::Result;
use rocket::FromForm;
use rocket::http::RawStr;
use std::collections::BTreeSet;

use crate::database::schema::target::TargetKind;

pub mod generator;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    And(Vec<Expression>),
    Name(String),
    Kind(TargetKind),
    Members(BTreeSet<u64>),
    Extra { key: String, value: String },
}

/// Declared filter schema for the target listing.
///
/// Every field is optional and parsed leniently: a value that does not fit
/// the schema is dropped instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromForm)]
pub struct FilterParams {
    pub name: Option<String>,
    #[field(name = "type")]
    pub kind: Option<String>,
    #[field(name = "targetlist__name")]
    pub target_list: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl FilterParams {
    /// Build the filter expression from the valid fields.
    ///
    /// `resolve_list` maps a target list id to its members, or `None` when
    /// the list does not exist. Returns `None` when no field is valid.
    pub fn to_expression(
        &self,
        resolve_list: impl Fn(u64) -> Result<Option<BTreeSet<u64>>>,
    ) -> Result<Option<Expression>> {
        let mut clauses = Vec::new();

        if let Some(name) = non_blank(&self.name) {
            clauses.push(Expression::Name(name.to_lowercase()));
        }

        if let Some(kind) = non_blank(&self.kind) {
            if let Ok(kind) = kind.parse::<TargetKind>() {
                clauses.push(Expression::Kind(kind));
            }
        }

        if let Some(list_id) = non_blank(&self.target_list).and_then(|id| id.parse::<u64>().ok()) {
            if let Some(members) = resolve_list(list_id)? {
                clauses.push(Expression::Members(members));
            }
        }

        if let (Some(key), Some(value)) = (non_blank(&self.key), non_blank(&self.value)) {
            clauses.push(Expression::Extra {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        Ok(match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Expression::And(clauses)),
        })
    }

    /// Non-empty filter values as `(parameter, value)` pairs, in schema order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("type", &self.kind),
            ("targetlist__name", &self.target_list),
            ("key", &self.key),
            ("value", &self.value),
        ]
        .into_iter()
        .filter_map(|(param, value)| non_blank(value).map(|value| (param, value)))
        .collect()
    }

    /// Percent-encoded query string of the filter values, without `page`.
    pub fn query_string(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(param, value)| format!("{}={}", param, RawStr::new(value).percent_encode()))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_lists(_: u64) -> Result<Option<BTreeSet<u64>>> {
        Ok(None)
    }

    #[test]
    fn invalid_fields_are_dropped() {
        let params = FilterParams {
            kind: Some("GALAXY".to_string()),
            target_list: Some("not-a-number".to_string()),
            key: Some("redshift".to_string()),
            value: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.to_expression(no_lists).unwrap(), None);
    }

    #[test]
    fn unknown_list_is_dropped_known_list_applies() {
        let params = FilterParams {
            target_list: Some("4".to_string()),
            ..Default::default()
        };
        assert_eq!(params.to_expression(no_lists).unwrap(), None);

        let expression = params
            .to_expression(|id| Ok((id == 4).then(|| BTreeSet::from([1, 2]))))
            .unwrap();
        assert_eq!(expression, Some(Expression::Members(BTreeSet::from([1, 2]))));
    }

    #[test]
    fn valid_fields_combine() {
        let params = FilterParams {
            name: Some(" M3 ".to_string()),
            kind: Some("sidereal".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.to_expression(no_lists).unwrap(),
            Some(Expression::And(vec![
                Expression::Name("m3".to_string()),
                Expression::Kind(TargetKind::Sidereal),
            ]))
        );
    }

    #[test]
    fn query_string_skips_blank_values() {
        let params = FilterParams {
            name: Some("NGC 1300".to_string()),
            kind: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(params.query_string(), "name=NGC%201300");
    }
}
