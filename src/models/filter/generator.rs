use super::Expression;
use crate::models::scalar::Scalar;
use crate::models::target::Target;

impl Expression {
    pub fn generate_filter(self) -> Box<dyn Fn(&Target) -> bool + Sync + Send> {
        match self {
            Expression::And(expressions) => {
                let filters: Vec<_> = expressions
                    .into_iter()
                    .map(Expression::generate_filter)
                    .collect();
                Box::new(move |target: &Target| filters.iter().all(|filter| filter(target)))
            }
            // Already lowercased by the parser.
            Expression::Name(name) => Box::new(move |target: &Target| target.matches_name(&name)),
            Expression::Kind(kind) => Box::new(move |target: &Target| target.kind == kind),
            Expression::Members(members) => {
                Box::new(move |target: &Target| members.contains(&target.id))
            }
            Expression::Extra { key, value } => {
                let number = value.parse::<f64>().ok();
                Box::new(move |target: &Target| match target.extra.get(&key) {
                    None | Some(Scalar::Null) => false,
                    Some(extra) => match (extra.as_f64(), number) {
                        (Some(extra), Some(number)) => extra == number,
                        _ => extra.to_string() == value,
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::target::TargetKind;
    use crate::models::target::NewTarget;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn target(id: u64, new: NewTarget) -> Target {
        new.into_schema(id, Utc::now()).into()
    }

    #[test]
    fn extra_compares_numbers_numerically() {
        let galaxy = target(1, NewTarget::sidereal("NGC 4993", 197.4, -23.4).extra("z", 0.0098));
        let filter = Expression::Extra {
            key: "z".to_string(),
            value: "0.00980".to_string(),
        }
        .generate_filter();
        assert!(filter(&galaxy));

        let filter = Expression::Extra {
            key: "z".to_string(),
            value: "high".to_string(),
        }
        .generate_filter();
        assert!(!filter(&galaxy));
    }

    #[test]
    fn and_requires_every_clause() {
        let comet = target(2, NewTarget::non_sidereal("C/2020 F3").alias("NEOWISE"));
        let filter = Expression::And(vec![
            Expression::Name("neowise".to_string()),
            Expression::Kind(TargetKind::NonSidereal),
            Expression::Members(BTreeSet::from([2])),
        ])
        .generate_filter();
        assert!(filter(&comet));

        let filter = Expression::And(vec![
            Expression::Name("neowise".to_string()),
            Expression::Kind(TargetKind::Sidereal),
        ])
        .generate_filter();
        assert!(!filter(&comet));
    }
}
