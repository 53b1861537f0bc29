//! Bundled `autompg2` reference dataset (a subset of the EPA fuel economy
//! table), used by the composite demo view.

use super::VisualizationError;
use super::source::ColumnDataSource;
use crate::models::scalar::Scalar;

pub struct MpgRow {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub displ: f64,
    pub year: i64,
    pub cyl: i64,
    pub trans: &'static str,
    pub drv: &'static str,
    pub cty: i64,
    pub hwy: i64,
    pub fl: &'static str,
    pub class: &'static str,
}

macro_rules! mpg {
    ($($manufacturer:literal, $model:literal, $displ:literal, $year:literal, $cyl:literal,
       $trans:literal, $drv:literal, $cty:literal, $hwy:literal, $fl:literal, $class:literal;)*) => {
        &[$(MpgRow {
            manufacturer: $manufacturer,
            model: $model,
            displ: $displ,
            year: $year,
            cyl: $cyl,
            trans: $trans,
            drv: $drv,
            cty: $cty,
            hwy: $hwy,
            fl: $fl,
            class: $class,
        }),*]
    };
}

pub const AUTOMPG2: &[MpgRow] = mpg! {
    "audi", "a4", 1.8, 1999, 4, "auto(l5)", "f", 18, 29, "p", "compact";
    "audi", "a4", 1.8, 1999, 4, "manual(m5)", "f", 21, 29, "p", "compact";
    "audi", "a4", 2.0, 2008, 4, "manual(m6)", "f", 20, 31, "p", "compact";
    "audi", "a4", 2.0, 2008, 4, "auto(av)", "f", 21, 30, "p", "compact";
    "audi", "a4", 2.8, 1999, 6, "auto(l5)", "f", 16, 26, "p", "compact";
    "audi", "a4", 2.8, 1999, 6, "manual(m5)", "f", 18, 26, "p", "compact";
    "audi", "a4", 3.1, 2008, 6, "auto(av)", "f", 18, 27, "p", "compact";
    "audi", "a4 quattro", 1.8, 1999, 4, "manual(m5)", "4", 18, 26, "p", "compact";
    "audi", "a4 quattro", 1.8, 1999, 4, "auto(l5)", "4", 16, 25, "p", "compact";
    "audi", "a4 quattro", 2.0, 2008, 4, "manual(m6)", "4", 20, 28, "p", "compact";
    "chevrolet", "c1500 suburban 2wd", 5.3, 2008, 8, "auto(l4)", "r", 14, 20, "r", "suv";
    "chevrolet", "corvette", 5.7, 1999, 8, "manual(m6)", "r", 16, 26, "p", "2seater";
    "chevrolet", "corvette", 6.2, 2008, 8, "auto(s6)", "r", 15, 25, "p", "2seater";
    "dodge", "caravan 2wd", 2.4, 1999, 4, "auto(l3)", "f", 18, 24, "r", "minivan";
    "dodge", "dakota pickup 4wd", 3.7, 2008, 6, "manual(m6)", "4", 15, 19, "r", "pickup";
    "ford", "f150 pickup 4wd", 4.2, 1999, 6, "manual(m5)", "4", 14, 17, "r", "pickup";
    "ford", "mustang", 3.8, 1999, 6, "manual(m5)", "r", 18, 26, "r", "subcompact";
    "honda", "civic", 1.6, 1999, 4, "manual(m5)", "f", 28, 33, "r", "subcompact";
    "hyundai", "sonata", 2.4, 1999, 4, "auto(l4)", "f", 18, 26, "r", "midsize";
    "jeep", "grand cherokee 4wd", 4.7, 2008, 8, "auto(l5)", "4", 14, 19, "r", "suv";
    "nissan", "altima", 2.5, 2008, 4, "manual(m6)", "f", 23, 32, "r", "midsize";
    "toyota", "camry", 2.2, 1999, 4, "manual(m5)", "f", 21, 29, "r", "midsize";
    "toyota", "corolla", 1.8, 2008, 4, "manual(m5)", "f", 28, 37, "r", "compact";
    "volkswagen", "jetta", 1.9, 1999, 4, "manual(m5)", "f", 33, 44, "d", "compact";
    "volkswagen", "new beetle", 1.9, 1999, 4, "manual(m5)", "f", 35, 44, "d", "subcompact";
};

/// The sample table as a column data source.
pub fn autompg2() -> Result<ColumnDataSource, VisualizationError> {
    fn column<T: Into<Scalar>>(get: impl Fn(&MpgRow) -> T) -> Vec<Scalar> {
        AUTOMPG2.iter().map(|row| get(row).into()).collect()
    }

    let columns = vec![
        ("manufacturer", column(|row| row.manufacturer)),
        ("model", column(|row| row.model)),
        ("displ", column(|row| row.displ)),
        ("year", column(|row| row.year)),
        ("cyl", column(|row| row.cyl)),
        ("trans", column(|row| row.trans)),
        ("drv", column(|row| row.drv)),
        ("cty", column(|row| row.cty)),
        ("hwy", column(|row| row.hwy)),
        ("fl", column(|row| row.fl)),
        ("class", column(|row| row.class)),
    ];

    ColumnDataSource::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_every_column() {
        let source = autompg2().unwrap();
        assert_eq!(source.len(), AUTOMPG2.len());
        for column in ["manufacturer", "model", "displ", "year", "cyl", "trans", "drv", "cty", "hwy", "class"] {
            assert!(source.has_column(column), "missing {column}");
        }
        assert_eq!(source.distinct_strings("drv").unwrap(), vec!["4", "f", "r"]);
    }
}
