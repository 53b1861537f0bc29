use std::str::FromStr;
use std::sync::Arc;

use super::VisualizationError;
use super::models::{
    DataTable, Editor, Figure, FontStyle, Formatter, HoverTool, Scatter, TableColumn, Tool,
};
use super::source::{ColumnDataSource, INDEX_COLUMN};
use crate::models::scalar::Scalar;
use crate::models::target::Target;

// ────────────────────────────────────────────────────────────────
// Smoke plot
// ────────────────────────────────────────────────────────────────

/// Fixed five-point scatter on its own inline data.
pub fn smoke_plot() -> Result<Figure, VisualizationError> {
    let points = |values: [i64; 5]| values.into_iter().map(Scalar::Int).collect::<Vec<_>>();
    let source = ColumnDataSource::from_columns(vec![
        ("x", points([1, 2, 3, 4, 5])),
        ("y", points([6, 7, 2, 4, 5])),
    ])?;

    let mut figure = Figure::new(400, 400);
    figure.scatter(Scatter::new(Arc::new(source), "x", "y").style("navy", 20.0, 0.5));
    figure.validate()?;
    Ok(figure)
}

// ────────────────────────────────────────────────────────────────
// Composite scatter + editable grid
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Select editor whose options are the column's distinct values.
    Select { bold: bool },
    /// Free text with the distinct values as completions.
    Completions,
    Number { step: f64, format: &'static str },
    Int,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub field: &'static str,
    pub title: &'static str,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDecl {
    pub field: &'static str,
    pub title: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayout {
    pub columns: Vec<ColumnDecl>,
    pub series: [SeriesDecl; 2],
}

impl CompositeLayout {
    fn is_series(&self, field: &str) -> bool {
        self.series.iter().any(|series| series.field == field)
    }
}

/// Column layout of the bundled `autompg2` sample.
pub fn autompg_layout() -> CompositeLayout {
    let column = |field, title, kind| ColumnDecl { field, title, kind };
    CompositeLayout {
        columns: vec![
            column("manufacturer", "Manufacturer", ColumnKind::Select { bold: true }),
            column("model", "Model", ColumnKind::Completions),
            column("displ", "Displacement", ColumnKind::Number { step: 0.1, format: "0.0" }),
            column("year", "Year", ColumnKind::Int),
            column("cyl", "Cylinders", ColumnKind::Int),
            column("trans", "Transmission", ColumnKind::Select { bold: false }),
            column("drv", "Drive", ColumnKind::Select { bold: false }),
            column("class", "Class", ColumnKind::Select { bold: false }),
            column("cty", "City MPG", ColumnKind::Int),
            column("hwy", "Highway MPG", ColumnKind::Int),
        ],
        series: [
            SeriesDecl {
                field: "cty",
                title: "City MPG",
                color: "#396285",
            },
            SeriesDecl {
                field: "hwy",
                title: "Highway MPG",
                color: "#CE603D",
            },
        ],
    }
}

fn table_column(
    source: &ColumnDataSource,
    decl: &ColumnDecl,
) -> Result<TableColumn, VisualizationError> {
    let column = TableColumn::new(decl.field, decl.title);
    Ok(match &decl.kind {
        ColumnKind::Select { bold } => {
            let column = column.editor(Editor::SelectEditor {
                options: source.distinct_strings(decl.field)?,
            });
            if *bold {
                column.formatter(Formatter::StringFormatter {
                    font_style: FontStyle::Bold,
                })
            } else {
                column
            }
        }
        ColumnKind::Completions => column.editor(Editor::StringEditor {
            completions: source.distinct_strings(decl.field)?,
        }),
        ColumnKind::Number { step, format } => column
            .editor(Editor::NumberEditor { step: *step })
            .formatter(Formatter::NumberFormatter {
                format: format.to_string(),
            }),
        ColumnKind::Int => column.editor(Editor::IntEditor),
    })
}

/// Scatter of both series against the row index, linked to an editable
/// grid over the same source.
///
/// Fails with `FieldNotFound` when the layout names a column the source
/// does not have.
pub fn composite_view(
    source: Arc<ColumnDataSource>,
    layout: &CompositeLayout,
) -> Result<(Figure, DataTable), VisualizationError> {
    let columns = layout
        .columns
        .iter()
        .map(|decl| table_column(&source, decl))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = DataTable::new(source.clone(), columns);
    table.editable = true;
    table.width = 800;
    table.index_position = Some(-1);
    table.index_header = "row index".to_string();
    table.index_width = 60;

    let mut figure = Figure::new(800, 300).tools(
        &[Tool::Pan, Tool::WheelZoom, Tool::XboxSelect, Tool::Reset],
        Some(Tool::XboxSelect),
    );

    let descriptive: Vec<(String, String)> = layout
        .columns
        .iter()
        .filter(|decl| !layout.is_series(decl.field))
        .map(|decl| (decl.title.to_string(), format!("@{}", decl.field)))
        .collect();

    for series in &layout.series {
        let glyph = figure.scatter(
            Scatter::new(source.clone(), INDEX_COLUMN, series.field).style(series.color, 8.0, 0.5),
        );
        let mut tooltips = descriptive.clone();
        tooltips.push((series.title.to_string(), format!("@{}", series.field)));
        figure.add_hover(HoverTool {
            renderers: vec![glyph],
            tooltips,
        });
    }

    table.validate()?;
    figure.validate()?;
    Ok((figure, table))
}

// ────────────────────────────────────────────────────────────────
// Target grid
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Numeric,
    Datetime,
}

/// One configured target grid column, declared as `name:type`. The name is
/// a built-in target column or `extra.<key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetColumn {
    pub name: String,
    pub column_type: ColumnType,
}

impl FromStr for TargetColumn {
    type Err = VisualizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VisualizationError::InvalidColumnDecl(s.to_string());
        let (name, column_type) = s.trim().split_once(':').ok_or_else(invalid)?;
        let column_type = match column_type.trim() {
            "text" => ColumnType::Text,
            "numeric" => ColumnType::Numeric,
            "datetime" => ColumnType::Datetime,
            _ => return Err(invalid()),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        if !Target::is_column(name) {
            return Err(VisualizationError::FieldNotFound {
                model: "Target".to_string(),
                field: name.to_string(),
            });
        }
        Ok(TargetColumn {
            name: name.to_string(),
            column_type,
        })
    }
}

/// Parse a comma-separated `name:type` list.
pub fn parse_target_columns(raw: &str) -> Result<Vec<TargetColumn>, VisualizationError> {
    raw.split(',')
        .filter(|decl| !decl.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Sortable, filterable grid over targets with the configured columns.
pub fn target_table(
    source: Arc<ColumnDataSource>,
    columns: &[TargetColumn],
) -> Result<DataTable, VisualizationError> {
    let table_columns = columns
        .iter()
        .map(|column| {
            let table_column = TableColumn::new(column.name.as_str(), column.name.as_str());
            Ok(match column.column_type {
                ColumnType::Text => table_column.editor(Editor::SelectEditor {
                    options: source.distinct_strings(&column.name)?,
                }),
                ColumnType::Numeric => table_column.formatter(Formatter::NumberFormatter {
                    format: "0.0000".to_string(),
                }),
                ColumnType::Datetime => table_column.formatter(Formatter::DateFormatter {
                    format: "%Y-%m-%d %H:%M".to_string(),
                }),
            })
        })
        .collect::<Result<Vec<_>, VisualizationError>>()?;

    let mut table = DataTable::new(source, table_columns);
    table.sortable = true;
    table.filterable = true;
    table.width = 1000;
    table.height = 600;
    table.validate()?;
    Ok(table)
}
