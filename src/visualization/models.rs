use serde::{Serialize, Serializer};
use std::sync::Arc;

use super::VisualizationError;
use super::source::ColumnDataSource;

fn source_id<S: Serializer>(source: &Arc<ColumnDataSource>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(source.id())
}

fn require_field(
    source: &ColumnDataSource,
    model: &str,
    field: &str,
) -> Result<(), VisualizationError> {
    if source.has_column(field) {
        Ok(())
    } else {
        Err(VisualizationError::FieldNotFound {
            model: model.to_string(),
            field: field.to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────
// Table
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Editor {
    SelectEditor { options: Vec<String> },
    StringEditor { completions: Vec<String> },
    NumberEditor { step: f64 },
    IntEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Formatter {
    StringFormatter { font_style: FontStyle },
    NumberFormatter { format: String },
    DateFormatter { format: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub field: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<Editor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<Formatter>,
}

impl TableColumn {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            editor: None,
            formatter: None,
        }
    }

    pub fn editor(mut self, editor: Editor) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    #[serde(serialize_with = "source_id")]
    pub source: Arc<ColumnDataSource>,
    pub columns: Vec<TableColumn>,
    pub editable: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub width: u32,
    pub height: u32,
    /// Position of the row-index column; negative counts from the right.
    pub index_position: Option<i32>,
    pub index_header: String,
    pub index_width: u32,
}

impl DataTable {
    pub fn new(source: Arc<ColumnDataSource>, columns: Vec<TableColumn>) -> Self {
        Self {
            source,
            columns,
            editable: false,
            sortable: true,
            filterable: false,
            width: 600,
            height: 400,
            index_position: Some(0),
            index_header: "#".to_string(),
            index_width: 40,
        }
    }

    pub fn validate(&self) -> Result<(), VisualizationError> {
        self.columns
            .iter()
            .try_for_each(|column| require_field(&self.source, "DataTable", &column.field))
    }
}

// ────────────────────────────────────────────────────────────────
// Figure
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Pan,
    WheelZoom,
    BoxSelect,
    XboxSelect,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    #[serde(serialize_with = "source_id")]
    pub source: Arc<ColumnDataSource>,
    pub x: String,
    pub y: String,
    pub fill_color: String,
    pub size: f64,
    pub alpha: f64,
}

impl Scatter {
    pub fn new(source: Arc<ColumnDataSource>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            source,
            x: x.into(),
            y: y.into(),
            fill_color: "#1f77b4".to_string(),
            size: 4.0,
            alpha: 1.0,
        }
    }

    pub fn style(mut self, fill_color: impl Into<String>, size: f64, alpha: f64) -> Self {
        self.fill_color = fill_color.into();
        self.size = size;
        self.alpha = alpha;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverTool {
    /// Indices into [`Figure::renderers`].
    pub renderers: Vec<usize>,
    /// `(label, template)` pairs, e.g. `("Model", "@model")`.
    pub tooltips: Vec<(String, String)>,
}

impl HoverTool {
    /// Column names referenced as `@field` or `@{field}` in the tooltips.
    /// `$`-prefixed special variables are not columns.
    pub fn fields(&self) -> Vec<&str> {
        self.tooltips
            .iter()
            .filter_map(|(_, template)| template.strip_prefix('@'))
            .map(|field| {
                field
                    .strip_prefix('{')
                    .and_then(|field| field.strip_suffix('}'))
                    .unwrap_or(field)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub tools: Vec<Tool>,
    pub active_drag: Option<Tool>,
    pub renderers: Vec<Scatter>,
    pub hover_tools: Vec<HoverTool>,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tools: vec![Tool::Pan, Tool::WheelZoom, Tool::BoxSelect, Tool::Reset],
            active_drag: None,
            renderers: Vec::new(),
            hover_tools: Vec::new(),
        }
    }

    pub fn tools(mut self, tools: &[Tool], active_drag: Option<Tool>) -> Self {
        self.tools = tools.to_vec();
        self.active_drag = active_drag;
        self
    }

    /// Add a scatter renderer and return its index for hover tools.
    pub fn scatter(&mut self, scatter: Scatter) -> usize {
        self.renderers.push(scatter);
        self.renderers.len() - 1
    }

    pub fn add_hover(&mut self, hover: HoverTool) {
        self.hover_tools.push(hover);
    }

    pub fn validate(&self) -> Result<(), VisualizationError> {
        for scatter in &self.renderers {
            require_field(&scatter.source, "Scatter", &scatter.x)?;
            require_field(&scatter.source, "Scatter", &scatter.y)?;
        }
        for hover in &self.hover_tools {
            for &renderer in &hover.renderers {
                let scatter = self
                    .renderers
                    .get(renderer)
                    .ok_or(VisualizationError::UnknownRenderer(renderer))?;
                for field in hover.fields() {
                    require_field(&scatter.source, "HoverTool", field)?;
                }
            }
        }
        Ok(())
    }
}

/// A top-level embeddable widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Root {
    Figure(Figure),
    DataTable(DataTable),
}

impl Root {
    pub fn validate(&self) -> Result<(), VisualizationError> {
        match self {
            Root::Figure(figure) => figure.validate(),
            Root::DataTable(table) => table.validate(),
        }
    }

    pub fn sources(&self) -> Vec<&Arc<ColumnDataSource>> {
        match self {
            Root::Figure(figure) => figure.renderers.iter().map(|r| &r.source).collect(),
            Root::DataTable(table) => vec![&table.source],
        }
    }
}

impl From<Figure> for Root {
    fn from(figure: Figure) -> Self {
        Root::Figure(figure)
    }
}

impl From<DataTable> for Root {
    fn from(table: DataTable) -> Self {
        Root::DataTable(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scalar::Scalar;

    fn source() -> Arc<ColumnDataSource> {
        Arc::new(
            ColumnDataSource::from_columns(vec![
                ("model", vec![Scalar::from("a4")]),
                ("cty", vec![Scalar::Int(18)]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn hover_fields_strip_markup() {
        let hover = HoverTool {
            renderers: vec![0],
            tooltips: vec![
                ("Model".to_string(), "@model".to_string()),
                ("City".to_string(), "@{cty}".to_string()),
                ("Index".to_string(), "$index".to_string()),
            ],
        };
        assert_eq!(hover.fields(), vec!["model", "cty"]);
    }

    #[test]
    fn figure_validation_checks_glyphs_and_tooltips() {
        let mut figure = Figure::new(100, 100);
        let glyph = figure.scatter(Scatter::new(source(), "index", "cty"));
        figure.add_hover(HoverTool {
            renderers: vec![glyph],
            tooltips: vec![("Cylinders".to_string(), "@cyl".to_string())],
        });
        let err = figure.validate().unwrap_err();
        assert!(matches!(err, VisualizationError::FieldNotFound { ref field, .. } if field == "cyl"));

        figure.hover_tools[0].renderers = vec![3];
        assert!(matches!(
            figure.validate(),
            Err(VisualizationError::UnknownRenderer(3))
        ));
    }

    #[test]
    fn table_serializes_source_by_id() {
        let source = source();
        let table = DataTable::new(
            source.clone(),
            vec![TableColumn::new("model", "Model").editor(Editor::IntEditor)],
        );
        table.validate().unwrap();
        let json = serde_json::to_value(Root::from(table)).unwrap();
        assert_eq!(json["type"], "DataTable");
        assert_eq!(json["source"], source.id());
        assert_eq!(json["columns"][0]["editor"]["type"], "IntEditor");
    }
}
