use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::VisualizationError;
use super::models::Root;
use super::source::ColumnDataSource;

/// Script plus one div per embedded root, to be inserted verbatim and
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    pub script: String,
    pub divs: Vec<String>,
}

#[derive(Serialize)]
struct EmbeddedRoot<'a> {
    root_id: String,
    element_id: String,
    model: &'a Root,
}

#[derive(Serialize)]
struct Document<'a> {
    version: &'static str,
    sources: BTreeMap<&'a str, &'a ColumnDataSource>,
    roots: Vec<EmbeddedRoot<'a>>,
}

/// Serialize `roots` into one shared script and one div per root, in order.
///
/// Every root is validated first; nothing is produced if any of them
/// references a field its source lacks.
pub fn components(roots: &[Root]) -> Result<Fragments, VisualizationError> {
    if roots.is_empty() {
        return Err(VisualizationError::EmptyEmbed);
    }
    roots.iter().try_for_each(Root::validate)?;

    let mut sources = BTreeMap::new();
    for root in roots {
        for source in root.sources() {
            sources.insert(source.id(), &**source);
        }
    }

    let embedded: Vec<EmbeddedRoot> = roots
        .iter()
        .map(|model| EmbeddedRoot {
            root_id: Uuid::new_v4().to_string(),
            element_id: Uuid::new_v4().to_string(),
            model,
        })
        .collect();

    let divs = embedded
        .iter()
        .map(|root| {
            format!(
                r#"<div id="{}" data-root-id="{}" style="display: contents;"></div>"#,
                root.element_id, root.root_id
            )
        })
        .collect();

    let document = Document {
        version: env!("CARGO_PKG_VERSION"),
        sources,
        roots: embedded,
    };
    // `</` must not appear inside a script element.
    let json = serde_json::to_string(&document)?.replace("</", r"<\/");
    let doc_id = Uuid::new_v4();

    let script = format!(
        r#"<script type="application/json" id="{doc_id}">{json}</script>
<script type="text/javascript">
(function() {{
  const doc = JSON.parse(document.getElementById("{doc_id}").textContent);
  if (window.TargetView) {{
    window.TargetView.embed(doc);
  }} else {{
    console.error("TargetView renderer not loaded");
  }}
}})();
</script>"#
    );

    Ok(Fragments { script, divs })
}
