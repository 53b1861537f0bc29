use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::VisualizationError;
use super::embed::{Fragments, components};
use super::sample::autompg2;
use super::source::ColumnDataSource;
use super::views::{TargetColumn, autompg_layout, composite_view, smoke_plot, target_table};
use crate::models::target::Target;

/// What a dashboard app may draw from when rendering one request.
pub struct DashboardInput<'a> {
    /// The current page of the listing.
    pub targets: &'a [Target],
}

pub trait DashboardApp: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, input: &DashboardInput<'_>) -> Result<Fragments, VisualizationError>;
}

/// Target grid over the listing page with configured columns.
pub struct TargetlistTableApp {
    columns: Vec<TargetColumn>,
}

impl TargetlistTableApp {
    pub fn new(columns: Vec<TargetColumn>) -> Self {
        Self { columns }
    }
}

impl DashboardApp for TargetlistTableApp {
    fn name(&self) -> &str {
        "TargetlistTable"
    }

    fn render(&self, input: &DashboardInput<'_>) -> Result<Fragments, VisualizationError> {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let source = Arc::new(ColumnDataSource::from_targets(input.targets, &names)?);
        let table = target_table(source, &self.columns)?;
        components(&[table.into()])
    }
}

/// Composite scatter + grid over the bundled sample dataset.
pub struct AutoMpgApp;

impl DashboardApp for AutoMpgApp {
    fn name(&self) -> &str {
        "AutoMpg"
    }

    fn render(&self, _input: &DashboardInput<'_>) -> Result<Fragments, VisualizationError> {
        let source = Arc::new(autompg2()?);
        let (figure, table) = composite_view(source, &autompg_layout())?;
        components(&[figure.into(), table.into()])
    }
}

pub struct SmokePlotApp;

impl DashboardApp for SmokePlotApp {
    fn name(&self) -> &str {
        "Smoke"
    }

    fn render(&self, _input: &DashboardInput<'_>) -> Result<Fragments, VisualizationError> {
        components(&[smoke_plot()?.into()])
    }
}

/// Named dashboard apps, built once at start-up and handed to whoever
/// composes responses.
#[derive(Default)]
pub struct DashboardRegistry {
    apps: BTreeMap<String, Box<dyn DashboardApp>>,
}

impl DashboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in apps.
    pub fn with_builtin(target_columns: Vec<TargetColumn>) -> Self {
        let mut registry = Self::new();
        registry.register(TargetlistTableApp::new(target_columns));
        registry.register(AutoMpgApp);
        registry.register(SmokePlotApp);
        registry
    }

    /// Add an app, replacing any app registered under the same name.
    pub fn register(&mut self, app: impl DashboardApp + 'static) {
        let name = app.name().to_string();
        if self.apps.insert(name.clone(), Box::new(app)).is_some() {
            info!("Replaced dashboard app {}", name);
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn DashboardApp, VisualizationError> {
        self.apps
            .get(name)
            .map(|app| app.as_ref())
            .ok_or_else(|| VisualizationError::UnknownApp(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::views::parse_target_columns;

    fn registry() -> DashboardRegistry {
        DashboardRegistry::with_builtin(parse_target_columns("name:text,ra:numeric").unwrap())
    }

    #[test]
    fn builtin_apps_are_registered() {
        let registry = registry();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["AutoMpg", "Smoke", "TargetlistTable"]
        );
        assert!(matches!(
            registry.get("Dash"),
            Err(VisualizationError::UnknownApp(name)) if name == "Dash"
        ));
    }

    #[test]
    fn apps_render_expected_fragment_counts() {
        let registry = registry();
        let input = DashboardInput { targets: &[] };
        assert_eq!(registry.get("AutoMpg").unwrap().render(&input).unwrap().divs.len(), 2);
        assert_eq!(registry.get("Smoke").unwrap().render(&input).unwrap().divs.len(), 1);
        assert_eq!(
            registry.get("TargetlistTable").unwrap().render(&input).unwrap().divs.len(),
            1
        );
    }
}
