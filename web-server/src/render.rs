//! HTML rendering of pivot tables and the tab page.
//!
//! Templates live in `templates/` and are compiled into the binary. All
//! interpolation goes through handlebars' escaping; support labels are
//! mapped to symbols here so the templates stay logic-free.

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

use matrix_types::{PivotTable, SupportLevel, Warning};

const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");
const TABLE_PARTIAL: &str = include_str!("../templates/table.hbs");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.hbs");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// One rendered table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<&'static str>,
    /// Original label, used as the cell tooltip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CellView {
    /// Support labels become symbols; anything else is shown as text.
    pub fn from_value(value: &str) -> Self {
        match SupportLevel::from_label(value) {
            Some(level) => {
                let (symbol, class) = match level {
                    SupportLevel::Full => ("✓", "supported"),
                    SupportLevel::Partial => ("⚬", "partial"),
                    SupportLevel::Unsupported => ("✗", "not-supported"),
                };
                Self {
                    text: symbol.to_string(),
                    class: Some(class),
                    title: Some(value.to_string()),
                }
            }
            None => Self {
                text: value.to_string(),
                class: None,
                title: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub name: String,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<RowView>,
}

impl From<&PivotTable> for TableView {
    fn from(table: &PivotTable) -> Self {
        Self {
            headers: table.headers.clone(),
            rows: table
                .rows
                .iter()
                .map(|row| RowView {
                    name: row.name.clone(),
                    cells: row.values.iter().map(|v| CellView::from_value(v)).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TabLink {
    pub key: &'static str,
    pub title: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<I, S>(values: I, current: Option<&str>) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .map(|v| {
                let value: String = v.into();
                Self {
                    selected: current == Some(value.as_str()),
                    label: value.clone(),
                    value,
                }
            })
            .collect()
    }
}

/// Controls shown above the table for the active tab.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ides: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<SelectOption>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarningView {
    pub kind: String,
    pub ide: String,
    pub message: String,
}

impl From<&Warning> for WarningView {
    fn from(warning: &Warning) -> Self {
        Self {
            kind: warning.kind.to_string(),
            ide: warning.ide.clone(),
            message: warning.message.clone(),
        }
    }
}

/// Everything the page template needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub tab: &'static str,
    pub caption: &'static str,
    pub tabs: Vec<TabLink>,
    pub form: FilterForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableView>,
    /// Shown instead of the table when the view has nothing to display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub warnings: Vec<WarningView>,
    pub warning_count: usize,
    pub source: String,
    pub loaded_at: String,
}

#[derive(Debug, Serialize)]
struct ErrorContext<'a> {
    code: &'a str,
    message: &'a str,
}

pub struct Renderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_partial("table", TABLE_PARTIAL)?;
        registry.register_template_string("page", PAGE_TEMPLATE)?;
        registry.register_template_string("error", ERROR_TEMPLATE)?;
        Ok(Self { registry })
    }

    pub fn page(&self, context: &PageContext) -> Result<String, RenderError> {
        Ok(self.registry.render("page", context)?)
    }

    pub fn error(&self, code: &str, message: &str) -> Result<String, RenderError> {
        Ok(self
            .registry
            .render("error", &ErrorContext { code, message })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_types::PivotRow;
    use pretty_assertions::assert_eq;

    fn sample_table() -> PivotTable {
        PivotTable {
            headers: vec!["Feature".into(), "VS Code".into(), "Vim".into()],
            rows: vec![PivotRow {
                name: "<Chat>".into(),
                values: vec!["full".into(), "none".into()],
            }],
        }
    }

    fn page_with(table: Option<TableView>, notice: Option<String>) -> PageContext {
        PageContext {
            tab: "latest",
            caption: "Latest by IDE",
            tabs: vec![TabLink {
                key: "latest",
                title: "Latest by IDE",
                active: true,
            }],
            form: FilterForm::default(),
            table,
            notice,
            warnings: vec![],
            warning_count: 0,
            source: "inline".into(),
            loaded_at: "2024-01-01 00:00 UTC".into(),
        }
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(
            CellView::from_value("full"),
            CellView {
                text: "✓".into(),
                class: Some("supported"),
                title: Some("full".into())
            }
        );
        assert_eq!(CellView::from_value("partial").class, Some("partial"));
        assert_eq!(CellView::from_value("none").text, "✗");
        assert_eq!(CellView::from_value("none").class, Some("not-supported"));

        let version = CellView::from_value("1.70.0");
        assert_eq!(version.text, "1.70.0");
        assert_eq!(version.class, None);
        assert_eq!(CellView::from_value("N/A").text, "N/A");
    }

    #[test]
    fn test_page_renders_table_escaped() {
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .page(&page_with(Some(TableView::from(&sample_table())), None))
            .unwrap();
        assert!(html.contains("feature-table"));
        assert!(html.contains(r#"class="supported""#));
        assert!(html.contains(r#"class="not-supported""#));
        assert!(html.contains("&lt;Chat&gt;"));
        assert!(!html.contains("<Chat>"));
    }

    #[test]
    fn test_page_shows_notice_without_table() {
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .page(&page_with(None, Some("Select an IDE".into())))
            .unwrap();
        assert!(html.contains("Select an IDE"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_error_view() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.error("PARSE", "dataset 'x' is not valid JSON").unwrap();
        assert!(html.contains("PARSE"));
        assert!(html.contains("is not valid JSON"));
        assert!(!html.contains("'x'"));
    }
}
