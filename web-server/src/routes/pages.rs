//! Server-rendered tab page.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use feature_matrix::{MatrixSession, ViewKind};
use matrix_types::{Axis, PivotTable};

use super::api::MatrixParams;
use crate::render::{FilterForm, PageContext, SelectOption, TabLink, TableView, WarningView};
use crate::state::{AppState, MatrixState};

pub async fn index(
    Query(params): Query<MatrixParams>,
    State(state): State<AppState>,
) -> Response {
    let session = match state.matrix.as_ref() {
        MatrixState::Ready(session) => session,
        MatrixState::Failed { code, message } => {
            return match state.renderer.error(code, message) {
                Ok(html) => (StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response(),
                Err(e) => render_failure(e),
            };
        }
    };

    let (status, context) = build_page(session, &params);
    match state.renderer.page(&context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => render_failure(e),
    }
}

fn render_failure(e: crate::render::RenderError) -> Response {
    error!("Failed to render page: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Assemble the page for the requested tab.
pub fn build_page(session: &MatrixSession, params: &MatrixParams) -> (StatusCode, PageContext) {
    let view = params.view();
    let filters = params.filters();
    let mut status = StatusCode::OK;
    let mut form = FilterForm::default();

    let outcome: Result<PivotTable, String> = match view {
        ViewKind::Latest => Ok(session.latest_view()),
        ViewKind::Ide => {
            form.ides = Some(SelectOption::list(session.distinct_ides(), filters.ide.as_deref()));
            if let Some(ide) = filters.ide.as_deref() {
                form.versions = Some(SelectOption::list(
                    session.versions_for_ide(ide),
                    filters.version.as_deref(),
                ));
            }
            form.features = Some(SelectOption::list(
                session.distinct_features(),
                filters.feature.as_deref(),
            ));
            if filters.ide.is_none() {
                Err("Select an IDE to see its feature history.".to_string())
            } else {
                Ok(session.ide_view(&filters))
            }
        }
        ViewKind::Feature => {
            form.features = Some(SelectOption::list(
                session.distinct_features(),
                filters.feature.as_deref(),
            ));
            if filters.feature.is_none() {
                Err("Select a feature to see when each IDE shipped it.".to_string())
            } else {
                Ok(session.release_view(&filters))
            }
        }
        ViewKind::Pivot => {
            let (rows, columns) = params.axes().unwrap_or((Axis::Feature, Axis::Ide));
            let axis_names = || Axis::ALL.iter().map(|a| a.as_str());
            form.rows = Some(SelectOption::list(axis_names(), Some(rows.as_str())));
            form.columns = Some(SelectOption::list(axis_names(), Some(columns.as_str())));
            form.ides = Some(SelectOption::list(session.distinct_ides(), filters.ide.as_deref()));
            form.versions = Some(SelectOption::list(
                session.distinct_versions(),
                filters.version.as_deref(),
            ));
            form.features = Some(SelectOption::list(
                session.distinct_features(),
                filters.feature.as_deref(),
            ));
            match params.pivot_query() {
                Ok(_) if rows == columns => {
                    Err("Rows and columns must be different axes.".to_string())
                }
                Ok(query) => Ok(session.pivot(&query)),
                Err(e) => {
                    status = StatusCode::BAD_REQUEST;
                    Err(e.to_string())
                }
            }
        }
    };

    let (table, notice) = match outcome {
        Ok(table) if table.is_empty() || table.rows.is_empty() => {
            (None, Some("No features match the current filters.".to_string()))
        }
        Ok(table) => (Some(TableView::from(&table)), None),
        Err(notice) => (None, Some(notice)),
    };

    let tabs = ViewKind::ALL
        .iter()
        .map(|kind| TabLink {
            key: kind.as_str(),
            title: kind.title(),
            active: *kind == view,
        })
        .collect();

    let meta = session.meta();
    let warnings: Vec<WarningView> = session.warnings().iter().map(WarningView::from).collect();
    let context = PageContext {
        tab: view.as_str(),
        caption: view.title(),
        tabs,
        form,
        table,
        notice,
        warning_count: warnings.len(),
        warnings,
        source: meta.source.clone(),
        loaded_at: meta.loaded_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    };
    (status, context)
}
