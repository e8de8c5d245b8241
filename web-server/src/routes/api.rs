//! JSON API over the loaded feature matrix.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use feature_matrix::{MatrixSession, PivotQuery, SessionMeta, ViewKind};
use matrix_types::{Axis, AxisParseError, Fact, PivotFilters, PivotTable, Warning, WarningKind};

use crate::state::{AppState, MatrixState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn failure(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::err(message)))
}

/// The loaded session, or 503 when the dataset never loaded.
fn ready(state: &AppState) -> Result<&MatrixSession, ApiError> {
    match state.matrix.as_ref() {
        MatrixState::Ready(session) => Ok(session),
        MatrixState::Failed { code, message } => Err(failure(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("feature data unavailable ({code}): {message}"),
        )),
    }
}

/// Query string shared by the API and the HTML page.
///
/// Empty values are treated as absent so unset form fields don't filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixParams {
    pub tab: Option<String>,
    pub rows: Option<String>,
    pub columns: Option<String>,
    pub ide: Option<String>,
    pub version: Option<String>,
    pub feature: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl MatrixParams {
    pub fn filters(&self) -> PivotFilters {
        PivotFilters {
            ide: non_empty(&self.ide),
            version: non_empty(&self.version),
            feature: non_empty(&self.feature),
        }
    }

    /// Unknown tabs fall back to the default view.
    pub fn view(&self) -> ViewKind {
        non_empty(&self.tab)
            .and_then(|tab| tab.parse().ok())
            .unwrap_or_default()
    }

    /// Row and column axes, defaulting to feature × ide.
    pub fn axes(&self) -> Result<(Axis, Axis), AxisParseError> {
        let rows = match non_empty(&self.rows) {
            Some(raw) => raw.parse()?,
            None => Axis::Feature,
        };
        let columns = match non_empty(&self.columns) {
            Some(raw) => raw.parse()?,
            None => Axis::Ide,
        };
        Ok((rows, columns))
    }

    pub fn pivot_query(&self) -> Result<PivotQuery, AxisParseError> {
        let (rows, columns) = self.axes()?;
        Ok(PivotQuery::new(rows, columns).with_filters(self.filters()))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthInfo {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WarningsInfo {
    pub count: usize,
    pub by_kind: BTreeMap<WarningKind, usize>,
    pub warnings: Vec<Warning>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/ides", get(list_ides))
        .route("/api/features", get(list_features))
        .route("/api/ides/:ide/versions", get(list_ide_versions))
        .route("/api/facts", get(list_facts))
        .route("/api/pivot", get(pivot_table))
        .route("/api/views/latest", get(latest_view))
        .route("/api/views/ide", get(ide_view))
        .route("/api/views/feature", get(feature_view))
        .route("/api/warnings", get(list_warnings))
}

// Answers even when the dataset failed to load
async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthInfo>> {
    let info = match state.matrix.as_ref() {
        MatrixState::Ready(session) => HealthInfo {
            status: "ok",
            session: Some(session.meta().clone()),
            error: None,
        },
        MatrixState::Failed { code, message } => HealthInfo {
            status: "unavailable",
            session: None,
            error: Some(format!("{code}: {message}")),
        },
    };
    Json(ApiResponse::ok(info))
}

async fn list_ides(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let session = ready(&state)?;
    Ok(Json(ApiResponse::ok(session.distinct_ides())))
}

async fn list_features(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let session = ready(&state)?;
    Ok(Json(ApiResponse::ok(session.distinct_features())))
}

async fn list_ide_versions(
    Path(ide): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<String>> {
    let session = ready(&state)?;
    if session.dataset().ide(&ide).is_none() {
        return Err(failure(
            StatusCode::NOT_FOUND,
            format!("unknown IDE '{ide}'"),
        ));
    }
    Ok(Json(ApiResponse::ok(session.versions_for_ide(&ide))))
}

async fn list_facts(
    Query(params): Query<MatrixParams>,
    State(state): State<AppState>,
) -> ApiResult<Vec<Fact>> {
    let session = ready(&state)?;
    let facts = session
        .facts(&params.filters())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ApiResponse::ok(facts)))
}

async fn pivot_table(
    Query(params): Query<MatrixParams>,
    State(state): State<AppState>,
) -> ApiResult<PivotTable> {
    let session = ready(&state)?;
    let query = params.pivot_query().map_err(|e| {
        warn!("Rejected pivot request: {}", e);
        failure(StatusCode::BAD_REQUEST, e.to_string())
    })?;
    Ok(Json(ApiResponse::ok(session.pivot(&query))))
}

async fn latest_view(State(state): State<AppState>) -> ApiResult<PivotTable> {
    let session = ready(&state)?;
    Ok(Json(ApiResponse::ok(session.latest_view())))
}

async fn ide_view(
    Query(params): Query<MatrixParams>,
    State(state): State<AppState>,
) -> ApiResult<PivotTable> {
    let session = ready(&state)?;
    Ok(Json(ApiResponse::ok(session.ide_view(&params.filters()))))
}

async fn feature_view(
    Query(params): Query<MatrixParams>,
    State(state): State<AppState>,
) -> ApiResult<PivotTable> {
    let session = ready(&state)?;
    Ok(Json(ApiResponse::ok(session.release_view(&params.filters()))))
}

async fn list_warnings(State(state): State<AppState>) -> ApiResult<WarningsInfo> {
    let session = ready(&state)?;
    let report = session.report();
    let by_kind = report
        .by_kind()
        .into_iter()
        .map(|(kind, warnings)| (kind, warnings.len()))
        .collect();
    Ok(Json(ApiResponse::ok(WarningsInfo {
        count: report.count(),
        by_kind,
        warnings: report.warnings.clone(),
    })))
}
