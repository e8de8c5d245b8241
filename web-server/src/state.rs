//! Shared application state.

use std::sync::Arc;

use feature_matrix::MatrixSession;

use crate::render::Renderer;

/// Outcome of the one-time dataset load.
#[derive(Debug)]
pub enum MatrixState {
    Ready(MatrixSession),
    /// Terminal: the server keeps running but only reports the failure
    Failed { code: String, message: String },
}

#[derive(Clone)]
pub struct AppState {
    pub matrix: Arc<MatrixState>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn ready(session: MatrixSession, renderer: Renderer) -> Self {
        Self {
            matrix: Arc::new(MatrixState::Ready(session)),
            renderer: Arc::new(renderer),
        }
    }

    pub fn failed(code: impl Into<String>, message: impl Into<String>, renderer: Renderer) -> Self {
        Self {
            matrix: Arc::new(MatrixState::Failed {
                code: code.into(),
                message: message.into(),
            }),
            renderer: Arc::new(renderer),
        }
    }

    pub fn session(&self) -> Option<&MatrixSession> {
        match self.matrix.as_ref() {
            MatrixState::Ready(session) => Some(session),
            MatrixState::Failed { .. } => None,
        }
    }
}
