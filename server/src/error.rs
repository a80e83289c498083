use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to fetch route data")]
    Database { details: Option<String> },
}

impl AppError {
    /// `details` is populated only in development builds of the config.
    pub fn database(err: anyhow::Error, include_details: bool) -> Self {
        Self::Database {
            details: include_details.then(|| format!("{err:#}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({ "error": self.to_string() });
        if let AppError::Database { details: Some(details) } = &self {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}
