use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveTime;
use serde_json::json;
use thiserror::Error;

/// Why an on-demand payroll request was turned away before any work started.
#[derive(Error, Debug, PartialEq)]
pub enum BatchRejection {
    #[error("{0}")]
    Validation(String),
    #[error("Esta función solo se puede llamar a las {window} (hora actual {now})")]
    TimeGate { now: NaiveTime, window: NaiveTime },
}

impl ResponseError for BatchRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to render payslip for employee {}: {cause}", display_id(.employee_id))]
pub struct RenderError {
    pub employee_id: Option<u64>,
    pub cause: String,
}

fn display_id(id: &Option<u64>) -> String {
    id.map_or_else(|| "<sin id>".to_string(), |id| id.to_string())
}

#[derive(Error, Debug)]
#[error("failed to store document {name}: {source}")]
pub struct StoreError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to email {recipient} (status {status:?}): {cause}")]
pub struct DispatchError {
    pub recipient: String,
    pub status: Option<u16>,
    pub cause: String,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Empleado {0} no encontrado")]
    NotFound(u64),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

impl ResponseError for RepositoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
            RepositoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            RepositoryError::NotFound(_) => self.to_string(),
            RepositoryError::Storage(e) => {
                tracing::error!(error = %e, "Roster storage failure");
                "Internal Server Error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
