use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::{AttachmentKind, FrameKind, Report};
use kernel::KernelError;
use serde_json::json;
use std::process::{ExitCode, Termination};

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl From<JsonRejection> for ErrorStatus {
    fn from(rejection: JsonRejection) -> Self {
        let body = rejection.body_text();
        ErrorStatus(
            Report::new(KernelError::Validation("invalid request body")).attach_printable(body),
        )
    }
}

impl From<QueryRejection> for ErrorStatus {
    fn from(rejection: QueryRejection) -> Self {
        let query = rejection.body_text();
        ErrorStatus(
            Report::new(KernelError::Validation("invalid query string")).attach_printable(query),
        )
    }
}

/// Most recent printable attachment, falling back to the innermost context.
fn internal_message(report: &Report<KernelError>) -> String {
    report
        .frames()
        .find_map(|frame| match frame.kind() {
            FrameKind::Attachment(AttachmentKind::Printable(printable)) => {
                Some(printable.to_string())
            }
            _ => None,
        })
        .or_else(|| {
            report
                .frames()
                .filter_map(|frame| match frame.kind() {
                    FrameKind::Context(context) => Some(context.to_string()),
                    _ => None,
                })
                .last()
        })
        .unwrap_or_else(|| KernelError::Internal.to_string())
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let report = self.0;
        let (status, body) = match report.current_context() {
            KernelError::Validation(message) | KernelError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            KernelError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            error @ KernelError::InsufficientStock { stock } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error.to_string(), "stock": stock }),
            ),
            error @ KernelError::Timeout => {
                (StatusCode::REQUEST_TIMEOUT, json!({ "error": error.to_string() }))
            }
            KernelError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": internal_message(&report) }),
            ),
        };

        if status.is_server_error() {
            tracing::error!("{report:?}");
        } else {
            tracing::debug!(status = status.as_u16(), "{report}");
        }
        (status, Json(body)).into_response()
    }
}
