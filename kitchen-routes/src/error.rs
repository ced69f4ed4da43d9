use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use error_stack::Report;
use serde::Serialize;
use std::borrow::Cow;
use std::error::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
#[error("kitchen service failed")]
pub struct KitchenServiceError;

#[derive(Debug, thiserror::Error)]
#[error("failed to set up the metrics recorder")]
pub struct MetricsSetupError;

/// Whatever went wrong below a handler. Logged in full, answered with a 500
/// carrying the chain of contexts.
#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError<T: Error + Send + Sync + 'static>(Report<T>);

impl<T: Error + Send + Sync + 'static> std::fmt::Debug for EndpointError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> From<Report<T>> for EndpointError<T>
where
    T: Error + Send + Sync + 'static,
{
    fn from(value: Report<T>) -> Self {
        Self(value)
    }
}

impl<T: Error + Send + Sync + 'static> IntoResponse for EndpointError<T> {
    fn into_response(self) -> Response {
        error!("request failed: {:?}", self.0);
        KitchenError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", self.0)).into_response()
    }
}

/// Error body every endpoint answers with: `{"detail": ...}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct KitchenError {
    #[serde(skip)]
    status_code: StatusCode,
    #[schema(value_type = String)]
    detail: Cow<'static, str>,
}

impl KitchenError {
    pub fn new(status_code: StatusCode, detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            detail: detail.into(),
        }
    }

    pub fn item_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Item not found")
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    }
}

impl From<JsonRejection> for KitchenError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for KitchenError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::ResultExt;

    #[derive(Debug, thiserror::Error)]
    #[error("lower layer failed")]
    struct LowerError;

    fn failing() -> Result<(), Report<KitchenServiceError>> {
        Err(Report::new(LowerError)).change_context(KitchenServiceError)
    }

    #[test]
    fn endpoint_error_is_internal_server_error() {
        let error = EndpointError::from(failing().unwrap_err());

        let response = error.into_response();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    }

    #[test]
    fn item_not_found_is_404() {
        let response = KitchenError::item_not_found().into_response();

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[test]
    fn method_not_allowed_is_405() {
        let response = KitchenError::method_not_allowed().into_response();

        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, response.status());
    }
}
