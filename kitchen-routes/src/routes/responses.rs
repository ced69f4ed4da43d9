use axum::Json;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use kitchen_core::model::Entity;
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(value_type = String)]
    message: Cow<'static, str>,
    /// Set when a record was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn created<E: Entity>(entity: &E) -> Self {
        Self {
            message: format!("{} added successfully", E::LABEL).into(),
            id: Some(entity.key().to_string()),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
