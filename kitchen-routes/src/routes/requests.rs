use crate::error::KitchenError;
use axum::Json;
use axum_extra::extract::WithRejection;

/// JSON body whose rejections answer with the usual `{"detail": ...}` envelope.
pub type JsonBody<T> = WithRejection<Json<T>, KitchenError>;
