use crate::error::KitchenServiceError;
use error_stack::Report;

pub type ServiceResult<T> = Result<T, Report<KitchenServiceError>>;
pub type OptServiceResult<T> = Result<Option<T>, Report<KitchenServiceError>>;

pub mod error;
mod metrics;
pub mod routes;
pub mod service;
pub mod state;
mod stream;
