use crate::error::ServiceError;
use error_stack::Report;

pub type ServiceResult<T> = Result<T, Report<ServiceError>>;
pub type OptServiceResult<T> = Result<Option<T>, Report<ServiceError>>;

pub mod error;
mod metrics;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
