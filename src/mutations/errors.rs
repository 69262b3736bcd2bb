//! Mutation error payloads
//!
//! Validation, permission and store failures never surface as GraphQL
//! protocol errors from a mutation. They land in the payload's `errors` list
//! as `{field, code, message}`.

use async_graphql::{Context, Enum, SimpleObject};
use uuid::Uuid;

use crate::auth::get_request_id;
use crate::store::StoreError;
use crate::types::GlobalId;

#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    Forbidden,
    Invalid,
    Required,
    Unique,
    CannotDelete,
    Internal,
}

/// A user-visible mutation failure
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct MutationError {
    /// Input field at fault, if any
    pub field: Option<String>,
    pub code: ErrorCode,
    pub message: String,
}

impl MutationError {
    pub fn new(field: Option<&str>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self { field: field.map(str::to_string), code, message: message.into() }
    }

    pub fn not_found(field: &str, entity: &str) -> Self {
        Self::new(Some(field), ErrorCode::NotFound, format!("{} not found.", entity))
    }

    pub fn forbidden() -> Self {
        Self::new(None, ErrorCode::Forbidden, "You do not have permission to perform this action.")
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::new(Some(field), ErrorCode::Invalid, message)
    }

    pub fn required(field: &str) -> Self {
        Self::new(Some(field), ErrorCode::Required, "This field is required.")
    }

    pub fn unique(field: &str) -> Self {
        Self::new(Some(field), ErrorCode::Unique, format!("An entry with this {} already exists.", field))
    }

    pub fn cannot_delete(message: impl Into<String>) -> Self {
        Self::new(None, ErrorCode::CannotDelete, message)
    }
}

/// Why a mutation did not go through
#[derive(Debug)]
pub enum Failure {
    Rejected(Vec<MutationError>),
    Store(StoreError),
}

impl From<MutationError> for Failure {
    fn from(error: MutationError) -> Self {
        Failure::Rejected(vec![error])
    }
}

impl From<StoreError> for Failure {
    fn from(error: StoreError) -> Self {
        Failure::Store(error)
    }
}

impl Failure {
    /// Client-facing errors; backend failures are logged under `correlation_id`
    pub fn into_errors(self, correlation_id: Uuid) -> Vec<MutationError> {
        match self {
            Failure::Rejected(errors) => errors,
            Failure::Store(StoreError::UniqueViolation { field, .. }) => vec![MutationError::unique(field)],
            Failure::Store(StoreError::NotFound { entity, .. }) => vec![MutationError::not_found("id", entity)],
            Failure::Store(StoreError::Backend(reason)) => {
                tracing::error!(%correlation_id, %reason, "store failure during mutation");
                vec![MutationError::new(
                    None,
                    ErrorCode::Internal,
                    format!("Internal error (reference {}).", correlation_id),
                )]
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Failure::Rejected(errors) => errors.first().map_or(ErrorCode::Invalid, |e| e.code),
            Failure::Store(StoreError::UniqueViolation { .. }) => ErrorCode::Unique,
            Failure::Store(StoreError::NotFound { .. }) => ErrorCode::NotFound,
            Failure::Store(StoreError::Backend(_)) => ErrorCode::Internal,
        }
    }
}

pub type Outcome<T> = Result<T, Failure>;

/// Errors of a settled mutation for the current request
pub(crate) fn errors_of(ctx: &Context<'_>, failure: Failure) -> Vec<MutationError> {
    failure.into_errors(get_request_id(ctx))
}

/// Payload carrying the affected entity under `$field`
macro_rules! payload {
    ($(#[$doc:meta])* $name:ident, $field:ident: $ty:ty) => {
        $(#[$doc])*
        #[derive(async_graphql::SimpleObject)]
        pub struct $name {
            pub $field: Option<$ty>,
            pub errors: Vec<$crate::mutations::errors::MutationError>,
        }

        impl $name {
            pub(crate) fn settle(
                ctx: &async_graphql::Context<'_>,
                outcome: $crate::mutations::errors::Outcome<$ty>,
            ) -> Self {
                match outcome {
                    Ok(value) => Self { $field: Some(value), errors: Vec::new() },
                    Err(failure) => Self {
                        $field: None,
                        errors: $crate::mutations::errors::errors_of(ctx, failure),
                    },
                }
            }
        }
    };
}

pub(crate) use payload;

/// Result of a delete
#[derive(SimpleObject, Debug, Clone)]
pub struct DeletePayload {
    pub deleted_id: Option<GlobalId>,
    pub errors: Vec<MutationError>,
}

impl DeletePayload {
    pub(crate) fn settle(ctx: &Context<'_>, outcome: Outcome<GlobalId>) -> Self {
        match outcome {
            Ok(id) => Self { deleted_id: Some(id), errors: Vec::new() },
            Err(failure) => Self { deleted_id: None, errors: errors_of(ctx, failure) },
        }
    }
}

/// An error raised by one item of a bulk operation
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
    pub id: GlobalId,
    pub field: Option<String>,
    pub code: ErrorCode,
    pub message: String,
}

/// Result of a bulk operation
#[derive(SimpleObject, Debug, Clone)]
pub struct BulkPayload {
    /// Items the operation succeeded on
    pub count: i32,
    pub errors: Vec<BulkItemError>,
}

impl BulkPayload {
    pub(crate) fn settle(ctx: &Context<'_>, outcomes: Vec<(GlobalId, Outcome<()>)>) -> Self {
        let mut count = 0;
        let mut errors = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => count += 1,
                Err(failure) => errors.extend(errors_of(ctx, failure).into_iter().map(|e| {
                    BulkItemError { id: id.clone(), field: e.field, code: e.code, message: e.message }
                })),
            }
        }
        Self { count, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_codes() {
        let id = Uuid::new_v4();
        let unique = Failure::from(StoreError::UniqueViolation { entity: "Company", field: "slug" });
        assert_eq!(unique.code(), ErrorCode::Unique);
        assert_eq!(unique.into_errors(id), vec![MutationError::unique("slug")]);

        let missing = Failure::from(StoreError::NotFound { entity: "Contact", id: 4 });
        assert_eq!(missing.into_errors(id)[0].code, ErrorCode::NotFound);
    }

    #[test]
    fn test_backend_failure_carries_correlation_id() {
        let id = Uuid::new_v4();
        let errors = Failure::from(StoreError::Backend("connection reset".into())).into_errors(id);
        assert_eq!(errors[0].code, ErrorCode::Internal);
        assert!(errors[0].message.contains(&id.to_string()));
        assert!(!errors[0].message.contains("connection reset"));
    }

    #[test]
    fn test_rejected_code_is_first_error() {
        let failure = Failure::Rejected(vec![MutationError::required("name"), MutationError::forbidden()]);
        assert_eq!(failure.code(), ErrorCode::Required);
    }
}
