//! Mutation roots
//!
//! Every mutation runs inside one store transaction: permission checks,
//! validation, the write and its side effects (cascades, unlinking) either
//! all commit or all roll back. Bulk operations use one transaction per item
//! so a failing item does not undo its siblings.

mod catalog;
mod children;
mod company;
mod contact;
pub mod errors;
mod success_story;
pub mod validation;

use async_graphql::MergedObject;

pub use catalog::CatalogMutation;
pub use children::ChildMutation;
pub use company::CompanyMutation;
pub use contact::ContactMutation;
pub use errors::{BulkItemError, BulkPayload, DeletePayload, ErrorCode, MutationError};
pub use success_story::SuccessStoryMutation;

use crate::auth::Viewer;
use crate::store::{Company, Store};
use errors::{Failure, Outcome};

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    CompanyMutation,
    ChildMutation,
    ContactMutation,
    SuccessStoryMutation,
    CatalogMutation,
);

/// Signed-in user id, `FORBIDDEN` otherwise
pub(crate) fn require_user(viewer: &Viewer) -> Outcome<i64> {
    viewer.user_id.ok_or_else(|| {
        tracing::debug!("anonymous viewer denied");
        MutationError::forbidden().into()
    })
}

pub(crate) fn require_capability(viewer: &Viewer, capability: &str) -> Outcome<()> {
    require_user(viewer)?;
    if viewer.has(capability) {
        Ok(())
    } else {
        tracing::debug!(user_id = ?viewer.user_id, capability, "capability missing");
        Err(MutationError::forbidden().into())
    }
}

/// Load a company the viewer may write to; `field` names the input that
/// referenced it
pub(crate) async fn writable_company(
    store: &Store,
    viewer: &Viewer,
    id: i64,
    field: &str,
) -> Outcome<Company> {
    require_user(viewer)?;
    let company = store
        .companies
        .get(id)
        .await?
        .ok_or_else(|| Failure::from(MutationError::not_found(field, "Company")))?;

    if viewer.can_manage_company(&company) {
        Ok(company)
    } else {
        tracing::debug!(user_id = ?viewer.user_id, company_id = id, "company write denied");
        Err(MutationError::forbidden().into())
    }
}
