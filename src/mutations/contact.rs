//! Buyer inquiries sent to a company's seller

use async_graphql::{Context, InputObject, Object, Result};
use chrono::Utc;
use validator::Validate;

use super::errors::{payload, BulkPayload, DeletePayload, Failure, MutationError, Outcome};
use super::require_user;
use super::validation::{pk, Checks};
use crate::auth::Viewer;
use crate::objects::Contact;
use crate::resolvers::{store, viewer};
use crate::store::{self, MessageStatus, MessageType, Store, Transaction};
use crate::types::GlobalId;

payload!(
    /// Result of a contact mutation
    ContactPayload, contact: Contact
);

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct ContactInput {
    /// Company the message is addressed to
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    /// ISO 3166-1 alpha-2 code
    pub country: Option<String>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    #[validate(length(max = 5000))]
    pub contact: Option<String>,
    pub ask_for_reference: Option<bool>,
    #[graphql(name = "type")]
    pub message_type: Option<MessageType>,
}

/// Seller-side changes to a received message
#[derive(InputObject, Debug, Clone)]
pub struct ContactUpdateInput {
    pub status: MessageStatus,
}

/// Staff, the seller the message went to, or the company's owner
async fn handles(store: &Store, viewer: &Viewer, contact: &store::Contact) -> Outcome<bool> {
    if viewer.is_staff() {
        return Ok(true);
    }
    let Some(user_id) = viewer.user_id else {
        return Ok(false);
    };
    if contact.seller_id == Some(user_id) {
        return Ok(true);
    }
    let company = store.companies.get(contact.company_id).await?;
    Ok(company.map_or(false, |c| c.owner_id == Some(user_id)))
}

async fn handled(store: &Store, viewer: &Viewer, id: i64) -> Outcome<store::Contact> {
    require_user(viewer)?;
    let contact = store
        .contacts
        .get(id)
        .await?
        .ok_or_else(|| Failure::from(MutationError::not_found("id", "Contact")))?;
    if !handles(store, viewer, &contact).await? {
        tracing::debug!(user_id = ?viewer.user_id, contact_id = id, "contact access denied");
        return Err(MutationError::forbidden().into());
    }
    Ok(contact)
}

async fn create(tx: &mut Transaction, store: &Store, viewer: &Viewer, input: ContactInput) -> Outcome<store::Contact> {
    let user_id = require_user(viewer)?;

    let mut checks = Checks::of(&input);
    let company_id = match input.company.as_ref() {
        Some(id) => checks.pk::<store::Company>("company", Some(id)),
        None => {
            checks.push(MutationError::required("company"));
            None
        }
    };
    let name = checks.required("name", input.name.as_deref());
    let email = checks.required("email", input.email.as_deref());
    let subject = checks.required("subject", input.subject.as_deref());
    let body = checks.required("contact", input.contact.as_deref());
    let country = checks.country("country", input.country.as_deref());
    checks.finish()?;

    let (Some(company_id), Some(name), Some(email), Some(subject), Some(body)) =
        (company_id, name, email, subject, body)
    else {
        return Err(MutationError::required("company").into());
    };

    let company = store
        .companies
        .get(company_id)
        .await?
        .filter(|c| viewer.can_see_company(c))
        .ok_or_else(|| Failure::from(MutationError::not_found("company", "Company")))?;

    let row = store::Contact {
        id: 0,
        company_id,
        seller_id: company.owner_id,
        user_id: Some(user_id),
        name,
        email,
        country,
        subject,
        contact: body,
        submission_date: Utc::now(),
        ask_for_reference: input.ask_for_reference.unwrap_or(false),
        status: MessageStatus::New,
        message_type: input.message_type.unwrap_or_default(),
    };
    let created = tx.insert(&store.contacts, row).await?;
    tracing::info!(contact_id = created.id, company_id, "contact message received");
    Ok(created)
}

async fn update(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    input: ContactUpdateInput,
) -> Outcome<store::Contact> {
    let current = handled(store, viewer, id).await?;
    if current.status == input.status {
        return Ok(current);
    }
    let row = store::Contact { status: input.status, ..current };
    let saved = tx.update(&store.contacts, row).await?;
    tracing::info!(contact_id = id, status = ?saved.status, "contact status changed");
    Ok(saved)
}

async fn delete(tx: &mut Transaction, store: &Store, viewer: &Viewer, id: i64) -> Outcome<()> {
    handled(store, viewer, id).await?;
    tx.delete(&store.contacts, id).await?;
    tracing::info!(contact_id = id, "contact deleted");
    Ok(())
}

#[derive(Default)]
pub struct ContactMutation;

#[Object]
impl ContactMutation {
    /// Send a message to a visible company; the owner becomes the seller
    async fn contact_create(&self, ctx: &Context<'_>, input: ContactInput) -> Result<ContactPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut tx = store.begin().await;
        let outcome = create(&mut tx, store, &viewer, input).await;
        let outcome = tx.settle(outcome).await;
        Ok(ContactPayload::settle(ctx, outcome.map(Contact)))
    }

    async fn contact_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: ContactUpdateInput,
    ) -> Result<ContactPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Contact>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = update(&mut tx, store, &viewer, id, input).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(ContactPayload::settle(ctx, outcome.map(Contact)))
    }

    async fn contact_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Contact>(&id) {
            Ok(pk) => {
                let mut tx = store.begin().await;
                let outcome = delete(&mut tx, store, &viewer, pk).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(DeletePayload::settle(ctx, outcome.map(|()| id)))
    }

    async fn contact_bulk_delete(&self, ctx: &Context<'_>, ids: Vec<GlobalId>) -> Result<BulkPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let outcome = match pk::<store::Contact>(&id) {
                Ok(pk) => {
                    let mut tx = store.begin().await;
                    let outcome = delete(&mut tx, store, &viewer, pk).await;
                    tx.settle(outcome).await
                }
                Err(e) => Err(e.into()),
            };
            outcomes.push((id, outcome));
        }
        Ok(BulkPayload::settle(ctx, outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MANAGE_COMPANIES;
    use crate::mutations::ErrorCode;

    async fn published(store: &Store, owner: i64) -> store::Company {
        let mut company = store::Company::draft("Acme", "acme", Some(owner));
        company.is_active = true;
        company.is_published = true;
        store.companies.insert(company).await.unwrap()
    }

    fn inquiry(company: &store::Company) -> ContactInput {
        ContactInput {
            company: Some(GlobalId::of::<store::Company>(company.id)),
            name: Some("Buyer".into()),
            email: Some("buyer@example.com".into()),
            country: Some("de".into()),
            subject: Some("Prices".into()),
            contact: Some("Please send a price list.".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_addresses_company_owner() {
        let store = Store::in_memory();
        let company = published(&store, 7).await;

        let mut tx = store.begin().await;
        let contact = create(&mut tx, &store, &Viewer::user(3), inquiry(&company)).await.unwrap();
        assert_eq!(contact.seller_id, Some(7));
        assert_eq!(contact.user_id, Some(3));
        assert_eq!(contact.status, MessageStatus::New);
        assert_eq!(contact.country.as_deref(), Some("DE"));
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let store = Store::in_memory();
        let company = published(&store, 7).await;
        let input = ContactInput { email: Some("nobody".into()), subject: None, ..inquiry(&company) };

        let mut tx = store.begin().await;
        let Err(Failure::Rejected(errors)) = create(&mut tx, &store, &Viewer::user(3), input).await else {
            panic!("expected validation errors");
        };
        let fields: Vec<_> = errors.iter().map(|e| (e.field.as_deref(), e.code)).collect();
        assert!(fields.contains(&(Some("email"), ErrorCode::Invalid)));
        assert!(fields.contains(&(Some("subject"), ErrorCode::Required)));
    }

    #[tokio::test]
    async fn test_hidden_company_cannot_be_contacted() {
        let store = Store::in_memory();
        let company = store.companies.insert(store::Company::draft("Draft", "draft", Some(7))).await.unwrap();

        let mut tx = store.begin().await;
        let failure = create(&mut tx, &store, &Viewer::user(3), inquiry(&company)).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_only_seller_side_handles_messages() {
        let store = Store::in_memory();
        let company = published(&store, 7).await;
        let mut tx = store.begin().await;
        let contact = create(&mut tx, &store, &Viewer::user(3), inquiry(&company)).await.unwrap();

        assert!(handles(&store, &Viewer::user(7), &contact).await.unwrap());
        assert!(handles(&store, &Viewer::user(9).with_capability(MANAGE_COMPANIES), &contact).await.unwrap());
        assert!(!handles(&store, &Viewer::user(3), &contact).await.unwrap());

        let read = ContactUpdateInput { status: MessageStatus::Read };
        let failure = update(&mut tx, &store, &Viewer::user(3), contact.id, read.clone()).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::Forbidden);
        let saved = update(&mut tx, &store, &Viewer::user(7), contact.id, read).await.unwrap();
        assert_eq!(saved.status, MessageStatus::Read);
    }
}
