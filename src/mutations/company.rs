//! Company profile mutations and state transitions

use async_graphql::{Context, InputObject, Object, Result};
use chrono::Utc;
use validator::Validate;

use super::errors::{payload, BulkPayload, DeletePayload, Failure, MutationError, Outcome};
use super::validation::{assign_text, is_slug, pk, slug_taken, slugify, unique_slug, Checks};
use super::{require_capability, require_user, writable_company};
use crate::auth::{Viewer, ADMIN};
use crate::objects::Company;
use crate::resolvers::{store, viewer};
use crate::store::{self, Store, Transaction};
use crate::types::{GlobalId, JsonArray};

payload!(
    /// Result of a company mutation
    CompanyPayload, company: Company
);

/// Profile fields; omitted fields stay unchanged, blank text clears them
#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct CompanyInput {
    /// Required on create
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Generated from the name when omitted on create
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 255))]
    pub seo_title: Option<String>,
    #[validate(length(max = 320))]
    pub seo_description: Option<String>,
    /// Stored path of an already uploaded logo
    pub logo: Option<String>,
    #[validate(length(max = 255))]
    pub logo_alt: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub founded_year: Option<i32>,
    #[graphql(name = "type")]
    pub company_type: Option<String>,
    #[validate(range(min = 1))]
    pub no_of_employees: Option<i32>,
    pub content: Option<String>,
    pub is_brand: Option<bool>,
    pub organic_products: Option<bool>,
    pub private_label: Option<bool>,
    pub female_leadership: Option<bool>,
    #[validate(length(max = 255))]
    pub branded_value: Option<String>,
    pub brands: Option<JsonArray>,
    pub membership: Option<JsonArray>,
    pub export_countries: Option<Vec<String>>,
    pub industry: Option<GlobalId>,
}

/// Fields only administrators may change
#[derive(InputObject, Debug, Clone, Default)]
pub struct CompanyAdminInput {
    pub is_verified: Option<bool>,
    pub owner: Option<GlobalId>,
    /// Replaces the awarded badges
    pub rosetters: Option<Vec<GlobalId>>,
}

impl CompanyInput {
    /// Validate the input and write it onto `row`
    async fn apply(self, store: &Store, row: &mut store::Company, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);

        if creating || self.name.is_some() {
            if let Some(name) = checks.required("name", self.name.as_deref()) {
                row.name = name;
            }
        }
        if let Some(slug) = self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            checks.slug("slug", slug);
            if is_slug(slug) && slug_taken(&store.companies, slug, row.id).await? {
                checks.push(MutationError::unique("slug"));
            }
            row.slug = slug.to_string();
        }

        checks.year("founded_year", self.founded_year);
        checks.company_type("type", self.company_type.as_deref());
        let industry = checks.pk::<store::Industry>("industry", self.industry.as_ref());
        let brands = checks.strings("brands", self.brands.as_ref());
        let membership = checks.strings("membership", self.membership.as_ref());
        let countries = self
            .export_countries
            .as_deref()
            .map(|codes| checks.countries("export_countries", codes));
        checks.finish()?;

        if let Some(id) = industry {
            if store.industries.get(id).await?.is_none() {
                return Err(MutationError::not_found("industry", "Industry").into());
            }
            row.industry_id = Some(id);
        }

        assign_text(&mut row.seo_title, self.seo_title);
        assign_text(&mut row.seo_description, self.seo_description);
        assign_text(&mut row.logo, self.logo);
        assign_text(&mut row.website, self.website);
        assign_text(&mut row.address, self.address);
        assign_text(&mut row.company_type, self.company_type);
        assign_text(&mut row.content, self.content);
        assign_text(&mut row.branded_value, self.branded_value);
        if let Some(alt) = self.logo_alt {
            row.logo_alt = alt.trim().to_string();
        }

        if self.founded_year.is_some() {
            row.founded_year = self.founded_year;
        }
        if self.no_of_employees.is_some() {
            row.no_of_employees = self.no_of_employees;
        }
        row.is_brand = self.is_brand.unwrap_or(row.is_brand);
        row.organic_products = self.organic_products.unwrap_or(row.organic_products);
        row.private_label = self.private_label.unwrap_or(row.private_label);
        row.female_leadership = self.female_leadership.unwrap_or(row.female_leadership);

        if let Some(brands) = brands {
            row.brands = brands;
        }
        if let Some(membership) = membership {
            row.membership = membership;
        }
        if let Some(countries) = countries {
            row.export_countries = countries;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Activate,
    Deactivate,
    Publish,
    Unpublish,
}

impl Transition {
    fn name(self) -> &'static str {
        match self {
            Transition::Activate => "activate",
            Transition::Deactivate => "deactivate",
            Transition::Publish => "publish",
            Transition::Unpublish => "unpublish",
        }
    }

    /// Published implies active; the publication date is stamped once.
    fn apply(self, row: &mut store::Company) -> Result<(), MutationError> {
        match self {
            Transition::Activate => row.is_active = true,
            Transition::Deactivate => {
                row.is_active = false;
                row.is_published = false;
            }
            Transition::Publish => {
                if !row.is_active {
                    return Err(MutationError::invalid(
                        "is_active",
                        "The company must be active before it can be published.",
                    ));
                }
                row.is_published = true;
                row.publication_date.get_or_insert_with(Utc::now);
            }
            Transition::Unpublish => row.is_published = false,
        }
        Ok(())
    }
}

async fn create(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    input: CompanyInput,
) -> Outcome<store::Company> {
    let owner = require_user(viewer)?;
    let mut row = store::Company::draft("", "", Some(owner));
    input.apply(store, &mut row, true).await?;

    if row.slug.is_empty() {
        row.slug = unique_slug(&store.companies, &slugify(&row.name)).await?;
    }

    let created = tx.insert(&store.companies, row).await?;
    tracing::info!(company_id = created.id, owner_id = owner, "company created");
    Ok(created)
}

/// Write `row` unless nothing changed
async fn save(
    tx: &mut Transaction,
    store: &Store,
    current: store::Company,
    mut row: store::Company,
) -> Outcome<store::Company> {
    if row == current {
        return Ok(current);
    }
    row.update_date = Utc::now();
    Ok(tx.update(&store.companies, row).await?)
}

async fn update(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    input: CompanyInput,
) -> Outcome<store::Company> {
    let current = writable_company(store, viewer, id, "id").await?;
    let mut row = current.clone();
    input.apply(store, &mut row, false).await?;
    let saved = save(tx, store, current, row).await?;
    tracing::info!(company_id = id, "company updated");
    Ok(saved)
}

async fn update_admin(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    input: CompanyAdminInput,
) -> Outcome<store::Company> {
    require_capability(viewer, ADMIN)?;
    let current = store
        .companies
        .get(id)
        .await?
        .ok_or_else(|| Failure::from(MutationError::not_found("id", "Company")))?;

    let mut checks = Checks::default();
    let owner = checks.pk::<store::User>("owner", input.owner.as_ref());
    let mut rosetters = Vec::new();
    for rosetter in input.rosetters.iter().flatten() {
        if let Some(pk) = checks.pk::<store::Rosetter>("rosetters", Some(rosetter)) {
            if !rosetters.contains(&pk) {
                rosetters.push(pk);
            }
        }
    }
    checks.finish()?;

    let mut row = current.clone();
    if let Some(verified) = input.is_verified {
        row.is_verified = verified;
    }
    if let Some(owner) = owner {
        if store.users.get(owner).await?.is_none() {
            return Err(MutationError::not_found("owner", "User").into());
        }
        row.owner_id = Some(owner);
    }
    if input.rosetters.is_some() {
        if store.rosetters.get_many(&rosetters).await?.len() != rosetters.len() {
            return Err(MutationError::not_found("rosetters", "Rosetter").into());
        }
        row.rosetter_ids = rosetters;
    }

    let saved = save(tx, store, current, row).await?;
    tracing::info!(company_id = id, "company updated by admin");
    Ok(saved)
}

async fn transition(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    transition: Transition,
) -> Outcome<store::Company> {
    let current = writable_company(store, viewer, id, "id").await?;
    let mut row = current.clone();
    transition.apply(&mut row)?;
    let saved = save(tx, store, current, row).await?;
    tracing::info!(company_id = id, transition = transition.name(), "company state changed");
    Ok(saved)
}

/// Delete a company together with everything it owns
async fn delete(tx: &mut Transaction, store: &Store, viewer: &Viewer, id: i64) -> Outcome<()> {
    writable_company(store, viewer, id, "id").await?;

    let mut removed = 0;
    removed += tx.delete_owned(&store.representatives, id).await?;
    removed += tx.delete_owned(&store.certificates, id).await?;
    removed += tx.delete_owned(&store.brochures, id).await?;
    removed += tx.delete_owned(&store.images, id).await?;
    removed += tx.delete_owned(&store.videos, id).await?;
    removed += tx.delete_owned(&store.social_responsibilities, id).await?;
    removed += tx.delete_owned(&store.trade_shows, id).await?;
    removed += tx.delete_owned(&store.contacts, id).await?;
    removed += tx.delete_owned(&store.products, id).await?;
    tx.delete(&store.companies, id).await?;

    tracing::info!(company_id = id, children = removed, "company deleted");
    Ok(())
}

#[derive(Default)]
pub struct CompanyMutation;

impl CompanyMutation {
    async fn run_transition(&self, ctx: &Context<'_>, id: GlobalId, t: Transition) -> Result<CompanyPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Company>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = transition(&mut tx, store, &viewer, id, t).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(CompanyPayload::settle(ctx, outcome.map(Company)))
    }
}

#[Object]
impl CompanyMutation {
    /// Create an unpublished, inactive company owned by the viewer
    async fn company_create(&self, ctx: &Context<'_>, input: CompanyInput) -> Result<CompanyPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut tx = store.begin().await;
        let outcome = create(&mut tx, store, &viewer, input).await;
        let outcome = tx.settle(outcome).await;
        Ok(CompanyPayload::settle(ctx, outcome.map(Company)))
    }

    async fn company_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: CompanyInput,
    ) -> Result<CompanyPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Company>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = update(&mut tx, store, &viewer, id, input).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(CompanyPayload::settle(ctx, outcome.map(Company)))
    }

    /// Verification, ownership and badges; requires `admin`
    async fn company_update_admin(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: CompanyAdminInput,
    ) -> Result<CompanyPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Company>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = update_admin(&mut tx, store, &viewer, id, input).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(CompanyPayload::settle(ctx, outcome.map(Company)))
    }

    async fn company_activate(&self, ctx: &Context<'_>, id: GlobalId) -> Result<CompanyPayload> {
        self.run_transition(ctx, id, Transition::Activate).await
    }

    /// Suspend the company; a published company is unpublished as well
    async fn company_deactivate(&self, ctx: &Context<'_>, id: GlobalId) -> Result<CompanyPayload> {
        self.run_transition(ctx, id, Transition::Deactivate).await
    }

    async fn company_publish(&self, ctx: &Context<'_>, id: GlobalId) -> Result<CompanyPayload> {
        self.run_transition(ctx, id, Transition::Publish).await
    }

    async fn company_unpublish(&self, ctx: &Context<'_>, id: GlobalId) -> Result<CompanyPayload> {
        self.run_transition(ctx, id, Transition::Unpublish).await
    }

    async fn company_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Company>(&id) {
            Ok(pk) => {
                let mut tx = store.begin().await;
                let outcome = delete(&mut tx, store, &viewer, pk).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(DeletePayload::settle(ctx, outcome.map(|()| id)))
    }

    /// Apply the same changes to several companies, each checked on its own
    async fn company_bulk_update(
        &self,
        ctx: &Context<'_>,
        ids: Vec<GlobalId>,
        input: CompanyInput,
    ) -> Result<BulkPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let outcome = match pk::<store::Company>(&id) {
                Ok(pk) => {
                    let mut tx = store.begin().await;
                    let outcome = update(&mut tx, store, &viewer, pk, input.clone()).await.map(|_| ());
                    tx.settle(outcome).await
                }
                Err(e) => Err(e.into()),
            };
            outcomes.push((id, outcome));
        }
        Ok(BulkPayload::settle(ctx, outcomes))
    }

    async fn company_bulk_delete(&self, ctx: &Context<'_>, ids: Vec<GlobalId>) -> Result<BulkPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let outcome = match pk::<store::Company>(&id) {
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
    use crate::mutations::ErrorCode;

    #[test]
    fn test_publish_requires_active() {
        let mut row = store::Company::draft("Acme", "acme", Some(1));
        assert!(Transition::Publish.apply(&mut row).is_err());
        assert!(!row.is_published);
    }

    #[test]
    fn test_publication_date_is_set_once() {
        let mut row = store::Company::draft("Acme", "acme", Some(1));
        Transition::Activate.apply(&mut row).unwrap();
        Transition::Publish.apply(&mut row).unwrap();
        let stamped = row.publication_date;
        assert!(stamped.is_some());

        Transition::Unpublish.apply(&mut row).unwrap();
        Transition::Publish.apply(&mut row).unwrap();
        assert_eq!(row.publication_date, stamped);
    }

    #[test]
    fn test_deactivate_unpublishes() {
        let mut row = store::Company::draft("Acme", "acme", Some(1));
        Transition::Activate.apply(&mut row).unwrap();
        Transition::Publish.apply(&mut row).unwrap();
        Transition::Deactivate.apply(&mut row).unwrap();
        assert!(!row.is_active);
        assert!(!row.is_published);
        assert!(row.publication_date.is_some());
    }

    #[tokio::test]
    async fn test_apply_requires_name_on_create() {
        let store = Store::in_memory();
        let mut row = store::Company::draft("", "", Some(1));
        let failure = CompanyInput::default().apply(&store, &mut row, true).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::Required);
    }

    #[tokio::test]
    async fn test_apply_collects_every_invalid_field() {
        let store = Store::in_memory();
        let mut row = store::Company::draft("Acme", "acme", Some(1));
        let input = CompanyInput {
            slug: Some("Not A Slug".into()),
            website: Some("nope".into()),
            company_type: Some("pirate".into()),
            brands: Some(JsonArray(vec![serde_json::json!(1)])),
            ..Default::default()
        };
        let Err(Failure::Rejected(errors)) = input.apply(&store, &mut row, false).await else {
            panic!("expected validation errors");
        };
        let mut fields: Vec<_> = errors.into_iter().filter_map(|e| e.field).collect();
        fields.sort();
        assert_eq!(fields, vec!["brands", "slug", "type", "website"]);
    }

    #[tokio::test]
    async fn test_apply_rejects_taken_slug_alongside_other_errors() {
        let store = Store::in_memory();
        store.companies.insert(store::Company::draft("Acme", "acme", Some(1))).await.unwrap();

        let mut row = store::Company::draft("", "", Some(2));
        let input = CompanyInput { slug: Some("acme".into()), ..Default::default() };
        let Err(Failure::Rejected(errors)) = input.apply(&store, &mut row, true).await else {
            panic!("expected validation errors");
        };
        let codes: Vec<_> = errors.iter().map(|e| (e.field.as_deref(), e.code)).collect();
        assert_eq!(
            codes,
            vec![(Some("name"), ErrorCode::Required), (Some("slug"), ErrorCode::Unique)]
        );
    }
}
