//! Administrator-managed catalogs: industries and rosetter badges

use async_graphql::{Context, InputObject, Object, Result};
use validator::Validate;

use super::errors::{payload, DeletePayload, Failure, MutationError, Outcome};
use super::require_capability;
use super::validation::{assign_text, pk, Checks};
use crate::auth::{Viewer, ADMIN};
use crate::objects::{Industry, Rosetter};
use crate::resolvers::{store, viewer};
use crate::store::{self, CompanyQuery, IndustryQuery, ProductQuery, Sort, Store, Transaction};
use crate::types::GlobalId;

payload!(IndustryPayload, industry: Industry);
payload!(RosetterPayload, rosetter: Rosetter);

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct IndustryInput {
    /// Required on create
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Defaults to active on create
    pub is_active: Option<bool>,
    pub parent: Option<GlobalId>,
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct RosetterInput {
    #[validate(length(max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Reject a parent that is `id` itself or one of its descendants
async fn check_ancestry(store: &Store, id: i64, parent_id: i64) -> Outcome<()> {
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        if current == id {
            return Err(MutationError::invalid("parent", "An industry cannot be its own ancestor.").into());
        }
        cursor = store.industries.get(current).await?.and_then(|i| i.parent_id);
    }
    Ok(())
}

impl IndustryInput {
    async fn apply(self, store: &Store, row: &mut store::Industry, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = if creating || self.name.is_some() {
            checks.required("name", self.name.as_deref())
        } else {
            None
        };
        let parent = checks.pk::<store::Industry>("parent", self.parent.as_ref());
        checks.finish()?;

        if let Some(parent_id) = parent {
            if store.industries.get(parent_id).await?.is_none() {
                return Err(MutationError::not_found("parent", "Industry").into());
            }
            if !creating {
                check_ancestry(store, row.id, parent_id).await?;
            }
            row.parent_id = Some(parent_id);
        }
        if let Some(name) = name {
            row.name = name;
        }
        if let Some(active) = self.is_active {
            row.is_active = active;
        }
        Ok(())
    }
}

async fn industry_create(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    input: IndustryInput,
) -> Outcome<store::Industry> {
    require_capability(viewer, ADMIN)?;
    let mut row = store::Industry { id: 0, name: String::new(), is_active: true, parent_id: None };
    input.apply(store, &mut row, true).await?;
    let created = tx.insert(&store.industries, row).await?;
    tracing::info!(industry_id = created.id, "industry created");
    Ok(created)
}

async fn existing_industry(store: &Store, viewer: &Viewer, id: i64) -> Outcome<store::Industry> {
    require_capability(viewer, ADMIN)?;
    store
        .industries
        .get(id)
        .await?
        .ok_or_else(|| Failure::from(MutationError::not_found("id", "Industry")))
}

async fn industry_update(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    input: IndustryInput,
) -> Outcome<store::Industry> {
    let current = existing_industry(store, viewer, id).await?;
    let mut row = current.clone();
    input.apply(store, &mut row, false).await?;
    if row == current {
        return Ok(current);
    }
    let saved = tx.update(&store.industries, row).await?;
    tracing::info!(industry_id = id, "industry updated");
    Ok(saved)
}

/// Refuses while companies, products or sub-industries still point at it
async fn industry_delete(tx: &mut Transaction, store: &Store, viewer: &Viewer, id: i64) -> Outcome<()> {
    existing_industry(store, viewer, id).await?;

    let companies = CompanyQuery { industry_id: Some(id), ..Default::default() };
    if !store.companies.list(&companies, Sort::default()).await?.is_empty() {
        return Err(MutationError::cannot_delete("Companies are still assigned to this industry.").into());
    }
    let products = ProductQuery { industry_id: Some(id), ..Default::default() };
    if !store.products.list(&products, Sort::default()).await?.is_empty() {
        return Err(MutationError::cannot_delete("Products are still assigned to this industry.").into());
    }
    let children = IndustryQuery { parent_id: Some(id), ..Default::default() };
    if !store.industries.list(&children, Sort::default()).await?.is_empty() {
        return Err(MutationError::cannot_delete("The industry still has sub-industries.").into());
    }

    tx.delete(&store.industries, id).await?;
    tracing::info!(industry_id = id, "industry deleted");
    Ok(())
}

async fn rosetter_create(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    input: RosetterInput,
) -> Outcome<store::Rosetter> {
    require_capability(viewer, ADMIN)?;
    let mut checks = Checks::of(&input);
    let name = checks.required("name", Some(&input.name));
    checks.finish()?;

    let mut row = store::Rosetter { id: 0, name: name.unwrap_or_default(), description: None, image: None };
    assign_text(&mut row.description, input.description);
    assign_text(&mut row.image, input.image);
    let created = tx.insert(&store.rosetters, row).await?;
    tracing::info!(rosetter_id = created.id, "rosetter created");
    Ok(created)
}

/// Delete a badge and take it off every company that holds it
async fn rosetter_delete(tx: &mut Transaction, store: &Store, viewer: &Viewer, id: i64) -> Outcome<()> {
    require_capability(viewer, ADMIN)?;
    if store.rosetters.get(id).await?.is_none() {
        return Err(MutationError::not_found("id", "Rosetter").into());
    }

    let holders = store.companies.list(&CompanyQuery::default(), Sort::default()).await?;
    let mut unlinked = 0;
    for mut company in holders.into_iter().filter(|c| c.rosetter_ids.contains(&id)) {
        company.rosetter_ids.retain(|r| *r != id);
        tx.update(&store.companies, company).await?;
        unlinked += 1;
    }
    tx.delete(&store.rosetters, id).await?;
    tracing::info!(rosetter_id = id, unlinked, "rosetter deleted");
    Ok(())
}

#[derive(Default)]
pub struct CatalogMutation;

#[Object]
impl CatalogMutation {
    async fn industry_create(&self, ctx: &Context<'_>, input: IndustryInput) -> Result<IndustryPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut tx = store.begin().await;
        let outcome = industry_create(&mut tx, store, &viewer, input).await;
        let outcome = tx.settle(outcome).await;
        Ok(IndustryPayload::settle(ctx, outcome.map(Industry)))
    }

    async fn industry_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: IndustryInput,
    ) -> Result<IndustryPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Industry>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = industry_update(&mut tx, store, &viewer, id, input).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(IndustryPayload::settle(ctx, outcome.map(Industry)))
    }

    async fn industry_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Industry>(&id) {
            Ok(pk) => {
                let mut tx = store.begin().await;
                let outcome = industry_delete(&mut tx, store, &viewer, pk).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(DeletePayload::settle(ctx, outcome.map(|()| id)))
    }

    async fn rosetter_create(&self, ctx: &Context<'_>, input: RosetterInput) -> Result<RosetterPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut tx = store.begin().await;
        let outcome = rosetter_create(&mut tx, store, &viewer, input).await;
        let outcome = tx.settle(outcome).await;
        Ok(RosetterPayload::settle(ctx, outcome.map(Rosetter)))
    }

    async fn rosetter_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::Rosetter>(&id) {
            Ok(pk) => {
                let mut tx = store.begin().await;
                let outcome = rosetter_delete(&mut tx, store, &viewer, pk).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(DeletePayload::settle(ctx, outcome.map(|()| id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::ErrorCode;

    fn admin() -> Viewer {
        Viewer::user(1).with_capability(ADMIN)
    }

    fn named(name: &str, parent: Option<i64>) -> IndustryInput {
        IndustryInput {
            name: Some(name.into()),
            parent: parent.map(GlobalId::of::<store::Industry>),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_parent_cycles_are_rejected() {
        let store = Store::in_memory();
        let mut tx = store.begin().await;
        let food = industry_create(&mut tx, &store, &admin(), named("Food", None)).await.unwrap();
        let dairy = industry_create(&mut tx, &store, &admin(), named("Dairy", Some(food.id))).await.unwrap();
        assert_eq!(dairy.parent_id, Some(food.id));

        let cycle = IndustryInput { parent: Some(GlobalId::of::<store::Industry>(dairy.id)), ..Default::default() };
        let failure = industry_update(&mut tx, &store, &admin(), food.id, cycle).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::Invalid);
    }

    #[tokio::test]
    async fn test_referenced_industry_cannot_be_deleted() {
        let store = Store::in_memory();
        let mut tx = store.begin().await;
        let food = industry_create(&mut tx, &store, &admin(), named("Food", None)).await.unwrap();
        let mut company = store::Company::draft("Acme", "acme", Some(2));
        company.industry_id = Some(food.id);
        store.companies.insert(company).await.unwrap();

        let failure = industry_delete(&mut tx, &store, &admin(), food.id).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::CannotDelete);

        let unused = industry_create(&mut tx, &store, &admin(), named("Textiles", None)).await.unwrap();
        industry_delete(&mut tx, &store, &admin(), unused.id).await.unwrap();
        assert!(store.industries.get(unused.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rosetter_delete_unlinks_companies() {
        let store = Store::in_memory();
        let mut tx = store.begin().await;
        let badge = RosetterInput { name: "Exporter of the year".into(), ..Default::default() };
        let badge = rosetter_create(&mut tx, &store, &admin(), badge).await.unwrap();

        let mut company = store::Company::draft("Acme", "acme", Some(2));
        company.rosetter_ids = vec![badge.id];
        let company = store.companies.insert(company).await.unwrap();

        rosetter_delete(&mut tx, &store, &admin(), badge.id).await.unwrap();
        assert!(store.companies.get(company.id).await.unwrap().unwrap().rosetter_ids.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_requires_admin() {
        let store = Store::in_memory();
        let mut tx = store.begin().await;
        let failure = industry_create(&mut tx, &store, &Viewer::user(2), named("Food", None)).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::Forbidden);
    }
}
