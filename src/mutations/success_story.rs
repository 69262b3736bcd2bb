//! Editorial success stories, managed by administrators

use async_graphql::{Context, InputObject, Object, Result};
use chrono::Utc;
use validator::Validate;

use super::errors::{payload, DeletePayload, Failure, MutationError, Outcome};
use super::require_capability;
use super::validation::{assign_text, is_slug, pk, slug_taken, slugify, unique_slug, Checks};
use crate::auth::{Viewer, ADMIN};
use crate::objects::SuccessStory;
use crate::resolvers::{store, viewer};
use crate::store::{self, Store, Transaction};
use crate::types::{GlobalId, JsonArray};

payload!(SuccessStoryPayload, success_story: SuccessStory);

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct SuccessStoryInput {
    /// Required on create
    #[validate(length(max = 255))]
    pub title: Option<String>,
    /// Generated from the title when omitted on create
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    pub image: Option<String>,
    /// Strings only; order is kept
    pub tags: Option<JsonArray>,
}

impl SuccessStoryInput {
    async fn apply(self, store: &Store, row: &mut store::SuccessStory, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        if creating || self.title.is_some() {
            if let Some(title) = checks.required("title", self.title.as_deref()) {
                row.title = title;
            }
        }
        if let Some(slug) = self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            checks.slug("slug", slug);
            if is_slug(slug) && slug_taken(&store.success_stories, slug, row.id).await? {
                checks.push(MutationError::unique("slug"));
            }
            row.slug = slug.to_string();
        }
        let tags = checks.strings("tags", self.tags.as_ref());
        checks.finish()?;

        assign_text(&mut row.name, self.name);
        assign_text(&mut row.description, self.description);
        assign_text(&mut row.location, self.location);
        assign_text(&mut row.company_name, self.company_name);
        assign_text(&mut row.image, self.image);
        if let Some(tags) = tags {
            row.tags = tags;
        }
        Ok(())
    }
}

fn blank() -> store::SuccessStory {
    store::SuccessStory {
        id: 0,
        slug: String::new(),
        title: String::new(),
        name: None,
        description: None,
        location: None,
        company_name: None,
        created_at: Utc::now(),
        is_active: false,
        image: None,
        tags: Vec::new(),
    }
}

async fn create(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    input: SuccessStoryInput,
) -> Outcome<store::SuccessStory> {
    require_capability(viewer, ADMIN)?;
    let mut row = blank();
    input.apply(store, &mut row, true).await?;
    if row.slug.is_empty() {
        row.slug = unique_slug(&store.success_stories, &slugify(&row.title)).await?;
    }
    let created = tx.insert(&store.success_stories, row).await?;
    tracing::info!(success_story_id = created.id, "success story created");
    Ok(created)
}

async fn existing(store: &Store, viewer: &Viewer, id: i64) -> Outcome<store::SuccessStory> {
    require_capability(viewer, ADMIN)?;
    store
        .success_stories
        .get(id)
        .await?
        .ok_or_else(|| Failure::from(MutationError::not_found("id", "SuccessStory")))
}

async fn update(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    input: SuccessStoryInput,
) -> Outcome<store::SuccessStory> {
    let current = existing(store, viewer, id).await?;
    let mut row = current.clone();
    input.apply(store, &mut row, false).await?;
    if row == current {
        return Ok(current);
    }
    let saved = tx.update(&store.success_stories, row).await?;
    tracing::info!(success_story_id = id, "success story updated");
    Ok(saved)
}

async fn set_active(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    active: bool,
) -> Outcome<store::SuccessStory> {
    let current = existing(store, viewer, id).await?;
    if current.is_active == active {
        return Ok(current);
    }
    let saved = tx.update(&store.success_stories, store::SuccessStory { is_active: active, ..current }).await?;
    tracing::info!(success_story_id = id, active, "success story state changed");
    Ok(saved)
}

async fn delete(tx: &mut Transaction, store: &Store, viewer: &Viewer, id: i64) -> Outcome<()> {
    existing(store, viewer, id).await?;
    tx.delete(&store.success_stories, id).await?;
    tracing::info!(success_story_id = id, "success story deleted");
    Ok(())
}

#[derive(Default)]
pub struct SuccessStoryMutation;

impl SuccessStoryMutation {
    async fn toggle(&self, ctx: &Context<'_>, id: GlobalId, active: bool) -> Result<SuccessStoryPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::SuccessStory>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = set_active(&mut tx, store, &viewer, id, active).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(SuccessStoryPayload::settle(ctx, outcome.map(SuccessStory)))
    }
}

#[Object]
impl SuccessStoryMutation {
    /// New stories start inactive
    async fn success_story_create(&self, ctx: &Context<'_>, input: SuccessStoryInput) -> Result<SuccessStoryPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let mut tx = store.begin().await;
        let outcome = create(&mut tx, store, &viewer, input).await;
        let outcome = tx.settle(outcome).await;
        Ok(SuccessStoryPayload::settle(ctx, outcome.map(SuccessStory)))
    }

    async fn success_story_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: SuccessStoryInput,
    ) -> Result<SuccessStoryPayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::SuccessStory>(&id) {
            Ok(id) => {
                let mut tx = store.begin().await;
                let outcome = update(&mut tx, store, &viewer, id, input).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(SuccessStoryPayload::settle(ctx, outcome.map(SuccessStory)))
    }

    async fn success_story_activate(&self, ctx: &Context<'_>, id: GlobalId) -> Result<SuccessStoryPayload> {
        self.toggle(ctx, id, true).await
    }

    async fn success_story_deactivate(&self, ctx: &Context<'_>, id: GlobalId) -> Result<SuccessStoryPayload> {
        self.toggle(ctx, id, false).await
    }

    async fn success_story_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        let store = store(ctx)?;
        let viewer = viewer(ctx);
        let outcome = match pk::<store::SuccessStory>(&id) {
            Ok(pk) => {
                let mut tx = store.begin().await;
                let outcome = delete(&mut tx, store, &viewer, pk).await;
                tx.settle(outcome).await
            }
            Err(e) => Err(e.into()),
        };
        Ok(DeletePayload::settle(ctx, outcome.map(|()| id)))
    }
}
