//! Mutations over the collections a company owns
//!
//! Representatives, certificates, brochures, images, videos, social
//! responsibility entries and trade shows all follow the same contract: the
//! viewer must be able to manage the owning company, the company is fixed at
//! creation, and new media entries are appended to the end of their
//! collection unless a position is given.

use async_graphql::{Context, InputObject, Object, Result};
use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use super::errors::{payload, DeletePayload, Failure, MutationError, Outcome};
use super::validation::{assign_text, next_sort_order, pk, Checks};
use super::{require_user, writable_company};
use crate::auth::Viewer;
use crate::objects::{Brochure, Certificate, Image, Representative, SocialResponsibility, TradeShow, Video};
use crate::resolvers::{store, viewer};
use crate::store::{self, Record, Repo, Store, Transaction};
use crate::types::GlobalId;

payload!(RepresentativePayload, representative: Representative);
payload!(CertificatePayload, certificate: Certificate);
payload!(BrochurePayload, brochure: Brochure);
payload!(ImagePayload, image: Image);
payload!(VideoPayload, video: Video);
payload!(SocialResponsibilityPayload, social_responsibility: SocialResponsibility);
payload!(TradeShowPayload, trade_show: TradeShow);

/// Input of a company-owned row
#[async_trait]
trait ChildInput: Validate + Send + Sized + 'static {
    type Row: Record + PartialEq;

    fn repo(store: &Store) -> &Repo<Self::Row>;

    /// Owning company; required on create
    fn company(&self) -> Option<&GlobalId>;

    /// Empty row appended after `siblings`
    fn blank(company_id: i64, siblings: &[Self::Row]) -> Self::Row;

    /// Validate and write the input onto `row`
    async fn apply(self, store: &Store, row: &mut Self::Row, creating: bool) -> Outcome<()>;

    /// Stamp modification time, for rows that track it
    fn touch(_row: &mut Self::Row) {}
}

fn required_name(checks: &mut Checks, creating: bool, name: Option<&str>) -> Option<String> {
    if creating || name.is_some() {
        checks.required("name", name)
    } else {
        None
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct RepresentativeInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub position: Option<String>,
    pub photo: Option<String>,
    #[validate(length(max = 255))]
    pub photo_alt: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
}

#[async_trait]
impl ChildInput for RepresentativeInput {
    type Row = store::Representative;

    fn repo(store: &Store) -> &Repo<store::Representative> {
        &store.representatives
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, _siblings: &[store::Representative]) -> store::Representative {
        store::Representative {
            id: 0,
            company_id,
            name: String::new(),
            position: None,
            photo: None,
            photo_alt: String::new(),
            linkedin_url: None,
            created_at: Utc::now(),
        }
    }

    async fn apply(self, _store: &Store, row: &mut store::Representative, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        checks.finish()?;

        if let Some(name) = name {
            row.name = name;
        }
        assign_text(&mut row.position, self.position);
        assign_text(&mut row.photo, self.photo);
        assign_text(&mut row.linkedin_url, self.linkedin_url);
        if let Some(alt) = self.photo_alt {
            row.photo_alt = alt.trim().to_string();
        }
        Ok(())
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct CertificateInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// Stored path of the certificate document
    pub certificate: Option<String>,
    #[graphql(name = "type")]
    pub certificate_type: Option<GlobalId>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[async_trait]
impl ChildInput for CertificateInput {
    type Row = store::Certificate;

    fn repo(store: &Store) -> &Repo<store::Certificate> {
        &store.certificates
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, siblings: &[store::Certificate]) -> store::Certificate {
        store::Certificate {
            id: 0,
            company_id,
            name: String::new(),
            description: None,
            sort_order: next_sort_order(siblings.iter().map(|c| c.sort_order)),
            certificate: None,
            type_id: None,
            created_at: Utc::now(),
        }
    }

    async fn apply(self, store: &Store, row: &mut store::Certificate, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        let type_id = checks.pk::<store::CertificateType>("type", self.certificate_type.as_ref());
        checks.finish()?;

        if let Some(id) = type_id {
            if store.certificate_types.get(id).await?.is_none() {
                return Err(MutationError::not_found("type", "CertificateType").into());
            }
            row.type_id = Some(id);
        }
        if let Some(name) = name {
            row.name = name;
        }
        assign_text(&mut row.description, self.description);
        assign_text(&mut row.certificate, self.certificate);
        if let Some(order) = self.sort_order {
            row.sort_order = order;
        }
        Ok(())
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct BrochureInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub brochure: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[async_trait]
impl ChildInput for BrochureInput {
    type Row = store::Brochure;

    fn repo(store: &Store) -> &Repo<store::Brochure> {
        &store.brochures
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, siblings: &[store::Brochure]) -> store::Brochure {
        store::Brochure {
            id: 0,
            company_id,
            name: String::new(),
            description: None,
            sort_order: next_sort_order(siblings.iter().map(|b| b.sort_order)),
            brochure: None,
            created_at: Utc::now(),
        }
    }

    async fn apply(self, _store: &Store, row: &mut store::Brochure, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        checks.finish()?;

        if let Some(name) = name {
            row.name = name;
        }
        assign_text(&mut row.description, self.description);
        assign_text(&mut row.brochure, self.brochure);
        if let Some(order) = self.sort_order {
            row.sort_order = order;
        }
        Ok(())
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct ImageInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[async_trait]
impl ChildInput for ImageInput {
    type Row = store::Image;

    fn repo(store: &Store) -> &Repo<store::Image> {
        &store.images
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, siblings: &[store::Image]) -> store::Image {
        store::Image {
            id: 0,
            company_id,
            name: String::new(),
            description: None,
            sort_order: next_sort_order(siblings.iter().map(|i| i.sort_order)),
            image: None,
            created_at: Utc::now(),
        }
    }

    async fn apply(self, _store: &Store, row: &mut store::Image, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        checks.finish()?;

        if let Some(name) = name {
            row.name = name;
        }
        assign_text(&mut row.description, self.description);
        assign_text(&mut row.image, self.image);
        if let Some(order) = self.sort_order {
            row.sort_order = order;
        }
        Ok(())
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct VideoInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub video: Option<String>,
    #[validate(url)]
    pub youtube_url: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[async_trait]
impl ChildInput for VideoInput {
    type Row = store::Video;

    fn repo(store: &Store) -> &Repo<store::Video> {
        &store.videos
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, siblings: &[store::Video]) -> store::Video {
        store::Video {
            id: 0,
            company_id,
            name: String::new(),
            description: None,
            sort_order: next_sort_order(siblings.iter().map(|v| v.sort_order)),
            video: None,
            youtube_url: None,
            created_at: Utc::now(),
        }
    }

    async fn apply(self, _store: &Store, row: &mut store::Video, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        checks.finish()?;

        if let Some(name) = name {
            row.name = name;
        }
        assign_text(&mut row.description, self.description);
        assign_text(&mut row.video, self.video);
        assign_text(&mut row.youtube_url, self.youtube_url);
        if let Some(order) = self.sort_order {
            row.sort_order = order;
        }
        Ok(())
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct SocialResponsibilityInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    #[validate(url)]
    pub youtube_url: Option<String>,
    pub brochure: Option<String>,
    /// Display name of the brochure file
    #[validate(length(max = 255))]
    pub brochure_name: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[async_trait]
impl ChildInput for SocialResponsibilityInput {
    type Row = store::SocialResponsibility;

    fn repo(store: &Store) -> &Repo<store::SocialResponsibility> {
        &store.social_responsibilities
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, siblings: &[store::SocialResponsibility]) -> store::SocialResponsibility {
        store::SocialResponsibility {
            id: 0,
            company_id,
            name: String::new(),
            description: None,
            sort_order: next_sort_order(siblings.iter().map(|s| s.sort_order)),
            image: None,
            video: None,
            youtube_url: None,
            brochure: None,
            brochure_name: None,
            created_at: Utc::now(),
        }
    }

    async fn apply(
        self,
        _store: &Store,
        row: &mut store::SocialResponsibility,
        creating: bool,
    ) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        checks.finish()?;

        if let Some(name) = name {
            row.name = name;
        }
        assign_text(&mut row.description, self.description);
        assign_text(&mut row.image, self.image);
        assign_text(&mut row.video, self.video);
        assign_text(&mut row.youtube_url, self.youtube_url);
        assign_text(&mut row.brochure, self.brochure);
        assign_text(&mut row.brochure_name, self.brochure_name);
        if let Some(order) = self.sort_order {
            row.sort_order = order;
        }
        Ok(())
    }
}

#[derive(InputObject, Validate, Debug, Clone, Default)]
pub struct TradeShowInput {
    pub company: Option<GlobalId>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Required on create
    pub year: Option<i32>,
    #[validate(length(max = 255))]
    pub city: Option<String>,
}

#[async_trait]
impl ChildInput for TradeShowInput {
    type Row = store::TradeShow;

    fn repo(store: &Store) -> &Repo<store::TradeShow> {
        &store.trade_shows
    }

    fn company(&self) -> Option<&GlobalId> {
        self.company.as_ref()
    }

    fn blank(company_id: i64, _siblings: &[store::TradeShow]) -> store::TradeShow {
        let now = Utc::now();
        store::TradeShow {
            id: 0,
            company_id,
            name: String::new(),
            year: 0,
            city: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn apply(self, _store: &Store, row: &mut store::TradeShow, creating: bool) -> Outcome<()> {
        let mut checks = Checks::of(&self);
        let name = required_name(&mut checks, creating, self.name.as_deref());
        if creating && self.year.is_none() {
            checks.push(MutationError::required("year"));
        }
        checks.year("year", self.year);
        checks.finish()?;

        if let Some(name) = name {
            row.name = name;
        }
        if let Some(year) = self.year {
            row.year = year;
        }
        assign_text(&mut row.city, self.city);
        Ok(())
    }

    fn touch(row: &mut store::TradeShow) {
        row.updated_at = Utc::now();
    }
}

async fn create<I: ChildInput>(tx: &mut Transaction, store: &Store, viewer: &Viewer, input: I) -> Outcome<I::Row> {
    require_user(viewer)?;
    let company_id = match input.company() {
        Some(id) => id
            .pk_of::<store::Company>()
            .map_err(|e| MutationError::invalid("company", e.to_string()))?,
        None => return Err(MutationError::required("company").into()),
    };
    writable_company(store, viewer, company_id, "company").await?;

    let repo = I::repo(store);
    let siblings = repo.for_company(company_id).await?;
    let mut row = I::blank(company_id, &siblings);
    input.apply(store, &mut row, true).await?;

    let created = tx.insert(repo, row).await?;
    tracing::info!(entity = I::Row::TYPE_NAME, id = created.id(), company_id, "company child created");
    Ok(created)
}

/// Existing row and its company, checked for write access
async fn writable<T: Record>(store: &Store, viewer: &Viewer, repo: &Repo<T>, id: i64) -> Outcome<T> {
    require_user(viewer)?;
    let row = repo
        .get(id)
        .await?
        .ok_or_else(|| Failure::from(MutationError::not_found("id", T::TYPE_NAME)))?;
    let company_id = row
        .company_id()
        .ok_or_else(|| Failure::from(MutationError::not_found("company", "Company")))?;
    writable_company(store, viewer, company_id, "company").await?;
    Ok(row)
}

async fn update<I: ChildInput>(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    id: i64,
    input: I,
) -> Outcome<I::Row> {
    let repo = I::repo(store);
    let current = writable(store, viewer, repo, id).await?;

    if let Some(company) = input.company() {
        if company.pk_of::<store::Company>().ok() != current.company_id() {
            return Err(MutationError::invalid("company", "Entries cannot be moved to another company.").into());
        }
    }

    let mut row = current.clone();
    input.apply(store, &mut row, false).await?;
    if row == current {
        return Ok(current);
    }
    I::touch(&mut row);
    let saved = tx.update(repo, row).await?;
    tracing::info!(entity = I::Row::TYPE_NAME, id, "company child updated");
    Ok(saved)
}

async fn delete<T: Record>(
    tx: &mut Transaction,
    store: &Store,
    viewer: &Viewer,
    repo: &Repo<T>,
    id: i64,
) -> Outcome<()> {
    writable(store, viewer, repo, id).await?;
    tx.delete(repo, id).await?;
    tracing::info!(entity = T::TYPE_NAME, id, "company child deleted");
    Ok(())
}

async fn created<I: ChildInput>(ctx: &Context<'_>, input: I) -> Result<Outcome<I::Row>> {
    let store = store(ctx)?;
    let viewer = viewer(ctx);
    let mut tx = store.begin().await;
    let outcome = create(&mut tx, store, &viewer, input).await;
    Ok(tx.settle(outcome).await)
}

async fn updated<I: ChildInput>(ctx: &Context<'_>, id: &GlobalId, input: I) -> Result<Outcome<I::Row>> {
    let store = store(ctx)?;
    let viewer = viewer(ctx);
    let id = match pk::<I::Row>(id) {
        Ok(id) => id,
        Err(e) => return Ok(Err(e.into())),
    };
    let mut tx = store.begin().await;
    let outcome = update(&mut tx, store, &viewer, id, input).await;
    Ok(tx.settle(outcome).await)
}

async fn deleted<T: Record>(ctx: &Context<'_>, id: GlobalId, repo: fn(&Store) -> &Repo<T>) -> Result<DeletePayload> {
    let store = store(ctx)?;
    let viewer = viewer(ctx);
    let outcome = match pk::<T>(&id) {
        Ok(pk) => {
            let mut tx = store.begin().await;
            let outcome = delete(&mut tx, store, &viewer, repo(store), pk).await;
            tx.settle(outcome).await
        }
        Err(e) => Err(e.into()),
    };
    Ok(DeletePayload::settle(ctx, outcome.map(|()| id)))
}

#[derive(Default)]
pub struct ChildMutation;

#[Object]
impl ChildMutation {
    async fn representative_create(&self, ctx: &Context<'_>, input: RepresentativeInput) -> Result<RepresentativePayload> {
        let outcome = created(ctx, input).await?;
        Ok(RepresentativePayload::settle(ctx, outcome.map(Representative)))
    }

    async fn representative_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: RepresentativeInput,
    ) -> Result<RepresentativePayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(RepresentativePayload::settle(ctx, outcome.map(Representative)))
    }

    async fn representative_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, RepresentativeInput::repo).await
    }

    async fn certificate_create(&self, ctx: &Context<'_>, input: CertificateInput) -> Result<CertificatePayload> {
        let outcome = created(ctx, input).await?;
        Ok(CertificatePayload::settle(ctx, outcome.map(Certificate)))
    }

    async fn certificate_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: CertificateInput,
    ) -> Result<CertificatePayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(CertificatePayload::settle(ctx, outcome.map(Certificate)))
    }

    async fn certificate_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, CertificateInput::repo).await
    }

    async fn brochure_create(&self, ctx: &Context<'_>, input: BrochureInput) -> Result<BrochurePayload> {
        let outcome = created(ctx, input).await?;
        Ok(BrochurePayload::settle(ctx, outcome.map(Brochure)))
    }

    async fn brochure_update(&self, ctx: &Context<'_>, id: GlobalId, input: BrochureInput) -> Result<BrochurePayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(BrochurePayload::settle(ctx, outcome.map(Brochure)))
    }

    async fn brochure_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, BrochureInput::repo).await
    }

    async fn image_create(&self, ctx: &Context<'_>, input: ImageInput) -> Result<ImagePayload> {
        let outcome = created(ctx, input).await?;
        Ok(ImagePayload::settle(ctx, outcome.map(Image)))
    }

    async fn image_update(&self, ctx: &Context<'_>, id: GlobalId, input: ImageInput) -> Result<ImagePayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(ImagePayload::settle(ctx, outcome.map(Image)))
    }

    async fn image_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, ImageInput::repo).await
    }

    async fn video_create(&self, ctx: &Context<'_>, input: VideoInput) -> Result<VideoPayload> {
        let outcome = created(ctx, input).await?;
        Ok(VideoPayload::settle(ctx, outcome.map(Video)))
    }

    async fn video_update(&self, ctx: &Context<'_>, id: GlobalId, input: VideoInput) -> Result<VideoPayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(VideoPayload::settle(ctx, outcome.map(Video)))
    }

    async fn video_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, VideoInput::repo).await
    }

    async fn social_responsibility_create(
        &self,
        ctx: &Context<'_>,
        input: SocialResponsibilityInput,
    ) -> Result<SocialResponsibilityPayload> {
        let outcome = created(ctx, input).await?;
        Ok(SocialResponsibilityPayload::settle(ctx, outcome.map(SocialResponsibility)))
    }

    async fn social_responsibility_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: SocialResponsibilityInput,
    ) -> Result<SocialResponsibilityPayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(SocialResponsibilityPayload::settle(ctx, outcome.map(SocialResponsibility)))
    }

    async fn social_responsibility_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, SocialResponsibilityInput::repo).await
    }

    async fn trade_show_create(&self, ctx: &Context<'_>, input: TradeShowInput) -> Result<TradeShowPayload> {
        let outcome = created(ctx, input).await?;
        Ok(TradeShowPayload::settle(ctx, outcome.map(TradeShow)))
    }

    async fn trade_show_update(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
        input: TradeShowInput,
    ) -> Result<TradeShowPayload> {
        let outcome = updated(ctx, &id, input).await?;
        Ok(TradeShowPayload::settle(ctx, outcome.map(TradeShow)))
    }

    async fn trade_show_delete(&self, ctx: &Context<'_>, id: GlobalId) -> Result<DeletePayload> {
        deleted(ctx, id, TradeShowInput::repo).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::ErrorCode;

    async fn seeded() -> (Store, store::Company) {
        let store = Store::in_memory();
        let company = store.companies.insert(store::Company::draft("Acme", "acme", Some(1))).await.unwrap();
        (store, company)
    }

    fn certificate(company: &store::Company, name: &str) -> CertificateInput {
        CertificateInput {
            company: Some(GlobalId::of::<store::Company>(company.id)),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_appends_to_collection() {
        let (store, company) = seeded().await;
        let owner = Viewer::user(1);

        let mut tx = store.begin().await;
        let first = create(&mut tx, &store, &owner, certificate(&company, "ISO 9001")).await.unwrap();
        let second = create(&mut tx, &store, &owner, certificate(&company, "Halal")).await.unwrap();
        tx.settle::<(), ()>(Ok(())).await.unwrap();

        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
    }

    #[tokio::test]
    async fn test_create_requires_company_and_write_access() {
        let (store, company) = seeded().await;

        let mut tx = store.begin().await;
        let missing = create(&mut tx, &store, &Viewer::user(1), CertificateInput::default()).await.unwrap_err();
        assert_eq!(missing.code(), ErrorCode::Required);

        let stranger = create(&mut tx, &store, &Viewer::user(2), certificate(&company, "ISO")).await.unwrap_err();
        assert_eq!(stranger.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_trade_show_year_is_required_on_create_only() {
        let (store, company) = seeded().await;
        let owner = Viewer::user(1);
        let input = TradeShowInput {
            company: Some(GlobalId::of::<store::Company>(company.id)),
            name: Some("Anuga".into()),
            ..Default::default()
        };

        let mut tx = store.begin().await;
        let failure = create(&mut tx, &store, &owner, input.clone()).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::Required);

        let show = create(&mut tx, &store, &owner, TradeShowInput { year: Some(2025), ..input }).await.unwrap();
        let renamed = TradeShowInput { city: Some("Cologne".into()), ..Default::default() };
        let saved = update(&mut tx, &store, &owner, show.id, renamed).await.unwrap();
        assert_eq!(saved.year, 2025);
        assert_eq!(saved.city.as_deref(), Some("Cologne"));
        assert!(saved.updated_at >= show.updated_at);
    }

    #[tokio::test]
    async fn test_update_cannot_move_between_companies() {
        let (store, company) = seeded().await;
        let other = store.companies.insert(store::Company::draft("Other", "other", Some(1))).await.unwrap();
        let owner = Viewer::user(1);

        let mut tx = store.begin().await;
        let row = create(&mut tx, &store, &owner, certificate(&company, "ISO")).await.unwrap();
        let failure = update(&mut tx, &store, &owner, row.id, certificate(&other, "ISO")).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::Invalid);
    }

    #[tokio::test]
    async fn test_unknown_certificate_type_is_not_found() {
        let (store, company) = seeded().await;
        let input = CertificateInput {
            certificate_type: Some(GlobalId::of::<store::CertificateType>(99)),
            ..certificate(&company, "ISO")
        };

        let mut tx = store.begin().await;
        let failure = create(&mut tx, &store, &Viewer::user(1), input).await.unwrap_err();
        assert_eq!(failure.code(), ErrorCode::NotFound);
    }
}
