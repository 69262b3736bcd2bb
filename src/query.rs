//! Query root
//!
//! Singular getters return null when the row is missing or hidden from the
//! viewer. Listings are cursor connections taking `filter`, `sortBy` and
//! `first`/`after`/`last`/`before`.

use async_graphql::{Context, Object, Result};

use crate::filters::{
    sort_of, ChildFilterInput, CompanyFilterInput, ContactFilterInput, IndustryFilterInput,
    SortingInput, SuccessStoryFilterInput, TradeShowFilterInput,
};
use crate::objects::{
    Brochure, Certificate, CertificateType, Company, Contact, Image, Industry, Product,
    Representative, Rosetter, SocialResponsibility, SuccessStory, TradeShow, Video,
};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::{
    company_scope, company_visibility, paginate, paginate_within, parent_visible, store, viewer,
};
use crate::store::{
    self, CompanyQuery, CompanySortField, ContactSortField, IndustrySortField, MediaSortField,
    Recipient, Record, Repo, RepresentativeSortField, Sort, SocialResponsibilitySortField,
    SuccessStoryQuery, SuccessStorySortField, TradeShowSortField,
};
use crate::types::GlobalId;

#[derive(Default)]
pub struct QueryRoot;

/// Fetch by global id or by slug; the id wins when both are given
async fn by_id_or_slug<T: Record>(
    repo: &Repo<T>,
    id: Option<GlobalId>,
    slug: Option<String>,
) -> Result<Option<T>> {
    match (id, slug) {
        (Some(id), _) => Ok(repo.get(id.pk_of::<T>()?).await?),
        (None, Some(slug)) => Ok(repo.get_by_slug(&slug).await?),
        (None, None) => Err("either `id` or `slug` is required".into()),
    }
}

/// Fetch a company-owned row, hiding it when its company is hidden
async fn owned_row<T: Record, U>(
    ctx: &Context<'_>,
    repo: &Repo<T>,
    id: GlobalId,
    wrap: fn(T) -> U,
) -> Result<Option<U>> {
    let Some(row) = repo.get(id.pk_of::<T>()?).await? else {
        return Ok(None);
    };
    if let Some(company_id) = row.company_id() {
        if !parent_visible(ctx, company_id).await? {
            return Ok(None);
        }
    }
    Ok(Some(wrap(row)))
}

#[Object]
impl QueryRoot {
    async fn company(
        &self,
        ctx: &Context<'_>,
        id: Option<GlobalId>,
        slug: Option<String>,
    ) -> Result<Option<Company>> {
        let viewer = viewer(ctx);
        let row = by_id_or_slug(&store(ctx)?.companies, id, slug).await?;
        Ok(row.filter(|c| viewer.can_see_company(c)).map(Company))
    }

    #[allow(clippy::too_many_arguments)]
    async fn companies(
        &self,
        ctx: &Context<'_>,
        filter: Option<CompanyFilterInput>,
        sort_by: Option<SortingInput<CompanySortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Company>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        query.visible_to = company_visibility(&viewer(ctx));
        let pagination = PaginationInput::new(first, after, last, before);
        paginate(&store(ctx)?.companies, &query, sort_of(sort_by), pagination, Company).await
    }

    /// One of the viewer's own companies
    async fn user_company(
        &self,
        ctx: &Context<'_>,
        id: Option<GlobalId>,
        slug: Option<String>,
    ) -> Result<Option<Company>> {
        let viewer = viewer(ctx);
        if !viewer.is_authenticated() {
            return Ok(None);
        }
        let row = by_id_or_slug(&store(ctx)?.companies, id, slug).await?;
        Ok(row.filter(|c| viewer.owns(c)).map(Company))
    }

    /// The viewer's own companies, published or not
    #[allow(clippy::too_many_arguments)]
    async fn user_companies(
        &self,
        ctx: &Context<'_>,
        filter: Option<CompanyFilterInput>,
        sort_by: Option<SortingInput<CompanySortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Company>> {
        let Some(user_id) = viewer(ctx).user_id else {
            return Ok(Connection::empty());
        };
        let query = CompanyQuery {
            owner_id: Some(user_id),
            ..filter.unwrap_or_default().into_query()?
        };
        let pagination = PaginationInput::new(first, after, last, before);
        paginate(&store(ctx)?.companies, &query, sort_of(sort_by), pagination, Company).await
    }

    async fn representative(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Representative>> {
        owned_row(ctx, &store(ctx)?.representatives, id, Representative).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn representatives(
        &self,
        ctx: &Context<'_>,
        filter: Option<ChildFilterInput>,
        sort_by: Option<SortingInput<RepresentativeSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Representative>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        paginate_within(
            ctx,
            &scope,
            &store(ctx)?.representatives,
            &query,
            sort_of(sort_by),
            pagination,
            Representative,
        )
        .await
    }

    async fn certificate(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Certificate>> {
        owned_row(ctx, &store(ctx)?.certificates, id, Certificate).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn certificates(
        &self,
        ctx: &Context<'_>,
        filter: Option<ChildFilterInput>,
        sort_by: Option<SortingInput<MediaSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Certificate>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        paginate_within(
            ctx,
            &scope,
            &store(ctx)?.certificates,
            &query,
            sort_of(sort_by),
            pagination,
            Certificate,
        )
        .await
    }

    async fn brochure(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Brochure>> {
        owned_row(ctx, &store(ctx)?.brochures, id, Brochure).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn brochures(
        &self,
        ctx: &Context<'_>,
        filter: Option<ChildFilterInput>,
        sort_by: Option<SortingInput<MediaSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Brochure>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        paginate_within(
            ctx,
            &scope,
            &store(ctx)?.brochures,
            &query,
            sort_of(sort_by),
            pagination,
            Brochure,
        )
        .await
    }

    async fn image(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Image>> {
        owned_row(ctx, &store(ctx)?.images, id, Image).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn images(
        &self,
        ctx: &Context<'_>,
        filter: Option<ChildFilterInput>,
        sort_by: Option<SortingInput<MediaSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Image>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        paginate_within(
            ctx,
            &scope,
            &store(ctx)?.images,
            &query,
            sort_of(sort_by),
            pagination,
            Image,
        )
        .await
    }

    async fn video(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Video>> {
        owned_row(ctx, &store(ctx)?.videos, id, Video).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn videos(
        &self,
        ctx: &Context<'_>,
        filter: Option<ChildFilterInput>,
        sort_by: Option<SortingInput<MediaSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Video>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        paginate_within(
            ctx,
            &scope,
            &store(ctx)?.videos,
            &query,
            sort_of(sort_by),
            pagination,
            Video,
        )
        .await
    }

    async fn social_responsibility(
        &self,
        ctx: &Context<'_>,
        id: GlobalId,
    ) -> Result<Option<SocialResponsibility>> {
        owned_row(ctx, &store(ctx)?.social_responsibilities, id, SocialResponsibility).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn social_responsibilities(
        &self,
        ctx: &Context<'_>,
        filter: Option<ChildFilterInput>,
        sort_by: Option<SortingInput<SocialResponsibilitySortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<SocialResponsibility>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        let repo = &store(ctx)?.social_responsibilities;
        paginate_within(ctx, &scope, repo, &query, sort_of(sort_by), pagination, SocialResponsibility)
            .await
    }

    async fn trade_show(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<TradeShow>> {
        owned_row(ctx, &store(ctx)?.trade_shows, id, TradeShow).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn trade_shows(
        &self,
        ctx: &Context<'_>,
        filter: Option<TradeShowFilterInput>,
        sort_by: Option<SortingInput<TradeShowSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<TradeShow>> {
        let mut query = filter.unwrap_or_default().into_query()?;
        let scope = company_scope(ctx).await?;
        query.within = scope.ids();
        let pagination = PaginationInput::new(first, after, last, before);
        paginate_within(
            ctx,
            &scope,
            &store(ctx)?.trade_shows,
            &query,
            sort_of(sort_by),
            pagination,
            TradeShow,
        )
        .await
    }

    /// A contact message, visible to its seller, the company owner and staff
    async fn contact(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Contact>> {
        let viewer = viewer(ctx);
        let Some(user_id) = viewer.user_id else {
            return Ok(None);
        };
        let store = store(ctx)?;
        let Some(row) = store.contacts.get(id.pk_of::<store::Contact>()?).await? else {
            return Ok(None);
        };
        if viewer.is_staff() || row.seller_id == Some(user_id) {
            return Ok(Some(Contact(row)));
        }
        let owner = store.companies.get(row.company_id).await?;
        Ok(owner.filter(|c| viewer.owns(c)).map(|_| Contact(row)))
    }

    #[allow(clippy::too_many_arguments)]
    async fn contacts(
        &self,
        ctx: &Context<'_>,
        filter: Option<ContactFilterInput>,
        sort_by: Option<SortingInput<ContactSortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Contact>> {
        let viewer = viewer(ctx);
        let Some(user_id) = viewer.user_id else {
            return Ok(Connection::empty());
        };
        let store = store(ctx)?;

        let mut query = filter.unwrap_or_default().into_query()?;
        if !viewer.is_staff() {
            let owned = CompanyQuery { owner_id: Some(user_id), ..CompanyQuery::default() };
            let companies = store.companies.list(&owned, Sort::default()).await?;
            query.recipient = Some(Recipient {
                seller_id: user_id,
                companies: companies.iter().map(|c| c.id).collect(),
            });
        }

        let pagination = PaginationInput::new(first, after, last, before);
        paginate(&store.contacts, &query, sort_of(sort_by), pagination, Contact).await
    }

    async fn industry(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Industry>> {
        let row = store(ctx)?.industries.get(id.pk_of::<store::Industry>()?).await?;
        Ok(row.map(Industry))
    }

    #[allow(clippy::too_many_arguments)]
    async fn industries(
        &self,
        ctx: &Context<'_>,
        filter: Option<IndustryFilterInput>,
        sort_by: Option<SortingInput<IndustrySortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Industry>> {
        let query = filter.unwrap_or_default().into_query()?;
        let pagination = PaginationInput::new(first, after, last, before);
        paginate(&store(ctx)?.industries, &query, sort_of(sort_by), pagination, Industry).await
    }

    async fn success_story(
        &self,
        ctx: &Context<'_>,
        id: Option<GlobalId>,
        slug: Option<String>,
    ) -> Result<Option<SuccessStory>> {
        let staff = viewer(ctx).is_staff();
        let row = by_id_or_slug(&store(ctx)?.success_stories, id, slug).await?;
        Ok(row.filter(|s| s.is_active || staff).map(SuccessStory))
    }

    /// Inactive stories are listed for staff only
    #[allow(clippy::too_many_arguments)]
    async fn success_stories(
        &self,
        ctx: &Context<'_>,
        filter: Option<SuccessStoryFilterInput>,
        sort_by: Option<SortingInput<SuccessStorySortField>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<SuccessStory>> {
        let mut query = SuccessStoryQuery::from(filter.unwrap_or_default());
        if !viewer(ctx).is_staff() {
            query.is_active = Some(true);
        }
        let pagination = PaginationInput::new(first, after, last, before);
        paginate(&store(ctx)?.success_stories, &query, sort_of(sort_by), pagination, SuccessStory).await
    }

    /// A product, when published or managed by the viewer
    async fn product(
        &self,
        ctx: &Context<'_>,
        id: Option<GlobalId>,
        slug: Option<String>,
    ) -> Result<Option<Product>> {
        let store = store(ctx)?;
        let Some(row) = by_id_or_slug(&store.products, id, slug).await? else {
            return Ok(None);
        };
        if row.is_published_and_visible() {
            return Ok(Some(Product(row)));
        }
        let viewer = viewer(ctx);
        let company = store.companies.get(row.company_id).await?;
        Ok(company.filter(|c| viewer.can_manage_company(c)).map(|_| Product(row)))
    }

    async fn rosetter(&self, ctx: &Context<'_>, id: GlobalId) -> Result<Option<Rosetter>> {
        let row = store(ctx)?.rosetters.get(id.pk_of::<store::Rosetter>()?).await?;
        Ok(row.map(Rosetter))
    }

    async fn rosetters(&self, ctx: &Context<'_>) -> Result<Vec<Rosetter>> {
        let rows = store(ctx)?.rosetters.list(&(), Sort::default()).await?;
        Ok(rows.into_iter().map(Rosetter).collect())
    }

    async fn certificate_types(&self, ctx: &Context<'_>) -> Result<Vec<CertificateType>> {
        let rows = store(ctx)?.certificate_types.list(&(), Sort::default()).await?;
        Ok(rows.into_iter().map(CertificateType).collect())
    }
}
