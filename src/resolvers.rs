//! Field-resolution helpers shared by the object types and the query root

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_graphql::{Context, OutputType, Result};

use crate::auth::{get_viewer, Viewer};
use crate::dataloaders::Loaders;
use crate::media::{BaseUri, ImageAdjuster, MediaFile, RenditionKeySet};
use crate::objects;
use crate::pagination::{Connection, Edge, PaginationInput};
use crate::store::{self, CompanyQuery, Record, Repo, Sort, Store, Visibility};
use crate::types::ImageRendition;

pub fn store<'a>(ctx: &Context<'a>) -> Result<&'a Store> {
    ctx.data::<Store>()
}

pub fn loaders<'a>(ctx: &Context<'a>) -> Result<&'a Loaders> {
    ctx.data::<Loaders>()
}

pub fn viewer(ctx: &Context<'_>) -> Viewer {
    get_viewer(ctx)
}

/// Back-reference to a company, always routed through the loader
pub async fn company_by_id(ctx: &Context<'_>, id: i64) -> Result<Option<objects::Company>> {
    Ok(loaders(ctx)?.companies.load_one(id).await?.map(objects::Company))
}

/// Rendition descriptor for a stored image, `None` when there is no image
pub fn adjusted_image(
    ctx: &Context<'_>,
    path: Option<&str>,
    alt: &str,
    size: Option<i32>,
    key_set: RenditionKeySet,
) -> Result<Option<ImageRendition>> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let base = ctx.data::<BaseUri>()?;
    let adjuster = ctx.data::<Arc<dyn ImageAdjuster>>()?;
    Ok(Some(adjuster.get_adjusted(MediaFile::Image { path, alt }, size, key_set, base)))
}

/// Absolute URL of a stored file, `None` when there is no file
pub fn file_url(ctx: &Context<'_>, path: Option<&str>) -> Result<Option<String>> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    Ok(Some(MediaFile::File { path }.absolute_url(ctx.data::<BaseUri>()?)))
}

/// Listing scope for the viewer: `None` means unrestricted
pub fn company_visibility(viewer: &Viewer) -> Option<Visibility> {
    if viewer.is_staff() {
        None
    } else {
        Some(match viewer.user_id {
            Some(user) => Visibility::PublicOrOwnedBy(user),
            None => Visibility::Public,
        })
    }
}

/// Companies a restricted viewer may see, `None` when unrestricted
pub struct CompanyScope(Option<HashMap<i64, store::Company>>);

impl CompanyScope {
    pub fn ids(&self) -> Option<HashSet<i64>> {
        self.0.as_ref().map(|rows| rows.keys().copied().collect())
    }

    /// Hand the page's companies to the request loader so back-references
    /// resolve from cache
    async fn prime(&self, ctx: &Context<'_>, company_ids: impl Iterator<Item = i64>) -> Result<()> {
        let Some(rows) = &self.0 else {
            return Ok(());
        };
        let seen: Vec<(i64, store::Company)> = company_ids
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| rows.get(&id).map(|row| (id, row.clone())))
            .collect();
        loaders(ctx)?.companies.feed_many(seen).await;
        Ok(())
    }
}

/// The viewer's company scope, read with a single store lookup
pub async fn company_scope(ctx: &Context<'_>) -> Result<CompanyScope> {
    let viewer = viewer(ctx);
    let Some(visibility) = company_visibility(&viewer) else {
        return Ok(CompanyScope(None));
    };
    let query = CompanyQuery { visible_to: Some(visibility), ..CompanyQuery::default() };
    let rows = store(ctx)?.companies.list(&query, Sort::default()).await?;
    Ok(CompanyScope(Some(rows.into_iter().map(|c| (c.id, c)).collect())))
}

/// Whether the row's owning company is visible to the viewer
pub async fn parent_visible(ctx: &Context<'_>, company_id: i64) -> Result<bool> {
    let viewer = viewer(ctx);
    if viewer.is_staff() {
        return Ok(true);
    }
    Ok(loaders(ctx)?
        .companies
        .load_one(company_id)
        .await?
        .is_some_and(|company| viewer.can_see_company(&company)))
}

/// Run a paginated query and wrap each row
pub async fn paginate<T, U>(
    repo: &Repo<T>,
    filter: &T::Filter,
    sort: Sort<T::SortField>,
    pagination: PaginationInput,
    wrap: fn(T) -> U,
) -> Result<Connection<U>>
where
    T: Record,
    U: OutputType,
    Edge<U>: OutputType,
{
    let window = pagination.window(&sort.tag())?;
    let page = repo.query(filter, sort, &window).await?;
    Ok(page.into_connection(wrap)?)
}

/// [`paginate`] for company-owned rows, restricted to `scope`
pub async fn paginate_within<T, U>(
    ctx: &Context<'_>,
    scope: &CompanyScope,
    repo: &Repo<T>,
    filter: &T::Filter,
    sort: Sort<T::SortField>,
    pagination: PaginationInput,
    wrap: fn(T) -> U,
) -> Result<Connection<U>>
where
    T: Record,
    U: OutputType,
    Edge<U>: OutputType,
{
    let window = pagination.window(&sort.tag())?;
    let page = repo.query(filter, sort, &window).await?;
    scope.prime(ctx, page.items.iter().filter_map(|(_, row)| row.company_id())).await?;
    Ok(page.into_connection(wrap)?)
}

/// A company's full child collection, in collection order
pub async fn owned_by<T: Record, U>(repo: &Repo<T>, company_id: i64, wrap: fn(T) -> U) -> Result<Vec<U>> {
    Ok(repo.for_company(company_id).await?.into_iter().map(wrap).collect())
}
