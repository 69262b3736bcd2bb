//! Shared catalog nodes and external references

use async_graphql::{Context, Enum, Object, Result};

use super::Company;
use crate::media::RenditionKeySet;
use crate::resolvers::{adjusted_image, company_by_id, loaders, store};
use crate::store::{self, IndustryQuery, IndustrySortField, QuantityUnit, Sort, SortDirection};
use crate::types::{DateTime, GlobalId, ImageRendition};

/// Site navigation placement
#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum NavigationType {
    Main,
    Secondary,
}

#[derive(Debug, Clone)]
pub struct Industry(pub store::Industry);

#[Object]
impl Industry {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Industry>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn is_active(&self) -> bool {
        self.0.is_active
    }

    async fn parent(&self, ctx: &Context<'_>) -> Result<Option<Industry>> {
        match self.0.parent_id {
            Some(id) => Ok(loaders(ctx)?.industries.load_one(id).await?.map(Industry)),
            None => Ok(None),
        }
    }

    /// Direct children, by name
    async fn children(&self, ctx: &Context<'_>) -> Result<Vec<Industry>> {
        let query = IndustryQuery { parent_id: Some(self.0.id), ..IndustryQuery::default() };
        let sort = Sort::new(IndustrySortField::Name, SortDirection::Asc);
        let rows = store(ctx)?.industries.list(&query, sort).await?;
        Ok(rows.into_iter().map(Industry).collect())
    }
}

/// Badge or award shown on company profiles
#[derive(Debug, Clone)]
pub struct Rosetter(pub store::Rosetter);

#[Object]
impl Rosetter {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Rosetter>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn image(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        adjusted_image(ctx, self.0.image.as_deref(), &self.0.name, size, RenditionKeySet::Images)
    }
}

#[derive(Debug, Clone)]
pub struct CertificateType(pub store::CertificateType);

#[Object]
impl CertificateType {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::CertificateType>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }
}

#[derive(Debug, Clone)]
pub struct Category(pub store::Category);

#[Object]
impl Category {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Category>(self.0.id)
    }

    async fn slug(&self) -> &str {
        &self.0.slug
    }

    async fn name(&self) -> &str {
        &self.0.name
    }
}

#[derive(Debug, Clone)]
pub struct Product(pub store::Product);

#[Object]
impl Product {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Product>(self.0.id)
    }

    async fn slug(&self) -> &str {
        &self.0.slug
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn is_published(&self) -> bool {
        self.0.is_published_and_visible()
    }

    async fn quantity_unit(&self) -> QuantityUnit {
        self.0.quantity_unit
    }

    async fn created_at(&self) -> DateTime {
        self.0.created_at.into()
    }

    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        match self.0.category_id {
            Some(id) => Ok(loaders(ctx)?.categories.load_one(id).await?.map(Category)),
            None => Ok(None),
        }
    }

    async fn industry(&self, ctx: &Context<'_>) -> Result<Option<Industry>> {
        match self.0.industry_id {
            Some(id) => Ok(loaders(ctx)?.industries.load_one(id).await?.map(Industry)),
            None => Ok(None),
        }
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

#[derive(Debug, Clone)]
pub struct User(pub store::User);

#[Object]
impl User {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::User>(self.0.id)
    }

    async fn first_name(&self) -> &str {
        &self.0.first_name
    }

    async fn last_name(&self) -> &str {
        &self.0.last_name
    }

    async fn full_name(&self) -> String {
        format!("{} {}", self.0.first_name, self.0.last_name).trim().to_string()
    }

    async fn avatar(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        let alt = format!("{} {}", self.0.first_name, self.0.last_name);
        adjusted_image(ctx, self.0.avatar.as_deref(), alt.trim(), size, RenditionKeySet::UserAvatars)
    }
}
