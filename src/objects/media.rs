use async_graphql::{Context, Object, Result};

use super::{CertificateType, Company};
use crate::media::RenditionKeySet;
use crate::resolvers::{adjusted_image, company_by_id, file_url, loaders};
use crate::store;
use crate::types::{BrochureFile, DateTime, GlobalId, ImageRendition};

#[derive(Debug, Clone)]
pub struct Certificate(pub store::Certificate);

#[Object]
impl Certificate {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Certificate>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn sort_order(&self) -> i32 {
        self.0.sort_order
    }

    /// Absolute URL of the certificate document
    async fn certificate(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        file_url(ctx, self.0.certificate.as_deref())
    }

    #[graphql(name = "type")]
    async fn certificate_type(&self, ctx: &Context<'_>) -> Result<Option<CertificateType>> {
        match self.0.type_id {
            Some(id) => Ok(loaders(ctx)?.certificate_types.load_one(id).await?.map(CertificateType)),
            None => Ok(None),
        }
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

#[derive(Debug, Clone)]
pub struct Brochure(pub store::Brochure);

#[Object]
impl Brochure {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Brochure>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn sort_order(&self) -> i32 {
        self.0.sort_order
    }

    async fn brochure(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        file_url(ctx, self.0.brochure.as_deref())
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

#[derive(Debug, Clone)]
pub struct Image(pub store::Image);

#[Object]
impl Image {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Image>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn sort_order(&self) -> i32 {
        self.0.sort_order
    }

    async fn image(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        adjusted_image(ctx, self.0.image.as_deref(), &self.0.name, size, RenditionKeySet::Images)
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

#[derive(Debug, Clone)]
pub struct Video(pub store::Video);

#[Object]
impl Video {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Video>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn sort_order(&self) -> i32 {
        self.0.sort_order
    }

    async fn video(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        file_url(ctx, self.0.video.as_deref())
    }

    async fn youtube_url(&self) -> Option<&str> {
        self.0.youtube_url.as_deref()
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

#[derive(Debug, Clone)]
pub struct SocialResponsibility(pub store::SocialResponsibility);

#[Object]
impl SocialResponsibility {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::SocialResponsibility>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn sort_order(&self) -> i32 {
        self.0.sort_order
    }

    async fn image(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        adjusted_image(ctx, self.0.image.as_deref(), &self.0.name, size, RenditionKeySet::Images)
    }

    async fn video(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        file_url(ctx, self.0.video.as_deref())
    }

    async fn youtube_url(&self) -> Option<&str> {
        self.0.youtube_url.as_deref()
    }

    async fn brochure(&self, ctx: &Context<'_>) -> Result<Option<BrochureFile>> {
        Ok(file_url(ctx, self.0.brochure.as_deref())?
            .map(|url| BrochureFile { url, name: self.0.brochure_name.clone() }))
    }

    async fn created_at(&self) -> DateTime {
        self.0.created_at.into()
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}
