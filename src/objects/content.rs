use async_graphql::{Context, Object, Result};

use super::{Company, User};
use crate::media::RenditionKeySet;
use crate::resolvers::{adjusted_image, company_by_id, loaders};
use crate::store::{self, MessageStatus, MessageType};
use crate::types::{CountryDisplay, DateTime, GlobalId, ImageRendition};

#[derive(Debug, Clone)]
pub struct Representative(pub store::Representative);

#[Object]
impl Representative {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Representative>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn position(&self) -> Option<&str> {
        self.0.position.as_deref()
    }

    async fn photo(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        adjusted_image(
            ctx,
            self.0.photo.as_deref(),
            &self.0.photo_alt,
            size,
            RenditionKeySet::RepresentativePhotos,
        )
    }

    async fn linkedin_url(&self) -> Option<&str> {
        self.0.linkedin_url.as_deref()
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

#[derive(Debug, Clone)]
pub struct TradeShow(pub store::TradeShow);

#[Object]
impl TradeShow {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::TradeShow>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn year(&self) -> i32 {
        self.0.year
    }

    async fn city(&self) -> Option<&str> {
        self.0.city.as_deref()
    }

    async fn created_at(&self) -> DateTime {
        self.0.created_at.into()
    }

    async fn updated_at(&self) -> DateTime {
        self.0.updated_at.into()
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }
}

/// Buyer message addressed to a company
#[derive(Debug, Clone)]
pub struct Contact(pub store::Contact);

#[Object]
impl Contact {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Contact>(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn country(&self) -> Option<CountryDisplay> {
        self.0.country.as_deref().map(CountryDisplay::from_code)
    }

    async fn subject(&self) -> &str {
        &self.0.subject
    }

    async fn contact(&self) -> &str {
        &self.0.contact
    }

    async fn submission_date(&self) -> DateTime {
        self.0.submission_date.into()
    }

    async fn ask_for_reference(&self) -> bool {
        self.0.ask_for_reference
    }

    async fn status(&self) -> MessageStatus {
        self.0.status
    }

    #[graphql(name = "type")]
    async fn message_type(&self) -> MessageType {
        self.0.message_type
    }

    async fn company(&self, ctx: &Context<'_>) -> Result<Option<Company>> {
        company_by_id(ctx, self.0.company_id).await
    }

    /// Receiving seller
    async fn seller(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        match self.0.seller_id {
            Some(id) => Ok(loaders(ctx)?.users.load_one(id).await?.map(User)),
            None => Ok(None),
        }
    }

    /// Sending buyer, when signed in
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        match self.0.user_id {
            Some(id) => Ok(loaders(ctx)?.users.load_one(id).await?.map(User)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuccessStory(pub store::SuccessStory);

#[Object]
impl SuccessStory {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::SuccessStory>(self.0.id)
    }

    async fn slug(&self) -> &str {
        &self.0.slug
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn location(&self) -> Option<&str> {
        self.0.location.as_deref()
    }

    async fn company_name(&self) -> Option<&str> {
        self.0.company_name.as_deref()
    }

    async fn created_at(&self) -> DateTime {
        self.0.created_at.into()
    }

    async fn is_active(&self) -> bool {
        self.0.is_active
    }

    async fn image(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        adjusted_image(ctx, self.0.image.as_deref(), &self.0.title, size, RenditionKeySet::Images)
    }

    async fn tags(&self) -> Vec<String> {
        self.0.tags.clone()
    }
}
