use std::collections::HashSet;

use async_graphql::{Context, Object, Result};

use super::{
    Brochure, Category, Certificate, Image, Industry, Product, Representative, Rosetter,
    SocialResponsibility, TradeShow, User, Video,
};
use crate::media::RenditionKeySet;
use crate::resolvers::{adjusted_image, loaders, owned_by, store};
use crate::store::{self, ProductQuery, Sort};
use crate::types::{CountryDisplay, DateTime, GlobalId, ImageRendition};

/// Company profile, the aggregate root of the directory
#[derive(Debug, Clone)]
pub struct Company(pub store::Company);

#[Object]
impl Company {
    async fn id(&self) -> GlobalId {
        GlobalId::of::<store::Company>(self.0.id)
    }

    async fn slug(&self) -> &str {
        &self.0.slug
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn seo_title(&self) -> Option<&str> {
        self.0.seo_title.as_deref()
    }

    async fn seo_description(&self) -> Option<&str> {
        self.0.seo_description.as_deref()
    }

    async fn logo(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Option<ImageRendition>> {
        adjusted_image(ctx, self.0.logo.as_deref(), &self.0.logo_alt, size, RenditionKeySet::CompanyLogos)
    }

    async fn website(&self) -> Option<&str> {
        self.0.website.as_deref()
    }

    async fn address(&self) -> Option<&str> {
        self.0.address.as_deref()
    }

    async fn founded_year(&self) -> Option<i32> {
        self.0.founded_year
    }

    #[graphql(name = "type")]
    async fn company_type(&self) -> Option<&str> {
        self.0.company_type.as_deref()
    }

    async fn no_of_employees(&self) -> Option<i32> {
        self.0.no_of_employees
    }

    async fn content(&self) -> Option<&str> {
        self.0.content.as_deref()
    }

    async fn is_active(&self) -> bool {
        self.0.is_active
    }

    async fn is_verified(&self) -> bool {
        self.0.is_verified
    }

    async fn is_published(&self) -> bool {
        self.0.is_published
    }

    async fn is_brand(&self) -> bool {
        self.0.is_brand
    }

    async fn organic_products(&self) -> bool {
        self.0.organic_products
    }

    async fn private_label(&self) -> bool {
        self.0.private_label
    }

    async fn female_leadership(&self) -> bool {
        self.0.female_leadership
    }

    async fn branded_value(&self) -> Option<&str> {
        self.0.branded_value.as_deref()
    }

    async fn creation_date(&self) -> DateTime {
        self.0.creation_date.into()
    }

    async fn publication_date(&self) -> Option<DateTime> {
        self.0.publication_date.map(DateTime)
    }

    async fn update_date(&self) -> DateTime {
        self.0.update_date.into()
    }

    async fn brands(&self) -> Vec<String> {
        self.0.brands.clone()
    }

    async fn membership(&self) -> Vec<String> {
        self.0.membership.clone()
    }

    async fn export_countries(&self) -> Vec<CountryDisplay> {
        self.0.export_countries.iter().map(|code| CountryDisplay::from_code(code)).collect()
    }

    async fn industry(&self, ctx: &Context<'_>) -> Result<Option<Industry>> {
        match self.0.industry_id {
            Some(id) => Ok(loaders(ctx)?.industries.load_one(id).await?.map(Industry)),
            None => Ok(None),
        }
    }

    async fn owner(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        match self.0.owner_id {
            Some(id) => Ok(loaders(ctx)?.users.load_one(id).await?.map(User)),
            None => Ok(None),
        }
    }

    /// First representative added to the profile
    async fn representative(&self, ctx: &Context<'_>) -> Result<Option<Representative>> {
        let rows = store(ctx)?.representatives.for_company(self.0.id).await?;
        Ok(rows.into_iter().min_by_key(|r| r.id).map(Representative))
    }

    async fn representatives(&self, ctx: &Context<'_>) -> Result<Vec<Representative>> {
        owned_by(&store(ctx)?.representatives, self.0.id, Representative).await
    }

    async fn certificates(&self, ctx: &Context<'_>) -> Result<Vec<Certificate>> {
        owned_by(&store(ctx)?.certificates, self.0.id, Certificate).await
    }

    async fn brochures(&self, ctx: &Context<'_>) -> Result<Vec<Brochure>> {
        owned_by(&store(ctx)?.brochures, self.0.id, Brochure).await
    }

    async fn images(&self, ctx: &Context<'_>) -> Result<Vec<Image>> {
        owned_by(&store(ctx)?.images, self.0.id, Image).await
    }

    async fn videos(&self, ctx: &Context<'_>) -> Result<Vec<Video>> {
        owned_by(&store(ctx)?.videos, self.0.id, Video).await
    }

    async fn social_responsibilities(&self, ctx: &Context<'_>) -> Result<Vec<SocialResponsibility>> {
        owned_by(&store(ctx)?.social_responsibilities, self.0.id, SocialResponsibility).await
    }

    async fn trade_show(&self, ctx: &Context<'_>) -> Result<Vec<TradeShow>> {
        owned_by(&store(ctx)?.trade_shows, self.0.id, TradeShow).await
    }

    /// Badges awarded to the company
    async fn rosetter(&self, ctx: &Context<'_>) -> Result<Vec<Rosetter>> {
        let rows = store(ctx)?.rosetters.get_many(&self.0.rosetter_ids).await?;
        Ok(rows.into_iter().map(Rosetter).collect())
    }

    /// Published products only
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let rows = store(ctx)?
            .products
            .list(&ProductQuery::published_for(self.0.id), Sort::default())
            .await?;
        Ok(rows.into_iter().map(Product).collect())
    }

    /// Distinct categories of the published products
    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<Category>> {
        let products = store(ctx)?
            .products
            .list(&ProductQuery::published_for(self.0.id), Sort::default())
            .await?;

        let mut seen = HashSet::new();
        let ids: Vec<i64> = products
            .iter()
            .filter_map(|p| p.category_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let mut found = loaders(ctx)?.categories.load_many(ids.iter().copied()).await?;
        Ok(ids.iter().filter_map(|id| found.remove(id)).map(Category).collect())
    }
}
