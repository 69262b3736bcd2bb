//! Row models of the directory store

use async_graphql::Enum;
use chrono::{DateTime, Utc};

use super::query::*;
use super::Record;
use crate::pagination::SortKey;

/// Contact message lifecycle
#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[graphql(name = "MessageStatusEnum")]
pub enum MessageStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

/// What the buyer is asking for
#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[graphql(name = "MessageTypeEnum")]
pub enum MessageType {
    #[default]
    Inquiry,
    Quotation,
    SampleRequest,
    Other,
}

/// Unit a product quantity is expressed in
#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[graphql(name = "ProductQuantityUnit")]
pub enum QuantityUnit {
    Centimeter,
    CentimeterSquare,
    CentimeterCube,
    Gallon,
    Gram,
    #[default]
    Item,
    Kilogram,
    Pound,
    Liter,
    Milligram,
    Millimeter,
    MillimeterSquare,
    MillimeterCube,
    Meter,
    MeterSquare,
    MeterCube,
    Ounce,
    Ton,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub logo: Option<String>,
    pub logo_alt: String,
    pub website: Option<String>,
    pub address: Option<String>,
    pub founded_year: Option<i32>,
    pub company_type: Option<String>,
    pub no_of_employees: Option<i32>,
    pub content: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_published: bool,
    pub is_brand: bool,
    pub organic_products: bool,
    pub private_label: bool,
    pub female_leadership: bool,
    pub branded_value: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub publication_date: Option<DateTime<Utc>>,
    pub update_date: DateTime<Utc>,
    pub brands: Vec<String>,
    pub membership: Vec<String>,
    pub export_countries: Vec<String>,
    pub owner_id: Option<i64>,
    pub industry_id: Option<i64>,
    pub rosetter_ids: Vec<i64>,
}

impl Company {
    /// Fresh, unpublished and inactive profile
    pub fn draft(name: impl Into<String>, slug: impl Into<String>, owner_id: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            slug: slug.into(),
            name: name.into(),
            seo_title: None,
            seo_description: None,
            logo: None,
            logo_alt: String::new(),
            website: None,
            address: None,
            founded_year: None,
            company_type: None,
            no_of_employees: None,
            content: None,
            is_active: false,
            is_verified: false,
            is_published: false,
            is_brand: false,
            organic_products: false,
            private_label: false,
            female_leadership: false,
            branded_value: None,
            creation_date: now,
            publication_date: None,
            update_date: now,
            brands: Vec::new(),
            membership: Vec::new(),
            export_countries: Vec::new(),
            owner_id,
            industry_id: None,
            rosetter_ids: Vec::new(),
        }
    }
}

impl Record for Company {
    const TYPE_NAME: &'static str = "Company";
    type Filter = CompanyQuery;
    type SortField = CompanySortField;

    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn matches(&self, f: &CompanyQuery) -> bool {
        let flag = |wanted: Option<bool>, actual: bool| wanted.map_or(true, |w| w == actual);

        let visible = match f.visible_to {
            None => true,
            Some(Visibility::Public) => self.is_published,
            Some(Visibility::PublicOrOwnedBy(user)) => {
                self.is_published || self.owner_id == Some(user)
            }
        };

        visible
            && search_hit(
                &f.search,
                [self.name.as_str(), self.slug.as_str(), self.content.as_deref().unwrap_or("")],
            )
            && flag(f.is_published, self.is_published)
            && flag(f.is_active, self.is_active)
            && flag(f.is_verified, self.is_verified)
            && flag(f.is_brand, self.is_brand)
            && flag(f.organic_products, self.organic_products)
            && flag(f.private_label, self.private_label)
            && flag(f.female_leadership, self.female_leadership)
            && f.industry_id.map_or(true, |id| self.industry_id == Some(id))
            && f.owner_id.map_or(true, |id| self.owner_id == Some(id))
            && f.country.as_ref().map_or(true, |code| {
                self.export_countries.iter().any(|c| c.eq_ignore_ascii_case(code))
            })
            && f.created.map_or(true, |range| range.contains(self.creation_date))
    }

    fn sort_key(&self, field: CompanySortField) -> SortKey {
        match field {
            CompanySortField::Name => self.name.as_str().into(),
            CompanySortField::CreationDate => self.creation_date.into(),
            CompanySortField::PublicationDate => self.publication_date.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Representative {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub position: Option<String>,
    pub photo: Option<String>,
    pub photo_alt: String,
    pub linkedin_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub certificate: Option<String>,
    pub type_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brochure {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub brochure: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub video: Option<String>,
    pub youtube_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialResponsibility {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub image: Option<String>,
    pub video: Option<String>,
    pub youtube_url: Option<String>,
    pub brochure: Option<String>,
    pub brochure_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeShow {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub year: i32,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: i64,
    pub company_id: i64,
    pub seller_id: Option<i64>,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub country: Option<String>,
    pub subject: String,
    pub contact: String,
    pub submission_date: DateTime<Utc>,
    pub ask_for_reference: bool,
    pub status: MessageStatus,
    pub message_type: MessageType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Industry {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessStory {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rosetter {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub company_id: i64,
    pub slug: String,
    pub name: String,
    pub category_id: Option<i64>,
    pub industry_id: Option<i64>,
    pub is_published: bool,
    pub visible_in_listings: bool,
    pub quantity_unit: QuantityUnit,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_published_and_visible(&self) -> bool {
        self.is_published && self.visible_in_listings
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

macro_rules! identified {
    () => {
        fn id(&self) -> i64 {
            self.id
        }

        fn assign_id(&mut self, id: i64) {
            self.id = id;
        }
    };
}

macro_rules! company_owned {
    () => {
        fn company_id(&self) -> Option<i64> {
            Some(self.company_id)
        }
    };
}

impl Record for Representative {
    const TYPE_NAME: &'static str = "Representative";
    type Filter = ChildQuery;
    type SortField = RepresentativeSortField;
    identified!();
    company_owned!();

    fn matches(&self, f: &ChildQuery) -> bool {
        f.company_id.map_or(true, |id| id == self.company_id)
            && within(&f.within, self.company_id)
            && search_hit(&f.search, [self.name.as_str(), self.position.as_deref().unwrap_or("")])
    }

    fn sort_key(&self, field: RepresentativeSortField) -> SortKey {
        match field {
            RepresentativeSortField::CreatedAt => self.created_at.into(),
            RepresentativeSortField::Name => self.name.as_str().into(),
        }
    }

    fn position_key(&self) -> SortKey {
        self.created_at.into()
    }
}

impl Record for CertificateType {
    const TYPE_NAME: &'static str = "CertificateType";
    type Filter = ();
    type SortField = ();
    identified!();

    fn sort_key(&self, _: ()) -> SortKey {
        SortKey::Int(self.id)
    }
}

/// Certificates, brochures, images and videos share one filter and ordering
macro_rules! sorted_media {
    ($ty:ident, $name:literal) => {
        impl Record for $ty {
            const TYPE_NAME: &'static str = $name;
            type Filter = ChildQuery;
            type SortField = MediaSortField;
            identified!();
            company_owned!();

            fn matches(&self, f: &ChildQuery) -> bool {
                f.company_id.map_or(true, |id| id == self.company_id)
                    && within(&f.within, self.company_id)
                    && search_hit(
                        &f.search,
                        [self.name.as_str(), self.description.as_deref().unwrap_or("")],
                    )
            }

            fn sort_key(&self, field: MediaSortField) -> SortKey {
                match field {
                    MediaSortField::SortOrder => self.sort_order.into(),
                    MediaSortField::Name => self.name.as_str().into(),
                    MediaSortField::CreatedAt => self.created_at.into(),
                }
            }

            fn position_key(&self) -> SortKey {
                self.sort_order.into()
            }
        }
    };
}

sorted_media!(Certificate, "Certificate");
sorted_media!(Brochure, "Brochure");
sorted_media!(Image, "Image");
sorted_media!(Video, "Video");

impl Record for SocialResponsibility {
    const TYPE_NAME: &'static str = "SocialResponsibility";
    type Filter = ChildQuery;
    type SortField = SocialResponsibilitySortField;
    identified!();
    company_owned!();

    fn matches(&self, f: &ChildQuery) -> bool {
        f.company_id.map_or(true, |id| id == self.company_id)
            && within(&f.within, self.company_id)
            && search_hit(&f.search, [self.name.as_str(), self.description.as_deref().unwrap_or("")])
    }

    fn sort_key(&self, field: SocialResponsibilitySortField) -> SortKey {
        match field {
            SocialResponsibilitySortField::SortOrder => self.sort_order.into(),
            SocialResponsibilitySortField::CreatedAt => self.created_at.into(),
        }
    }

    fn position_key(&self) -> SortKey {
        self.sort_order.into()
    }
}

impl Record for TradeShow {
    const TYPE_NAME: &'static str = "TradeShow";
    type Filter = TradeShowQuery;
    type SortField = TradeShowSortField;
    identified!();
    company_owned!();

    fn matches(&self, f: &TradeShowQuery) -> bool {
        f.company_id.map_or(true, |id| id == self.company_id)
            && within(&f.within, self.company_id)
            && f.year.map_or(true, |year| year == self.year)
            && search_hit(&f.search, [self.name.as_str(), self.city.as_deref().unwrap_or("")])
    }

    fn sort_key(&self, field: TradeShowSortField) -> SortKey {
        match field {
            TradeShowSortField::Year => self.year.into(),
            TradeShowSortField::CreatedAt => self.created_at.into(),
        }
    }

    fn position_key(&self) -> SortKey {
        self.created_at.into()
    }
}

impl Record for Contact {
    const TYPE_NAME: &'static str = "Contact";
    type Filter = ContactQuery;
    type SortField = ContactSortField;
    identified!();
    company_owned!();

    fn matches(&self, f: &ContactQuery) -> bool {
        search_hit(
            &f.search,
            [self.name.as_str(), self.email.as_str(), self.subject.as_str(), self.contact.as_str()],
        ) && f.status.map_or(true, |status| status == self.status)
            && f.message_type.map_or(true, |kind| kind == self.message_type)
            && f.company_id.map_or(true, |id| id == self.company_id)
            && f.recipient.as_ref().map_or(true, |r| r.receives(self.seller_id, self.company_id))
            && f.submitted.map_or(true, |range| range.contains(self.submission_date))
    }

    fn sort_key(&self, field: ContactSortField) -> SortKey {
        match field {
            ContactSortField::SubmissionDate => self.submission_date.into(),
            ContactSortField::Name => self.name.as_str().into(),
        }
    }

    fn position_key(&self) -> SortKey {
        self.submission_date.into()
    }
}

impl Record for Industry {
    const TYPE_NAME: &'static str = "Industry";
    type Filter = IndustryQuery;
    type SortField = IndustrySortField;
    identified!();

    fn matches(&self, f: &IndustryQuery) -> bool {
        search_hit(&f.search, [self.name.as_str()])
            && f.is_active.map_or(true, |active| active == self.is_active)
            && f.parent_id.map_or(true, |id| self.parent_id == Some(id))
    }

    fn sort_key(&self, field: IndustrySortField) -> SortKey {
        match field {
            IndustrySortField::Name => self.name.as_str().into(),
        }
    }
}

impl Record for SuccessStory {
    const TYPE_NAME: &'static str = "SuccessStory";
    type Filter = SuccessStoryQuery;
    type SortField = SuccessStorySortField;
    identified!();

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn matches(&self, f: &SuccessStoryQuery) -> bool {
        let text = [self.title.as_str(), self.description.as_deref().unwrap_or("")];
        search_hit(&f.search, text.into_iter().chain(self.tags.iter().map(String::as_str)))
            && f.is_active.map_or(true, |active| active == self.is_active)
            && f.created.map_or(true, |range| range.contains(self.created_at))
    }

    fn sort_key(&self, field: SuccessStorySortField) -> SortKey {
        match field {
            SuccessStorySortField::CreatedAt => self.created_at.into(),
            SuccessStorySortField::Title => self.title.as_str().into(),
        }
    }
}

impl Record for Rosetter {
    const TYPE_NAME: &'static str = "Rosetter";
    type Filter = ();
    type SortField = ();
    identified!();

    fn sort_key(&self, _: ()) -> SortKey {
        SortKey::Int(self.id)
    }
}

impl Record for Product {
    const TYPE_NAME: &'static str = "Product";
    type Filter = ProductQuery;
    type SortField = ();
    identified!();
    company_owned!();

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn matches(&self, f: &ProductQuery) -> bool {
        f.company_id.map_or(true, |id| id == self.company_id)
            && f.industry_id.map_or(true, |id| self.industry_id == Some(id))
            && (!f.published_only || self.is_published_and_visible())
    }

    fn sort_key(&self, _: ()) -> SortKey {
        SortKey::Int(self.id)
    }
}

impl Record for Category {
    const TYPE_NAME: &'static str = "Category";
    type Filter = ();
    type SortField = ();
    identified!();

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn sort_key(&self, _: ()) -> SortKey {
        SortKey::Int(self.id)
    }
}

impl Record for User {
    const TYPE_NAME: &'static str = "User";
    type Filter = ();
    type SortField = ();
    identified!();

    fn sort_key(&self, _: ()) -> SortKey {
        SortKey::Int(self.id)
    }
}
