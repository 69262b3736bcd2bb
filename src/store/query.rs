//! Declarative predicate and ordering specs handed to repositories

use std::collections::HashSet;

use async_graphql::Enum;
use chrono::{DateTime, Utc};

use super::models::{MessageStatus, MessageType};
use super::OrderField;

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Inclusive creation-date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub gte: Option<DateTime<Utc>>,
    pub lte: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, value: DateTime<Utc>) -> bool {
        self.gte.map_or(true, |gte| value >= gte) && self.lte.map_or(true, |lte| value <= lte)
    }
}

/// Case-insensitive substring match over any of the given fields
pub(crate) fn search_hit<'a>(needle: &Option<String>, haystacks: impl IntoIterator<Item = &'a str>) -> bool {
    match needle.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            haystacks.into_iter().any(|h| h.to_lowercase().contains(&needle))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompanyQuery {
    pub search: Option<String>,
    pub is_published: Option<bool>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub industry_id: Option<i64>,
    /// Export country code
    pub country: Option<String>,
    pub is_brand: Option<bool>,
    pub organic_products: Option<bool>,
    pub private_label: Option<bool>,
    pub female_leadership: Option<bool>,
    pub created: Option<DateRange>,
    pub owner_id: Option<i64>,
    /// Rows visible to a non-staff viewer: published, or owned by this user
    pub visible_to: Option<Visibility>,
}

/// Listing scope for viewers without the staff capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    PublicOrOwnedBy(i64),
}

#[derive(Debug, Clone, Default)]
pub struct SuccessStoryQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub created: Option<DateRange>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    pub search: Option<String>,
    pub status: Option<MessageStatus>,
    pub message_type: Option<MessageType>,
    pub company_id: Option<i64>,
    pub submitted: Option<DateRange>,
    pub recipient: Option<Recipient>,
}

/// Messages a viewer may read: sent to them, or to a company they own
#[derive(Debug, Clone, Default)]
pub struct Recipient {
    pub seller_id: i64,
    pub companies: HashSet<i64>,
}

impl Recipient {
    pub fn receives(&self, seller_id: Option<i64>, company_id: i64) -> bool {
        seller_id == Some(self.seller_id) || self.companies.contains(&company_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndustryQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub parent_id: Option<i64>,
}

/// Filter for company-owned collections (media, representatives, trade shows)
#[derive(Debug, Clone, Default)]
pub struct ChildQuery {
    pub company_id: Option<i64>,
    pub search: Option<String>,
    /// Restrict to rows of these companies
    pub within: Option<HashSet<i64>>,
}

/// `within` membership, true when unrestricted
pub(crate) fn within(scope: &Option<HashSet<i64>>, company_id: i64) -> bool {
    scope.as_ref().map_or(true, |ids| ids.contains(&company_id))
}

#[derive(Debug, Clone, Default)]
pub struct TradeShowQuery {
    pub company_id: Option<i64>,
    pub year: Option<i32>,
    pub search: Option<String>,
    pub within: Option<HashSet<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub company_id: Option<i64>,
    pub industry_id: Option<i64>,
    /// Only products that are published and visible in listings
    pub published_only: bool,
}

impl ProductQuery {
    /// Published products of one company
    pub fn published_for(company_id: i64) -> Self {
        Self { company_id: Some(company_id), published_only: true, ..Self::default() }
    }
}

macro_rules! order_fields {
    ($($ty:ident { $($variant:ident => $name:literal),+ $(,)? })+) => {
        $(
            impl OrderField for $ty {
                fn as_str(&self) -> &'static str {
                    match self {
                        $($ty::$variant => $name,)+
                    }
                }
            }
        )+
    };
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CompanySortField {
    #[default]
    Name,
    CreationDate,
    PublicationDate,
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ContactSortField {
    #[default]
    SubmissionDate,
    Name,
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SuccessStorySortField {
    #[default]
    CreatedAt,
    Title,
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SocialResponsibilitySortField {
    #[default]
    SortOrder,
    CreatedAt,
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TradeShowSortField {
    #[default]
    Year,
    CreatedAt,
}

/// Ordering for certificates, brochures, images and videos
#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MediaSortField {
    #[default]
    SortOrder,
    Name,
    CreatedAt,
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RepresentativeSortField {
    #[default]
    CreatedAt,
    Name,
}

#[derive(Enum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum IndustrySortField {
    #[default]
    Name,
}

order_fields! {
    CompanySortField {
        Name => "name",
        CreationDate => "creation_date",
        PublicationDate => "publication_date",
    }
    ContactSortField {
        SubmissionDate => "submission_date",
        Name => "name",
    }
    SuccessStorySortField {
        CreatedAt => "created_at",
        Title => "title",
    }
    SocialResponsibilitySortField {
        SortOrder => "sort_order",
        CreatedAt => "created_at",
    }
    TradeShowSortField {
        Year => "year",
        CreatedAt => "created_at",
    }
    MediaSortField {
        SortOrder => "sort_order",
        Name => "name",
        CreatedAt => "created_at",
    }
    RepresentativeSortField {
        CreatedAt => "created_at",
        Name => "name",
    }
    IndustrySortField {
        Name => "name",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_range_is_inclusive() {
        let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let range = DateRange { gte: Some(day(2)), lte: Some(day(4)) };
        assert!(!range.contains(day(1)));
        assert!(range.contains(day(2)));
        assert!(range.contains(day(4)));
        assert!(!range.contains(day(5)));
        assert!(DateRange::default().contains(day(9)));
    }

    #[test]
    fn test_search_hit_ignores_case_and_blank_needles() {
        assert!(search_hit(&Some("ACME".into()), ["acme-foods"]));
        assert!(search_hit(&Some("  ".into()), ["anything"]));
        assert!(search_hit(&None, ["anything"]));
        assert!(!search_hit(&Some("zeta".into()), ["acme", "foods"]));
    }

    #[test]
    fn test_recipient_reads_own_and_owned_company_messages() {
        let recipient = Recipient { seller_id: 7, companies: HashSet::from([3]) };
        assert!(recipient.receives(Some(7), 1));
        assert!(recipient.receives(None, 3));
        assert!(!recipient.receives(Some(8), 4));
        assert!(within(&None, 99));
        assert!(!within(&Some(HashSet::from([1])), 2));
    }

    #[test]
    fn test_sort_field_names() {
        assert_eq!(CompanySortField::PublicationDate.as_str(), "publication_date");
        assert_eq!(TradeShowSortField::default().as_str(), "year");
    }
}
