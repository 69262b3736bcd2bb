//! Filter and sorting inputs
//!
//! Each listing accepts a `filter` input and a `sortBy` input. Both translate
//! into the declarative query specs of [`crate::store::query`]; global ids in
//! filters are decoded and type-checked here.

use async_graphql::{Enum, InputObject, InputType};

use crate::store::{
    ChildQuery, CompanyQuery, CompanySortField, ContactQuery, ContactSortField, DateRange,
    Industry, IndustryQuery, IndustrySortField, MediaSortField, MessageStatus, MessageType,
    OrderField, RepresentativeSortField, SocialResponsibilitySortField, Sort, SortDirection,
    SuccessStoryQuery, SuccessStorySortField, TradeShowQuery, TradeShowSortField,
};
use crate::store::Company as CompanyRow;
use crate::types::{DateTime, GlobalId};

/// Inclusive date range
#[derive(InputObject, Debug, Clone, Copy, Default)]
pub struct DateRangeInput {
    pub gte: Option<DateTime>,
    pub lte: Option<DateTime>,
}

impl From<DateRangeInput> for DateRange {
    fn from(input: DateRangeInput) -> Self {
        DateRange { gte: input.gte.map(|d| d.0), lte: input.lte.map(|d| d.0) }
    }
}

/// Sort field and direction for a listing
#[derive(InputObject, Debug, Clone, Copy)]
#[graphql(
    concrete(name = "CompanySortingInput", params(CompanySortField)),
    concrete(name = "ContactSortingInput", params(ContactSortField)),
    concrete(name = "SuccessStorySortingInput", params(SuccessStorySortField)),
    concrete(name = "SocialResponsibilitySortingInput", params(SocialResponsibilitySortField)),
    concrete(name = "TradeShowSortingInput", params(TradeShowSortField)),
    concrete(name = "MediaSortingInput", params(MediaSortField)),
    concrete(name = "RepresentativeSortingInput", params(RepresentativeSortField)),
    concrete(name = "IndustrySortingInput", params(IndustrySortField))
)]
pub struct SortingInput<F: InputType + OrderField> {
    pub field: F,
    #[graphql(default)]
    pub direction: SortDirection,
}

/// Resolve an optional `sortBy` argument, falling back to the field's default
pub fn sort_of<F: InputType + OrderField>(input: Option<SortingInput<F>>) -> Sort<F> {
    input
        .map(|s| Sort::new(s.field, s.direction))
        .unwrap_or_default()
}

fn pk_of<T: crate::store::Record>(id: Option<GlobalId>) -> async_graphql::Result<Option<i64>> {
    Ok(id.map(|id| id.pk_of::<T>()).transpose()?)
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct CompanyFilterInput {
    /// Substring over name, slug and content
    pub search: Option<String>,
    pub is_published: Option<bool>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub industry: Option<GlobalId>,
    /// Export country code
    pub country: Option<String>,
    pub is_brand: Option<bool>,
    pub organic_products: Option<bool>,
    pub private_label: Option<bool>,
    pub female_leadership: Option<bool>,
    pub created: Option<DateRangeInput>,
}

impl CompanyFilterInput {
    pub fn into_query(self) -> async_graphql::Result<CompanyQuery> {
        Ok(CompanyQuery {
            search: self.search,
            is_published: self.is_published,
            is_active: self.is_active,
            is_verified: self.is_verified,
            industry_id: pk_of::<Industry>(self.industry)?,
            country: self.country,
            is_brand: self.is_brand,
            organic_products: self.organic_products,
            private_label: self.private_label,
            female_leadership: self.female_leadership,
            created: self.created.map(Into::into),
            ..CompanyQuery::default()
        })
    }
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct SuccessStoryFilterInput {
    /// Substring over title, description and tags
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub created: Option<DateRangeInput>,
}

impl From<SuccessStoryFilterInput> for SuccessStoryQuery {
    fn from(input: SuccessStoryFilterInput) -> Self {
        SuccessStoryQuery {
            search: input.search,
            is_active: input.is_active,
            created: input.created.map(Into::into),
        }
    }
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct ContactFilterInput {
    pub search: Option<String>,
    pub status: Option<MessageStatus>,
    #[graphql(name = "type")]
    pub message_type: Option<MessageType>,
    pub company: Option<GlobalId>,
    pub submitted: Option<DateRangeInput>,
}

impl ContactFilterInput {
    pub fn into_query(self) -> async_graphql::Result<ContactQuery> {
        Ok(ContactQuery {
            search: self.search,
            status: self.status,
            message_type: self.message_type,
            company_id: pk_of::<CompanyRow>(self.company)?,
            submitted: self.submitted.map(Into::into),
            recipient: None,
        })
    }
}

/// Industry active flag
#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndustryStatus {
    Active,
    Inactive,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct IndustryFilterInput {
    pub search: Option<String>,
    pub status: Option<IndustryStatus>,
    /// Direct children of this industry
    pub parent: Option<GlobalId>,
}

impl IndustryFilterInput {
    pub fn into_query(self) -> async_graphql::Result<IndustryQuery> {
        Ok(IndustryQuery {
            search: self.search,
            is_active: self.status.map(|s| s == IndustryStatus::Active),
            parent_id: pk_of::<Industry>(self.parent)?,
        })
    }
}

/// Filter for representatives, certificates, brochures, images, videos and
/// social responsibility entries
#[derive(InputObject, Debug, Clone, Default)]
pub struct ChildFilterInput {
    pub company: Option<GlobalId>,
    pub search: Option<String>,
}

impl ChildFilterInput {
    pub fn into_query(self) -> async_graphql::Result<ChildQuery> {
        Ok(ChildQuery {
            company_id: pk_of::<CompanyRow>(self.company)?,
            search: self.search,
            within: None,
        })
    }
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct TradeShowFilterInput {
    pub company: Option<GlobalId>,
    pub year: Option<i32>,
    pub search: Option<String>,
}

impl TradeShowFilterInput {
    pub fn into_query(self) -> async_graphql::Result<TradeShowQuery> {
        Ok(TradeShowQuery {
            company_id: pk_of::<CompanyRow>(self.company)?,
            year: self.year,
            search: self.search,
            within: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Contact;

    #[test]
    fn test_company_filter_decodes_industry_id() {
        let filter = CompanyFilterInput {
            industry: Some(GlobalId::of::<Industry>(5)),
            is_brand: Some(true),
            ..Default::default()
        };
        let query = filter.into_query().unwrap();
        assert_eq!(query.industry_id, Some(5));
        assert_eq!(query.is_brand, Some(true));
        assert!(query.visible_to.is_none());
    }

    #[test]
    fn test_filter_rejects_id_of_other_type() {
        let filter = ChildFilterInput { company: Some(GlobalId::of::<Contact>(1)), search: None };
        assert!(filter.into_query().is_err());
    }

    #[test]
    fn test_industry_status_maps_to_flag() {
        let filter = IndustryFilterInput { status: Some(IndustryStatus::Inactive), ..Default::default() };
        assert_eq!(filter.into_query().unwrap().is_active, Some(false));
    }

    #[test]
    fn test_missing_sort_uses_defaults() {
        let sort = sort_of::<CompanySortField>(None);
        assert_eq!(sort.field, CompanySortField::Name);
        assert_eq!(sort.tag(), "name:asc");

        let sort = sort_of(Some(SortingInput {
            field: TradeShowSortField::CreatedAt,
            direction: SortDirection::Desc,
        }));
        assert_eq!(sort.tag(), "created_at:desc");
    }
}
