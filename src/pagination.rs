//! Keyset cursor pagination
//!
//! Listings are ordered by `(sort key, id)`. A cursor encodes the sort it was
//! issued under plus that pair, so it stays valid when rows are inserted
//! elsewhere in the ordering and is rejected if the sort changes mid-traversal.

use std::cmp::Ordering;

use async_graphql::{OutputType, SimpleObject};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::objects::{
    Brochure, Certificate, Company, Contact, Image, Industry, Representative,
    SocialResponsibility, SuccessStory, TradeShow, Video,
};
use crate::store::SortDirection;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: i32 = 100;

/// Page information
#[derive(SimpleObject, Debug, Clone)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Edge in a connection
#[derive(SimpleObject, Debug, Clone)]
#[graphql(
    concrete(name = "CompanyEdge", params(Company)),
    concrete(name = "RepresentativeEdge", params(Representative)),
    concrete(name = "CertificateEdge", params(Certificate)),
    concrete(name = "BrochureEdge", params(Brochure)),
    concrete(name = "ImageEdge", params(Image)),
    concrete(name = "VideoEdge", params(Video)),
    concrete(name = "SocialResponsibilityEdge", params(SocialResponsibility)),
    concrete(name = "ContactEdge", params(Contact)),
    concrete(name = "IndustryEdge", params(Industry)),
    concrete(name = "SuccessStoryEdge", params(SuccessStory)),
    concrete(name = "TradeShowEdge", params(TradeShow))
)]
pub struct Edge<T: OutputType> {
    pub cursor: String,
    pub node: T,
}

/// Connection (paginated result)
#[derive(SimpleObject, Debug, Clone)]
#[graphql(
    concrete(name = "CompanyConnection", params(Company)),
    concrete(name = "RepresentativeConnection", params(Representative)),
    concrete(name = "CertificateConnection", params(Certificate)),
    concrete(name = "BrochureConnection", params(Brochure)),
    concrete(name = "ImageConnection", params(Image)),
    concrete(name = "VideoConnection", params(Video)),
    concrete(name = "SocialResponsibilityConnection", params(SocialResponsibility)),
    concrete(name = "ContactConnection", params(Contact)),
    concrete(name = "IndustryConnection", params(Industry)),
    concrete(name = "SuccessStoryConnection", params(SuccessStory)),
    concrete(name = "TradeShowConnection", params(TradeShow))
)]
pub struct Connection<T: OutputType>
where
    Edge<T>: OutputType,
{
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: i32,
}

impl<T: OutputType> Connection<T>
where
    Edge<T>: OutputType,
{
    /// Create empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo {
                has_next_page: false,
                has_previous_page: false,
                start_cursor: None,
                end_cursor: None,
            },
            total_count: 0,
        }
    }
}

/// Orderable value of a row under the active sort
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum SortKey {
    Null,
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

impl From<i64> for SortKey {
    fn from(value: i64) -> Self {
        SortKey::Int(value)
    }
}

impl From<i32> for SortKey {
    fn from(value: i32) -> Self {
        SortKey::Int(value.into())
    }
}

impl From<DateTime<Utc>> for SortKey {
    fn from(value: DateTime<Utc>) -> Self {
        SortKey::Time(value)
    }
}

impl From<Option<DateTime<Utc>>> for SortKey {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(SortKey::Time).unwrap_or(SortKey::Null)
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        // Case-folded so "acme" and "Acme" sort together.
        SortKey::Text(value.to_lowercase())
    }
}

/// Position of a row inside an ordering, as carried by a cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// Sort the cursor was issued under, e.g. `name:asc`
    pub sort: String,
    pub key: SortKey,
    pub id: i64,
}

impl CursorPosition {
    fn compare(&self, other_key: &SortKey, other_id: i64) -> Ordering {
        (&self.key, self.id).cmp(&(other_key, other_id))
    }
}

/// Cursor encoding/decoding
pub struct CursorCodec;

impl CursorCodec {
    /// Encode cursor to base64
    pub fn encode(value: &str) -> String {
        BASE64.encode(value.as_bytes())
    }

    /// Decode cursor from base64
    pub fn decode(cursor: &str) -> crate::Result<String> {
        let bytes = BASE64
            .decode(cursor.as_bytes())
            .map_err(|e| crate::DirectoryError::InvalidCursor(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| crate::DirectoryError::InvalidCursor(e.to_string()))
    }

    /// Encode structured cursor (sort + key + id)
    pub fn encode_structured<T: Serialize>(value: &T) -> crate::Result<String> {
        let json = serde_json::to_string(value)
            .map_err(|e| crate::DirectoryError::InvalidCursor(e.to_string()))?;
        Ok(BASE64.encode(json.as_bytes()))
    }

    /// Decode structured cursor
    pub fn decode_structured<T: for<'de> Deserialize<'de>>(cursor: &str) -> crate::Result<T> {
        let json = Self::decode(cursor)?;
        serde_json::from_str(&json).map_err(|e| crate::DirectoryError::InvalidCursor(e.to_string()))
    }
}

/// Pagination arguments as received on a listing field
///
/// Follows the Relay Cursor Connections Specification:
/// https://relay.dev/graphql/connections.htm
#[derive(Debug, Clone, Default)]
pub struct PaginationInput {
    /// Number of items to return (forward pagination)
    pub first: Option<i32>,

    /// Cursor to start from (forward pagination)
    pub after: Option<String>,

    /// Number of items to return (backward pagination)
    pub last: Option<i32>,

    /// Cursor to start from (backward pagination)
    pub before: Option<String>,
}

impl PaginationInput {
    pub fn new(
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Self {
        Self { first, after, last, before }
    }

    /// Validate pagination input
    pub fn validate(&self) -> crate::Result<()> {
        if self.first.is_some() && self.last.is_some() {
            return Err(crate::DirectoryError::PaginationError(
                "Cannot specify both 'first' and 'last'".to_string(),
            ));
        }

        for (name, value) in [("first", self.first), ("last", self.last)] {
            if let Some(value) = value {
                if value < 0 {
                    return Err(crate::DirectoryError::PaginationError(format!(
                        "'{}' must be non-negative",
                        name
                    )));
                }
                if value > MAX_PAGE_SIZE {
                    return Err(crate::DirectoryError::PaginationError(format!(
                        "'{}' cannot exceed {}",
                        name, MAX_PAGE_SIZE
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolve into a window for the given sort, decoding and checking cursors
    pub fn window(&self, sort: &str) -> crate::Result<Window> {
        self.validate()?;

        let decode = |cursor: &Option<String>| -> crate::Result<Option<CursorPosition>> {
            match cursor {
                None => Ok(None),
                Some(raw) => {
                    let position: CursorPosition = CursorCodec::decode_structured(raw)?;
                    if position.sort != sort {
                        return Err(crate::DirectoryError::InvalidCursor(format!(
                            "cursor was issued for sort '{}', not '{}'",
                            position.sort, sort
                        )));
                    }
                    Ok(Some(position))
                }
            }
        };

        let first = self.first.map(|n| n as usize);
        let last = self.last.map(|n| n as usize);

        Ok(Window {
            sort: sort.to_string(),
            after: decode(&self.after)?,
            before: decode(&self.before)?,
            first: if first.is_none() && last.is_none() { Some(DEFAULT_PAGE_SIZE) } else { first },
            last,
        })
    }
}

/// A resolved pagination window
#[derive(Debug, Clone)]
pub struct Window {
    pub sort: String,
    pub after: Option<CursorPosition>,
    pub before: Option<CursorPosition>,
    pub first: Option<usize>,
    pub last: Option<usize>,
}

impl Window {
    /// Window covering the whole ordering
    pub fn unbounded(sort: &str) -> Self {
        Self { sort: sort.to_string(), after: None, before: None, first: None, last: None }
    }
}

/// One page of an ordered listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<(CursorPosition, T)>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_count: usize,
}

impl<T> Page<T> {
    /// Convert into a GraphQL connection, wrapping each row
    pub fn into_connection<U, F>(self, wrap: F) -> crate::Result<Connection<U>>
    where
        U: OutputType,
        Edge<U>: OutputType,
        F: Fn(T) -> U,
    {
        let edges = self
            .items
            .into_iter()
            .map(|(position, node)| {
                Ok(Edge { cursor: CursorCodec::encode_structured(&position)?, node: wrap(node) })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let start_cursor = edges.first().map(|e| e.cursor.clone());
        let end_cursor = edges.last().map(|e| e.cursor.clone());

        Ok(Connection {
            edges,
            page_info: PageInfo {
                has_next_page: self.has_next_page,
                has_previous_page: self.has_previous_page,
                start_cursor,
                end_cursor,
            },
            total_count: self.total_count as i32,
        })
    }
}

/// Compose the sort tag a cursor carries
pub fn sort_tag(field: &str, direction: SortDirection) -> String {
    match direction {
        SortDirection::Asc => format!("{}:asc", field),
        SortDirection::Desc => format!("{}:desc", field),
    }
}

/// Order `(key, id, row)` triples and cut the requested window out of them
pub fn slice<T>(
    mut rows: Vec<(SortKey, i64, T)>,
    direction: SortDirection,
    window: &Window,
) -> Page<T> {
    let directed = |ordering: Ordering| match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };

    rows.sort_by(|a, b| directed((&a.0, a.1).cmp(&(&b.0, b.1))));
    let total_count = rows.len();

    // First row strictly after the `after` cursor.
    let mut lo = match &window.after {
        Some(after) => rows
            .iter()
            .position(|(key, id, _)| directed(after.compare(key, *id)) == Ordering::Less)
            .unwrap_or(total_count),
        None => 0,
    };
    // First row at or past the `before` cursor.
    let mut hi = match &window.before {
        Some(before) => rows
            .iter()
            .position(|(key, id, _)| directed(before.compare(key, *id)) != Ordering::Greater)
            .unwrap_or(total_count),
        None => total_count,
    };
    if hi < lo {
        hi = lo;
    }

    if let Some(first) = window.first {
        hi = hi.min(lo + first);
    }
    if let Some(last) = window.last {
        lo = lo.max(hi.saturating_sub(last));
    }

    let has_next_page = hi < total_count;
    let has_previous_page = lo > 0;

    let items = rows
        .into_iter()
        .skip(lo)
        .take(hi - lo)
        .map(|(key, id, row)| (CursorPosition { sort: window.sort.clone(), key, id }, row))
        .collect();

    Page { items, has_next_page, has_previous_page, total_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: i64) -> Vec<(SortKey, i64, i64)> {
        (1..=n).map(|id| (SortKey::Int(id * 10), id, id)).collect()
    }

    fn ids<T: Copy>(page: &Page<T>) -> Vec<T> {
        page.items.iter().map(|(_, row)| *row).collect()
    }

    fn window(first: Option<usize>, last: Option<usize>) -> Window {
        Window { sort: "n:asc".into(), after: None, before: None, first, last }
    }

    #[test]
    fn test_cursor_codec() {
        let original = "test-cursor";
        let encoded = CursorCodec::encode(original);
        let decoded = CursorCodec::decode(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_structured_cursor_keeps_sort_key() {
        let position = CursorPosition { sort: "name:asc".into(), key: "acme".into(), id: 7 };
        let cursor = CursorCodec::encode_structured(&position).unwrap();
        let decoded: CursorPosition = CursorCodec::decode_structured(&cursor).unwrap();
        assert_eq!(decoded, position);
    }

    #[test]
    fn test_first_page_reports_next() {
        let page = slice(rows(5), SortDirection::Asc, &window(Some(2), None));
        assert_eq!(ids(&page), vec![1, 2]);
        assert!(page.has_next_page);
        assert!(!page.has_previous_page);
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn test_first_zero_returns_no_edges() {
        let page = slice(rows(3), SortDirection::Asc, &window(Some(0), None));
        assert!(page.items.is_empty());
        assert!(page.has_next_page);

        let empty = slice(Vec::<(SortKey, i64, i64)>::new(), SortDirection::Asc, &window(Some(0), None));
        assert!(!empty.has_next_page);
    }

    #[test]
    fn test_after_last_element_has_no_next_page() {
        let full = slice(rows(3), SortDirection::Asc, &window(Some(10), None));
        let (last, _) = full.items.last().cloned().unwrap();

        let mut w = window(Some(10), None);
        w.after = Some(last);
        let page = slice(rows(3), SortDirection::Asc, &w);
        assert!(page.items.is_empty());
        assert!(!page.has_next_page);
        assert!(page.has_previous_page);
    }

    #[test]
    fn test_cursor_survives_insertion_elsewhere() {
        let page = slice(rows(4), SortDirection::Asc, &window(Some(2), None));
        let (cursor, _) = page.items.last().cloned().unwrap();

        // A row sorting before the cursor appears between requests.
        let mut grown = rows(4);
        grown.push((SortKey::Int(5), 99, 99));

        let mut w = window(Some(2), None);
        w.after = Some(cursor);
        let next = slice(grown, SortDirection::Asc, &w);
        assert_eq!(ids(&next), vec![3, 4]);
    }

    #[test]
    fn test_descending_with_last_and_before() {
        let desc = slice(rows(5), SortDirection::Desc, &window(None, None));
        assert_eq!(ids(&desc), vec![5, 4, 3, 2, 1]);
        let before = desc.items[3].0.clone(); // row 2

        let mut w = window(None, Some(2));
        w.before = Some(before);
        let page = slice(rows(5), SortDirection::Desc, &w);
        assert_eq!(ids(&page), vec![4, 3]);
        assert!(page.has_previous_page);
        assert!(page.has_next_page);
    }

    #[test]
    fn test_validation_rejects_first_and_last() {
        let input = PaginationInput::new(Some(1), None, Some(1), None);
        assert!(input.validate().is_err());
        assert!(PaginationInput::new(Some(101), None, None, None).validate().is_err());
        assert!(PaginationInput::new(Some(-1), None, None, None).validate().is_err());
    }

    #[test]
    fn test_window_rejects_cursor_from_other_sort() {
        let position = CursorPosition { sort: "name:asc".into(), key: SortKey::Null, id: 1 };
        let cursor = CursorCodec::encode_structured(&position).unwrap();
        let input = PaginationInput::new(Some(5), Some(cursor), None, None);
        assert!(input.window("name:asc").is_ok());
        assert!(matches!(
            input.window("creation_date:desc"),
            Err(crate::DirectoryError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_default_window_uses_default_page_size() {
        let window = PaginationInput::default().window("id:asc").unwrap();
        assert_eq!(window.first, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(window.last, None);
    }
}
