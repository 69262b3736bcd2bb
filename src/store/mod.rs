//! Persistence seam consumed by the GraphQL layer
//!
//! The relational store itself lives outside this crate. Resolvers and
//! mutations only see [`Repository`] trait objects bundled in a [`Store`];
//! [`Store::in_memory`] wires the reference implementation used by the binary
//! and the tests.

mod memory;
pub mod models;
pub mod query;
mod transaction;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

pub use memory::MemoryRepository;
pub use models::*;
pub use query::*;
pub use transaction::Transaction;

use crate::pagination::{Page, SortKey, Window};

/// Store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} with this {field} already exists")]
    UniqueViolation { entity: &'static str, field: &'static str },

    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Sort field of a listing
pub trait OrderField: Copy + Default + Send + Sync + 'static {
    fn as_str(&self) -> &'static str;
}

impl OrderField for () {
    fn as_str(&self) -> &'static str {
        "id"
    }
}

/// Requested ordering of a listing
#[derive(Debug, Clone, Copy, Default)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: OrderField> Sort<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Tag cursors issued under this ordering carry
    pub fn tag(&self) -> String {
        crate::pagination::sort_tag(self.field.as_str(), self.direction)
    }
}

/// A row type the store can hold
pub trait Record: Clone + Send + Sync + 'static {
    /// GraphQL type name, also the global id prefix
    const TYPE_NAME: &'static str;

    type Filter: Default + Send + Sync;
    type SortField: OrderField;

    fn id(&self) -> i64;

    fn assign_id(&mut self, id: i64);

    fn slug(&self) -> Option<&str> {
        None
    }

    /// Owning company, for company-scoped rows
    fn company_id(&self) -> Option<i64> {
        None
    }

    /// Evaluated by stores that filter in process
    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }

    fn sort_key(&self, field: Self::SortField) -> SortKey;

    /// Order inside a company's child collection
    fn position_key(&self) -> SortKey {
        SortKey::Int(self.id())
    }
}

/// Access to one table of the store
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn get(&self, id: i64) -> StoreResult<Option<T>>;

    /// Fetch several rows in one round trip. Missing ids are skipped.
    async fn get_many(&self, ids: &[i64]) -> StoreResult<Vec<T>>;

    /// Case-sensitive slug lookup
    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<T>>;

    /// Rows owned by a company, in collection order
    async fn for_company(&self, company_id: i64) -> StoreResult<Vec<T>>;

    async fn list(&self, filter: &T::Filter, sort: Sort<T::SortField>) -> StoreResult<Vec<T>>;

    async fn query(
        &self,
        filter: &T::Filter,
        sort: Sort<T::SortField>,
        window: &Window,
    ) -> StoreResult<Page<T>>;

    /// Insert a new row; the store assigns the id
    async fn insert(&self, record: T) -> StoreResult<T>;

    /// Put back a previously deleted row under its original id
    async fn restore(&self, record: T) -> StoreResult<T>;

    async fn update(&self, record: T) -> StoreResult<T>;

    /// Remove a row, returning it when it existed
    async fn delete(&self, id: i64) -> StoreResult<Option<T>>;

    /// Read round trips served so far
    fn lookups(&self) -> usize;
}

pub type Repo<T> = Arc<dyn Repository<T>>;

/// All repositories the directory reads and writes
#[derive(Clone)]
pub struct Store {
    pub companies: Repo<Company>,
    pub representatives: Repo<Representative>,
    pub certificates: Repo<Certificate>,
    pub certificate_types: Repo<CertificateType>,
    pub brochures: Repo<Brochure>,
    pub images: Repo<Image>,
    pub videos: Repo<Video>,
    pub social_responsibilities: Repo<SocialResponsibility>,
    pub contacts: Repo<Contact>,
    pub industries: Repo<Industry>,
    pub success_stories: Repo<SuccessStory>,
    pub trade_shows: Repo<TradeShow>,
    pub rosetters: Repo<Rosetter>,
    pub products: Repo<Product>,
    pub categories: Repo<Category>,
    pub users: Repo<User>,
    writer: Arc<Mutex<()>>,
}

impl Store {
    /// Store backed by process memory
    pub fn in_memory() -> Self {
        fn repo<T: Record>() -> Repo<T> {
            Arc::new(MemoryRepository::<T>::new())
        }

        Self {
            companies: repo(),
            representatives: repo(),
            certificates: repo(),
            certificate_types: repo(),
            brochures: repo(),
            images: repo(),
            videos: repo(),
            social_responsibilities: repo(),
            contacts: repo(),
            industries: repo(),
            success_stories: repo(),
            trade_shows: repo(),
            rosetters: repo(),
            products: repo(),
            categories: repo(),
            users: repo(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Open a write transaction. Writers are serialized until it settles.
    pub async fn begin(&self) -> Transaction {
        Transaction::new(self.writer.clone().lock_owned().await)
    }
}
