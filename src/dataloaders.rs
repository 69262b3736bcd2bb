//! DataLoader utilities for batch loading
//!
//! Back-references and catalog lookups (`Certificate.company`,
//! `Company.industry`, `Contact.seller`, ...) go through these loaders so a
//! query touching N children issues one store lookup per tick instead of N.
//! See: https://github.com/graphql/dataloader
//!
//! A [`Loaders`] set is created per request by [`crate::auth::scoped_request`]
//! and dropped with it.

use std::collections::HashMap;

use async_graphql::dataloader::{DataLoader, HashMapCache, Loader};

use crate::store::{
    Category, CertificateType, Company, Industry, Record, Repo, Store, StoreError, User,
};

/// Batch lookup of rows by primary key
///
/// Keys without a row are simply absent from the result, so `load_one`
/// resolves them to `None` rather than failing.
pub struct ById<T: Record> {
    repo: Repo<T>,
}

impl<T: Record> ById<T> {
    pub fn new(repo: Repo<T>) -> Self {
        Self { repo }
    }
}

impl<T: Record> Loader<i64> for ById<T> {
    type Value = T;
    type Error = StoreError;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, T>, StoreError> {
        tracing::trace!(entity = T::TYPE_NAME, keys = keys.len(), "batched lookup");
        let rows = self.repo.get_many(keys).await?;
        Ok(rows.into_iter().map(|row| (row.id(), row)).collect())
    }
}

pub type CompanyById = ById<Company>;
pub type IndustryById = ById<Industry>;
pub type UserById = ById<User>;
pub type CertificateTypeById = ById<CertificateType>;
pub type CategoryById = ById<Category>;

type Cached<L> = DataLoader<L, HashMapCache>;

/// Request-scoped loaders, one per foreign-key target
pub struct Loaders {
    pub companies: Cached<CompanyById>,
    pub industries: Cached<IndustryById>,
    pub users: Cached<UserById>,
    pub certificate_types: Cached<CertificateTypeById>,
    pub categories: Cached<CategoryById>,
}

impl Loaders {
    pub fn new(store: &Store) -> Self {
        fn cached<T: Record>(repo: &Repo<T>) -> Cached<ById<T>> {
            DataLoader::with_cache(ById::new(repo.clone()), tokio::spawn, HashMapCache::default())
        }

        Self {
            companies: cached(&store.companies),
            industries: cached(&store.industries),
            users: cached(&store.users),
            certificate_types: cached(&store.certificate_types),
            categories: cached(&store.categories),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(n: usize) -> (Store, Vec<i64>) {
        let store = Store::in_memory();
        let mut ids = Vec::new();
        for i in 0..n {
            let company = Company::draft(format!("Company {}", i), format!("company-{}", i), None);
            ids.push(store.companies.insert(company).await.unwrap().id);
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_lookup() {
        let (store, ids) = seeded(3).await;
        let loaders = Loaders::new(&store);

        let (a, b, c) = tokio::join!(
            loaders.companies.load_one(ids[0]),
            loaders.companies.load_one(ids[1]),
            loaders.companies.load_one(ids[2]),
        );

        assert_eq!(a.unwrap().map(|c| c.slug), Some("company-0".to_string()));
        assert!(b.unwrap().is_some());
        assert!(c.unwrap().is_some());
        assert_eq!(store.companies.lookups(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (store, _) = seeded(1).await;
        let loaders = Loaders::new(&store);
        assert_eq!(loaders.companies.load_one(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_serves_repeated_keys() {
        let (store, ids) = seeded(1).await;
        let loaders = Loaders::new(&store);

        loaders.companies.load_one(ids[0]).await.unwrap();
        loaders.companies.load_one(ids[0]).await.unwrap();
        assert_eq!(store.companies.lookups(), 1);
    }

    #[tokio::test]
    async fn test_fresh_loaders_do_not_share_cache() {
        let (store, ids) = seeded(1).await;

        Loaders::new(&store).companies.load_one(ids[0]).await.unwrap();
        Loaders::new(&store).companies.load_one(ids[0]).await.unwrap();
        assert_eq!(store.companies.lookups(), 2);
    }
}
