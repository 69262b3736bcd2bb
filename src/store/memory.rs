//! In-memory repositories
//!
//! One `MemoryRepository<T>` per table. Rows live in a `BTreeMap` keyed by id
//! behind a `tokio::sync::RwLock`; ids are handed out from a monotonic counter
//! so insertion order equals id order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Record, Repository, Sort, StoreError, StoreResult};
use crate::pagination::{self, Page, Window};

pub struct MemoryRepository<T: Record> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
    lookups: AtomicUsize,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            lookups: AtomicUsize::new(0),
        }
    }

    fn touch(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    fn check_unique(rows: &BTreeMap<i64, T>, record: &T) -> StoreResult<()> {
        if let Some(slug) = record.slug() {
            let taken = rows.values().any(|row| row.id() != record.id() && row.slug() == Some(slug));
            if taken {
                return Err(StoreError::UniqueViolation { entity: T::TYPE_NAME, field: "slug" });
            }
        }
        Ok(())
    }

    fn sorted(&self, rows: &BTreeMap<i64, T>, filter: &T::Filter, sort: Sort<T::SortField>) -> Vec<T> {
        let keyed = rows
            .values()
            .filter(|row| row.matches(filter))
            .map(|row| (row.sort_key(sort.field), row.id(), row.clone()))
            .collect();
        pagination::slice(keyed, sort.direction, &Window::unbounded(&sort.tag()))
            .items
            .into_iter()
            .map(|(_, row)| row)
            .collect()
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn get(&self, id: i64) -> StoreResult<Option<T>> {
        self.touch();
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[i64]) -> StoreResult<Vec<T>> {
        self.touch();
        let rows = self.rows.read().await;
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| rows.get(id).cloned())
            .collect())
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<T>> {
        self.touch();
        let rows = self.rows.read().await;
        Ok(rows.values().find(|row| row.slug() == Some(slug)).cloned())
    }

    async fn for_company(&self, company_id: i64) -> StoreResult<Vec<T>> {
        self.touch();
        let rows = self.rows.read().await;
        let mut owned: Vec<T> = rows
            .values()
            .filter(|row| row.company_id() == Some(company_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| (a.position_key(), a.id()).cmp(&(b.position_key(), b.id())));
        Ok(owned)
    }

    async fn list(&self, filter: &T::Filter, sort: Sort<T::SortField>) -> StoreResult<Vec<T>> {
        self.touch();
        let rows = self.rows.read().await;
        Ok(self.sorted(&rows, filter, sort))
    }

    async fn query(
        &self,
        filter: &T::Filter,
        sort: Sort<T::SortField>,
        window: &Window,
    ) -> StoreResult<Page<T>> {
        self.touch();
        let rows = self.rows.read().await;
        let keyed = rows
            .values()
            .filter(|row| row.matches(filter))
            .map(|row| (row.sort_key(sort.field), row.id(), row.clone()))
            .collect();
        Ok(pagination::slice(keyed, sort.direction, window))
    }

    async fn insert(&self, mut record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().await;
        record.assign_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        Self::check_unique(&rows, &record)?;
        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn restore(&self, record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, &record)?;
        self.next_id.fetch_max(record.id() + 1, Ordering::SeqCst);
        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn update(&self, record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&record.id()) {
            return Err(StoreError::NotFound { entity: T::TYPE_NAME, id: record.id() });
        }
        Self::check_unique(&rows, &record)?;
        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: i64) -> StoreResult<Option<T>> {
        Ok(self.rows.write().await.remove(&id))
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Company, CompanyQuery, CompanySortField, SortDirection};

    fn company(name: &str) -> Company {
        Company::draft(name, name.to_lowercase(), Some(1))
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = MemoryRepository::<Company>::new();
        let a = repo.insert(company("Acme")).await.unwrap();
        let b = repo.insert(company("Beta")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(repo.get(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let repo = MemoryRepository::<Company>::new();
        repo.insert(company("Acme")).await.unwrap();
        let err = repo.insert(company("Acme")).await.unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation { entity: "Company", field: "slug" });
    }

    #[tokio::test]
    async fn test_get_many_skips_missing_and_counts_one_lookup() {
        let repo = MemoryRepository::<Company>::new();
        let a = repo.insert(company("Acme")).await.unwrap();
        let found = repo.get_many(&[a.id, 999, a.id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(repo.lookups(), 1);
    }

    #[tokio::test]
    async fn test_slug_lookup_is_case_sensitive() {
        let repo = MemoryRepository::<Company>::new();
        repo.insert(company("Acme")).await.unwrap();
        assert!(repo.get_by_slug("acme").await.unwrap().is_some());
        assert!(repo.get_by_slug("ACME").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_keeps_original_id() {
        let repo = MemoryRepository::<Company>::new();
        let a = repo.insert(company("Acme")).await.unwrap();
        let removed = repo.delete(a.id).await.unwrap().unwrap();
        repo.restore(removed).await.unwrap();
        assert_eq!(repo.get(a.id).await.unwrap().map(|c| c.slug), Some("acme".to_string()));
        let next = repo.insert(company("Next")).await.unwrap();
        assert!(next.id > a.id);
    }

    #[tokio::test]
    async fn test_list_sorts_descending() {
        let repo = MemoryRepository::<Company>::new();
        for name in ["Beta", "Acme", "Gamma"] {
            repo.insert(company(name)).await.unwrap();
        }
        let sort = Sort::new(CompanySortField::Name, SortDirection::Desc);
        let names: Vec<_> = repo
            .list(&CompanyQuery::default(), sort)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Gamma", "Beta", "Acme"]);
    }
}
