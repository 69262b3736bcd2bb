//! Write transactions over the store
//!
//! A transaction holds the store's writer lock, so validation, writes and
//! cascades of one mutation never interleave with another. Every write goes
//! through the transaction and leaves an undo step behind; settling with an
//! error replays them newest first. A transaction dropped before it settles
//! (the request was cancelled) is rolled back on a spawned task that keeps
//! the writer lock until the undo chain has run.

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::OwnedMutexGuard;

use super::{Record, Repo, StoreResult};

type Undo = Box<dyn FnOnce() -> BoxFuture<'static, StoreResult<()>> + Send>;

async fn unwind(mut undo: Vec<Undo>) {
    let steps = undo.len();
    while let Some(step) = undo.pop() {
        if let Err(e) = step().await {
            tracing::error!(error = %e, "undo step failed during rollback");
        }
    }
    tracing::debug!(steps, "transaction rolled back");
}

pub struct Transaction {
    writer: Option<OwnedMutexGuard<()>>,
    undo: Vec<Undo>,
}

impl Transaction {
    pub(super) fn new(writer: OwnedMutexGuard<()>) -> Self {
        Self { writer: Some(writer), undo: Vec::new() }
    }

    pub async fn insert<T: Record>(&mut self, repo: &Repo<T>, record: T) -> StoreResult<T> {
        let inserted = repo.insert(record).await?;
        let (repo, id) = (repo.clone(), inserted.id());
        self.undo.push(Box::new(move || {
            async move { repo.delete(id).await.map(|_| ()) }.boxed()
        }));
        Ok(inserted)
    }

    pub async fn update<T: Record>(&mut self, repo: &Repo<T>, record: T) -> StoreResult<T> {
        let previous = repo.get(record.id()).await?;
        let updated = repo.update(record).await?;
        if let Some(previous) = previous {
            let repo = repo.clone();
            self.undo.push(Box::new(move || {
                async move { repo.update(previous).await.map(|_| ()) }.boxed()
            }));
        }
        Ok(updated)
    }

    pub async fn delete<T: Record>(&mut self, repo: &Repo<T>, id: i64) -> StoreResult<Option<T>> {
        let removed = repo.delete(id).await?;
        if let Some(row) = removed.clone() {
            let repo = repo.clone();
            self.undo.push(Box::new(move || {
                async move { repo.restore(row).await.map(|_| ()) }.boxed()
            }));
        }
        Ok(removed)
    }

    /// Delete every row a company owns in one table
    pub async fn delete_owned<T: Record>(&mut self, repo: &Repo<T>, company_id: i64) -> StoreResult<usize> {
        let owned = repo.for_company(company_id).await?;
        for row in &owned {
            self.delete(repo, row.id()).await?;
        }
        Ok(owned.len())
    }

    /// Commit on `Ok`, roll back on `Err`, and hand the outcome through
    pub async fn settle<R, E>(self, outcome: Result<R, E>) -> Result<R, E> {
        if outcome.is_err() {
            self.rollback().await;
        } else {
            self.commit();
        }
        outcome
    }

    pub fn commit(mut self) {
        self.undo.clear();
    }

    pub async fn rollback(mut self) {
        unwind(std::mem::take(&mut self.undo)).await;
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.undo.is_empty() {
            return;
        }
        let undo = std::mem::take(&mut self.undo);
        let writer = self.writer.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(steps = undo.len(), "transaction dropped before settling, rolling back");
                handle.spawn(async move {
                    unwind(undo).await;
                    drop(writer);
                });
            }
            Err(_) => {
                tracing::error!(steps = undo.len(), "transaction dropped outside a runtime, writes kept");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::store::{Certificate, Company, Store};
    use chrono::Utc;
    use tokio_test::{assert_err, assert_ok};

    fn certificate(company_id: i64, name: &str) -> Certificate {
        Certificate {
            id: 0,
            company_id,
            name: name.into(),
            description: None,
            sort_order: 0,
            certificate: None,
            type_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_rollback_undoes_every_write() {
        let store = Store::in_memory();
        let company = assert_ok!(store.companies.insert(Company::draft("Acme", "acme", Some(1))).await);
        let kept = assert_ok!(store.certificates.insert(certificate(company.id, "ISO 9001")).await);

        let mut tx = store.begin().await;
        let mut renamed = company.clone();
        renamed.name = "Renamed".into();
        assert_ok!(tx.update(&store.companies, renamed).await);
        assert_ok!(tx.delete_owned(&store.certificates, company.id).await);
        let added = assert_ok!(tx.insert(&store.certificates, certificate(company.id, "Halal")).await);

        let outcome: Result<(), &str> = tx.settle(Err("validation failed")).await;
        assert_err!(outcome);

        assert_eq!(store.companies.get(company.id).await.unwrap().unwrap().name, "Acme");
        assert_eq!(store.certificates.get(kept.id).await.unwrap(), Some(kept));
        assert_eq!(store.certificates.get(added.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = Store::in_memory();
        let company = assert_ok!(store.companies.insert(Company::draft("Acme", "acme", Some(1))).await);
        let kept = assert_ok!(store.certificates.insert(certificate(company.id, "ISO 9001")).await);

        let mut tx = store.begin().await;
        assert_ok!(tx.delete_owned(&store.certificates, company.id).await);
        assert_ok!(tx.delete(&store.companies, company.id).await);
        drop(tx);

        // the next writer waits for the undo chain
        let next = store.begin().await;
        assert!(store.companies.get(company.id).await.unwrap().is_some());
        assert_eq!(store.certificates.get(kept.id).await.unwrap(), Some(kept));
        next.commit();
    }

    #[tokio::test]
    async fn test_settle_ok_keeps_writes() {
        let store = Store::in_memory();
        let mut tx = store.begin().await;
        let company = assert_ok!(tx.insert(&store.companies, Company::draft("Acme", "acme", None)).await);
        let outcome: Result<i64, ()> = tx.settle(Ok(company.id)).await;
        assert_eq!(outcome, Ok(company.id));
        assert!(store.companies.get(company.id).await.unwrap().is_some());
    }
}
