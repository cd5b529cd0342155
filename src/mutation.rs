//! Optimistic Mutations
//!
//! A cache that has already applied a provisional change, plus the persistence
//! call that decides its fate. Success commits the server's record; failure or
//! cancellation rolls the cache back.

use std::future::Future;
use std::marker::PhantomData;

/// A cache able to settle provisional changes to entities of type `E`
pub trait Reconcile<E>: Send + Sync {
    /// Token identifying one provisional change and the state before it
    type Snapshot: Send;

    /// Install the authoritative record. False if the change was already settled.
    fn commit(&self, snapshot: &Self::Snapshot, authoritative: E) -> bool;

    /// Undo the change. False if the change was already settled.
    fn rollback(&self, snapshot: &Self::Snapshot) -> bool;
}

/// One outstanding optimistic change. Dropping it unsettled rolls back.
pub struct OptimisticMutation<'a, E, C>
where
    C: Reconcile<E>,
{
    cache: &'a C,
    snapshot: Option<C::Snapshot>,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E, C> OptimisticMutation<'a, E, C>
where
    C: Reconcile<E>,
{
    /// Take ownership of a change the cache has already applied
    pub fn begin(cache: &'a C, snapshot: C::Snapshot) -> Self {
        Self {
            cache,
            snapshot: Some(snapshot),
            _entity: PhantomData,
        }
    }

    /// Await the persistence call and settle the change with its outcome
    pub async fn run<F, Err>(mut self, call: F) -> Result<E, Err>
    where
        F: Future<Output = Result<E, Err>>,
        E: Clone,
    {
        let outcome = call.await;
        if let Some(snapshot) = self.snapshot.take() {
            match &outcome {
                Ok(entity) => {
                    self.cache.commit(&snapshot, entity.clone());
                }
                Err(_) => {
                    self.cache.rollback(&snapshot);
                }
            }
        }
        outcome
    }
}

impl<E, C> Drop for OptimisticMutation<'_, E, C>
where
    C: Reconcile<E>,
{
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.cache.rollback(&snapshot);
        }
    }
}
