//! In-memory [`Database`] implementation.
//!
//! Keeps the whole state behind a single [`Mutex`]. A [`Tx`] holds that
//! [`Mutex`] for its whole lifetime and works on a staged copy of the state,
//! so concurrent [`Tx`]s are serialized, and nothing of a [`Tx`] is visible
//! until it's [`Commit`]ted.

mod impls;

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use common::operations::{Commit, Transact};
use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{exchange, ledger, offer, user, Exchange, Offer, Report},
    infra::{database, Database},
};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a write operation fail with [`Error::InjectedFailure`] after
    /// the provided number of successful ones.
    ///
    /// Allows exercising rollbacks of partially applied [`Tx`]s.
    pub fn fail_write_after(&self, successful: usize) {
        self.0
            .failure
            .store(successful.saturating_add(1), Ordering::SeqCst);
    }
}

/// In-memory state of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// Stored [`Offer`]s.
    pub(crate) offers: HashMap<offer::Id, Offer>,

    /// Stored [`Exchange`]s.
    pub(crate) exchanges: HashMap<exchange::Id, Exchange>,

    /// Append-only list of [`ledger::Entry`]s, in their insertion order.
    pub(crate) ledger: Vec<ledger::Entry>,

    /// Filed [`Report`]s, in their insertion order.
    pub(crate) reports: Vec<Report>,
}

/// Access to a [`Store`].
pub trait Access {
    /// Reads the [`Store`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`Store`] cannot be accessed.
    fn read<R>(
        &self,
        f: impl FnOnce(&Store) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Modifies the [`Store`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`Store`] cannot be accessed, or a failure has been injected.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut Store) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

/// Countdown of write operations until an injected failure.
///
/// Zero means no failure is injected.
type FailureCountdown = Arc<AtomicUsize>;

/// Counts a write operation down the provided [`FailureCountdown`], failing
/// when it reaches the injected failure.
fn count_write(
    countdown: &FailureCountdown,
) -> Result<(), Traced<database::Error>> {
    let prev = countdown
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        })
        .unwrap_or(0);
    if prev == 1 {
        return Err(tracerr::new!(database::Error::from(
            Error::InjectedFailure
        )));
    }
    Ok(())
}

/// Non-transactional [`Memory`] database client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`Store`].
    store: Arc<Mutex<Store>>,

    /// [`FailureCountdown`] of write operations.
    failure: FailureCountdown,
}

impl Access for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Store) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.store.lock().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Store) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut store = self.store.lock().await;
        count_write(&self.failure).map_err(tracerr::wrap!())?;
        Ok(f(&mut store))
    }
}

/// Transactional [`Memory`] database client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Staged`] changes, or [`None`] once committed.
    staged: Arc<Mutex<Option<Staged>>>,

    /// [`FailureCountdown`] of write operations.
    failure: FailureCountdown,
}

/// Changes staged by a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Guard of the shared [`Store`], keeping other [`Tx`]s waiting.
    committed: OwnedMutexGuard<Store>,

    /// Copy of the [`Store`] the [`Tx`] works on.
    store: Store,
}

impl Tx {
    /// Starts a new [`Tx`] out of the provided [`NonTx`] client, waiting for
    /// any other [`Tx`] to finish.
    async fn begin(client: &NonTx) -> Self {
        let committed = Arc::clone(&client.store).lock_owned().await;
        let store = committed.clone();
        Self {
            staged: Arc::new(Mutex::new(Some(Staged { committed, store }))),
            failure: Arc::clone(&client.failure),
        }
    }

    /// Commits this [`Tx`], publishing its staged changes.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] has been committed already.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Staged {
            mut committed,
            store,
        } = self
            .staged
            .lock()
            .await
            .take()
            .ok_or_else(|| database::Error::from(Error::TxFinished))
            .map_err(tracerr::wrap!())?;
        *committed = store;
        Ok(())
    }
}

impl Access for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Store) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let staged = self.staged.lock().await;
        let staged = staged
            .as_ref()
            .ok_or_else(|| database::Error::from(Error::TxFinished))
            .map_err(tracerr::wrap!())?;
        Ok(f(&staged.store))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Store) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut staged = self.staged.lock().await;
        let staged = staged
            .as_mut()
            .ok_or_else(|| database::Error::from(Error::TxFinished))
            .map_err(tracerr::wrap!())?;
        count_write(&self.failure).map_err(tracerr::wrap!())?;
        Ok(f(&mut staged.store))
    }
}

impl<C: Access> Access for Memory<C> {
    fn read<R>(
        &self,
        f: impl FnOnce(&Store) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>> {
        self.0.read(f)
    }

    fn write<R>(
        &self,
        f: impl FnOnce(&mut Store) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>> {
        self.0.write(f)
    }
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Failure injected via [`Memory::fail_write_after()`].
    #[display("Injected write failure")]
    InjectedFailure,

    /// Operation on an already committed [`Tx`].
    #[display("`Tx` is already committed")]
    TxFinished,

    /// Balance of the user doesn't fit into [`Minutes`].
    ///
    /// [`Minutes`]: common::Minutes
    #[display("Balance of `User(id: {_0})` overflows")]
    BalanceOverflow(#[error(not(source))] user::Id),
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::begin(&self.0).await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().await.map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        Handler as _, Minutes,
    };

    use crate::domain::{offer, user, Offer};

    use super::Memory;

    fn offer() -> Offer {
        Offer {
            id: offer::Id::new(),
            owner_id: user::Id::new(),
            title: offer::Title::new("Bike repair").unwrap(),
            description: None,
            category: None,
            location_hint: None,
            duration: offer::Duration::new(Minutes::new(30)).unwrap(),
            status: offer::Status::Open,
            created_at: offer::CreationDateTime::now(),
        }
    }

    #[tokio::test]
    async fn tx_is_invisible_until_committed() {
        let db = Memory::new();
        let offer = offer();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(offer.clone())).await.unwrap();
        let seen = tx
            .execute(Select(By::<Option<Offer>, _>::new(offer.id)))
            .await
            .unwrap();
        assert!(seen.is_some());
        tx.execute(Commit).await.unwrap();
        drop(tx);

        let stored = db
            .execute(Select(By::<Option<Offer>, _>::new(offer.id)))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn dropped_tx_is_rolled_back() {
        let db = Memory::new();
        let offer = offer();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(offer.clone())).await.unwrap();
        drop(tx);

        let stored = db
            .execute(Select(By::<Option<Offer>, _>::new(offer.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn injects_single_write_failure() {
        let db = Memory::new();
        db.fail_write_after(1);

        assert!(db.execute(Insert(offer())).await.is_ok());
        assert!(db.execute(Insert(offer())).await.is_err());
        assert!(db.execute(Insert(offer())).await.is_ok());
    }

    #[tokio::test]
    async fn committed_tx_rejects_operations() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();

        assert!(tx.execute(Insert(offer())).await.is_err());
        assert!(tx.execute(Commit).await.is_err());
    }
}
