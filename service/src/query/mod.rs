//! [`Query`] definition.

pub mod exchange;
pub mod exchanges;
pub mod ledger;
pub mod offer;
pub mod offers;
pub mod reports;

use std::marker::PhantomData;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    read, Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] listing `T`s passing the `F`ilter, from the newest to the
/// oldest.
///
/// Requested limit is resolved with the [`ListConfig`] of the [`Service`].
///
/// [`ListConfig`]: crate::ListConfig
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct ListQuery<T, F> {
    /// Filter of the listed `T`s.
    filter: F,

    /// Requested maximum number of the listed `T`s, if any.
    limit: Option<usize>,

    /// Type of the listed items.
    _item: PhantomData<fn() -> T>,
}

impl<T, F> ListQuery<T, F> {
    /// Creates a new [`ListQuery`] out of the provided `filter` and `limit`.
    #[must_use]
    pub fn new(filter: F, limit: Option<usize>) -> Self {
        Self {
            filter,
            limit,
            _item: PhantomData,
        }
    }
}

impl<Db, T, F> Query<ListQuery<T, F>> for Service<Db>
where
    Db: Database<
        Select<By<Vec<T>, read::Selector<F>>>,
        Ok = Vec<T>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<T>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: ListQuery<T, F>,
    ) -> Result<Self::Ok, Self::Err> {
        let ListQuery { filter, limit, .. } = query;
        let selector = read::Selector {
            filter,
            limit: self.config().list.limit(limit),
        };
        self.database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::wrap!())
    }
}
