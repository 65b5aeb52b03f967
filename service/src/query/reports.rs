//! [`Query`] collection related to the multiple [`Report`]s.

use crate::{domain::Report, read};
#[cfg(doc)]
use crate::Query;

use super::ListQuery;

/// Queries a list of [`Report`]s filed by a user, from the newest to the
/// oldest.
pub type List = ListQuery<Report, read::report::list::Filter>;

#[cfg(test)]
mod spec {
    use std::{cmp::Reverse, time::Duration};

    use common::Handler as _;

    use crate::{
        command::CreateReport,
        domain::{user, Report},
        fixture,
        infra::Memory,
        read::report::list::Filter,
        Service,
    };

    use super::List;

    async fn file(
        svc: &Service<Memory>,
        reporter: user::Id,
        reason: &str,
    ) -> Report {
        tokio::time::sleep(Duration::from_millis(2)).await;
        svc.execute(CreateReport {
            reporter_id: Some(reporter),
            target_user_id: user::Id::new(),
            offer_id: None,
            exchange_id: None,
            reason: reason.into(),
            note: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn lists_own_reports_newest_first() {
        let svc = fixture::service();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let mut filed = Vec::new();
        for reason in ["Spam", "Rude", "Late"] {
            filed.push(file(&svc, alice, reason).await);
        }
        _ = file(&svc, bob, "Spam").await;
        filed.sort_by_key(|r| Reverse((r.created_at, r.id)));

        let listed = svc
            .execute(List::new(Filter { reporter_id: alice }, None))
            .await
            .unwrap();

        assert_eq!(
            listed.iter().map(|r| r.id).collect::<Vec<_>>(),
            filed.iter().map(|r| r.id).collect::<Vec<_>>(),
        );
    }

    #[tokio::test]
    async fn limits_reports() {
        let svc = fixture::service();
        let alice = user::Id::new();
        for _ in 0..3 {
            _ = file(&svc, alice, "Spam").await;
        }

        let listed = svc
            .execute(List::new(Filter { reporter_id: alice }, Some(2)))
            .await
            .unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
