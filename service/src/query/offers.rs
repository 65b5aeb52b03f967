//! [`Query`] collection related to the multiple [`Offer`]s.

use crate::{domain::Offer, read};
#[cfg(doc)]
use crate::Query;

use super::ListQuery;

/// Queries a list of [`Offer`]s, from the newest to the oldest.
pub type List = ListQuery<Offer, read::offer::list::Filter>;

#[cfg(test)]
mod spec {
    use std::cmp::Reverse;

    use common::Handler as _;

    use crate::{
        command::{CloseOffer, TakeOffer},
        domain::{offer, user},
        fixture,
        read::offer::list::Filter,
    };

    use super::List;

    #[tokio::test]
    async fn lists_newest_first() {
        let svc = fixture::service();
        let owner = user::Id::new();
        let mut created = Vec::new();
        for minutes in [15, 30, 45] {
            created.push(fixture::offer(&svc, owner, minutes).await);
        }
        created.sort_by_key(|o| Reverse((o.created_at, o.id)));

        let listed = svc
            .execute(List::new(Filter::default(), None))
            .await
            .unwrap();

        assert_eq!(
            listed.iter().map(|o| o.id).collect::<Vec<_>>(),
            created.iter().map(|o| o.id).collect::<Vec<_>>(),
        );
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn listing_is_repeatable() {
        let svc = fixture::service();
        for _ in 0..5 {
            _ = fixture::offer(&svc, user::Id::new(), 60).await;
        }
        let ids = |offers: Vec<offer::Offer>| {
            offers.into_iter().map(|o| o.id).collect::<Vec<_>>()
        };

        let first = svc.execute(List::new(Filter::default(), None)).await;
        let second = svc.execute(List::new(Filter::default(), None)).await;

        assert_eq!(ids(first.unwrap()), ids(second.unwrap()));
    }

    #[tokio::test]
    async fn filters_and_limits() {
        let svc = fixture::service();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let first = fixture::offer(&svc, alice, 30).await;
        let second = fixture::offer(&svc, alice, 60).await;
        let third = fixture::offer(&svc, bob, 90).await;
        _ = svc
            .execute(CloseOffer {
                offer_id: first.id,
                initiator_id: alice,
                reason: None,
            })
            .await
            .unwrap();
        _ = svc
            .execute(TakeOffer {
                offer_id: third.id,
                requester_id: alice,
            })
            .await
            .unwrap();

        let by_alice = svc
            .execute(List::new(
                Filter {
                    owner_id: Some(alice),
                    ..Filter::default()
                },
                None,
            ))
            .await
            .unwrap();
        assert_eq!(by_alice.len(), 2);
        assert!(by_alice.iter().all(|o| o.owner_id == alice));

        let open = svc
            .execute(List::new(
                Filter {
                    status: Some(offer::Status::Open),
                    ..Filter::default()
                },
                None,
            ))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, second.id);

        let gardening = svc
            .execute(List::new(
                Filter {
                    category: offer::Category::new("garden"),
                    ..Filter::default()
                },
                Some(1),
            ))
            .await
            .unwrap();
        assert_eq!(gardening.len(), 1);
        assert_eq!(gardening[0].id, third.id);
    }
}
