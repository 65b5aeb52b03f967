//! [`Query`] collection related to the multiple [`Exchange`]s.

use crate::{domain::Exchange, read};
#[cfg(doc)]
use crate::Query;

use super::ListQuery;

/// Queries a list of [`Exchange`]s of a participant, from the newest to the
/// oldest.
pub type List = ListQuery<Exchange, read::exchange::list::Filter>;

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        domain::{exchange, user},
        fixture::{self, Parties},
        read::exchange::list::Filter,
    };

    use super::List;

    #[tokio::test]
    async fn lists_exchanges_of_participant() {
        let svc = fixture::service();
        let parties = Parties::new();
        let pending = fixture::pending(&svc, parties, 30).await;
        let accepted = fixture::accepted(&svc, parties, 60).await;
        _ = fixture::pending(&svc, Parties::new(), 90).await;

        for participant_id in [parties.requester, parties.provider] {
            let listed = svc
                .execute(List::new(
                    Filter {
                        participant_id,
                        status: None,
                    },
                    None,
                ))
                .await
                .unwrap();
            let ids = listed.iter().map(|e| e.id).collect::<Vec<_>>();
            assert_eq!(ids, [accepted.id, pending.id]);
        }

        let only_pending = svc
            .execute(List::new(
                Filter {
                    participant_id: parties.provider,
                    status: Some(exchange::Status::Pending),
                },
                None,
            ))
            .await
            .unwrap();
        assert_eq!(only_pending.len(), 1);
        assert_eq!(only_pending[0].id, pending.id);

        let stranger = svc
            .execute(List::new(
                Filter {
                    participant_id: user::Id::new(),
                    status: None,
                },
                None,
            ))
            .await
            .unwrap();
        assert!(stranger.is_empty());
    }
}
