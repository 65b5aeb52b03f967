//! [`Command`] definition.

pub mod accept_exchange;
pub mod authorize_user_session;
pub mod cancel_exchange;
pub mod close_offer;
pub mod complete_exchange;
pub mod create_offer;
pub mod create_report;
pub mod mark_no_show;
pub mod take_offer;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_exchange::AcceptExchange,
    authorize_user_session::AuthorizeUserSession,
    cancel_exchange::CancelExchange, close_offer::CloseOffer,
    complete_exchange::CompleteExchange, create_offer::CreateOffer,
    create_report::CreateReport, mark_no_show::MarkNoShow,
    take_offer::TakeOffer,
};
