mod commands;
mod dto;
pub mod handlers;
mod messenger;
mod replies;
mod router;

pub use messenger::{LineMessenger, Messenger, OutboundMessage};
pub use replies::BROADCAST_HEADER;
