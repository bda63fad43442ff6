//! Everything Slack-specific: where messages go, what they look like on the
//! wire, and how they get there.
//!
//! See [render::render] and [api::SlackClient::send].

pub mod api;
pub mod auth;
pub mod channel;
pub mod destination;
pub mod error;
pub mod message;
pub mod render;

pub use destination::{Destination, DestinationKind, Destinations};
pub use error::SlackError;
pub use message::{Icon, Presentation};
pub use render::{MessageFormatter, Renderer};
