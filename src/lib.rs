pub mod args;
pub mod config;
pub mod dispatcher;
pub mod expression;
pub mod link;
pub mod logging;
pub mod protocol;
pub mod retry;
pub mod surface;
pub mod theme;

// Re-export the driving API at crate root for convenience
pub use config::{Config, Endpoint};
pub use dispatcher::Dispatcher;
pub use link::{ConnectionManager, ConnectionState, LinkError, LinkEvent, LinkHandle};
pub use protocol::{DecodedEvent, Intent, OutboundMessage, ProtocolError, decode, encode};
