//! Opportunistic neighbor forwarding
//!
//! Events from the rest of the daemon are turned into tasks by the
//! [`EventTranslator`]. A single [`ForwardingDispatcher`] consumes them,
//! selecting up to a bounded number of stored bundles per neighbor and
//! handing them to the transport.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod filter;
pub mod service;
pub mod translator;

pub use config::{ForwardingConfig, DEFAULT_MAX_CANDIDATES, DEFAULT_MAX_IN_TRANSIT};
pub use dispatcher::{ForwardingDispatcher, SearchStop, SearchSummary, TaskOutcome};
pub use error::{ConfigError, RoutingError, RoutingResult};
pub use events::{AbortReason, RoutingEvent};
pub use filter::NeighborBundleFilter;
pub use service::NeighborRouting;
pub use translator::EventTranslator;
