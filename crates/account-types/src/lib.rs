//! Common types for the chain account service.
//!
//! This crate holds the request and response shapes shared by the chain
//! adaptors, the dispatcher and the HTTP surface, together with a handful of
//! small utilities used across the workspace.

/// Request and response envelopes for every adaptor capability.
pub mod api;
/// Block selectors understood by the chain clients.
pub mod block;
/// Registry trait for self-registering chain adaptors.
pub mod registry;
/// Redacted string type for credentials.
pub mod secret_string;
/// Hex formatting helpers.
pub mod utils;

pub use api::*;
pub use block::BlockTag;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use utils::{is_zero_address, with_0x_prefix, without_0x_prefix};
