//! # Cardboard Remote
//!
//! The boundary between the board engine and its persistence collaborator.
//! Everything past [`RemoteGateway`] is asynchronous, independently fallible,
//! and free to complete out of order; the engine never assumes otherwise.
//!
//! - [`RemoteGateway`] - the abstract mutation/query contract
//! - [`RemoteError`] - the failure taxonomy the engine maps onto rollbacks
//! - [`RetryingGateway`] - bounded-retry wrapper for transient failures
//! - [`InMemoryGateway`] - deterministic fake with call log and fault
//!   injection, used by the engine's tests

mod error;
mod gateway;
mod memory;
mod retry;

pub use error::{RemoteError, Result};
pub use gateway::RemoteGateway;
pub use memory::{GatewayCall, InMemoryGateway};
pub use retry::{RetryPolicy, RetryingGateway};
