//! Ports layer: Trait definitions for external collaborators.
//!
//! The persistence gateway and the session store are implemented in
//! `adapters`; application services only see these traits.

mod gateway;
mod session;

pub use gateway::{PersistenceGateway, SaveOutcome};
pub use session::{SessionError, SessionStore};
