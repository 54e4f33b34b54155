//! Administrator gateway.
//!
//! The privileged operation surface: withdrawal approval, room creation,
//! and coin grants. Authorization is enforced here against the identity
//! provider's role flag, never left to the embedding UI.

pub mod errors;
pub mod gateway;

pub use errors::{AdminError, AdminResult};
pub use gateway::AdminGateway;
