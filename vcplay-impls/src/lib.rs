//! Concrete adapters for the collaborators vcplay talks to over the network.

mod bridge;
mod telegram;

pub use bridge::*;
pub use telegram::*;
