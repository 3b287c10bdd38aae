//! Repository implementations for database operations

pub mod clubs;
pub mod matches;
pub mod players;
pub mod scores;

pub use clubs::*;
pub use matches::*;
pub use players::*;
pub use scores::*;
