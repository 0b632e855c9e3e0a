//! Membership table and its liveness sweeper.

mod sweeper;
mod table;

pub use table::{NodeInfo, Registry};
