//! Wire types of the agents data plane.

pub mod agent;
pub mod common;
pub mod message;
pub mod run;
pub mod thread;

pub use agent::*;
pub use common::*;
pub use message::*;
pub use run::*;
pub use thread::*;
