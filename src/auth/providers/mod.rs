//! Concrete token sources used by the default credential chain.

pub mod azure_cli;
pub mod environment;
pub mod managed_identity;
