pub mod audit;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod planner;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{OpsgateError, Result};
