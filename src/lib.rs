// ABOUTME: Root module for foreman - agent execution coordination library.
// ABOUTME: Re-exports all public types from submodules.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod health;
pub mod metrics;
pub mod pipeline;
pub mod prelude;
pub mod retry;
pub mod validate;
pub mod worker;

pub use error::CoordinatorError;
