//! Client-side orchestration over a Piston-style code execution service.
//!
//! The engine never sandboxes anything itself. It resolves languages against
//! the service's runtime directory, submits one execution per test case and
//! judges the returned output.

pub mod cache;
pub mod client;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod language;
pub mod runner;
pub mod service;

#[cfg(test)]
mod testing;

pub use cache::{Clock, RuntimeCache, SystemClock};
pub use client::{ExecutionBackend, PistonClient, RuntimeDescriptor, RuntimeSource};
pub use error::{ClientError, ExecuteError};
pub use executor::{CodeExecutor, Executor};
pub use runner::TestRunner;
pub use service::ExecutionService;
