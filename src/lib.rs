//! `volley` is a library for load testing HTTP endpoints.
//! A [`Dispatcher`] sends a fixed number of GET requests to a target while
//! never having more than a configured number of them in flight, and reports
//! how many requests ended with each status code.
//!
//! Example:
//! ```no_run
//!
//! use volley::{ClientBuilder, Dispatcher, RunConfig};
//! use std::error::Error;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!   let config = RunConfig::new("http://localhost:8080", 100, 10)?
//!       .with_pacing(Duration::from_millis(100));
//!   let client = ClientBuilder::default().url(config.url()).build()?;
//!   let report = Dispatcher::new(config, client).run().await?;
//!   println!("{}", report);
//!   Ok(())
//! }
//! ```

#[macro_use]
extern crate log;

mod client;
mod config;
mod dispatcher;
mod error;
mod gate;
mod stats;
mod types;
mod waiter;

pub mod test_utils;

pub use client::{Checker, Client, ClientBuilder, USER_AGENT};
pub use config::RunConfig;
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, Result};
pub use gate::{AdmissionGate, Permit};
pub use stats::{Report, ResponseStats};
pub use types::{Response, Status, StatusClass};
pub use waiter::{WaitGroup, WaitGuard};
