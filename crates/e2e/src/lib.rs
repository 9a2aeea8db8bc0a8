//! Keystone admin UI end-to-end harness
//!
//! Starts the pieces an admin UI test run needs and tears them down again:
//!
//! ```text
//! kne / start_e2e
//!   ├── config     args + env + kne.toml -> ResolvedRun
//!   ├── selenium   optional standalone server, ready on its stderr line
//!   ├── tunnel     Sauce Connect for device-grid environments
//!   ├── nightwatch generated runner config + CLI invocation
//!   └── cleanup    server killed, tunnel closed, first error returned
//! ```
//!
//! Tests drive the admin UI through [`pages`] (screens) and [`fields`]
//! (form widgets) over the [`browser::Browser`] seam.

pub mod browser;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod nightwatch;
pub mod pages;
pub mod runner;
pub mod selenium;
pub mod tunnel;
pub mod utils;

pub use config::{EnvSnapshot, InvocationArgs, KeystoneTarget, KneConfig, ResolvedRun};
pub use error::{E2eError, E2eResult};
pub use runner::{start_e2e, start_e2e_with_callback, E2eRun, RunStage, StartOptions};
