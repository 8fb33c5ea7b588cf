//! `multisect`: locate the minimal set of commits at which a deterministic
//! command's observable output changes, across a linear commit range.
//!
//! The crate is organized around a small pipeline: a [`vcs`] port resolves
//! two endpoint identifiers into an ordered [`types::CommitRange`]; a
//! [`runner`] port executes one probe per visited commit; a [`cache`]
//! memoizes those probes at most once per position; a [`validator`] decides
//! whether a target's sparse digest sequence is already fully resolved; and
//! [`driver`] ties all four together into the bisection search described by
//! the design. [`session`] is the façade most callers should use; the CLI
//! binary is a thin shell around it.

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod report;
pub mod runner;
pub mod session;
pub mod types;
pub mod validator;
pub mod vcs;

pub use driver::MultisectionDriver;
pub use error::{ConfigurationError, Error, Result};
pub use report::SessionReport;
pub use session::{Session, SessionParams};
