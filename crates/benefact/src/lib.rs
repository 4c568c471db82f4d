//! Core library for the membership benefits administration platform.
//!
//! Members apply for catalog benefits ("offerings") and file change requests
//! against their own household records; staff review both kinds of submission
//! and either apply or refuse them. The workflow engines live under
//! [`workflows::benefits`]; persistence is reached only through repository
//! traits so the library can be exercised against in-memory fakes or a
//! durable gateway.

pub mod config;
pub mod error;
pub mod sync;
pub mod telemetry;
pub mod workflows;
