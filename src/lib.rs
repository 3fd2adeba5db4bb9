//! Tri-state deferred results for reactive bindings.
//!
//! `deferred` gives a binding layer a disciplined way to represent and consume
//! the result of an asynchronous computation: a value that may not exist yet,
//! may have failed, or may be ready.
//!
//! The crate works independently of any specific async runtime. Producer runs are
//! spawned on any [`futures::task::Spawn`] implementor.
//!
//! Features include:
//! - [`Deferred`], the tri-state value, and its pure transition function driven
//!   by [`Action`]s
//! - [`all`] and the [`All`] trait for joining several states with
//!   reject > pending > resolved precedence
//! - [`DeferCell`], an observable owner of one state that can be driven by hand
//! - [`Controller`], which runs a [`Producer`], applies only the outcome of its
//!   latest run, and supports soft and hard reloads
//! - [`Gate`], a render boundary that branches on a state and publishes the
//!   resolved value to its descendants through a [`Scope`]
//!
//! Failures of any kind are carried as [`Error`] inside [`Deferred::Rejected`];
//! nothing is re-thrown to callers.

pub mod cell;
pub mod combinator;
pub mod controller;
pub mod error;
pub mod gate;
pub mod producer;
pub mod state;

pub use cell::{Changes, DeferCell};
pub use combinator::{All, all};
pub use controller::{Builder, Controller, ReloadHandle};
pub use error::Error;
pub use gate::{Gate, GateOptions, Scope};
pub use producer::Producer;
pub use state::{Action, Deferred, Update};
