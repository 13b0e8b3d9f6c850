//! docsync - keep a hosted documentation project in sync with local files
//!
//! A project is split into versions, and each version holds documentation
//! categories with their docs, custom pages and custom content. The local
//! side is a [`registry::Registry`]: the desired state, built from a content
//! tree or saved by a previous run.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Resource types and the entries the sync phases pass around
//! - [`registry`] - Local desired state, its diff and its on-disk form
//! - [`sync`] - Download, upload and clean phases
//! - [`transport`] - HTTP client for the hosting API, with bounded batches
//! - [`extract`] - Writes a downloaded project out to files
//! - [`markup`] - Front matter and code-block conversion
//! - [`config`] - Config file and resolved settings
//! - [`auth`] - Credentials from the environment
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod markup;
pub mod model;
pub mod progress;
pub mod registry;
pub mod sync;
pub mod transport;

pub use error::{Error, Result};
