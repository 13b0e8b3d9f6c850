//! Diff-driven synchronization with the remote host.
//!
//! - **Downloader**: remote snapshot, fetched once per command
//! - **Uploader**: create-or-update every local resource, then ordering
//! - **Cleaner**: delete remote resources the local registry dropped
//!
//! # Architecture
//!
//! All three share one [`Downloader`], so an `upload` followed by a clean
//! in the same command downloads the remote project once:
//!
//! 1. The local registry is diffed against the snapshot
//! 2. The diff decides POST (create) versus PUT (update) per resource
//! 3. Requests run with bounded concurrency; results keep input order
//! 4. Server responses are patched back onto the local registry
//!
//! Per-resource failures never abort a phase. They come back marked on
//! the entries of a [`Batch`].
//!
//! # Example
//!
//! ```ignore
//! use docsync::sync::{Downloader, Uploader};
//!
//! let downloader = Downloader::new(&transport, &settings);
//! let uploader = Uploader::new(&transport, &downloader, &settings);
//! let summary = uploader.upload_all(&mut registry).await?;
//! registry.save(&settings.registry_path)?;
//! ```

mod cleaner;
mod downloader;
mod types;
mod uploader;

pub use cleaner::Cleaner;
pub use downloader::Downloader;
pub use types::{Batch, CleanReport, DeleteOutcome, OrderOutcome, UploadPlan, UploadSummary};
pub use uploader::Uploader;
