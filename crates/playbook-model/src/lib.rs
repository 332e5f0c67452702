//! Playbook Entity Model
//!
//! Typed entity graph for certificate-lifecycle playbooks.
//!
//! # Core Concepts
//!
//! - [`PlaybookDocument`]: Root of the graph, owns every descendant entity
//! - [`ConnectionConfig`]: Platform and credentials block, set once per document
//! - [`CertificateTask`]: One named unit of work (request + installations)
//! - [`Request`], [`Subject`], [`Location`]: Issuance specification
//! - [`Installation`]: Deployment instructions for one file format
//!
//! Every optional field is an `Option` and is omitted from serialized output
//! when unset. Nothing is emitted as `null`.
//!
//! # Example
//!
//! ```rust
//! use playbook_model::{CertificateTask, PlaybookDocument};
//!
//! let mut document = PlaybookDocument::new();
//! document.certificate_tasks = Some(vec![CertificateTask::new("first")]);
//!
//! assert!(document.find_task("first").is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod connection;
mod document;
mod installation;
mod task;

pub use connection::{ConnectionConfig, Credentials, Platform, UnknownPlatform};
pub use document::{PlaybookConfig, PlaybookDocument};
pub use installation::{Installation, InstallationFormat};
pub use task::{CertificateTask, Location, Request, Subject};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
