//! Upload requests: links that let anyone send files to a user.
//!
//! Expired requests stay resolvable for a grace period so the upload page can
//! explain why the link no longer works; the reaper removes them afterwards.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;
pub mod workers;

pub use services::FileRequestService;
pub use stores::{FileRequestStore, PgFileRequestStore};
pub use workers::RequestReaper;
