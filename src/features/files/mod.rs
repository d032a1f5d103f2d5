//! Stored files and their lifecycle: active, expired, trashed, erased.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/trash` | List trashed files |
//! | POST | `/api/admin/trash/{id}/restore` | Restore a trashed file |
//! | DELETE | `/api/admin/trash/{id}` | Permanently delete a trashed file |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;
pub mod workers;

pub use services::{FileLifecycleService, QuotaService};
pub use stores::{FileLifecycleStore, PgFileLifecycleStore};
pub use workers::FileRetentionWorker;
