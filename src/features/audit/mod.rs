//! Audit trail: writing entries, listing them, and bounding their growth.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/audit-logs` | Paginated audit trail |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;
pub mod workers;

pub use services::AuditLogger;
pub use stores::{AuditLogStore, PgAuditLogStore};
pub use workers::{AuditRetentionReport, AuditRetentionWorker};
