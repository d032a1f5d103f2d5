//! Retention schedulers and the operator endpoints that trigger them on demand.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/admin/maintenance/files/run` | Expire, purge and reap now |
//! | POST | `/api/admin/maintenance/audit/run` | Apply audit retention now |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod scheduler;

pub use handlers::MaintenanceState;
pub use scheduler::{spawn_all, RetentionJobs};
