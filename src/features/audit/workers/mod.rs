mod audit_retention_worker;

pub use audit_retention_worker::{AuditRetentionReport, AuditRetentionWorker};
