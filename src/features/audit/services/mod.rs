mod audit_logger;

pub use audit_logger::AuditLogger;
