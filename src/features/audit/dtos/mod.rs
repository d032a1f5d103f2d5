pub mod audit_log_dto;

pub use audit_log_dto::{AuditLogQuery, AuditLogResponseDto};
