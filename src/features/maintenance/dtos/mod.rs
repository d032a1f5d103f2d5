pub mod maintenance_dto;

pub use maintenance_dto::{AuditMaintenanceRunDto, FileMaintenanceRunDto};
