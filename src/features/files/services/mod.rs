mod file_lifecycle_service;
mod quota_service;

pub use file_lifecycle_service::FileLifecycleService;
pub use quota_service::QuotaService;
