pub mod audit;
pub mod file_requests;
pub mod files;
pub mod maintenance;
