pub mod maintenance_handler;

pub use maintenance_handler::{
    __path_run_audit_maintenance, __path_run_file_maintenance, run_audit_maintenance,
    run_file_maintenance, MaintenanceState,
};
