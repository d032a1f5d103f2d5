mod file_retention_worker;

pub use file_retention_worker::{
    ExpirePassReport, FileRetentionReport, FileRetentionWorker, PurgePassReport,
};
