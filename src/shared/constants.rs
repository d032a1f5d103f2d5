use std::time::Duration;

/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// RETENTION DEFAULTS
// =============================================================================

/// Days a trashed file is kept before permanent deletion
pub const DEFAULT_TRASH_RETENTION_DAYS: i64 = 5;

/// Days an audit entry is kept before age eviction
pub const DEFAULT_AUDIT_LOG_RETENTION_DAYS: i64 = 90;

/// Audit log size ceiling in megabytes
pub const DEFAULT_AUDIT_LOG_MAX_SIZE_MB: i64 = 100;

/// Upper bound for any retention window, roughly a century
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Audit retention runs once a day
pub const AUDIT_SCAN_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Expired upload requests stay visible this long before they are deleted
pub const FILE_REQUEST_GRACE_DAYS: i64 = 10;

// =============================================================================
// AUDIT
// =============================================================================

/// Label recorded for automated actions
pub const SYSTEM_ACTOR_LABEL: &str = "system";

/// Label for a trashing user whose account no longer exists
pub const DELETED_USER_LABEL: &str = "deleted user";
