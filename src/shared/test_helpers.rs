//! In-memory stores and storage fakes for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::middleware::AdminPrincipal;
use crate::features::audit::models::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};
use crate::features::audit::stores::AuditLogStore;
use crate::features::file_requests::models::{FileRequest, NewFileRequest};
use crate::features::file_requests::stores::FileRequestStore;
use crate::features::files::models::StoredFile;
use crate::features::files::stores::FileLifecycleStore;
use crate::modules::storage::{ObjectStorage, RemoveOutcome};
use crate::shared::actor::Actor;

pub const MB: i64 = 1024 * 1024;

fn injected(what: &str) -> AppError {
    AppError::Internal(format!("injected {} failure", what))
}

// =============================================================================
// FILES
// =============================================================================

/// A live file uploaded a month ago
pub fn file_for(user_id: i64, size_bytes: i64, expires_at: Option<DateTime<Utc>>) -> StoredFile {
    StoredFile {
        id: Uuid::new_v4(),
        user_id,
        name: format!("file-{}.bin", &Uuid::new_v4().simple().to_string()[..8]),
        size_bytes,
        created_at: Utc::now() - Duration::days(30),
        expires_at,
        deleted_at: None,
        deleted_by_kind: None,
        deleted_by: None,
    }
}

impl StoredFile {
    /// Same file, trashed by the system at `at`
    pub fn trashed_at(mut self, at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(at);
        self.deleted_by_kind = Some("system".to_string());
        self.deleted_by = None;
        self
    }

    /// Same file, trashed by user `user_id` at `at`
    pub fn trashed_by_user(mut self, user_id: i64, at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(at);
        self.deleted_by_kind = Some("user".to_string());
        self.deleted_by = Some(user_id);
        self
    }

    /// The trashing user's account was removed; the FK nulls the id
    pub fn with_deleting_user_removed(mut self) -> Self {
        self.deleted_by = None;
        self
    }
}

#[derive(Default)]
struct FileState {
    files: HashMap<Uuid, StoredFile>,
    /// Users with a quota row; a refresh for anyone else fails
    usage: HashMap<i64, i64>,
}

#[derive(Default)]
pub struct InMemoryFileStore {
    state: Mutex<FileState>,
    mutations: AtomicUsize,
    fail_expired_query: AtomicBool,
    fail_soft_delete: Mutex<HashSet<Uuid>>,
    fail_permanent_delete: Mutex<HashSet<Uuid>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, file: StoredFile) -> Uuid {
        let id = file.id;
        self.state.lock().unwrap().files.insert(id, file);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<StoredFile> {
        self.state.lock().unwrap().files.get(&id).cloned()
    }

    pub fn set_usage(&self, user_id: i64, bytes: i64) {
        self.state.lock().unwrap().usage.insert(user_id, bytes);
    }

    pub fn usage(&self, user_id: i64) -> Option<i64> {
        self.state.lock().unwrap().usage.get(&user_id).copied()
    }

    /// Number of successful writes so far
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn fail_expired_query(&self) {
        self.fail_expired_query.store(true, Ordering::SeqCst);
    }

    pub fn fail_soft_delete_for(&self, id: Uuid) {
        self.fail_soft_delete.lock().unwrap().insert(id);
    }

    pub fn fail_permanent_delete_for(&self, id: Uuid) {
        self.fail_permanent_delete.lock().unwrap().insert(id);
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }

    fn select(&self, predicate: impl Fn(&StoredFile) -> bool) -> Vec<StoredFile> {
        let state = self.state.lock().unwrap();
        state.files.values().filter(|f| predicate(f)).cloned().collect()
    }
}

#[async_trait]
impl FileLifecycleStore for InMemoryFileStore {
    async fn find_file(&self, file_id: Uuid) -> Result<Option<StoredFile>> {
        Ok(self.get(file_id))
    }

    async fn find_expired_active_files(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>> {
        if self.fail_expired_query.load(Ordering::SeqCst) {
            return Err(injected("expired query"));
        }
        let mut files = self.select(|f| !f.is_trashed() && f.is_expired_at(now));
        files.sort_by_key(|f| f.expires_at);
        Ok(files)
    }

    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<StoredFile>> {
        let mut files = self.select(|f| f.deleted_at.is_some_and(|at| at < cutoff));
        files.sort_by_key(|f| f.deleted_at);
        Ok(files)
    }

    async fn list_trashed(&self, user_id: Option<i64>) -> Result<Vec<StoredFile>> {
        let mut files =
            self.select(|f| f.is_trashed() && user_id.map_or(true, |id| f.user_id == id));
        files.sort_by_key(|f| std::cmp::Reverse(f.deleted_at));
        Ok(files)
    }

    async fn soft_delete_file(
        &self,
        file_id: Uuid,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if self.fail_soft_delete.lock().unwrap().contains(&file_id) {
            return Err(injected("soft delete"));
        }
        let mut state = self.state.lock().unwrap();
        match state.files.get_mut(&file_id) {
            Some(file) if !file.is_trashed() => {
                file.deleted_at = Some(at);
                file.deleted_by_kind = Some(actor.kind().to_string());
                file.deleted_by = actor.user_id();
            }
            _ => return Err(AppError::NotFound(format!("File {} not found", file_id))),
        }
        drop(state);
        self.mutated();
        Ok(())
    }

    async fn restore_file(&self, file_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.files.get_mut(&file_id) {
            Some(file) if file.is_trashed() => {
                file.deleted_at = None;
                file.deleted_by_kind = None;
                file.deleted_by = None;
            }
            _ => return Err(AppError::NotFound(format!("File {} not in trash", file_id))),
        }
        drop(state);
        self.mutated();
        Ok(())
    }

    async fn permanently_delete_file_record(&self, file_id: Uuid) -> Result<()> {
        if self.fail_permanent_delete.lock().unwrap().contains(&file_id) {
            return Err(injected("permanent delete"));
        }
        if self.state.lock().unwrap().files.remove(&file_id).is_none() {
            return Err(AppError::NotFound(format!("File {} not found", file_id)));
        }
        self.mutated();
        Ok(())
    }

    async fn compute_live_storage_for_user(&self, user_id: i64) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .files
            .values()
            .filter(|f| f.user_id == user_id && f.counts_toward_quota())
            .map(|f| f.size_bytes)
            .sum())
    }

    async fn set_user_storage_usage(&self, user_id: i64, bytes: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.usage.get_mut(&user_id) {
            Some(usage) => *usage = bytes,
            None => return Err(AppError::NotFound(format!("User {} not found", user_id))),
        }
        drop(state);
        self.mutated();
        Ok(())
    }
}

// =============================================================================
// OBJECT STORAGE
// =============================================================================

#[derive(Default)]
pub struct MockObjectStorage {
    objects: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str) {
        self.objects.lock().unwrap().insert(key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains(key)
    }

    /// Removing `key` returns a storage error and leaves the object in place
    pub fn fail_removal_of(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn remove(&self, key: &str) -> Result<RemoveOutcome> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(AppError::Storage(format!("permission denied: {}", key)));
        }
        if self.objects.lock().unwrap().remove(key) {
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotFound)
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.contains(key))
    }
}

// =============================================================================
// AUDIT
// =============================================================================

/// Audit store measuring entries with `NewAuditLogEntry::estimated_size`
#[derive(Default)]
pub struct InMemoryAuditStore {
    /// Insertion order, each with its measured size
    entries: Mutex<Vec<(AuditLogEntry, i64)>>,
    next_id: AtomicI64,
    fail_appends: AtomicBool,
    fail_age_eviction: AtomicBool,
    fail_size_eviction: AtomicBool,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest insert first
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _)| e.clone())
            .collect()
    }

    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    pub fn fail_age_eviction(&self) {
        self.fail_age_eviction.store(true, Ordering::SeqCst);
    }

    pub fn fail_size_eviction(&self) {
        self.fail_size_eviction.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditStore {
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<i64> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(injected("append"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = AuditLogEntry {
            id,
            actor: entry.actor.clone(),
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            details: entry.details.clone(),
            success: entry.success,
            error_message: entry.error_message.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            created_at: entry.created_at,
        };
        self.entries
            .lock()
            .unwrap()
            .push((stored, entry.estimated_size()));
        Ok(id)
    }

    async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLogEntry>, i64)> {
        let mut matching: Vec<AuditLogEntry> = self
            .entries()
            .into_iter()
            .filter(|e| filter.action.as_ref().map_or(true, |a| &e.action == a))
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn total_size(&self) -> Result<i64> {
        Ok(self.entries.lock().unwrap().iter().map(|(_, s)| s).sum())
    }

    async fn delete_entries_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        if self.fail_age_eviction.load(Ordering::SeqCst) {
            return Err(injected("age eviction"));
        }
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(e, _)| e.created_at >= cutoff);
        Ok((before - entries.len()) as u64)
    }

    async fn delete_oldest_until_under_size(&self, max_bytes: i64) -> Result<u64> {
        if self.fail_size_eviction.load(Ordering::SeqCst) {
            return Err(injected("size eviction"));
        }
        let mut entries = self.entries.lock().unwrap();

        let mut newest_first: Vec<(DateTime<Utc>, i64, i64)> = entries
            .iter()
            .map(|(e, size)| (e.created_at, e.id, *size))
            .collect();
        newest_first.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

        let mut running = 0;
        let mut evict = HashSet::new();
        for (_, id, size) in newest_first {
            running += size;
            if running > max_bytes {
                evict.insert(id);
            }
        }

        entries.retain(|(e, _)| !evict.contains(&e.id));
        Ok(evict.len() as u64)
    }
}

// =============================================================================
// FILE REQUESTS
// =============================================================================

#[derive(Default)]
pub struct InMemoryFileRequestStore {
    requests: Mutex<Vec<FileRequest>>,
    next_id: AtomicI64,
    fail_deletes: AtomicBool,
}

impl InMemoryFileRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileRequestStore for InMemoryFileRequestStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<FileRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(requests.iter().find(|r| r.request_token == token).cloned())
    }

    async fn create(&self, request: &NewFileRequest) -> Result<FileRequest> {
        let mut requests = self.requests.lock().unwrap();
        if requests
            .iter()
            .any(|r| r.request_token == request.request_token)
        {
            return Err(AppError::Conflict("duplicate request token".to_string()));
        }
        let created = FileRequest {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: request.user_id,
            request_token: request.request_token.clone(),
            title: request.title.clone(),
            message: request.message.clone(),
            created_at: Utc::now(),
            expires_at: request.expires_at,
            is_active: true,
            max_file_size_mb: request.max_file_size_mb,
            allowed_file_types: request.allowed_file_types.clone(),
        };
        requests.push(created.clone());
        Ok(created)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(injected("request delete"));
        }
        let mut requests = self.requests.lock().unwrap();
        let before = requests.len();
        requests.retain(|r| !r.expires_at.is_some_and(|at| at < cutoff));
        Ok((before - requests.len()) as u64)
    }
}

// =============================================================================
// HTTP
// =============================================================================

pub const TEST_ADMIN: &str = "operator";

async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(AdminPrincipal {
        username: TEST_ADMIN.to_string(),
    });
    next.run(request).await
}

/// Wrap admin routes so handlers see an authenticated operator
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}
