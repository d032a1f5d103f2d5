//! Audit trail writer.
//!
//! The canonical entry point is [`AuditLogger::log_action`]; the rest are
//! shorthands that fix the action, entity type and detail shape for a
//! particular event so records stay uniform across call sites.

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::RequestContext;
use crate::features::audit::models::{
    AuditAction, AuditLogEntry, AuditLogFilter, EntityType, NewAuditLogEntry,
};
use crate::features::audit::stores::AuditLogStore;
use crate::shared::actor::Actor;

pub struct AuditLogger {
    store: Arc<dyn AuditLogStore>,
}

#[allow(dead_code)]
impl AuditLogger {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    /// Append one entry. `error_message` is only stored for failed actions.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_action(
        &self,
        actor: &Actor,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        details: Value,
        request: Option<&RequestContext>,
        success: bool,
        error_message: Option<&str>,
    ) -> Result<i64> {
        let mut entry = NewAuditLogEntry::new(actor.clone(), action, entity_type)
            .entity(entity_id)
            .details(details)
            .outcome(success, error_message);

        if let Some(ctx) = request {
            entry = entry.request(ctx);
        }

        let id = self.store.append(&entry).await?;

        tracing::debug!(
            "Audit entry {} recorded: {} by {}",
            id,
            entry.action,
            actor.label()
        );

        Ok(id)
    }

    /// Page through the trail, newest first
    pub async fn list_entries(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLogEntry>, i64)> {
        self.store.list(filter).await
    }

    /// Successful action performed by a user
    pub async fn log_user_action(
        &self,
        user: &Actor,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        details: Value,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_action(user, action, entity_type, entity_id, details, request, true, None)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn log_user_action_with_status(
        &self,
        user: &Actor,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        details: Value,
        request: Option<&RequestContext>,
        success: bool,
        error_message: Option<&str>,
    ) -> Result<i64> {
        self.log_action(
            user,
            action,
            entity_type,
            entity_id,
            details,
            request,
            success,
            error_message,
        )
        .await
    }

    /// Action taken by a scheduler, with no request attached
    pub async fn log_system_action(
        &self,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        details: Value,
    ) -> Result<i64> {
        self.log_action(
            &Actor::System,
            action,
            entity_type,
            entity_id,
            details,
            None,
            true,
            None,
        )
        .await
    }

    /// Login attempt. An attempt for an unknown account has no user id and is
    /// recorded against an anonymous actor labelled with the email.
    pub async fn log_login_attempt(
        &self,
        email: &str,
        success: bool,
        request: Option<&RequestContext>,
        user_id: Option<i64>,
        error_message: Option<&str>,
    ) -> Result<i64> {
        let action = if success {
            AuditAction::LoginSuccess
        } else {
            AuditAction::LoginFailed
        };
        let actor = match user_id {
            Some(id) => Actor::user(id, email),
            None => Actor::anonymous(email),
        };

        self.log_action(
            &actor,
            action,
            EntityType::Session,
            "",
            json!({ "email": email, "success": success }),
            request,
            success,
            error_message,
        )
        .await
    }

    pub async fn log_logout(&self, user: &Actor, request: Option<&RequestContext>) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::Logout,
            EntityType::Session,
            "",
            json!({ "email": user.label() }),
            request,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Files
    // -------------------------------------------------------------------------

    pub async fn log_file_upload(
        &self,
        user: &Actor,
        file_id: Uuid,
        file_name: &str,
        file_size: i64,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::FileUploaded,
            EntityType::File,
            &file_id.to_string(),
            json!({ "file_name": file_name, "file_size": file_size }),
            request,
        )
        .await
    }

    pub async fn log_file_delete(
        &self,
        user: &Actor,
        file_id: Uuid,
        file_name: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_file_event(user, AuditAction::FileDeleted, file_id, file_name, request)
            .await
    }

    pub async fn log_file_restore(
        &self,
        user: &Actor,
        file_id: Uuid,
        file_name: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_file_event(user, AuditAction::FileRestored, file_id, file_name, request)
            .await
    }

    pub async fn log_file_permanent_delete(
        &self,
        user: &Actor,
        file_id: Uuid,
        file_name: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_file_event(
            user,
            AuditAction::FilePermanentlyDeleted,
            file_id,
            file_name,
            request,
        )
        .await
    }

    /// Download by id and email, since downloads happen on shared links
    /// where no full user record is loaded
    pub async fn log_file_download(
        &self,
        user_id: i64,
        user_email: &str,
        file_id: Uuid,
        file_name: &str,
        file_size: i64,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            &Actor::user(user_id, user_email),
            AuditAction::FileDownloaded,
            EntityType::File,
            &file_id.to_string(),
            json!({ "file_name": file_name, "file_size": file_size }),
            request,
        )
        .await
    }

    pub async fn log_file_shared_with_team(
        &self,
        user: &Actor,
        file_id: Uuid,
        file_name: &str,
        team_id: i64,
        team_name: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::FileSharedWithTeam,
            EntityType::File,
            &file_id.to_string(),
            json!({ "file_name": file_name, "team_id": team_id, "team_name": team_name }),
            request,
        )
        .await
    }

    async fn log_file_event(
        &self,
        user: &Actor,
        action: AuditAction,
        file_id: Uuid,
        file_name: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            action,
            EntityType::File,
            &file_id.to_string(),
            json!({ "file_name": file_name }),
            request,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // User management
    // -------------------------------------------------------------------------

    pub async fn log_user_created(
        &self,
        admin: &Actor,
        new_user_id: i64,
        new_user_email: &str,
        user_level: i32,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            admin,
            AuditAction::UserCreated,
            EntityType::User,
            &new_user_id.to_string(),
            json!({ "email": new_user_email, "user_level": user_level }),
            request,
        )
        .await
    }

    pub async fn log_user_updated(
        &self,
        admin: &Actor,
        target_user_id: i64,
        target_user_email: &str,
        changes: Value,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            admin,
            AuditAction::UserUpdated,
            EntityType::User,
            &target_user_id.to_string(),
            json!({ "email": target_user_email, "changes": changes }),
            request,
        )
        .await
    }

    pub async fn log_user_deleted(
        &self,
        admin: &Actor,
        deleted_user_id: i64,
        deleted_user_email: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_event(
            admin,
            AuditAction::UserDeleted,
            deleted_user_id,
            deleted_user_email,
            request,
        )
        .await
    }

    pub async fn log_user_activated(
        &self,
        admin: &Actor,
        target_user_id: i64,
        target_user_email: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_event(
            admin,
            AuditAction::UserActivated,
            target_user_id,
            target_user_email,
            request,
        )
        .await
    }

    pub async fn log_user_deactivated(
        &self,
        admin: &Actor,
        target_user_id: i64,
        target_user_email: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_event(
            admin,
            AuditAction::UserDeactivated,
            target_user_id,
            target_user_email,
            request,
        )
        .await
    }

    pub async fn log_password_changed(
        &self,
        user: &Actor,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_own_account_event(user, AuditAction::PasswordChanged, request)
            .await
    }

    pub async fn log_2fa_enabled(
        &self,
        user: &Actor,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_own_account_event(user, AuditAction::TwoFactorEnabled, request)
            .await
    }

    pub async fn log_2fa_disabled(
        &self,
        user: &Actor,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_own_account_event(user, AuditAction::TwoFactorDisabled, request)
            .await
    }

    async fn log_user_event(
        &self,
        admin: &Actor,
        action: AuditAction,
        target_user_id: i64,
        target_user_email: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            admin,
            action,
            EntityType::User,
            &target_user_id.to_string(),
            json!({ "email": target_user_email }),
            request,
        )
        .await
    }

    async fn log_own_account_event(
        &self,
        user: &Actor,
        action: AuditAction,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        let entity_id = user.user_id().map(|id| id.to_string()).unwrap_or_default();
        self.log_user_action(
            user,
            action,
            EntityType::User,
            &entity_id,
            json!({ "email": user.label() }),
            request,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Teams and settings
    // -------------------------------------------------------------------------

    pub async fn log_team_created(
        &self,
        user: &Actor,
        team_id: i64,
        team_name: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::TeamCreated,
            EntityType::Team,
            &team_id.to_string(),
            json!({ "team_name": team_name }),
            request,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn log_team_member_added(
        &self,
        user: &Actor,
        team_id: i64,
        team_name: &str,
        member_id: i64,
        member_email: &str,
        role: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::TeamMemberAdded,
            EntityType::Team,
            &team_id.to_string(),
            json!({
                "team_name": team_name,
                "member_id": member_id,
                "member_email": member_email,
                "role": role,
            }),
            request,
        )
        .await
    }

    pub async fn log_team_member_removed(
        &self,
        user: &Actor,
        team_id: i64,
        team_name: &str,
        member_id: i64,
        member_email: &str,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::TeamMemberRemoved,
            EntityType::Team,
            &team_id.to_string(),
            json!({
                "team_name": team_name,
                "member_id": member_id,
                "member_email": member_email,
            }),
            request,
        )
        .await
    }

    pub async fn log_settings_updated(
        &self,
        user: &Actor,
        changes: Value,
        request: Option<&RequestContext>,
    ) -> Result<i64> {
        self.log_user_action(
            user,
            AuditAction::SettingsUpdated,
            EntityType::Settings,
            "",
            changes,
            request,
        )
        .await
    }
}
