//! Who performed an action.
//!
//! Automated jobs are a distinct variant instead of a reserved numeric id, so
//! a real user can never be mistaken for the system.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::SYSTEM_ACTOR_LABEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// A registered account, labelled by its email or display name
    User { id: i64, label: String },
    /// A scheduler or other automated process
    System,
    /// An unidentified caller, e.g. a login attempt for an unknown email
    Anonymous { label: String },
}

impl Actor {
    pub fn user(id: i64, label: impl Into<String>) -> Self {
        Actor::User {
            id,
            label: label.into(),
        }
    }

    pub fn anonymous(label: impl Into<String>) -> Self {
        Actor::Anonymous {
            label: label.into(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Actor::User { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Actor::User { label, .. } | Actor::Anonymous { label } => label,
            Actor::System => SYSTEM_ACTOR_LABEL,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Actor::System)
    }

    /// Column value for `audit_logs.actor_kind`
    pub fn kind(&self) -> &'static str {
        match self {
            Actor::User { .. } => "user",
            Actor::System => "system",
            Actor::Anonymous { .. } => "anonymous",
        }
    }

    /// Rebuild an actor from its persisted columns.
    ///
    /// A `user` row without an id degrades to `Anonymous` rather than failing
    /// the whole read.
    pub fn from_columns(kind: &str, user_id: Option<i64>, label: &str) -> Self {
        match (kind, user_id) {
            ("system", _) => Actor::System,
            ("user", Some(id)) => Actor::user(id, label),
            _ => Actor::anonymous(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_actor_has_no_user_id() {
        assert_eq!(Actor::System.user_id(), None);
        assert_eq!(Actor::System.label(), "system");
        assert!(Actor::System.is_system());
    }

    #[test]
    fn test_user_id_zero_is_still_a_user() {
        let actor = Actor::user(0, "root@example.com");
        assert_eq!(actor.user_id(), Some(0));
        assert!(!actor.is_system());
        assert_eq!(actor.kind(), "user");
    }

    #[test]
    fn test_from_columns_round_trip() {
        for actor in [
            Actor::user(42, "ada@example.com"),
            Actor::System,
            Actor::anonymous("ghost@example.com"),
        ] {
            let rebuilt = Actor::from_columns(actor.kind(), actor.user_id(), actor.label());
            assert_eq!(rebuilt, actor);
        }
    }

    #[test]
    fn test_from_columns_user_without_id() {
        assert_eq!(
            Actor::from_columns("user", None, "orphan@example.com"),
            Actor::anonymous("orphan@example.com")
        );
    }

    #[test]
    fn test_actor_serializes_with_kind_tag() {
        let json = serde_json::to_value(Actor::user(7, "a@b.c")).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["id"], 7);
        assert_eq!(serde_json::to_value(Actor::System).unwrap()["kind"], "system");
    }
}
