//! Side-effect descriptors
//!
//! A domain operation never calls collaborators directly; it returns
//! declarative [`SideEffect`] records describing who needs to know about
//! the change. The fan-out executes them after commit, in [`EffectKind`]
//! order.

use serde::Serialize;

use crate::effects::audit::AuditAction;
use shared::message::{NotificationKind, NotificationPayload};
use shared::models::PointsAward;

/// Side-effect categories, in application order
///
/// Audit runs first (compliance-critical, must not be skipped silently),
/// points last (explicitly best-effort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Audit,
    Notify,
    Broadcast,
    Points,
}

/// Declarative record of one side effect to perform
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Compliance audit entry; operator fields come from the request meta
    Audit {
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        details: serde_json::Value,
    },
    /// User notification
    Notify(NotificationPayload),
    /// Realtime resource sync
    Broadcast {
        resource: String,
        action: String,
        id: String,
        data: Option<serde_json::Value>,
    },
    /// Gamification points award
    AwardPoints(PointsAward),
}

impl SideEffect {
    pub fn kind(&self) -> EffectKind {
        match self {
            SideEffect::Audit { .. } => EffectKind::Audit,
            SideEffect::Notify(_) => EffectKind::Notify,
            SideEffect::Broadcast { .. } => EffectKind::Broadcast,
            SideEffect::AwardPoints(_) => EffectKind::Points,
        }
    }

    /// Short label for outcome reporting and logs
    pub fn target(&self) -> String {
        match self {
            SideEffect::Audit {
                resource_type,
                resource_id,
                ..
            } => format!("{resource_type}:{resource_id}"),
            SideEffect::Notify(n) => format!("user:{}", n.user_id),
            SideEffect::Broadcast { resource, id, .. } => format!("{resource}:{id}"),
            SideEffect::AwardPoints(a) => format!("user:{}", a.user_id),
        }
    }

    // ── Constructors (keep action code terse) ───────────────────────

    pub fn audit(
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl ToString,
        details: serde_json::Value,
    ) -> Self {
        SideEffect::Audit {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.to_string(),
            details,
        }
    }

    pub fn notify(
        user_id: i64,
        kind: NotificationKind,
        message_key: impl Into<String>,
        message_params: serde_json::Value,
        role: &str,
        module: &str,
    ) -> Self {
        SideEffect::Notify(NotificationPayload {
            user_id,
            kind,
            message_key: message_key.into(),
            message_params,
            role: Some(role.to_string()),
            module: Some(module.to_string()),
            language_code: None,
        })
    }

    pub fn broadcast(
        resource: impl Into<String>,
        action: impl Into<String>,
        id: impl ToString,
        data: Option<serde_json::Value>,
    ) -> Self {
        SideEffect::Broadcast {
            resource: resource.into(),
            action: action.into(),
            id: id.to_string(),
            data,
        }
    }

    pub fn award_points(
        user_id: i64,
        action: impl Into<String>,
        points: i64,
        metadata: serde_json::Value,
    ) -> Self {
        SideEffect::AwardPoints(PointsAward {
            user_id,
            action: action.into(),
            points,
            metadata,
        })
    }
}

/// Result of applying one descriptor
#[derive(Debug, Clone, Serialize)]
pub struct EffectOutcome {
    pub kind: EffectKind,
    pub target: String,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_order_audit_first_points_last() {
        let mut kinds = vec![
            EffectKind::Points,
            EffectKind::Broadcast,
            EffectKind::Audit,
            EffectKind::Notify,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                EffectKind::Audit,
                EffectKind::Notify,
                EffectKind::Broadcast,
                EffectKind::Points,
            ]
        );
    }

    #[test]
    fn target_labels_are_stable() {
        let effect = SideEffect::broadcast("booking", "updated", 42, None);
        assert_eq!(effect.target(), "booking:42");
        let effect = SideEffect::award_points(7, "check_in", 25, serde_json::json!({}));
        assert_eq!(effect.target(), "user:7");
    }
}
