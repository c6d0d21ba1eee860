use crate::models::{ActionType, AttendanceRecord};

/// Derived state of one attendance stage. Recomputed on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionStatus {
    pub action_type: ActionType,
    pub label: &'static str,
    pub active_label: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub enabled: bool,
}

/// Computes the five stages in fixed order.
///
/// A stage is enabled only when it is not completed and every stage before
/// it is. On a record whose timestamps were filled in order this is the same
/// as looking at the direct predecessor; on a record with a gap it keeps the
/// chain to a single enabled stage. Without a record there is nothing to act
/// on and the list is empty.
pub fn derive_action_statuses(
    record: Option<&AttendanceRecord>,
    previous_day_done: bool,
    daily_report_done: bool,
) -> Vec<ActionStatus> {
    let Some(record) = record else {
        return Vec::new();
    };

    let mut statuses = Vec::with_capacity(ActionType::ALL.len());
    let mut predecessor_completed = true;

    for action in ActionType::ALL {
        let completed = match action {
            ActionType::PreviousDay => previous_day_done,
            ActionType::Report => daily_report_done,
            _ => record.stage_time(action).is_some(),
        };

        statuses.push(ActionStatus {
            action_type: action,
            label: action.label(),
            active_label: action.active_label(),
            description: action.description(),
            completed,
            enabled: predecessor_completed && !completed,
        });

        predecessor_completed = predecessor_completed && completed;
    }

    statuses
}

/// First stage that can be performed now, scanning in order.
pub fn next_action(statuses: &[ActionStatus]) -> Option<&ActionStatus> {
    statuses.iter().find(|status| !status.completed && status.enabled)
}

/// True once every stage is completed. An empty list never counts.
pub fn all_completed(statuses: &[ActionStatus]) -> bool {
    !statuses.is_empty() && statuses.iter().all(|status| status.completed)
}

pub fn status_of(statuses: &[ActionStatus], action: ActionType) -> Option<&ActionStatus> {
    statuses.iter().find(|status| status.action_type == action)
}
