use crate::models::{HomeTab, UserRole};

/// Where a user lands after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Manager screens live elsewhere; only a notice is shown here.
    Manager,
    Tab(HomeTab),
}

pub fn landing_for(role: UserRole) -> Landing {
    match role {
        UserRole::Manager => Landing::Manager,
        UserRole::Staff => Landing::Tab(HomeTab::Attendance),
    }
}
