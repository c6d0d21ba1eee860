pub mod attendance;
pub mod report;
pub mod shift;
pub mod status;
pub mod user;

pub use attendance::AttendanceRecord;
pub use report::{DailyReport, PreviousDayReport};
pub use shift::{Availability, Worksite};
pub use status::{ActionType, AttendanceStatus, HomeTab, ReportStatus, UserRole};
pub use user::{Credentials, User};
