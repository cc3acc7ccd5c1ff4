pub mod assignments;
pub mod auth;
pub mod class_status;
pub mod grades;
pub mod groups;
pub mod submissions;
pub mod retry;
pub mod users;

pub use assignments::{AssignmentLifecycle, AssignmentService};
pub use auth::AuthService;
pub use class_status::ClassStatusService;
pub use grades::GradingService;
pub use groups::GroupService;
pub use submissions::SubmissionService;
pub use users::UserService;
