//! Repository layer: stateless structs with static async methods over a
//! `&PgPool`. All counter updates are single-statement atomic SQL.

mod exam_repo;
mod notification_repo;
mod progress_repo;
mod question_repo;
mod reminder_repo;
mod streak_repo;
mod user_repo;

pub use exam_repo::ExamRepo;
pub use notification_repo::NotificationRepo;
pub use progress_repo::ProgressRepo;
pub use question_repo::QuestionRepo;
pub use reminder_repo::ReminderRepo;
pub use streak_repo::StreakRepo;
pub use user_repo::UserRepo;
