pub mod exams;
pub mod notification;
pub mod reminders;
pub mod streak;
