pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod payments;
pub mod selections;
pub mod users;
