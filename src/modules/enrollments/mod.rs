pub mod controller;
pub mod router;
pub mod service;
pub mod transaction;

pub use router::init_enrollments_router;
