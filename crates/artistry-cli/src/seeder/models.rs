//! Seeding configuration and generated records.

/// How much data to generate.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub instructors: usize,
    pub courses_per_instructor: usize,
    pub students: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            instructors: 5,
            courses_per_instructor: 3,
            students: 50,
        }
    }
}

/// Counts of what was inserted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub instructors: usize,
    pub courses: usize,
    pub approved_courses: usize,
    pub students: usize,
}

pub struct IdentitySeed {
    pub email: String,
    pub name: String,
    pub photo_url: String,
}
