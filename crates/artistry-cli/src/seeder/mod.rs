//! Fake-data seeding.
//!
//! Generation is pure and kept apart from insertion so it can be tested
//! without a store.

pub mod courses;
pub mod identities;
pub mod models;

use std::time::Instant;

use artistry_db::{Store, StoreError};

pub use models::{SeedConfig, SeedSummary};

/// Seeds instructors, their courses, and students.
///
/// Roughly two thirds of the courses are approved so they show up in the
/// public listing; the rest stay pending for moderation.
pub async fn seed_all(store: &dyn Store, config: SeedConfig) -> Result<SeedSummary, StoreError> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} instructors, {} courses each, {} students...",
        config.instructors, config.courses_per_instructor, config.students
    );

    let instructors = identities::seed_instructors(store, config.instructors).await?;
    let courses =
        courses::seed_courses(store, &instructors, config.courses_per_instructor).await?;
    let approved = courses::approve_some(store, &courses).await?;
    let students = identities::seed_students(store, config.students).await?;

    let summary = SeedSummary {
        instructors: instructors.len(),
        courses: courses.len(),
        approved_courses: approved,
        students: students.len(),
    };

    println!("✅ Seeding finished in {:?}", start_time.elapsed());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_db::MemoryStore;
    use artistry_models::{CourseFilter, IdentityFilter, UserRole};

    #[tokio::test]
    async fn test_seed_all_populates_store() {
        let store = MemoryStore::new();
        let config = SeedConfig {
            instructors: 2,
            courses_per_instructor: 3,
            students: 4,
        };

        let summary = seed_all(&store, config).await.unwrap();
        assert_eq!(summary.instructors, 2);
        assert_eq!(summary.courses, 6);
        assert_eq!(summary.students, 4);

        let instructors = store
            .list_identities(&IdentityFilter {
                role: Some(UserRole::Instructor),
            })
            .await
            .unwrap();
        assert_eq!(instructors.len(), 2);

        let approved = store.count_courses(&CourseFilter::approved()).await.unwrap();
        assert_eq!(approved as usize, summary.approved_courses);
    }
}
