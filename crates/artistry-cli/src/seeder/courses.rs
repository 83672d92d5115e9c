//! Course seeding.

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Words};

use artistry_db::{Store, StoreError};
use artistry_models::{Course, CourseStatus, Identity, NewCourse};

const DISCIPLINES: [&str; 8] = [
    "Watercolour",
    "Oil Painting",
    "Charcoal Drawing",
    "Ceramics",
    "Printmaking",
    "Calligraphy",
    "Digital Illustration",
    "Sculpture",
];

pub fn generate_courses(instructor: &Identity, count: usize) -> Vec<NewCourse> {
    (0..count)
        .map(|idx| {
            let discipline = DISCIPLINES[(idx + instructor.email.len()) % DISCIPLINES.len()];
            let words: Vec<String> = Words(1..3).fake();
            let price_dollars: i64 = (20..200).fake();

            NewCourse {
                title: format!("{} {}", discipline, words.join(" ")),
                description: Some(Paragraph(2..4).fake()),
                image_url: Some(format!(
                    "https://picsum.photos/seed/{}{}/640/480",
                    idx, instructor.id
                )),
                instructor_email: instructor.email.clone(),
                instructor_name: instructor.name.clone(),
                price_cents: price_dollars * 100,
                seats: (5..40).fake(),
            }
        })
        .collect()
}

pub async fn seed_courses(
    store: &dyn Store,
    instructors: &[Identity],
    per_instructor: usize,
) -> Result<Vec<Course>, StoreError> {
    println!("🖌️  Seeding {} courses...", instructors.len() * per_instructor);

    let mut courses = Vec::with_capacity(instructors.len() * per_instructor);
    for instructor in instructors {
        for course in generate_courses(instructor, per_instructor) {
            courses.push(store.insert_course(&course).await?);
        }
    }
    Ok(courses)
}

/// Approves every course except each third one. Returns how many changed.
pub async fn approve_some(store: &dyn Store, courses: &[Course]) -> Result<usize, StoreError> {
    let mut approved = 0;
    for course in courses.iter().enumerate().filter(|(idx, _)| idx % 3 != 2).map(|(_, c)| c) {
        if store
            .transition_course_status(course.id, CourseStatus::Pending, CourseStatus::Approved)
            .await?
            .is_some()
        {
            approved += 1;
        }
    }
    Ok(approved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_models::{IdentityId, UserRole};
    use chrono::Utc;

    fn instructor() -> Identity {
        Identity {
            id: IdentityId::new(),
            email: "frida@example.com".to_string(),
            name: Some("Frida".to_string()),
            photo_url: None,
            role: UserRole::Instructor,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generated_courses_are_valid() {
        let courses = generate_courses(&instructor(), 10);
        assert_eq!(courses.len(), 10);
        for course in &courses {
            assert_eq!(course.instructor_email, "frida@example.com");
            assert!(course.price_cents >= 2000);
            assert!((5..40).contains(&course.seats));
            assert!(!course.title.is_empty());
        }
    }
}
