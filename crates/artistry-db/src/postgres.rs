//! PostgreSQL adapter for [`Store`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use artistry_models::{
    Course, CourseChanges, CourseFilter, CourseId, CourseStatus, EnrollmentRecord, Identity,
    IdentityFilter, IdentityId, IdentityUpsert, NewCourse, NewEnrollment, SelectionEntry,
    SelectionId, UserRole,
};

use crate::store::{COURSE_ENROLLMENT, EnrollmentTx, PAYMENT_REF, Store, StoreError, StoreResult};

const IDENTITY_COLUMNS: &str =
    "id, email, name, photo_url, role, is_deleted, created_at, updated_at";

const COURSE_COLUMNS: &str = "id, title, description, image_url, instructor_email, \
     instructor_name, price_cents, seats, enrolled_count, status, feedback, created_at, updated_at";

const SELECTION_COLUMNS: &str = "id, student_email, course_id, created_at";

const ENROLLMENT_COLUMNS: &str =
    "id, student_email, course_id, payment_ref, amount_cents, date";

fn duplicate_or(err: sqlx::Error, entity: &'static str, detail: impl Into<String>) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate {
            entity,
            detail: detail.into(),
        },
        _ => StoreError::Database(err),
    }
}

/// One enrollment per (student, course).
const ENROLLMENT_COURSE_CONSTRAINT: &str = "enrollments_student_course_key";

/// Names the uniqueness rule an enrollment insert ran into.
fn enrollment_duplicate(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.constraint() == Some(ENROLLMENT_COURSE_CONSTRAINT) =>
        {
            COURSE_ENROLLMENT
        }
        _ => PAYMENT_REF,
    }
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_identity_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = $1 AND is_deleted = FALSE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_identity(&self, id: IdentityId) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn list_identities(&self, filter: &IdentityFilter) -> StoreResult<Vec<Identity>> {
        let identities = sqlx::query_as::<_, Identity>(&format!(
            r#"
            SELECT {IDENTITY_COLUMNS}
            FROM identities
            WHERE is_deleted = FALSE
              AND ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(filter.role)
        .fetch_all(&self.pool)
        .await?;

        Ok(identities)
    }

    async fn upsert_identity(
        &self,
        email: &str,
        changes: &IdentityUpsert,
    ) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            r#"
            INSERT INTO identities (email, name, photo_url, role)
            VALUES ($1, $2, $3, COALESCE($4::user_role, 'student'::user_role))
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE($2, identities.name),
                photo_url = COALESCE($3, identities.photo_url),
                role = COALESCE($4::user_role, identities.role),
                updated_at = NOW()
            WHERE identities.is_deleted = FALSE
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(changes.name.as_deref())
        .bind(changes.photo_url.as_deref())
        .bind(changes.role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn set_identity_role(
        &self,
        id: IdentityId,
        role: UserRole,
    ) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            r#"
            UPDATE identities SET role = $2, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn soft_delete_identity(&self, id: IdentityId) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE identities SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_course(&self, course: &NewCourse) -> StoreResult<Course> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses
                (title, description, image_url, instructor_email, instructor_name, price_cents, seats)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(&course.title)
        .bind(course.description.as_deref())
        .bind(course.image_url.as_deref())
        .bind(&course.instructor_email)
        .bind(course.instructor_name.as_deref())
        .bind(course.price_cents)
        .bind(course.seats)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    async fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn list_courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            r#"
            SELECT {COURSE_COLUMNS}
            FROM courses
            WHERE ($1::course_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR instructor_email = $2)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.status)
        .bind(filter.instructor_email.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn count_courses(&self, filter: &CourseFilter) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM courses
            WHERE ($1::course_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR instructor_email = $2)
            "#,
        )
        .bind(filter.status)
        .bind(filter.instructor_email.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_course(
        &self,
        id: CourseId,
        instructor_email: &str,
        changes: &CourseChanges,
    ) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                price_cents = COALESCE($6, price_cents),
                seats = COALESCE($7, seats),
                updated_at = NOW()
            WHERE id = $1 AND instructor_email = $2
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(instructor_email)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.image_url.as_deref())
        .bind(changes.price_cents)
        .bind(changes.seats)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn transition_course_status(
        &self,
        id: CourseId,
        from: CourseStatus,
        to: CourseStatus,
    ) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn set_course_feedback(
        &self,
        id: CourseId,
        feedback: &str,
    ) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses SET feedback = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(feedback)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn delete_course(&self, id: CourseId, instructor_email: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM courses WHERE id = $1 AND instructor_email = $2 AND enrolled_count = 0",
        )
        .bind(id)
        .bind(instructor_email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_selection(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<SelectionEntry> {
        sqlx::query_as::<_, SelectionEntry>(&format!(
            r#"
            INSERT INTO selections (student_email, course_id)
            VALUES ($1, $2)
            RETURNING {SELECTION_COLUMNS}
            "#
        ))
        .bind(student_email)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, "selection", format!("course {}", course_id)))
    }

    async fn find_selection(&self, id: SelectionId) -> StoreResult<Option<SelectionEntry>> {
        let selection = sqlx::query_as::<_, SelectionEntry>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM selections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(selection)
    }

    async fn find_selection_for(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<Option<SelectionEntry>> {
        let selection = sqlx::query_as::<_, SelectionEntry>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM selections WHERE student_email = $1 AND course_id = $2"
        ))
        .bind(student_email)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(selection)
    }

    async fn list_selections(&self, student_email: &str) -> StoreResult<Vec<SelectionEntry>> {
        let selections = sqlx::query_as::<_, SelectionEntry>(&format!(
            r#"
            SELECT {SELECTION_COLUMNS}
            FROM selections
            WHERE student_email = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(student_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(selections)
    }

    async fn delete_selection(&self, id: SelectionId, student_email: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM selections WHERE id = $1 AND student_email = $2")
            .bind(id)
            .bind(student_email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_enrollment_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> StoreResult<Option<EnrollmentRecord>> {
        let record = sqlx::query_as::<_, EnrollmentRecord>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE payment_ref = $1"
        ))
        .bind(payment_ref)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_enrollment_for(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<Option<EnrollmentRecord>> {
        let record = sqlx::query_as::<_, EnrollmentRecord>(&format!(
            r#"
            SELECT {ENROLLMENT_COLUMNS}
            FROM enrollments
            WHERE student_email = $1 AND course_id = $2
            LIMIT 1
            "#
        ))
        .bind(student_email)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_enrollments(&self, student_email: &str) -> StoreResult<Vec<EnrollmentRecord>> {
        let records = sqlx::query_as::<_, EnrollmentRecord>(&format!(
            r#"
            SELECT {ENROLLMENT_COLUMNS}
            FROM enrollments
            WHERE student_email = $1
            ORDER BY date DESC, id DESC
            "#
        ))
        .bind(student_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn begin(&self) -> StoreResult<Box<dyn EnrollmentTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

/// Enrollment transaction over a single pooled connection.
///
/// The seat update takes a row lock on the course, so concurrent
/// enrollments for the same course queue behind each other.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EnrollmentTx for PgTx {
    async fn find_enrollment_by_payment_ref(
        &mut self,
        payment_ref: &str,
    ) -> StoreResult<Option<EnrollmentRecord>> {
        let record = sqlx::query_as::<_, EnrollmentRecord>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE payment_ref = $1"
        ))
        .bind(payment_ref)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn find_course(&mut self, id: CourseId) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(course)
    }

    async fn find_selection(&mut self, id: SelectionId) -> StoreResult<Option<SelectionEntry>> {
        let selection = sqlx::query_as::<_, SelectionEntry>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM selections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(selection)
    }

    async fn take_seat(&mut self, course_id: CourseId) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses
            SET seats = seats - 1, enrolled_count = enrolled_count + 1, updated_at = NOW()
            WHERE id = $1 AND seats > 0
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(course)
    }

    async fn insert_enrollment(
        &mut self,
        enrollment: &NewEnrollment,
    ) -> StoreResult<EnrollmentRecord> {
        sqlx::query_as::<_, EnrollmentRecord>(&format!(
            r#"
            INSERT INTO enrollments (student_email, course_id, payment_ref, amount_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        ))
        .bind(&enrollment.student_email)
        .bind(enrollment.course_id)
        .bind(&enrollment.payment_ref)
        .bind(enrollment.amount_cents)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            let entity = enrollment_duplicate(&e);
            duplicate_or(e, entity, enrollment.payment_ref.clone())
        })
    }

    async fn delete_selection(&mut self, id: SelectionId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM selections WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
