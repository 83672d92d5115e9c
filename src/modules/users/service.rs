use tracing::instrument;
use validator::ValidateEmail;

use artistry_core::AppError;
use artistry_db::Store;
use artistry_models::{
    AdminFlag, Identity, IdentityFilter, IdentityId, IdentityUpsert, InstructorFlag,
    UpsertIdentityDto, UserRole,
};

use crate::audit_event;
use crate::metrics::track_identity_upserted;

pub struct UserService;

impl UserService {
    #[instrument(skip(store))]
    pub async fn list_users(store: &dyn Store) -> Result<Vec<Identity>, AppError> {
        Ok(store.list_identities(&IdentityFilter::default()).await?)
    }

    #[instrument(skip(store))]
    pub async fn list_instructors(store: &dyn Store) -> Result<Vec<Identity>, AppError> {
        let filter = IdentityFilter {
            role: Some(UserRole::Instructor),
        };
        Ok(store.list_identities(&filter).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_user_by_email(store: &dyn Store, email: &str) -> Result<Identity, AppError> {
        ensure_email(email)?;

        store
            .find_identity_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Creates or updates the identity for `email` on behalf of `caller_email`.
    ///
    /// Callers may only write their own identity unless they are admins.
    /// A non-admin may repeat their current role but never change it.
    #[instrument(skip(store))]
    pub async fn upsert_user(
        store: &dyn Store,
        caller_email: &str,
        email: &str,
        dto: UpsertIdentityDto,
    ) -> Result<Identity, AppError> {
        ensure_email(email)?;

        let caller_is_admin = store
            .find_identity_by_email(caller_email)
            .await?
            .is_some_and(|caller| caller.role == UserRole::Admin);

        if !caller_is_admin && caller_email != email {
            return Err(AppError::forbidden("You can only update your own profile"));
        }

        let existing = store.find_identity_by_email(email).await?;
        let current_role = existing.as_ref().map_or(UserRole::Student, |i| i.role);

        if let Some(role) = dto.role
            && role != current_role
            && !caller_is_admin
        {
            return Err(AppError::forbidden("Only admins can change roles"));
        }

        let identity = store
            .upsert_identity(email, &IdentityUpsert::from(dto))
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        track_identity_upserted(identity.role.as_str());

        if existing.is_some_and(|before| before.role != identity.role) {
            audit_event!(
                "role_changed",
                "identity",
                identity.id = %identity.id,
                role = %identity.role,
                actor = %caller_email
            );
        }

        Ok(identity)
    }

    /// `false` whenever `email` is not the caller's own.
    #[instrument(skip(store))]
    pub async fn is_admin(
        store: &dyn Store,
        caller_email: &str,
        email: &str,
    ) -> Result<AdminFlag, AppError> {
        let admin = Self::own_role(store, caller_email, email).await? == Some(UserRole::Admin);
        Ok(AdminFlag { admin })
    }

    #[instrument(skip(store))]
    pub async fn is_instructor(
        store: &dyn Store,
        caller_email: &str,
        email: &str,
    ) -> Result<InstructorFlag, AppError> {
        let instructor =
            Self::own_role(store, caller_email, email).await? == Some(UserRole::Instructor);
        Ok(InstructorFlag { instructor })
    }

    async fn own_role(
        store: &dyn Store,
        caller_email: &str,
        email: &str,
    ) -> Result<Option<UserRole>, AppError> {
        if caller_email != email {
            return Ok(None);
        }

        Ok(store
            .find_identity_by_email(email)
            .await?
            .map(|identity| identity.role))
    }

    #[instrument(skip(store))]
    pub async fn set_role(
        store: &dyn Store,
        actor: &Identity,
        id: IdentityId,
        role: UserRole,
    ) -> Result<Identity, AppError> {
        let identity = store
            .set_identity_role(id, role)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        audit_event!(
            "role_changed",
            "identity",
            identity.id = %identity.id,
            role = %role,
            actor = %actor.email
        );

        Ok(identity)
    }

    #[instrument(skip(store))]
    pub async fn delete_user(
        store: &dyn Store,
        actor: &Identity,
        id: IdentityId,
    ) -> Result<(), AppError> {
        if !store.soft_delete_identity(id).await? {
            return Err(AppError::not_found("User not found"));
        }

        audit_event!("identity_deleted", "identity", identity.id = %id, actor = %actor.email);

        Ok(())
    }
}

fn ensure_email(email: &str) -> Result<(), AppError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(AppError::bad_request("Invalid email address"))
    }
}
