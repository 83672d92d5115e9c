//! Instructor and student seeding.

use fake::Fake;
use fake::faker::name::en::*;

use artistry_db::{Store, StoreError};
use artistry_models::{Identity, IdentityUpsert, UserRole};

use super::models::IdentitySeed;

/// Emails carry the role and index so reruns hit the same identities.
pub fn generate_identities(count: usize, role: UserRole) -> Vec<IdentitySeed> {
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            IdentitySeed {
                email: format!("{}+{}{}@example.com", first_name.to_lowercase(), role, idx),
                name: format!("{} {}", first_name, last_name),
                photo_url: format!("https://i.pravatar.cc/300?u={}{}", role, idx),
            }
        })
        .collect()
}

async fn insert_identities(
    store: &dyn Store,
    seeds: Vec<IdentitySeed>,
    role: UserRole,
) -> Result<Vec<Identity>, StoreError> {
    let mut identities = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let changes = IdentityUpsert {
            name: Some(seed.name),
            photo_url: Some(seed.photo_url),
            role: Some(role),
        };
        // Soft-deleted identities are skipped
        if let Some(identity) = store.upsert_identity(&seed.email, &changes).await? {
            identities.push(identity);
        }
    }
    Ok(identities)
}

pub async fn seed_instructors(
    store: &dyn Store,
    count: usize,
) -> Result<Vec<Identity>, StoreError> {
    println!("🎨 Seeding {} instructors...", count);
    let seeds = generate_identities(count, UserRole::Instructor);
    insert_identities(store, seeds, UserRole::Instructor).await
}

pub async fn seed_students(store: &dyn Store, count: usize) -> Result<Vec<Identity>, StoreError> {
    println!("🎓 Seeding {} students...", count);
    let seeds = generate_identities(count, UserRole::Student);
    insert_identities(store, seeds, UserRole::Student).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_emails_are_unique_per_index() {
        let seeds = generate_identities(20, UserRole::Student);
        let mut emails: Vec<_> = seeds.iter().map(|s| s.email.clone()).collect();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), 20);
        assert!(seeds.iter().all(|s| s.email.contains("+student")));
    }
}
