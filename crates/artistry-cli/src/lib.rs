//! # Artistry CLI
//!
//! Administrative commands and database seeding for Artistry Academia.
//!
//! Everything goes through the [`Store`](artistry_db::Store) port, so the
//! same code seeds PostgreSQL or an in-memory store.
//!
//! ## Usage
//!
//! ```ignore
//! use artistry_cli::seeder::{SeedConfig, seed_all};
//!
//! let summary = seed_all(&store, SeedConfig::default()).await?;
//! ```

pub mod admin;
pub mod seeder;
