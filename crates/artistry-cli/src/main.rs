use std::process;

use artistry_cli::admin::create_admin;
use artistry_cli::seeder::{self, SeedConfig};
use artistry_db::{PgStore, init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "artistry-cli")]
#[command(about = "Artistry Academia CLI - administrative tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or promote) an administrator account
    CreateAdmin {
        /// Email address of the admin
        #[arg(short = 'e', long)]
        email: String,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },
    /// Seed the database with fake instructors, courses, and students
    Seed {
        /// Number of instructors to create
        #[arg(short = 'i', long, default_value = "5")]
        instructors: usize,

        /// Number of courses per instructor
        #[arg(short = 'c', long, default_value = "3")]
        courses: usize,

        /// Number of students to create
        #[arg(short = 's', long, default_value = "50")]
        students: usize,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("❌ {}", e);
        process::exit(1);
    }

    let store = PgStore::new(pool);

    match cli.command {
        Commands::CreateAdmin { email, name } => match create_admin(&store, &email, name).await {
            Ok(identity) => {
                println!("\n✅ Admin ready!");
                println!("   Email: {}", identity.email);
                println!("   Id: {}", identity.id);
            }
            Err(e) => {
                eprintln!("\n❌ Error creating admin: {}", e);
                process::exit(1);
            }
        },
        Commands::Seed {
            instructors,
            courses,
            students,
        } => {
            let config = SeedConfig {
                instructors,
                courses_per_instructor: courses,
                students,
            };
            match seeder::seed_all(&store, config).await {
                Ok(summary) => {
                    println!("   Instructors: {}", summary.instructors);
                    println!(
                        "   Courses: {} ({} approved)",
                        summary.courses, summary.approved_courses
                    );
                    println!("   Students: {}", summary.students);
                }
                Err(e) => {
                    eprintln!("\n❌ Error seeding database: {}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Migrate => println!("✅ Migrations up to date"),
    }
}
