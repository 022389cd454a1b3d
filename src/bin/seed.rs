//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@crisisconnect.local";
const ADMIN_PASSWORD: &str = "Admin123!";
const USER_EMAIL: &str = "user@crisisconnect.local";
const USER_PASSWORD: &str = "User123!";

/// (title, description, status, age in days)
const SAMPLE_REPORTS: &[(&str, &str, &str, i64)] = &[
    ("Flooded underpass", "Water level above curb on Main St underpass", "Pending", 0),
    ("Power line down", "Line across the road near the school", "In Progress", 1),
    ("Gas smell", "Strong gas odor in building lobby", "Resolved", 2),
    ("Fallen tree", "Tree blocking the north lane", "Resolved", 4),
    ("Missing signage", "Evacuation sign removed from stairwell", "Pending", 6),
    ("Smoke reported", "Smoke seen from the warehouse roof", "In Progress", 9),
    ("Broken hydrant", "Hydrant leaking continuously", "Pending", 13),
    ("Blocked exit", "Fire exit chained shut at the mall", "Resolved", 21),
    ("Landslide risk", "Cracks appearing on the hillside path", "Pending", 28),
    ("Stray livestock", "Cattle wandering onto the highway", "Escalated", 40),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = crisisconnect::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    crisisconnect::db::run_migrations(&pool).await?;

    println!("=== CrisisConnect Seed Script ===");

    let admin_id = seed_user(&pool, "Site Administrator", ADMIN_EMAIL, ADMIN_PASSWORD, "admin").await?;
    let user_id = seed_user(&pool, "Field Reporter", USER_EMAIL, USER_PASSWORD, "user").await?;
    seed_reports(&pool, user_id).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: {ADMIN_EMAIL} / {ADMIN_PASSWORD} ({admin_id})");
    println!("User login:  {USER_EMAIL} / {USER_PASSWORD} ({user_id})");

    Ok(())
}

/// Create the account if missing, otherwise reset its password. Returns its id.
async fn seed_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let hash = crisisconnect::services::auth::hash_password(password)?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ($1, $2, $3, $4::user_role)
         ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
         RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(&hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("[done] {role} account {email}");
    Ok(id)
}

async fn seed_reports(pool: &PgPool, owner: Uuid) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Reports already exist ({count})");
        return Ok(());
    }

    let now = Utc::now();
    for &(title, description, status, age_days) in SAMPLE_REPORTS {
        sqlx::query(
            "INSERT INTO reports (title, description, status, user_id, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(owner)
        .bind(now - Duration::days(age_days))
        .execute(pool)
        .await?;
    }

    println!("[done] Created {} sample reports", SAMPLE_REPORTS.len());
    Ok(())
}
