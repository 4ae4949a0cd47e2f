//! Database seeder for Tally development and testing.
//!
//! Creates one account per role and six months of transactions for each,
//! so every endpoint including premium analytics has data to show.
//! Accounts that already exist are left alone.
//!
//! Usage: DATABASE_URL=sqlite://tally.db?mode=rwc cargo run --bin seeder

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm_migration::MigratorTrait;
use sea_orm_migration::sea_orm::DatabaseConnection;
use tally_core::auth::{Role, hash_password};
use tally_core::calendar::MonthKey;
use tally_core::ledger::TransactionDraft;
use tally_db::migration::Migrator;
use tally_db::repositories::{CreateUserInput, TransactionRepository, UserRepository};
use tally_shared::config::DatabaseConfig;
use tally_shared::types::UserId;

/// Password of every seeded account.
const SEED_PASSWORD: &str = "password123";

/// Seeded accounts: username and role.
const ACCOUNTS: [(&str, Role); 3] = [
    ("alice", Role::User),
    ("paula", Role::Premium),
    ("root", Role::Admin),
];

/// Recurring monthly entries: day offset, label, type, amount in cents.
const MONTHLY: [(i64, &str, &str, i64); 4] = [
    (0, "Salary", "income", 320_000),
    (1, "Rent", "expense", 125_000),
    (9, "Groceries", "expense", 31_250),
    (17, "Utilities", "expense", 8_975),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    println!("Connecting to database...");
    let db = tally_db::connect(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
        run_migrations: true,
    })
    .await?;

    Migrator::up(&db, None).await?;

    let current = MonthKey::of(Utc::now(), Tz::UTC);
    let months = (0..5).fold(current, |m, _| m.pred()).through(current);

    for (username, role) in ACCOUNTS {
        println!("Seeding {username} ({role})...");
        let Some(user_id) = seed_user(&db, username, role).await? else {
            println!("  {username} already exists, skipping...");
            continue;
        };

        let mut count = 0;
        for month in &months {
            count += seed_month(&db, user_id, month.start(Tz::UTC)).await?;
        }
        println!("  {count} transactions");
    }

    println!("Seeding complete! Log in with any account and password '{SEED_PASSWORD}'.");
    Ok(())
}

/// Creates the account, or returns `None` if its email is taken.
async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> anyhow::Result<Option<UserId>> {
    let repo = UserRepository::new(db.clone());
    let email = format!("{username}@tally.dev");

    if repo.email_exists(&email).await? {
        return Ok(None);
    }

    let user = repo
        .create(CreateUserInput {
            username: username.to_string(),
            email,
            password_hash: hash_password(SEED_PASSWORD)?,
            role: role.into(),
        })
        .await?;

    Ok(Some(UserId::from_uuid(user.id)))
}

/// Inserts one month of entries starting at `start`. Entries that would lie
/// in the future are skipped.
async fn seed_month(
    db: &DatabaseConnection,
    owner: UserId,
    start: DateTime<Utc>,
) -> anyhow::Result<usize> {
    let repo = TransactionRepository::new(db.clone());
    let now = Utc::now();
    let mut inserted = 0;

    for (day, text, kind, cents) in MONTHLY {
        let at = start + Duration::days(day) + Duration::hours(9);
        if at > now {
            continue;
        }

        let record = TransactionDraft {
            text: Some(text.to_string()),
            amount: Some(Decimal::new(cents, 2)),
            kind: Some(kind.to_string()),
            category: None,
        }
        .validate()?;

        repo.insert_at(owner, record, at).await?;
        inserted += 1;
    }

    Ok(inserted)
}
