//! Initial seeding
//!
//! Check-and-write provisioning executed once at startup: when the room
//! collection is empty, create the default floor (rooms 101-108 with a
//! mixed spread of statuses and one pre-reported problem); when the staff
//! collection is empty, create one account per role.
//!
//! Default passwords come from `SEED_STAFF_PASSWORD` and must be rotated
//! after first login in any real deployment.

use crate::db::models::{Problem, Room, RoomCreate, Staff, StaffCreate};
use crate::db::repository::{RepoResult, RoomRepository, StaffRepository};
use shared::models::{BaseStatus, Role};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

/// Seed rooms and staff if their collections are empty. Idempotent.
pub async fn seed_if_empty(db: &Surreal<Db>) -> RepoResult<()> {
    seed_rooms(db).await?;
    seed_staff(db).await?;
    Ok(())
}

async fn seed_rooms(db: &Surreal<Db>) -> RepoResult<()> {
    let existing: Vec<Room> = db.select("room").await.map_err(super::repository::RepoError::from)?;
    if !existing.is_empty() {
        tracing::debug!(count = existing.len(), "Rooms already provisioned, skipping seed");
        return Ok(());
    }

    let repo = RoomRepository::new(db.clone());
    let statuses = [
        BaseStatus::Dirty,
        BaseStatus::Dirty,
        BaseStatus::Dirty,
        BaseStatus::Clean,
        BaseStatus::Clean,
        BaseStatus::Occupied,
        BaseStatus::Occupied,
        BaseStatus::Dirty,
    ];

    for (index, base_status) in statuses.iter().enumerate() {
        let number = (101 + index).to_string();
        // The last seeded room carries a pre-reported problem so a fresh
        // install shows every display status the board can render.
        let problems = if index == statuses.len() - 1 {
            vec![Problem {
                id: Uuid::new_v4().to_string(),
                description: "Leaking tap".to_string(),
                reported_by: "seed".to_string(),
                reported_at: now_millis(),
                is_resolved: false,
                evidence: None,
            }]
        } else {
            Vec::new()
        };

        repo.create(
            &number,
            RoomCreate {
                base_status: *base_status,
                problems,
            },
        )
        .await?;
    }

    tracing::info!(count = statuses.len(), "Initial rooms created");
    Ok(())
}

async fn seed_staff(db: &Surreal<Db>) -> RepoResult<()> {
    let existing: Vec<Staff> = db.select("staff").await.map_err(super::repository::RepoError::from)?;
    if !existing.is_empty() {
        tracing::debug!(count = existing.len(), "Staff already provisioned, skipping seed");
        return Ok(());
    }

    let password =
        std::env::var("SEED_STAFF_PASSWORD").unwrap_or_else(|_| "changeme123".to_string());

    let repo = StaffRepository::new(db.clone());
    let accounts = [
        ("maria", "Maria", Role::Cleaner),
        ("sofia", "Sofia", Role::Supervisor),
        ("diego", "Diego", Role::Maintenance),
    ];

    for (username, display_name, role) in accounts {
        repo.create(StaffCreate {
            username: username.to_string(),
            password: password.clone(),
            display_name: Some(display_name.to_string()),
            email: Some(format!("{}@example.com", username)),
            role,
        })
        .await?;
    }

    tracing::info!("Default staff accounts created (one per role)");
    Ok(())
}
