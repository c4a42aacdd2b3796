//! Staff Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Staff, StaffCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "staff";

#[derive(Clone)]
pub struct StaffRepository {
    base: BaseRepository,
}

impl StaffRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all staff accounts, deactivated ones included.
    ///
    /// Deactivation gates login, not history: summaries still resolve a
    /// former cleaner's name on `last_cleaned_by` and problem reports.
    pub async fn find_all(&self) -> RepoResult<Vec<Staff>> {
        let staff: Vec<Staff> = self
            .base
            .db()
            .query("SELECT * FROM staff ORDER BY username")
            .await?
            .take(0)?;
        Ok(staff)
    }

    /// Find a staff account by username.
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<Staff>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM staff WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let staff: Vec<Staff> = result.take(0)?;
        Ok(staff.into_iter().next())
    }

    /// Create a staff account. Used by seeding only.
    ///
    /// `hash_pass` is skip_serializing on the model, so the record is
    /// written through an explicit CREATE with the hash bound directly.
    pub async fn create(&self, data: StaffCreate) -> RepoResult<Staff> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Staff '{}' already exists",
                data.username
            )));
        }

        let hash_pass = Staff::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        let display_name = data.display_name.unwrap_or_else(|| data.username.clone());

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE staff SET
                    username = $username,
                    display_name = $display_name,
                    email = $email,
                    hash_pass = $hash_pass,
                    role = $role,
                    is_active = true
                RETURN AFTER"#,
            )
            .bind(("username", data.username))
            .bind(("display_name", display_name))
            .bind(("email", data.email))
            .bind(("hash_pass", hash_pass))
            .bind(("role", data.role))
            .await?;

        let created: Option<Staff> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create staff account".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_memory, seed};

    #[tokio::test]
    async fn find_all_keeps_deactivated_accounts_for_attribution() {
        let db = connect_memory().await.unwrap();
        seed::seed_if_empty(&db).await.unwrap();

        db.query("UPDATE staff SET is_active = false WHERE username = 'maria'")
            .await
            .unwrap();

        let repo = StaffRepository::new(db);
        let staff = repo.find_all().await.unwrap();
        assert_eq!(staff.len(), 3);

        let maria = staff.iter().find(|s| s.username == "maria").unwrap();
        assert!(!maria.is_active);
        assert_eq!(maria.display_name, "Maria");
    }
}
