//! User-identity database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::UserIdentity;

impl Database {
    /// Insert a new user identity.
    pub fn insert_user(&self, user: &UserIdentity) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![user.id, user.email, user.created_at, user.updated_at],
        )?;
        Ok(())
    }

    /// Get a user identity by id.
    pub fn get_user(&self, id: &str) -> DbResult<Option<UserIdentity>> {
        self.conn
            .query_row(
                "SELECT id, email, created_at, updated_at FROM users WHERE id = ?",
                [id],
                |row| {
                    Ok(UserIdentity {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find the first user identity with the given email.
    pub fn find_user_by_email(&self, email: &str) -> DbResult<Option<UserIdentity>> {
        self.conn
            .query_row(
                "SELECT id, email, created_at, updated_at FROM users WHERE email = ? LIMIT 1",
                [email],
                |row| {
                    Ok(UserIdentity {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Change a user identity's email.
    pub fn update_user_email(&self, id: &str, email: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE users SET email = ?, updated_at = datetime('now') WHERE id = ?",
            [email, id],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find_by_email() {
        let db = Database::open_in_memory().unwrap();

        let user = UserIdentity::new("ana@example.com".into());
        db.insert_user(&user).unwrap();

        let found = db.find_user_by_email("ana@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);

        assert!(db.find_user_by_email("nadie@example.com").unwrap().is_none());
    }

    #[test]
    fn test_update_email() {
        let db = Database::open_in_memory().unwrap();

        let user = UserIdentity::new("ana@example.com".into());
        db.insert_user(&user).unwrap();

        assert!(db.update_user_email(&user.id, "ana.lopez@example.com").unwrap());

        let updated = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(updated.email, "ana.lopez@example.com");
        assert!(updated.updated_at.is_some());
    }
}
