//! User account operations.

use crate::domain::{hash_password, Role, User};
use sqlx::Row;
use std::str::FromStr;

use super::Repository;

impl Repository {
    /// Create a user with a hashed password.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including duplicate email).
    pub async fn insert_user(
        &self,
        user: &User,
        password: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(hash_password(password))
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a user by email and verify the password.
    ///
    /// Returns None for unknown email or wrong password; the two cases are
    /// indistinguishable to the caller.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| {
            let stored_hash = row.get::<String, _>("password_hash");
            if stored_hash != hash_password(password) {
                return None;
            }
            Some(User {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                role: Role::from_str(&row.get::<String, _>("role")).unwrap_or(Role::User),
            })
        }))
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, role
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            role: Role::from_str(&row.get::<String, _>("role")).unwrap_or(Role::User),
        }))
    }
}
