//! User account management (admin only)

use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UserProfileRow, UserType, UserWithProfile, USER_PROFILE_SELECT};

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

fn profile_table(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Admin => "admin_profiles",
        UserType::Staff => "staff_profiles",
    }
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserWithProfile>> {
        let sql = format!("{} ORDER BY u.created_at DESC", USER_PROFILE_SELECT);
        let rows = sqlx::query_as::<_, UserProfileRow>(&sql)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(UserWithProfile::try_from).collect()
    }

    /// Create an account and its profile in one statement
    pub async fn create_user(&self, input: NewUser) -> AppResult<UserWithProfile> {
        shared::validate_new_user(&input)?;

        let email = input.email.trim().to_lowercase();
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE LOWER(email) = $1",
        )
        .bind(&email)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("User with this email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let sql = format!(
            r#"
            WITH new_user AS (
                INSERT INTO users (email, password_hash, user_type)
                VALUES ($1, $2, $3)
                RETURNING id
            )
            INSERT INTO {} (user_id, first_name, last_name, contact_number)
            SELECT id, $4, $5, $6 FROM new_user
            RETURNING user_id
            "#,
            profile_table(input.user_type)
        );

        let user_id = sqlx::query_scalar::<_, i32>(&sql)
            .bind(&email)
            .bind(&password_hash)
            .bind(input.user_type.as_str())
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.contact_number)
            .fetch_one(&self.db)
            .await?;

        tracing::info!(user_id, user_type = input.user_type.as_str(), "User created");

        let sql = format!("{} WHERE u.id = $1", USER_PROFILE_SELECT);
        let row = sqlx::query_as::<_, UserProfileRow>(&sql)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_table_by_type() {
        assert_eq!(profile_table(UserType::Admin), "admin_profiles");
        assert_eq!(profile_table(UserType::Staff), "staff_profiles");
    }
}
