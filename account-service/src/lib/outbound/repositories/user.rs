use async_trait::async_trait;
use chrono::SubsecRound;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::models::UserName;
use crate::account::ports::UserRepository;

/// Partial unique index over active accounts, see migrations.
const EMAIL_UNIQUE_INDEX: &str = "users_email_active_key";

const USER_COLUMNS: &str =
    "id, name, email, password_hash, created_at, updated_at, deleted_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User, AccountError> {
        let column = |e: sqlx::Error| AccountError::DatabaseError(e.to_string());

        Ok(User {
            id: UserId(row.try_get("id").map_err(column)?),
            name: stored_name(row.try_get("name").map_err(column)?)?,
            email: stored_email(row.try_get("email").map_err(column)?)?,
            password_hash: row.try_get("password_hash").map_err(column)?,
            created_at: row.try_get("created_at").map_err(column)?,
            updated_at: row.try_get("updated_at").map_err(column)?,
            deleted_at: row.try_get("deleted_at").map_err(column)?,
        })
    }

    fn map_write_error(e: sqlx::Error, user: &User) -> AccountError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX) {
                return AccountError::EmailAlreadyExists(user.email.as_str().to_string());
            }
        }
        AccountError::DatabaseError(e.to_string())
    }
}

// A stored value that fails the value rules is a storage fault, not a client error
fn stored_name(name: String) -> Result<UserName, AccountError> {
    UserName::new(name)
        .map_err(|e| AccountError::DatabaseError(format!("corrupt user row: {}", e)))
}

fn stored_email(email: String) -> Result<EmailAddress, AccountError> {
    EmailAddress::new(email)
        .map_err(|e| AccountError::DatabaseError(format!("corrupt user row: {}", e)))
}

/// Round timestamps to the microsecond precision of `TIMESTAMPTZ`, so the
/// returned user matches what a later read yields.
fn to_storage_precision(user: User) -> User {
    User {
        created_at: user.created_at.trunc_subsecs(6),
        updated_at: user.updated_at.trunc_subsecs(6),
        deleted_at: user.deleted_at.map(|t| t.trunc_subsecs(6)),
        ..user
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, AccountError> {
        let user = to_storage_precision(user);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &user))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn update(&self, user: User) -> Result<User, AccountError> {
        let user = to_storage_precision(user);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, updated_at = $5
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &user))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }
}
