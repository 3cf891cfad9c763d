use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password;
use crate::db::{asset_queries, user_queries};
use crate::errors::AppError;
use crate::models::{NewUser, User, UserResponse};
use crate::validate::{LoginCredentials, SignupFields, ValidationErrors};

const LOGIN_FAILED: &str = "Invalid email or password provided.";
const EMAIL_TAKEN: &str = "Email address is already in use.";
const USERNAME_TAKEN: &str = "Username is already in use.";

/// Verify credentials against the stored hash.
pub async fn login(pool: &PgPool, credentials: LoginCredentials) -> Result<User, AppError> {
    let email = credentials.email.to_lowercase();

    let user = check_credentials(
        user_queries::find_by_email(pool, &email).await?,
        &credentials.password,
    )?;
    info!("🔓 User {} logged in", user.id);
    Ok(user)
}

/// Decide a login against the looked-up account row.
///
/// Unknown emails and wrong passwords produce the identical error, so the
/// endpoint cannot be used to discover which addresses have accounts.
fn check_credentials(candidate: Option<User>, password: &str) -> Result<User, AppError> {
    match candidate {
        Some(user) if password::verify_password(&user.hashed_password, password) => Ok(user),
        _ => {
            let mut errors = ValidationErrors::new();
            errors.add("email", LOGIN_FAILED);
            Err(errors.into())
        }
    }
}

/// Create an account from validated signup fields.
///
/// Uniqueness is checked up front so both a taken email and a taken username
/// can be reported in one response; the database constraints still back the
/// check up when two signups race past it.
pub async fn signup(pool: &PgPool, fields: SignupFields) -> Result<User, AppError> {
    let mut errors = ValidationErrors::new();
    if user_queries::email_exists(pool, &fields.email).await? {
        errors.add("email", EMAIL_TAKEN);
    }
    if user_queries::username_exists(pool, &fields.username).await? {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let hashed_password = password::hash_password(&fields.password)?;
    let user = user_queries::insert(
        pool,
        NewUser {
            first_name: fields.first_name,
            last_name: fields.last_name,
            username: fields.username,
            email: fields.email,
            hashed_password,
            buying_power: fields.buying_power,
        },
    )
    .await
    .map_err(map_unique_violation)?;

    info!("🆕 Created user {} ({})", user.id, user.username);
    Ok(user)
}

/// The session user payload: public account fields plus holdings keyed by
/// symbol and their cost basis total.
pub async fn enriched_user(pool: &PgPool, user_id: i64) -> Result<UserResponse, AppError> {
    let user = user_queries::fetch_one(pool, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let assets = asset_queries::fetch_for_user(pool, user_id).await?;
    Ok(UserResponse::enrich(user, assets))
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, AppError> {
    user_queries::fetch_all(pool).await.map_err(AppError::Db)
}

pub async fn get_user(pool: &PgPool, id: i64) -> Result<UserResponse, AppError> {
    let user = user_queries::fetch_one(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let assets = asset_queries::fetch_for_user(pool, id).await?;
    Ok(UserResponse::enrich(user, assets))
}

/// A unique violation on insert means another signup won the race after the
/// pre-checks; report it like any other taken email or username.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            let mut errors = ValidationErrors::new();
            if db_err.constraint().unwrap_or_default().contains("username") {
                errors.add("username", USERNAME_TAKEN);
            } else {
                errors.add("email", EMAIL_TAKEN);
            }
            return errors.into();
        }
    }
    warn!("Database error inserting user: {}", e);
    AppError::Db(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    fn stored_user(password: &str) -> User {
        User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            hashed_password: password::hash_password(password).unwrap(),
            buying_power: BigDecimal::from(10_000),
            created_at: Utc::now(),
        }
    }

    fn rejection_messages(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_messages(),
            other => panic!("expected a validation rejection, got {:?}", other),
        }
    }

    #[test]
    fn unknown_email_and_wrong_password_reject_identically() {
        let unknown = rejection_messages(check_credentials(None, "hunter22").unwrap_err());
        let wrong = rejection_messages(
            check_credentials(Some(stored_user("hunter22")), "hunter23").unwrap_err(),
        );

        assert_eq!(unknown, wrong);
        assert_eq!(unknown, vec!["email : Invalid email or password provided."]);
    }

    #[test]
    fn matching_password_passes_the_credential_check() {
        let user = check_credentials(Some(stored_user("hunter22")), "hunter22").unwrap();
        assert_eq!(user.id, 1);
    }
}
