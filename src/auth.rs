use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::{
    AppState,
    entities::{session, user},
    error::{AppError, AppResult},
    models,
};

pub const SESSION_COOKIE: &str = "cinelog_session";
const TOKEN_LEN: usize = 48;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i32,
    ttl_days: i64,
) -> AppResult<session::Model> {
    let now = models::now_sec();

    // Opportunistic cleanup of this user's expired sessions.
    session::Entity::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .filter(session::Column::ExpiresAt.lte(now))
        .exec(db)
        .await?;

    let token: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(TOKEN_LEN).map(char::from).collect();
    let model = session::ActiveModel {
        token: Set(token),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(now + ttl_days * 86_400),
    };
    Ok(model.insert(db).await?)
}

pub async fn destroy_session(db: &DatabaseConnection, token: &str) -> AppResult<()> {
    session::Entity::delete_by_id(token.to_string()).exec(db).await?;
    Ok(())
}

pub async fn user_for_session(
    db: &DatabaseConnection,
    token: &str,
) -> AppResult<Option<user::Model>> {
    let Some(sess) = session::Entity::find_by_id(token.to_string()).one(db).await? else {
        return Ok(None);
    };
    if sess.expires_at <= models::now_sec() {
        session::Entity::delete_by_id(sess.token).exec(db).await?;
        return Ok(None);
    }
    Ok(user::Entity::find_by_id(sess.user_id).one(db).await?)
}

/// Session cookie for a fresh login. "Remember me" pins an expiry; otherwise
/// the cookie lives until the browser closes.
pub fn session_cookie(token: &str, remember: bool, ttl_days: i64) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if remember {
        builder = builder.max_age(time::Duration::days(ttl_days));
    }
    builder.build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Creates or promotes the operator account named in the environment.
pub async fn ensure_operator(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> AppResult<()> {
    match user::Entity::find().filter(user::Column::Username.eq(username)).one(db).await? {
        Some(existing) if existing.is_operator => {}
        Some(existing) => {
            let mut account: user::ActiveModel = existing.into();
            account.is_operator = Set(true);
            account.update(db).await?;
            tracing::info!(username, "promoted existing user to operator");
        }
        None => {
            let account = user::ActiveModel {
                id: Default::default(),
                username: Set(username.to_string()),
                password_hash: Set(hash_password(password)?),
                is_operator: Set(true),
                date_joined: Set(models::now_sec()),
            };
            account.insert(db).await?;
            tracing::info!(username, "created operator account");
        }
    }
    Ok(())
}

/// The signed-in user, if any. Never rejects on missing auth.
pub struct MaybeUser(pub Option<user::Model>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        Ok(Self(user_for_session(&state.db, cookie.value()).await?))
    }
}

/// Auth-required routes: anonymous requests bounce to the login form with a
/// return path.
pub struct RequireUser(pub user::Model);

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(found) =
            MaybeUser::from_request_parts(parts, state).await.map_err(IntoResponse::into_response)?;
        match found {
            Some(account) => Ok(Self(account)),
            None => {
                let next = urlencoding::encode(parts.uri.path()).into_owned();
                Err(Redirect::to(&format!("/login/?next={next}")).into_response())
            }
        }
    }
}

/// Console routes 404 for everyone who is not an operator.
pub struct RequireOperator(pub user::Model);

impl FromRequestParts<Arc<AppState>> for RequireOperator {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(found) =
            MaybeUser::from_request_parts(parts, state).await.map_err(IntoResponse::into_response)?;
        match found {
            Some(account) if account.is_operator => Ok(Self(account)),
            _ => Err(AppError::NotFound.into_response()),
        }
    }
}
