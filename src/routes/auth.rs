use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::{HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use serde::Deserialize;

use crate::{
    AppState, auth,
    entities::user,
    error::AppResult,
    flash::{self, Level},
    forms::{FieldErrors, LoginForm, NON_FIELD, SignupForm},
    models, templates,
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

impl NextQuery {
    // Only same-site paths are honored as redirect targets.
    fn target(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
            _ => "/",
        }
    }
}

fn no_store(response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

pub async fn login_page(
    auth::MaybeUser(current): auth::MaybeUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(no_store(Redirect::to("/")));
    }
    let (jar, messages) = flash::take(jar);
    let body = templates::login_page(&LoginForm::default(), &FieldErrors::default(), &messages);
    Ok(no_store((jar, Html(body))))
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    auth::MaybeUser(current): auth::MaybeUser,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(no_store(Redirect::to("/")));
    }

    let username = form.username.trim().to_string();
    let mut errors = form.validate();

    let mut account = None;
    if errors.is_empty() {
        account = user::Entity::find()
            .filter(user::Column::Username.eq(username.as_str()))
            .one(&state.db)
            .await?;

        let verified = account
            .as_ref()
            .map(|u| auth::verify_password(&form.password, &u.password_hash))
            .unwrap_or(false);
        if !verified {
            account = None;
            errors.push(NON_FIELD, "Please enter a correct username and password.");
        }
    }

    let Some(account) = account else {
        tracing::debug!(username = %username, "rejected login");
        return Ok(no_store((jar, Html(templates::login_page(&form, &errors, &[])))));
    };

    let session =
        auth::create_session(&state.db, account.id, state.config.session_ttl_days).await?;
    let cookie =
        auth::session_cookie(&session.token, form.remember(), state.config.session_ttl_days);
    let jar = flash::push(
        jar.add(cookie),
        Level::Success,
        format!("Welcome back, {}!", account.username),
    );

    tracing::debug!(username = %account.username, "login");
    Ok(no_store((jar, Redirect::to(query.target()))))
}

pub async fn signup_page(
    auth::MaybeUser(current): auth::MaybeUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(no_store(Redirect::to("/")));
    }
    let (jar, messages) = flash::take(jar);
    let body = templates::signup_page(&SignupForm::default(), &FieldErrors::default(), &messages);
    Ok(no_store((jar, Html(body))))
}

pub async fn signup_submit(
    State(state): State<Arc<AppState>>,
    auth::MaybeUser(current): auth::MaybeUser,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(no_store(Redirect::to("/")));
    }

    let username = form.username.trim().to_string();
    let mut errors = form.validate();

    if errors.is_empty() {
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(username.as_str()))
            .one(&state.db)
            .await?
            .is_some();
        if taken {
            errors.push("username", "This username is already taken.");
        }
    }

    if !errors.is_empty() {
        return Ok(no_store((jar, Html(templates::signup_page(&form, &errors, &[])))));
    }

    let account = user::ActiveModel {
        id: Default::default(),
        username: Set(username),
        password_hash: Set(auth::hash_password(&form.password1)?),
        is_operator: Set(false),
        date_joined: Set(models::now_sec()),
    };
    let account = match account.insert(&state.db).await {
        Ok(account) => account,
        // Pre-check raced another signup for the same name.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            let mut errors = FieldErrors::default();
            errors.push("username", "This username is already taken.");
            return Ok(no_store((jar, Html(templates::signup_page(&form, &errors, &[])))));
        }
        Err(e) => return Err(e.into()),
    };

    let session =
        auth::create_session(&state.db, account.id, state.config.session_ttl_days).await?;
    let cookie = auth::session_cookie(&session.token, false, state.config.session_ttl_days);
    let jar = flash::push(
        jar.add(cookie),
        Level::Success,
        format!(
            "Welcome to Cinelog, {}! Your account has been created successfully.",
            account.username
        ),
    );

    tracing::debug!(username = %account.username, "signup");
    Ok(no_store((jar, Redirect::to("/"))))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth::MaybeUser(current): auth::MaybeUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let mut jar = jar;
    if let Some(account) = current {
        if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
            auth::destroy_session(&state.db, cookie.value()).await?;
        }
        jar = jar.remove(auth::clear_session_cookie());
        jar = flash::push(
            jar,
            Level::Info,
            format!("You have been logged out successfully. See you soon, {}!", account.username),
        );
        tracing::debug!(username = %account.username, "logout");
    }
    Ok((jar, Redirect::to("/")).into_response())
}
