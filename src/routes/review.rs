use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set, SqlErr,
};

use crate::{
    AppState,
    auth::RequireUser,
    entities::review,
    error::{AppError, AppResult},
    flash::{self, Level},
    forms::ReviewForm,
    models,
};

const ALREADY_REVIEWED: &str =
    "You have already reviewed this movie. You can edit your existing review.";

pub async fn add(
    State(state): State<Arc<AppState>>,
    RequireUser(account): RequireUser,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;
    let back = format!("/movie/{}/", movie.id);

    let existing = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie.id))
        .filter(review::Column::UserId.eq(account.id))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        let jar = flash::push(jar, Level::Error, ALREADY_REVIEWED);
        return Ok((jar, Redirect::to(&back)).into_response());
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            let jar = flash::push(jar, Level::Error, message);
            return Ok((jar, Redirect::to(&back)).into_response());
        }
    };

    let now = models::now_sec();
    let model = review::ActiveModel {
        id: Default::default(),
        user_id: Set(account.id),
        movie_id: Set(movie.id),
        rating: Set(input.rating),
        review_text: Set(input.review_text),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let jar = match model.insert(&state.db).await {
        Ok(_) => {
            tracing::debug!(user = %account.username, movie = %movie.title, "review added");
            flash::push(
                jar,
                Level::Success,
                format!("Your review for '{}' has been added successfully!", movie.title),
            )
        }
        // The unique index is the arbiter when two submissions race.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            flash::push(jar, Level::Error, ALREADY_REVIEWED)
        }
        Err(e) => return Err(e.into()),
    };

    Ok((jar, Redirect::to(&back)).into_response())
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    RequireUser(account): RequireUser,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;
    let back = format!("/movie/{}/", movie.id);

    let existing = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie.id))
        .filter(review::Column::UserId.eq(account.id))
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let jar = match form.validate() {
        Ok(input) => {
            let mut model: review::ActiveModel = existing.into();
            model.rating = Set(input.rating);
            model.review_text = Set(input.review_text);
            model.updated_at = Set(models::now_sec());
            model.update(&state.db).await?;
            flash::push(
                jar,
                Level::Success,
                format!("Your review for '{}' has been updated successfully!", movie.title),
            )
        }
        Err(message) => flash::push(jar, Level::Error, message),
    };

    Ok((jar, Redirect::to(&back)).into_response())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    RequireUser(account): RequireUser,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;
    let back = format!("/movie/{}/", movie.id);

    let existing = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie.id))
        .filter(review::Column::UserId.eq(account.id))
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    existing.delete(&state.db).await?;

    let jar = flash::push(
        jar,
        Level::Success,
        format!("Your review for '{}' has been deleted.", movie.title),
    );
    Ok((jar, Redirect::to(&back)).into_response())
}
