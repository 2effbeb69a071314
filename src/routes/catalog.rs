use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::{
    AppState, auth,
    entities::{movie, movie_info, review, user},
    error::AppResult,
    flash,
    models::{self, ReviewWithAuthor},
    templates,
};

pub async fn home(
    State(state): State<Arc<AppState>>,
    auth::MaybeUser(viewer): auth::MaybeUser,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let movies =
        movie::Entity::find().order_by_desc(movie::Column::Id).all(&state.db).await?;

    // Sidebar statistics.
    let total_movies = movie::Entity::find().count(&state.db).await?;
    let total_users = user::Entity::find().count(&state.db).await?;

    let (jar, messages) = flash::take(jar);
    let body =
        templates::home_page(viewer.as_ref(), &movies, total_movies, total_users, &messages);
    Ok((jar, Html(body)))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    auth::MaybeUser(viewer): auth::MaybeUser,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;

    // Absence of details is the normal state for freshly added movies.
    let details = movie_info::Entity::find()
        .filter(movie_info::Column::MovieId.eq(movie.id))
        .one(&state.db)
        .await?;

    let reviews: Vec<ReviewWithAuthor> = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie.id))
        .find_also_related(user::Entity)
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(review, author)| ReviewWithAuthor { review, author })
        .collect();

    let viewer_review = match viewer.as_ref() {
        Some(account) => {
            review::Entity::find()
                .filter(review::Column::MovieId.eq(movie.id))
                .filter(review::Column::UserId.eq(account.id))
                .one(&state.db)
                .await?
        }
        None => None,
    };

    let ratings: Vec<i32> = reviews.iter().map(|r| r.review.rating).collect();
    let average = models::average_rating(&ratings);

    let (jar, messages) = flash::take(jar);
    let body = templates::movie_detail_page(
        viewer.as_ref(),
        &movie,
        details.as_ref(),
        &reviews,
        viewer_review.as_ref(),
        average,
        &messages,
    );
    Ok((jar, Html(body)))
}
