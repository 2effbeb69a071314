use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::RequireOperator,
    entities::{movie, movie_info, review, user},
    error::{AppError, AppResult},
    flash::{self, Level},
    forms::{FieldErrors, MovieForm, MovieInfoForm, ReviewForm},
    models::{self, AdminReviewRow, AdminTotals},
    templates,
};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewFilter {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    movie: Option<String>,
    #[serde(default)]
    since: Option<String>,
}

fn text_filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn int_filter(value: &Option<String>) -> Option<i32> {
    text_filter(value).and_then(|v| v.parse().ok())
}

fn date_filter(value: &Option<String>) -> Option<i64> {
    let date = text_filter(value)?.parse::<jiff::civil::Date>().ok()?;
    let zoned = date.to_zoned(jiff::tz::TimeZone::UTC).ok()?;
    Some(zoned.timestamp().as_second())
}

fn echo(value: &Option<String>) -> &str {
    text_filter(value).unwrap_or("")
}

async fn info_or_404(db: &DatabaseConnection, id: i32) -> AppResult<movie_info::Model> {
    movie_info::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)
}

async fn review_or_404(db: &DatabaseConnection, id: i32) -> AppResult<review::Model> {
    review::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let totals = AdminTotals {
        movies: movie::Entity::find().count(&state.db).await?,
        movie_info: movie_info::Entity::find().count(&state.db).await?,
        reviews: review::Entity::find().count(&state.db).await?,
        users: user::Entity::find().count(&state.db).await?,
    };
    let (jar, messages) = flash::take(jar);
    Ok((jar, Html(templates::admin::dashboard(&operator, &totals, &messages))))
}

pub async fn movie_list(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Query(filter): Query<CatalogFilter>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let mut select = movie::Entity::find().order_by_desc(movie::Column::Id);
    if let Some(term) = text_filter(&filter.q) {
        select = select.filter(
            Condition::any()
                .add(movie::Column::Title.contains(term))
                .add(movie::Column::Description.contains(term)),
        );
    }
    if let Some(year) = int_filter(&filter.year) {
        select = select
            .join(JoinType::InnerJoin, movie::Relation::MovieInfo.def())
            .filter(movie_info::Column::Year.eq(year));
    }
    let movies = select.all(&state.db).await?;

    let detail_ids: HashSet<i32> = movie_info::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|info| info.movie_id)
        .collect();

    let (jar, messages) = flash::take(jar);
    let body = templates::admin::movie_list(
        &operator,
        &movies,
        &detail_ids,
        echo(&filter.q),
        echo(&filter.year),
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn movie_new(
    RequireOperator(operator): RequireOperator,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let (jar, messages) = flash::take(jar);
    let body = templates::admin::movie_form(
        &operator,
        "Add movie",
        "/admin/movies/new/",
        &MovieForm::default(),
        &FieldErrors::default(),
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn movie_create(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    jar: CookieJar,
    Form(form): Form<MovieForm>,
) -> AppResult<Response> {
    let mut errors = form.validate();

    if errors.is_empty() {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(form.title.trim().to_string()),
            description: Set(form.description.trim().to_string()),
            poster: Set(form.poster_value()),
        };
        match model.insert(&state.db).await {
            Ok(created) => {
                let jar = flash::push(
                    jar,
                    Level::Success,
                    format!("Added movie '{}'.", created.title),
                );
                return Ok((jar, Redirect::to("/admin/movies/")).into_response());
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                errors.push("title", "A movie with this title already exists.");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let body = templates::admin::movie_form(
        &operator,
        "Add movie",
        "/admin/movies/new/",
        &form,
        &errors,
        &[],
    );
    Ok((jar, Html(body)).into_response())
}

pub async fn movie_edit(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;
    let (jar, messages) = flash::take(jar);
    let body = templates::admin::movie_form(
        &operator,
        "Edit movie",
        &format!("/admin/movies/{}/edit/", movie.id),
        &MovieForm::from_model(&movie),
        &FieldErrors::default(),
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn movie_update(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<MovieForm>,
) -> AppResult<Response> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;
    let mut errors = form.validate();

    if errors.is_empty() {
        let mut model: movie::ActiveModel = movie.clone().into();
        model.title = Set(form.title.trim().to_string());
        model.description = Set(form.description.trim().to_string());
        model.poster = Set(form.poster_value());
        match model.update(&state.db).await {
            Ok(updated) => {
                let jar = flash::push(
                    jar,
                    Level::Success,
                    format!("Updated movie '{}'.", updated.title),
                );
                return Ok((jar, Redirect::to("/admin/movies/")).into_response());
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                errors.push("title", "A movie with this title already exists.");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let body = templates::admin::movie_form(
        &operator,
        "Edit movie",
        &format!("/admin/movies/{}/edit/", movie.id),
        &form,
        &errors,
        &[],
    );
    Ok((jar, Html(body)).into_response())
}

pub async fn movie_delete(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(movie_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let movie = super::movie_or_404(&state.db, movie_id).await?;

    let txn = state.db.begin().await?;
    review::Entity::delete_many()
        .filter(review::Column::MovieId.eq(movie.id))
        .exec(&txn)
        .await?;
    movie_info::Entity::delete_many()
        .filter(movie_info::Column::MovieId.eq(movie.id))
        .exec(&txn)
        .await?;
    movie::Entity::delete_by_id(movie.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::debug!(operator = %operator.username, movie = %movie.title, "movie deleted");
    let jar = flash::push(jar, Level::Success, format!("Deleted movie '{}'.", movie.title));
    Ok((jar, Redirect::to("/admin/movies/")).into_response())
}

pub async fn movie_info_list(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Query(filter): Query<CatalogFilter>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let mut select = movie_info::Entity::find()
        .find_also_related(movie::Entity)
        .order_by_desc(movie_info::Column::Id);
    if let Some(term) = text_filter(&filter.q) {
        select = select.filter(
            Condition::any()
                .add(movie::Column::Title.contains(term))
                .add(movie_info::Column::Director.contains(term))
                .add(movie_info::Column::Actor1.contains(term))
                .add(movie_info::Column::Actor2.contains(term))
                .add(movie_info::Column::Actor3.contains(term))
                .add(movie_info::Column::Actor4.contains(term)),
        );
    }
    if let Some(year) = int_filter(&filter.year) {
        select = select.filter(movie_info::Column::Year.eq(year));
    }
    let rows = select.all(&state.db).await?;

    let (jar, messages) = flash::take(jar);
    let body = templates::admin::movie_info_list(
        &operator,
        &rows,
        echo(&filter.q),
        echo(&filter.year),
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn movie_info_new(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let movies =
        movie::Entity::find().order_by_asc(movie::Column::Title).all(&state.db).await?;
    let (jar, messages) = flash::take(jar);
    let body = templates::admin::movie_info_form(
        &operator,
        "Add movie details",
        "/admin/movie-info/new/",
        &movies,
        &MovieInfoForm::default(),
        &FieldErrors::default(),
        true,
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn movie_info_create(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    jar: CookieJar,
    Form(form): Form<MovieInfoForm>,
) -> AppResult<Response> {
    let (mut errors, year) = form.validate();

    let movie_id = match form.movie.trim().parse::<i32>() {
        Ok(id) => movie::Entity::find_by_id(id).one(&state.db).await?.map(|m| m.id),
        Err(_) => None,
    };
    if movie_id.is_none() {
        errors.push("movie", "Select a valid movie.");
    }

    if let (true, Some(movie_id), Some(year)) = (errors.is_empty(), movie_id, year) {
        let model = movie_info::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            director: Set(form.director.trim().to_string()),
            actor1: Set(form.actor1.trim().to_string()),
            actor2: Set(form.actor2.trim().to_string()),
            actor3: Set(form.actor3.trim().to_string()),
            actor4: Set(form.actor4.trim().to_string()),
            year: Set(year),
        };
        model.insert(&state.db).await?;
        let jar = flash::push(jar, Level::Success, "Added movie details.");
        return Ok((jar, Redirect::to("/admin/movie-info/")).into_response());
    }

    let movies =
        movie::Entity::find().order_by_asc(movie::Column::Title).all(&state.db).await?;
    let body = templates::admin::movie_info_form(
        &operator,
        "Add movie details",
        "/admin/movie-info/new/",
        &movies,
        &form,
        &errors,
        true,
        &[],
    );
    Ok((jar, Html(body)).into_response())
}

pub async fn movie_info_edit(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(info_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let info = info_or_404(&state.db, info_id).await?;
    let movies =
        movie::Entity::find().order_by_asc(movie::Column::Title).all(&state.db).await?;
    let (jar, messages) = flash::take(jar);
    let body = templates::admin::movie_info_form(
        &operator,
        "Edit movie details",
        &format!("/admin/movie-info/{}/edit/", info.id),
        &movies,
        &MovieInfoForm::from_model(&info),
        &FieldErrors::default(),
        false,
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn movie_info_update(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(info_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<MovieInfoForm>,
) -> AppResult<Response> {
    let info = info_or_404(&state.db, info_id).await?;
    let (errors, year) = form.validate();

    if let (true, Some(year)) = (errors.is_empty(), year) {
        let mut model: movie_info::ActiveModel = info.into();
        model.director = Set(form.director.trim().to_string());
        model.actor1 = Set(form.actor1.trim().to_string());
        model.actor2 = Set(form.actor2.trim().to_string());
        model.actor3 = Set(form.actor3.trim().to_string());
        model.actor4 = Set(form.actor4.trim().to_string());
        model.year = Set(year);
        model.update(&state.db).await?;
        let jar = flash::push(jar, Level::Success, "Updated movie details.");
        return Ok((jar, Redirect::to("/admin/movie-info/")).into_response());
    }

    let movies =
        movie::Entity::find().order_by_asc(movie::Column::Title).all(&state.db).await?;
    let body = templates::admin::movie_info_form(
        &operator,
        "Edit movie details",
        &format!("/admin/movie-info/{}/edit/", info_id),
        &movies,
        &form,
        &errors,
        false,
        &[],
    );
    Ok((jar, Html(body)).into_response())
}

pub async fn movie_info_delete(
    State(state): State<Arc<AppState>>,
    RequireOperator(_operator): RequireOperator,
    Path(info_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let info = info_or_404(&state.db, info_id).await?;
    info.delete(&state.db).await?;
    let jar = flash::push(jar, Level::Success, "Deleted movie details.");
    Ok((jar, Redirect::to("/admin/movie-info/")).into_response())
}

pub async fn review_list(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Query(filter): Query<ReviewFilter>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let mut select = review::Entity::find()
        .find_also_related(movie::Entity)
        .order_by_desc(review::Column::CreatedAt);
    if let Some(rating) = int_filter(&filter.rating) {
        select = select.filter(review::Column::Rating.eq(rating));
    }
    if let Some(movie_id) = int_filter(&filter.movie) {
        select = select.filter(review::Column::MovieId.eq(movie_id));
    }
    if let Some(since) = date_filter(&filter.since) {
        select = select.filter(review::Column::CreatedAt.gte(since));
    }
    if let Some(term) = text_filter(&filter.q) {
        select = select
            .join(JoinType::InnerJoin, review::Relation::User.def())
            .filter(
                Condition::any()
                    .add(movie::Column::Title.contains(term))
                    .add(user::Column::Username.contains(term)),
            );
    }
    let rows = select.all(&state.db).await?;

    let user_ids: Vec<i32> = rows.iter().map(|(r, _)| r.user_id).collect();
    let usernames: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let rows: Vec<AdminReviewRow> = rows
        .into_iter()
        .map(|(review, movie)| AdminReviewRow {
            movie_title: movie.map(|m| m.title).unwrap_or_default(),
            username: usernames
                .get(&review.user_id)
                .cloned()
                .unwrap_or_else(|| "[deleted]".to_string()),
            review,
        })
        .collect();

    // Movie dropdown for the filter bar.
    let movies =
        movie::Entity::find().order_by_asc(movie::Column::Title).all(&state.db).await?;

    let (jar, messages) = flash::take(jar);
    let body = templates::admin::review_list(
        &operator,
        &rows,
        &movies,
        echo(&filter.q),
        echo(&filter.rating),
        echo(&filter.movie),
        echo(&filter.since),
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn review_edit(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(review_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let row = review_or_404(&state.db, review_id).await?;
    let movie_title = movie::Entity::find_by_id(row.movie_id)
        .one(&state.db)
        .await?
        .map(|m| m.title)
        .unwrap_or_default();
    let username = user::Entity::find_by_id(row.user_id)
        .one(&state.db)
        .await?
        .map(|u| u.username)
        .unwrap_or_else(|| "[deleted]".to_string());

    let form =
        ReviewForm { rating: row.rating.to_string(), review_text: row.review_text.clone() };
    let (jar, messages) = flash::take(jar);
    let body = templates::admin::review_form(
        &operator,
        &row,
        &movie_title,
        &username,
        &form,
        None,
        &messages,
    );
    Ok((jar, Html(body)))
}

pub async fn review_update(
    State(state): State<Arc<AppState>>,
    RequireOperator(operator): RequireOperator,
    Path(review_id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let row = review_or_404(&state.db, review_id).await?;

    match form.validate() {
        Ok(input) => {
            let mut model: review::ActiveModel = row.into();
            model.rating = Set(input.rating);
            model.review_text = Set(input.review_text);
            model.updated_at = Set(models::now_sec());
            model.update(&state.db).await?;
            let jar = flash::push(jar, Level::Success, "Review updated.");
            Ok((jar, Redirect::to("/admin/reviews/")).into_response())
        }
        Err(message) => {
            let movie_title = movie::Entity::find_by_id(row.movie_id)
                .one(&state.db)
                .await?
                .map(|m| m.title)
                .unwrap_or_default();
            let username = user::Entity::find_by_id(row.user_id)
                .one(&state.db)
                .await?
                .map(|u| u.username)
                .unwrap_or_else(|| "[deleted]".to_string());
            let body = templates::admin::review_form(
                &operator,
                &row,
                &movie_title,
                &username,
                &form,
                Some(message),
                &[],
            );
            Ok((jar, Html(body)).into_response())
        }
    }
}

pub async fn review_delete(
    State(state): State<Arc<AppState>>,
    RequireOperator(_operator): RequireOperator,
    Path(review_id): Path<i32>,
    jar: CookieJar,
) -> AppResult<Response> {
    let row = review_or_404(&state.db, review_id).await?;
    row.delete(&state.db).await?;
    let jar = flash::push(jar, Level::Success, "Review deleted.");
    Ok((jar, Redirect::to("/admin/reviews/")).into_response())
}
