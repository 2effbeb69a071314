use std::collections::HashSet;

use maud::{Markup, html};

use crate::{
    entities::{movie, movie_info, review, user},
    flash::Message,
    forms::{FieldErrors, MovieForm, MovieInfoForm, ReviewForm},
    models::{self, AdminReviewRow, AdminTotals},
};

use super::{field_error, page};

const INPUT: &str = "mt-1 w-full rounded-md border border-gray-300 px-3 py-2";
const FILTER_INPUT: &str = "rounded-md border border-gray-300 px-3 py-1.5 text-sm";
const SUBMIT: &str =
    "rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700";
const TH: &str = "px-4 py-2 text-left text-xs font-semibold uppercase text-gray-500";
const TD: &str = "px-4 py-2 text-sm text-gray-700";

fn shell(title: &str, operator: &user::Model, messages: &[Message], body: Markup) -> String {
    page(
        title,
        Some(operator),
        messages,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10" {
                div class="flex items-center justify-between" {
                    h1 class="text-3xl font-bold text-gray-900" { "Console" }
                    nav class="flex gap-4 text-sm" {
                        a class="text-blue-600 hover:text-blue-800" href="/admin/" { "Dashboard" }
                        a class="text-blue-600 hover:text-blue-800" href="/admin/movies/" { "Movies" }
                        a class="text-blue-600 hover:text-blue-800" href="/admin/movie-info/" { "Movie details" }
                        a class="text-blue-600 hover:text-blue-800" href="/admin/reviews/" { "Reviews" }
                    }
                }
                div class="mt-8" { (body) }
            }
        },
    )
}

fn bool_mark(value: bool) -> Markup {
    html! {
        @if value {
            span class="text-green-600" { "yes" }
        } @else {
            span class="text-gray-400" { "no" }
        }
    }
}

pub fn dashboard(operator: &user::Model, totals: &AdminTotals, messages: &[Message]) -> String {
    shell(
        "Console - Cinelog",
        operator,
        messages,
        html! {
            div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-4" {
                (stat_card("Movies", totals.movies))
                (stat_card("Movie details", totals.movie_info))
                (stat_card("Reviews", totals.reviews))
                (stat_card("Users", totals.users))
            }
        },
    )
}

fn stat_card(label: &str, value: u64) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            p class="text-sm text-gray-500" { (label) }
            p class="mt-1 text-3xl font-bold text-gray-900" { (value) }
        }
    }
}

pub fn movie_list(
    operator: &user::Model,
    movies: &[movie::Model],
    detail_ids: &HashSet<i32>,
    q: &str,
    year: &str,
    messages: &[Message],
) -> String {
    shell(
        "Movies - Console",
        operator,
        messages,
        html! {
            div class="flex items-center justify-between" {
                form class="flex gap-2" method="get" action="/admin/movies/" {
                    input class=(FILTER_INPUT) type="text" name="q" value=(q) placeholder="Search title or description";
                    input class=(FILTER_INPUT) type="text" name="year" value=(year) placeholder="Year";
                    button class=(SUBMIT) type="submit" { "Filter" }
                }
                a class=(SUBMIT) href="/admin/movies/new/" { "Add movie" }
            }

            div class="mt-6 bg-white shadow rounded-lg overflow-x-auto" {
                table class="min-w-full divide-y divide-gray-200" {
                    thead {
                        tr {
                            th class=(TH) { "Title" }
                            th class=(TH) { "Description" }
                            th class=(TH) { "Has poster" }
                            th class=(TH) { "Has details" }
                            th class=(TH) { "" }
                        }
                    }
                    tbody class="divide-y divide-gray-100" {
                        @for entry in movies {
                            tr {
                                td class=(TD) {
                                    a class="text-blue-600 hover:text-blue-800" href=(format!("/movie/{}/", entry.id)) { (entry.title) }
                                }
                                td class=(TD) { (models::description_preview(&entry.description)) }
                                td class=(TD) { (bool_mark(entry.poster.is_some())) }
                                td class=(TD) { (bool_mark(detail_ids.contains(&entry.id))) }
                                td class=(TD) {
                                    div class="flex items-center gap-3" {
                                        a class="text-blue-600 hover:text-blue-800" href=(format!("/admin/movies/{}/edit/", entry.id)) { "Edit" }
                                        form method="post" action=(format!("/admin/movies/{}/delete/", entry.id)) {
                                            button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                                        }
                                    }
                                }
                            }
                        }
                        @if movies.is_empty() {
                            tr { td class=(TD) colspan="5" { "No movies matched." } }
                        }
                    }
                }
            }
        },
    )
}

pub fn movie_form(
    operator: &user::Model,
    heading: &str,
    action: &str,
    form: &MovieForm,
    errors: &FieldErrors,
    messages: &[Message],
) -> String {
    shell(
        heading,
        operator,
        messages,
        html! {
            div class="max-w-xl bg-white shadow rounded-lg p-8" {
                h2 class="text-xl font-semibold text-gray-900" { (heading) }
                form class="mt-6 space-y-4" method="post" action=(action) {
                    div {
                        label class="block text-sm font-medium text-gray-700" for="title" { "Title" }
                        input class=(INPUT) type="text" name="title" id="title" value=(form.title);
                        (field_error(errors, "title"))
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="description" { "Description" }
                        textarea class=(INPUT) name="description" id="description" rows="5" { (form.description) }
                        (field_error(errors, "description"))
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="poster" { "Poster reference" }
                        input class=(INPUT) type="text" name="poster" id="poster" value=(form.poster) placeholder="https://... (optional)";
                        (field_error(errors, "poster"))
                    }
                    button class=(SUBMIT) type="submit" { "Save" }
                }
            }
        },
    )
}

pub fn movie_info_list(
    operator: &user::Model,
    rows: &[(movie_info::Model, Option<movie::Model>)],
    q: &str,
    year: &str,
    messages: &[Message],
) -> String {
    shell(
        "Movie details - Console",
        operator,
        messages,
        html! {
            div class="flex items-center justify-between" {
                form class="flex gap-2" method="get" action="/admin/movie-info/" {
                    input class=(FILTER_INPUT) type="text" name="q" value=(q) placeholder="Search movie, director, actor";
                    input class=(FILTER_INPUT) type="text" name="year" value=(year) placeholder="Year";
                    button class=(SUBMIT) type="submit" { "Filter" }
                }
                a class=(SUBMIT) href="/admin/movie-info/new/" { "Add details" }
            }

            div class="mt-6 bg-white shadow rounded-lg overflow-x-auto" {
                table class="min-w-full divide-y divide-gray-200" {
                    thead {
                        tr {
                            th class=(TH) { "Movie" }
                            th class=(TH) { "Director" }
                            th class=(TH) { "Year" }
                            th class=(TH) { "Main actors" }
                            th class=(TH) { "" }
                        }
                    }
                    tbody class="divide-y divide-gray-100" {
                        @for (info, entry) in rows {
                            tr {
                                td class=(TD) {
                                    @match entry {
                                        Some(m) => { (m.title) },
                                        None => { "-" },
                                    }
                                }
                                td class=(TD) { (info.director) }
                                td class=(TD) { (info.year) }
                                td class=(TD) { (models::main_actors_preview(info)) }
                                td class=(TD) {
                                    div class="flex items-center gap-3" {
                                        a class="text-blue-600 hover:text-blue-800" href=(format!("/admin/movie-info/{}/edit/", info.id)) { "Edit" }
                                        form method="post" action=(format!("/admin/movie-info/{}/delete/", info.id)) {
                                            button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                                        }
                                    }
                                }
                            }
                        }
                        @if rows.is_empty() {
                            tr { td class=(TD) colspan="5" { "No movie details matched." } }
                        }
                    }
                }
            }
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub fn movie_info_form(
    operator: &user::Model,
    heading: &str,
    action: &str,
    movies: &[movie::Model],
    form: &MovieInfoForm,
    errors: &FieldErrors,
    movie_selectable: bool,
    messages: &[Message],
) -> String {
    shell(
        heading,
        operator,
        messages,
        html! {
            div class="max-w-xl bg-white shadow rounded-lg p-8" {
                h2 class="text-xl font-semibold text-gray-900" { (heading) }
                form class="mt-6 space-y-4" method="post" action=(action) {
                    @if movie_selectable {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="movie" { "Movie" }
                            select class=(INPUT) name="movie" id="movie" {
                                option value="" { "Select a movie" }
                                @for entry in movies {
                                    option value=(entry.id) selected[form.movie == entry.id.to_string()] { (entry.title) }
                                }
                            }
                            (field_error(errors, "movie"))
                        }
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="director" { "Director" }
                        input class=(INPUT) type="text" name="director" id="director" value=(form.director);
                        (field_error(errors, "director"))
                    }
                    div class="grid gap-4 sm:grid-cols-2" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="actor1" { "Actor 1" }
                            input class=(INPUT) type="text" name="actor1" id="actor1" value=(form.actor1);
                            (field_error(errors, "actor1"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="actor2" { "Actor 2" }
                            input class=(INPUT) type="text" name="actor2" id="actor2" value=(form.actor2);
                            (field_error(errors, "actor2"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="actor3" { "Actor 3" }
                            input class=(INPUT) type="text" name="actor3" id="actor3" value=(form.actor3);
                            (field_error(errors, "actor3"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="actor4" { "Actor 4" }
                            input class=(INPUT) type="text" name="actor4" id="actor4" value=(form.actor4);
                            (field_error(errors, "actor4"))
                        }
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="year" { "Release year" }
                        input class=(INPUT) type="text" name="year" id="year" value=(form.year);
                        (field_error(errors, "year"))
                    }
                    button class=(SUBMIT) type="submit" { "Save" }
                }
            }
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub fn review_list(
    operator: &user::Model,
    rows: &[AdminReviewRow],
    movies: &[movie::Model],
    q: &str,
    rating: &str,
    movie_filter: &str,
    since: &str,
    messages: &[Message],
) -> String {
    shell(
        "Reviews - Console",
        operator,
        messages,
        html! {
            form class="flex flex-wrap gap-2" method="get" action="/admin/reviews/" {
                input class=(FILTER_INPUT) type="text" name="q" value=(q) placeholder="Search movie or user";
                select class=(FILTER_INPUT) name="rating" {
                    option value="" { "Any rating" }
                    @for value in 1..=5 {
                        option value=(value) selected[rating == value.to_string()] { (value) }
                    }
                }
                select class=(FILTER_INPUT) name="movie" {
                    option value="" { "Any movie" }
                    @for entry in movies {
                        option value=(entry.id) selected[movie_filter == entry.id.to_string()] { (entry.title) }
                    }
                }
                input class=(FILTER_INPUT) type="date" name="since" value=(since);
                button class=(SUBMIT) type="submit" { "Filter" }
            }

            div class="mt-6 bg-white shadow rounded-lg overflow-x-auto" {
                table class="min-w-full divide-y divide-gray-200" {
                    thead {
                        tr {
                            th class=(TH) { "Movie" }
                            th class=(TH) { "User" }
                            th class=(TH) { "Rating" }
                            th class=(TH) { "Created" }
                            th class=(TH) { "" }
                        }
                    }
                    tbody class="divide-y divide-gray-100" {
                        @for row in rows {
                            tr {
                                td class=(TD) { (row.movie_title) }
                                td class=(TD) { (row.username) }
                                td class=(TD) { (row.review.rating) "/5" }
                                td class=(TD) { (models::format_ts(row.review.created_at)) }
                                td class=(TD) {
                                    div class="flex items-center gap-3" {
                                        a class="text-blue-600 hover:text-blue-800" href=(format!("/admin/reviews/{}/edit/", row.review.id)) { "Edit" }
                                        form method="post" action=(format!("/admin/reviews/{}/delete/", row.review.id)) {
                                            button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                                        }
                                    }
                                }
                            }
                        }
                        @if rows.is_empty() {
                            tr { td class=(TD) colspan="5" { "No reviews matched." } }
                        }
                    }
                }
            }
        },
    )
}

pub fn review_form(
    operator: &user::Model,
    row: &review::Model,
    movie_title: &str,
    username: &str,
    form: &ReviewForm,
    error: Option<&str>,
    messages: &[Message],
) -> String {
    let rating: i32 = form.rating.trim().parse().unwrap_or(0);
    shell(
        "Edit review - Console",
        operator,
        messages,
        html! {
            div class="max-w-xl bg-white shadow rounded-lg p-8" {
                h2 class="text-xl font-semibold text-gray-900" { "Edit review" }
                dl class="mt-4 grid gap-2 text-sm text-gray-600 sm:grid-cols-2" {
                    div { dt class="font-medium text-gray-500" { "Movie" } dd { (movie_title) } }
                    div { dt class="font-medium text-gray-500" { "User" } dd { (username) } }
                    div { dt class="font-medium text-gray-500" { "Created" } dd { (models::format_ts(row.created_at)) } }
                    div { dt class="font-medium text-gray-500" { "Updated" } dd { (models::format_ts(row.updated_at)) } }
                }
                @if let Some(message) = error {
                    p class="mt-4 rounded-md bg-red-50 px-3 py-2 text-sm text-red-700" { (message) }
                }
                form class="mt-6 space-y-4" method="post" action=(format!("/admin/reviews/{}/edit/", row.id)) {
                    div {
                        label class="block text-sm font-medium text-gray-700" for="rating" { "Rating" }
                        select class=(INPUT) name="rating" id="rating" {
                            @for value in 1..=5 {
                                option value=(value) selected[value == rating] { (value) }
                            }
                        }
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="review_text" { "Review text" }
                        textarea class=(INPUT) name="review_text" id="review_text" rows="4" { (form.review_text) }
                    }
                    button class=(SUBMIT) type="submit" { "Save" }
                }
            }
        },
    )
}
