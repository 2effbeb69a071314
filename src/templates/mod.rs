pub mod admin;

use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::{movie, movie_info, review, user},
    flash::{Level, Message},
    forms::{FieldErrors, LoginForm, NON_FIELD, SignupForm},
    models::{self, ReviewWithAuthor},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT: &str =
    "mt-1 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub(crate) fn page(
    title: &str,
    viewer: Option<&user::Model>,
    messages: &[Message],
    body: Markup,
) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (navbar(viewer))
                (flash_list(messages))
                (body)
            }
        }
    }
    .into_string()
}

fn navbar(viewer: Option<&user::Model>) -> Markup {
    html! {
        header class="bg-white shadow" {
            div class="max-w-6xl mx-auto px-6 py-4 flex items-center justify-between" {
                a class="text-xl font-bold text-gray-900" href="/" { "Cinelog" }
                nav class="flex items-center gap-4 text-sm" {
                    @match viewer {
                        Some(account) => {
                            @if account.is_operator {
                                a class="text-gray-600 hover:text-gray-900" href="/admin/" { "Console" }
                            }
                            span class="text-gray-500" { (account.username) }
                            a class="text-blue-600 hover:text-blue-800" href="/logout/" { "Log out" }
                        },
                        None => {
                            a class="text-blue-600 hover:text-blue-800" href="/login/" { "Log in" }
                            a class="text-blue-600 hover:text-blue-800" href="/signup/" { "Sign up" }
                        },
                    }
                }
            }
        }
    }
}

fn flash_list(messages: &[Message]) -> Markup {
    html! {
        @if !messages.is_empty() {
            div class="max-w-6xl mx-auto px-6 pt-4 space-y-2" {
                @for message in messages {
                    @let tone = match message.level {
                        Level::Success => "bg-green-50 text-green-800",
                        Level::Info => "bg-blue-50 text-blue-800",
                        Level::Error => "bg-red-50 text-red-800",
                    };
                    p class=(format!("rounded-md px-4 py-2 text-sm {tone}")) { (message.text) }
                }
            }
        }
    }
}

pub(crate) fn field_error(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(field) {
            p class="mt-1 text-sm text-red-700" { (message) }
        }
    }
}

fn stars(rating: i32) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn home_page(
    viewer: Option<&user::Model>,
    movies: &[movie::Model],
    total_movies: u64,
    total_users: u64,
    messages: &[Message],
) -> String {
    page(
        "Cinelog",
        viewer,
        messages,
        html! {
            div class="max-w-6xl mx-auto px-6 py-10 grid gap-8 md:grid-cols-[1fr_240px]" {
                div {
                    h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                    @if movies.is_empty() {
                        p class="mt-6 text-gray-600" { "No movies in the catalog yet." }
                    } @else {
                        div class="mt-6 grid gap-4 sm:grid-cols-2 lg:grid-cols-3" {
                            @for entry in movies {
                                (movie_card(entry))
                            }
                        }
                    }
                }
                aside class="bg-white shadow rounded-lg p-6 h-fit" {
                    h2 class="text-sm font-semibold text-gray-700" { "Statistics" }
                    dl class="mt-3 space-y-2 text-sm text-gray-600" {
                        div class="flex justify-between" { dt { "Movies" } dd { (total_movies) } }
                        div class="flex justify-between" { dt { "Members" } dd { (total_users) } }
                    }
                }
            }
        },
    )
}

fn movie_card(entry: &movie::Model) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-md" href=(format!("/movie/{}/", entry.id)) {
            @if let Some(poster) = &entry.poster {
                img class="h-48 w-full object-cover" src=(poster) alt=(entry.title);
            } @else {
                div class="h-48 w-full bg-gray-200 flex items-center justify-center text-gray-400" { "No poster" }
            }
            div class="p-4" {
                h2 class="font-semibold text-gray-900" { (entry.title) }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn movie_detail_page(
    viewer: Option<&user::Model>,
    entry: &movie::Model,
    details: Option<&movie_info::Model>,
    reviews: &[ReviewWithAuthor],
    viewer_review: Option<&review::Model>,
    average: Option<f64>,
    messages: &[Message],
) -> String {
    page(
        &format!("{} - Cinelog", entry.title),
        viewer,
        messages,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10 space-y-6" {
                div class="bg-white shadow rounded-lg p-8 flex gap-6" {
                    @if let Some(poster) = &entry.poster {
                        img class="h-56 w-40 rounded object-cover" src=(poster) alt=(entry.title);
                    }
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { (entry.title) }
                        p class="mt-3 text-gray-700" { (entry.description) }
                    }
                }

                div class="bg-white shadow rounded-lg p-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Details" }
                    @match details {
                        Some(info) => {
                            dl class="mt-4 grid gap-2 text-sm text-gray-700 sm:grid-cols-2" {
                                div { dt class="font-medium text-gray-500" { "Director" } dd { (info.director) } }
                                div { dt class="font-medium text-gray-500" { "Year" } dd { (info.year) } }
                                div class="sm:col-span-2" {
                                    dt class="font-medium text-gray-500" { "Starring" }
                                    dd { (info.actor1) ", " (info.actor2) ", " (info.actor3) ", " (info.actor4) }
                                }
                            }
                        },
                        None => {
                            p class="mt-4 text-gray-600" { "No details available yet." }
                        },
                    }
                }

                div class="bg-white shadow rounded-lg p-8" {
                    div class="flex items-baseline justify-between" {
                        h2 class="text-xl font-semibold text-gray-900" { "Reviews (" (reviews.len()) ")" }
                        @if let Some(average) = average {
                            span class="text-sm text-gray-600" { "Average rating: " (format!("{average:.1}")) " / 5" }
                        }
                    }

                    (review_box(viewer, entry, viewer_review))

                    @if reviews.is_empty() {
                        p class="mt-6 text-gray-600" { "No reviews yet. Be the first!" }
                    } @else {
                        div class="mt-6 space-y-4" {
                            @for row in reviews {
                                div class="border-t border-gray-100 pt-4" {
                                    div class="flex items-center justify-between" {
                                        span class="font-medium text-gray-900" { (row.author_name()) }
                                        span class="text-yellow-500" { (stars(row.review.rating)) }
                                    }
                                    p class="text-xs text-gray-500" { (models::format_ts(row.review.created_at)) }
                                    @if !row.review.review_text.is_empty() {
                                        p class="mt-2 text-gray-700" { (row.review.review_text) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn review_box(
    viewer: Option<&user::Model>,
    entry: &movie::Model,
    viewer_review: Option<&review::Model>,
) -> Markup {
    if viewer.is_none() {
        return html! {
            p class="mt-4 text-sm text-gray-600" {
                a class="text-blue-600 hover:text-blue-800"
                    href=(format!("/login/?next=/movie/{}/", entry.id)) { "Log in" }
                " to review this movie."
            }
        };
    }

    match viewer_review {
        Some(own) => html! {
            div class="mt-4 rounded-md border border-gray-200 p-4" {
                h3 class="text-sm font-semibold text-gray-700" { "Your review" }
                form class="mt-3" method="post" action=(format!("/movie/{}/review/edit/", entry.id)) {
                    (rating_fields(own.rating, &own.review_text))
                    button class="mt-3 rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Update review" }
                }
                form class="mt-2" method="post" action=(format!("/movie/{}/review/delete/", entry.id)) {
                    button class="text-sm text-red-600 hover:text-red-800" type="submit" { "Delete review" }
                }
            }
        },
        None => html! {
            div class="mt-4 rounded-md border border-gray-200 p-4" {
                h3 class="text-sm font-semibold text-gray-700" { "Add your review" }
                form class="mt-3" method="post" action=(format!("/movie/{}/review/add/", entry.id)) {
                    (rating_fields(5, ""))
                    button class="mt-3 rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Post review" }
                }
            }
        },
    }
}

fn rating_fields(rating: i32, text: &str) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for="rating" { "Rating" }
            select class="mt-1 rounded-md border border-gray-300 px-3 py-2" name="rating" id="rating" {
                @for value in 1..=5 {
                    option value=(value) selected[value == rating] {
                        (value) @if value == 1 { " Star" } @else { " Stars" }
                    }
                }
            }
        }
        div class="mt-3" {
            label class="block text-sm font-medium text-gray-700" for="review_text" { "Share your thoughts about this movie" }
            textarea class="mt-1 w-full rounded-md border border-gray-300 px-3 py-2" name="review_text" id="review_text" rows="3" { (text) }
        }
    }
}

pub fn login_page(form: &LoginForm, errors: &FieldErrors, messages: &[Message]) -> String {
    page(
        "Login to Cinelog",
        None,
        messages,
        html! {
            div class="max-w-md mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Log in" }
                    @if let Some(message) = errors.get(NON_FIELD) {
                        p class="mt-4 rounded-md bg-red-50 px-3 py-2 text-sm text-red-700" { (message) }
                    }
                    form class="mt-6 space-y-4" method="post" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                            input class=(INPUT) type="text" name="username" id="username" value=(form.username) autofocus;
                            (field_error(errors, "username"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                            input class=(INPUT) type="password" name="password" id="password";
                            (field_error(errors, "password"))
                        }
                        div class="flex items-center gap-2" {
                            input class="rounded border-gray-300" type="checkbox" name="remember_me" id="remember_me" checked[form.remember()];
                            label class="text-sm text-gray-700" for="remember_me" { "Remember me" }
                        }
                        button class=(BUTTON) type="submit" { "Log in" }
                    }
                    p class="mt-4 text-sm text-gray-600" {
                        "New here? "
                        a class="text-blue-600 hover:text-blue-800" href="/signup/" { "Create an account" }
                    }
                }
            }
        },
    )
}

pub fn signup_page(form: &SignupForm, errors: &FieldErrors, messages: &[Message]) -> String {
    page(
        "Join Cinelog",
        None,
        messages,
        html! {
            div class="max-w-md mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Create an account" }
                    form class="mt-6 space-y-4" method="post" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                            input class=(INPUT) type="text" name="username" id="username" value=(form.username) autofocus;
                            (field_error(errors, "username"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password1" { "Password" }
                            input class=(INPUT) type="password" name="password1" id="password1";
                            (field_error(errors, "password1"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password2" { "Confirm password" }
                            input class=(INPUT) type="password" name="password2" id="password2";
                            (field_error(errors, "password2"))
                        }
                        button class=(BUTTON) type="submit" { "Sign up" }
                    }
                    p class="mt-4 text-sm text-gray-600" {
                        "Already have an account? "
                        a class="text-blue-600 hover:text-blue-800" href="/login/" { "Log in" }
                    }
                }
            }
        },
    )
}

pub fn not_found_page() -> String {
    page(
        "Not found",
        None,
        &[],
        html! {
            div class="max-w-xl mx-auto px-6 py-16" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Not found" }
                    p class="mt-4 text-gray-700" { "The page you were looking for does not exist." }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        None,
        &[],
        html! {
            div class="max-w-xl mx-auto px-6 py-16" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Error" }
                    p class="mt-4 text-gray-700" { (message) }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}
