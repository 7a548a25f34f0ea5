use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    forms::{FieldErrors, RatingForm},
    store::Movie,
    tmdb::MovieCandidate,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

/// `movies` arrives ascending by rating; the page lists rank 1 first.
pub fn home_page(movies: &[Movie], notice: Option<&str>) -> String {
    page(
        "My Top Movies",
        html! {
            div class="max-w-4xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                        p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                    }
                    a class=(BUTTON_CLASS) href="/add" { "Add Movie" }
                }

                @if let Some(notice) = notice {
                    (notice_banner(notice))
                }

                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "Nothing here yet. Add a movie to get started." }
                    }
                } @else {
                    div class="mt-10 space-y-4" {
                        @for movie in movies.iter().rev() {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(title: &str, errors: &FieldErrors) -> String {
    page(
        "Add Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { "Add a Movie" }

                    form class="mt-8 space-y-6" method="post" action="/add" novalidate {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                            input class=(INPUT_CLASS) name="title" id="title" value=(title) required;
                            (field_error(errors, "title"))
                        }
                        button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Add Movie" }
                    }
                }
            }
        },
    )
}

pub fn select_page(query: &str, candidates: &[MovieCandidate]) -> String {
    page(
        "Select Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "Select Movie" }
                        p class="mt-2 text-gray-600" { "Results for \"" (query) "\"" }
                    }
                    a class="text-sm text-blue-600 hover:text-blue-800" href="/add" { "New search" }
                }

                @if candidates.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No movies matched that title." }
                    }
                } @else {
                    ul class="mt-10 bg-white shadow rounded-lg divide-y divide-gray-100" {
                        @for candidate in candidates {
                            li class="px-6 py-4" {
                                a class="text-blue-600 hover:text-blue-800" href=(format!("/select?id={}", candidate.id)) {
                                    (candidate.title)
                                    @if let Some(date) = candidate.release_date.as_deref().filter(|d| !d.is_empty()) {
                                        span class="ml-2 text-gray-500" { "- " (date) }
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

pub fn edit_page(
    movie: &Movie,
    form: &RatingForm,
    errors: &FieldErrors,
    notice: Option<&str>,
) -> String {
    page(
        "Edit Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                    p class="mt-2 text-gray-600" { "Edit Movie Rating" }

                    @if let Some(notice) = notice {
                        (notice_banner(notice))
                    }

                    form class="mt-8 space-y-6" method="post" action=(format!("/edit?id={}", movie.id)) novalidate {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="rating" { "Your Rating Out of 10" }
                            input class=(INPUT_CLASS) name="rating" id="rating" inputmode="decimal" value=(form.rating) required;
                            (field_error(errors, "rating"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="review" { "Your Review" }
                            input class=(INPUT_CLASS) name="review" id="review" value=(form.review) required;
                            (field_error(errors, "review"))
                        }
                        button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Done" }
                    }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    page(
        heading,
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { (heading) }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn notice_banner(notice: &str) -> Markup {
    html! {
        div id="notice" class="mt-6 rounded-md bg-blue-50 px-4 py-3 text-sm text-blue-800" { (notice) }
    }
}

fn field_error(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(field) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            @if !movie.image_url.is_empty() {
                img class="w-24 rounded" src=(movie.image_url) alt=(format!("{} poster", movie.title));
            }
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(ranking) = movie.ranking {
                            span class="mr-2 text-gray-400" { "#" (ranking) }
                        }
                        (movie.title)
                        @if let Some(year) = movie.year {
                            span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                        }
                    }
                    @if let Some(rating) = movie.rating {
                        span class="text-lg font-semibold text-blue-700" { (format!("{rating:.1}")) }
                    }
                }
                @if let Some(review) = &movie.review {
                    p class="mt-1 italic text-gray-700" { "\"" (review) "\"" }
                }
                p class="mt-2 text-sm text-gray-600" { (movie.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?id={}", movie.id)) { "Delete" }
                }
            }
        }
    }
}
