use crate::entities::{movie_info, review, user};

pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

pub fn format_ts(ts: i64) -> String {
    jiff::Timestamp::from_second(ts)
        .map(|t| t.to_zoned(jiff::tz::TimeZone::UTC).strftime("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Mean rating rounded to one decimal place, ties to even. Undefined (not
/// zero) for an empty slice.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i32 = ratings.iter().sum();
    Some((sum as f64 / ratings.len() as f64 * 10.0).round_ties_even() / 10.0)
}

/// First 50 characters of a description, with a trailing ellipsis when the
/// text was longer.
pub fn description_preview(description: &str) -> String {
    let mut chars = description.chars();
    let preview: String = chars.by_ref().take(50).collect();
    if chars.next().is_some() { format!("{preview}...") } else { preview }
}

/// Up to two credited actors, "..." when more are listed.
pub fn main_actors_preview(info: &movie_info::Model) -> String {
    let actors: Vec<&str> = [&info.actor1, &info.actor2, &info.actor3, &info.actor4]
        .into_iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();
    let shown = actors.iter().take(2).copied().collect::<Vec<_>>().join(", ");
    if actors.len() > 2 { format!("{shown}...") } else { shown }
}

#[derive(Clone, Debug)]
pub struct ReviewWithAuthor {
    pub review: review::Model,
    pub author: Option<user::Model>,
}

impl ReviewWithAuthor {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|u| u.username.as_str()).unwrap_or("[deleted]")
    }
}

/// Flattened row for the console's review listing.
#[derive(Clone, Debug)]
pub struct AdminReviewRow {
    pub review: review::Model,
    pub movie_title: String,
    pub username: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AdminTotals {
    pub movies: u64,
    pub movie_info: u64,
    pub reviews: u64,
    pub users: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(actors: [&str; 4]) -> movie_info::Model {
        movie_info::Model {
            id: 1,
            movie_id: 1,
            director: "Someone".to_string(),
            actor1: actors[0].to_string(),
            actor2: actors[1].to_string(),
            actor3: actors[2].to_string(),
            actor4: actors[3].to_string(),
            year: 2010,
        }
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[5]), Some(5.0));
        assert_eq!(average_rating(&[4, 5]), Some(4.5));
        assert_eq!(average_rating(&[1, 1, 2]), Some(1.3));
        assert_eq!(average_rating(&[5, 5, 5, 4]), Some(4.8));
    }

    #[test]
    fn average_rating_rounds_ties_to_even() {
        assert_eq!(average_rating(&[5, 4, 4, 4]), Some(4.2));
        assert_eq!(average_rating(&[1, 2, 2, 4]), Some(2.2));
        assert_eq!(average_rating(&[4, 3, 3, 4]), Some(3.5));
    }

    #[test]
    fn average_rating_is_undefined_without_reviews() {
        assert_eq!(average_rating(&[]), None);
    }

    #[test]
    fn short_descriptions_are_untouched() {
        assert_eq!(description_preview("A heist film."), "A heist film.");
        let exactly_50 = "x".repeat(50);
        assert_eq!(description_preview(&exactly_50), exactly_50);
    }

    #[test]
    fn long_descriptions_are_truncated_with_ellipsis() {
        let long = "y".repeat(60);
        let preview = description_preview(&long);
        assert_eq!(preview, format!("{}...", "y".repeat(50)));
    }

    #[test]
    fn description_preview_respects_char_boundaries() {
        let long = "é".repeat(60);
        assert_eq!(description_preview(&long), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn actor_preview_shows_first_two() {
        assert_eq!(main_actors_preview(&info(["A", "B", "", ""])), "A, B");
        assert_eq!(main_actors_preview(&info(["A", "B", "C", "D"])), "A, B...");
        assert_eq!(main_actors_preview(&info(["", "", "", ""])), "");
    }
}
