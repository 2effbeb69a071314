use serde::Deserialize;

use crate::entities::{movie, movie_info};

/// Key used for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

#[derive(Clone, Debug, Default)]
pub struct FieldErrors {
    entries: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.entries.push((field, message.into()));
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.iter().find(|(f, _)| *f == field).map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("This field is required.");
    }
    if username.chars().count() > 150 {
        return Err("Ensure this value has at most 150 characters.");
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(c)) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    Ok(())
}

pub fn validate_password(username: &str, password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("This password is too short. It must contain at least 8 characters.");
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("This password is entirely numeric.");
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        return Err("The password is too similar to the username.");
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    // Checkboxes post "on" or nothing at all.
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        self.remember_me.is_some()
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.username.trim().is_empty() {
            errors.push("username", "This field is required.");
        }
        if self.password.is_empty() {
            errors.push("password", "This field is required.");
        }
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        let username = self.username.trim();

        if let Err(message) = validate_username(username) {
            errors.push("username", message);
        }
        if let Err(message) = validate_password(username, &self.password1) {
            errors.push("password1", message);
        }
        if self.password2.is_empty() {
            errors.push("password2", "This field is required.");
        } else if self.password1 != self.password2 {
            errors.push("password2", "The two password fields didn't match.");
        }
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review_text: String,
}

#[derive(Clone, Debug)]
pub struct ReviewInput {
    pub rating: i32,
    pub review_text: String,
}

impl ReviewForm {
    pub fn validate(&self) -> Result<ReviewInput, &'static str> {
        let rating = self
            .rating
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or("Select a rating between 1 and 5.")?;
        Ok(ReviewInput { rating, review_text: self.review_text.trim().to_string() })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poster: String,
}

impl MovieForm {
    pub fn from_model(model: &movie::Model) -> Self {
        Self {
            title: model.title.clone(),
            description: model.description.clone(),
            poster: model.poster.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        let title = self.title.trim();
        if title.is_empty() {
            errors.push("title", "This field is required.");
        } else if title.chars().count() > 200 {
            errors.push("title", "Ensure this value has at most 200 characters.");
        }
        if self.description.trim().is_empty() {
            errors.push("description", "This field is required.");
        }
        errors
    }

    pub fn poster_value(&self) -> Option<String> {
        let poster = self.poster.trim();
        if poster.is_empty() { None } else { Some(poster.to_string()) }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieInfoForm {
    // Movie id, only meaningful when creating.
    #[serde(default)]
    pub movie: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub actor1: String,
    #[serde(default)]
    pub actor2: String,
    #[serde(default)]
    pub actor3: String,
    #[serde(default)]
    pub actor4: String,
    #[serde(default)]
    pub year: String,
}

impl MovieInfoForm {
    pub fn from_model(model: &movie_info::Model) -> Self {
        Self {
            movie: model.movie_id.to_string(),
            director: model.director.clone(),
            actor1: model.actor1.clone(),
            actor2: model.actor2.clone(),
            actor3: model.actor3.clone(),
            actor4: model.actor4.clone(),
            year: model.year.to_string(),
        }
    }

    /// Returns field errors alongside the parsed year when it was valid.
    pub fn validate(&self) -> (FieldErrors, Option<i32>) {
        let mut errors = FieldErrors::default();
        if self.director.trim().is_empty() {
            errors.push("director", "This field is required.");
        }
        for (field, value) in [
            ("actor1", &self.actor1),
            ("actor2", &self.actor2),
            ("actor3", &self.actor3),
            ("actor4", &self.actor4),
        ] {
            if value.trim().is_empty() {
                errors.push(field, "This field is required.");
            }
        }
        let year = match self.year.trim().parse::<i32>() {
            Ok(year) => Some(year),
            Err(_) => {
                errors.push("year", "Enter a whole number.");
                None
            }
        };
        (errors, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_charset_is_enforced() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.lice+bob@example_01-x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn password_policy_matches_signup_rules() {
        assert!(validate_password("alice", "correct-horse").is_ok());
        assert!(validate_password("alice", "short").is_err());
        assert!(validate_password("alice", "12345678").is_err());
        assert!(validate_password("alice7890", "ALICE7890").is_err());
    }

    #[test]
    fn signup_rejects_mismatched_confirmation() {
        let form = SignupForm {
            username: "alice".to_string(),
            password1: "correct-horse".to_string(),
            password2: "wrong-horse".to_string(),
        };
        let errors = form.validate();
        assert_eq!(errors.get("password2"), Some("The two password fields didn't match."));
        assert!(errors.get("username").is_none());
    }

    #[test]
    fn review_rating_must_be_one_through_five() {
        for rating in ["1", "3", "5"] {
            let form = ReviewForm { rating: rating.to_string(), review_text: String::new() };
            assert_eq!(form.validate().unwrap().rating, rating.parse::<i32>().unwrap());
        }
        for rating in ["0", "6", "-1", "nope", ""] {
            let form = ReviewForm { rating: rating.to_string(), review_text: String::new() };
            assert!(form.validate().is_err(), "rating {rating:?} should be rejected");
        }
    }

    #[test]
    fn review_text_is_optional_and_trimmed() {
        let form = ReviewForm { rating: "4".to_string(), review_text: "  loved it  ".to_string() };
        assert_eq!(form.validate().unwrap().review_text, "loved it");

        let form = ReviewForm { rating: "4".to_string(), review_text: String::new() };
        assert_eq!(form.validate().unwrap().review_text, "");
    }

    #[test]
    fn login_checkbox_presence_means_remember() {
        let form = LoginForm { remember_me: Some("on".to_string()), ..Default::default() };
        assert!(form.remember());
        assert!(!LoginForm::default().remember());
    }

    #[test]
    fn movie_info_year_is_required() {
        let form = MovieInfoForm {
            director: "D".to_string(),
            actor1: "A".to_string(),
            actor2: "B".to_string(),
            actor3: "C".to_string(),
            actor4: "E".to_string(),
            year: "not a year".to_string(),
            ..Default::default()
        };
        let (errors, year) = form.validate();
        assert!(year.is_none());
        assert_eq!(errors.get("year"), Some("Enter a whole number."));
    }
}
