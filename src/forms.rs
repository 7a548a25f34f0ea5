use std::collections::BTreeMap;

use serde::Deserialize;

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;

/// Field name to message, rendered next to the offending input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw edit form. Fields stay strings so a bad value can be echoed back.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RatingForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatingUpdate {
    pub rating: f64,
    pub review: String,
}

impl RatingForm {
    pub fn validate(&self) -> Result<RatingUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();

        let rating = match validate_rating(&self.rating) {
            Ok(rating) => Some(rating),
            Err(msg) => {
                errors.add("rating", msg);
                None
            },
        };

        let review = self.review.trim();
        if review.is_empty() {
            errors.add("review", "This field is required.");
        }

        match rating {
            Some(rating) if errors.is_empty() => {
                Ok(RatingUpdate { rating, review: review.to_string() })
            },
            _ => Err(errors),
        }
    }
}

pub fn validate_rating(raw: &str) -> Result<f64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("This field is required.");
    }
    let value: f64 = raw.parse().map_err(|_| "Not a valid number.")?;
    if !value.is_finite() || !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err("Rating must be between 0 and 10");
    }
    Ok(value)
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddMovieForm {
    #[serde(default)]
    pub title: String,
}

impl AddMovieForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let title = self.title.trim();
        if title.is_empty() {
            let mut errors = FieldErrors::default();
            errors.add("title", "This field is required.");
            return Err(errors);
        }
        Ok(title.to_string())
    }
}
