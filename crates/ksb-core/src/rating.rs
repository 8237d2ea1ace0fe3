use crate::constants::{DEFAULT_RATING, RATING_MAX, RATING_MIN};

/// A confidence rating, always within 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

/// Rating value as it arrives from the form, an import, or the JS boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum RawRating {
    Number(f64),
    Text(String),
    Missing,
}

impl Rating {
    pub const DEFAULT: Rating = Rating(DEFAULT_RATING);

    /// Clamp an integer into range.
    pub fn new(value: i64) -> Self {
        Rating(value.clamp(RATING_MIN as i64, RATING_MAX as i64) as u8)
    }

    /// Resolve any raw input: numbers are truncated and clamped, text is
    /// parsed leniently, anything unusable becomes the default.
    pub fn resolve(raw: &RawRating) -> Self {
        match raw {
            RawRating::Number(v) => Self::from_f64(*v),
            RawRating::Text(s) => Self::parse_lenient(s),
            RawRating::Missing => Self::DEFAULT,
        }
    }

    /// Infinities clamp to the nearest end of the scale; only NaN defaults.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::DEFAULT
        } else {
            // float-to-int casts saturate
            Self::new(value.trunc() as i64)
        }
    }

    /// Parse a leading integer the way a form field would ("4", " 2 ", "5.0").
    pub fn parse_lenient(text: &str) -> Self {
        let t = text.trim();
        if let Ok(v) = t.parse::<i64>() {
            return Self::new(v);
        }
        match t.parse::<f64>() {
            Ok(v) => Self::from_f64(v),
            Err(_) => Self::DEFAULT,
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Map 1..=5 onto 0..=1.
    #[inline]
    pub fn normalized(self) -> f32 {
        (self.0 - RATING_MIN) as f32 / (RATING_MAX - RATING_MIN) as f32
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Rating> for RawRating {
    fn from(r: Rating) -> Self {
        RawRating::Number(r.0 as f64)
    }
}

impl From<i32> for RawRating {
    fn from(v: i32) -> Self {
        RawRating::Number(v as f64)
    }
}

impl From<i64> for RawRating {
    fn from(v: i64) -> Self {
        RawRating::Number(v as f64)
    }
}

impl From<u8> for RawRating {
    fn from(v: u8) -> Self {
        RawRating::Number(v as f64)
    }
}

impl From<f64> for RawRating {
    fn from(v: f64) -> Self {
        RawRating::Number(v)
    }
}

impl From<&str> for RawRating {
    fn from(v: &str) -> Self {
        RawRating::Text(v.to_string())
    }
}

impl From<String> for RawRating {
    fn from(v: String) -> Self {
        RawRating::Text(v)
    }
}

impl<T: Into<RawRating>> From<Option<T>> for RawRating {
    fn from(v: Option<T>) -> Self {
        v.map_or(RawRating::Missing, Into::into)
    }
}

/// Read accessor over the external ratings store.
///
/// The comment that travels alongside each rating in the store is not part of
/// this interface; the scene never looks at it.
pub trait RatingSource {
    fn rating(&self, id: &str) -> RawRating;
    fn all_ratings(&self) -> Vec<(String, RawRating)>;
}
