//! Review Records

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::UserUuid, domain::products::records::ProductUuid, uuids::TypedUuid};

/// Review UUID
pub type ReviewUuid = TypedUuid<ReviewRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rating {0} is outside 1..=5")]
pub struct RatingOutOfRange(pub i64);

/// Star rating from one to five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingOutOfRange`] unless `stars` is between 1 and 5.
    pub fn new(stars: u8) -> Result<Self, RatingOutOfRange> {
        if (1..=5).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(RatingOutOfRange(i64::from(stars)))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars)
    }
}

impl TryFrom<i16> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(stars: i16) -> Result<Self, Self::Error> {
        u8::try_from(stars)
            .map_err(|_overflow| RatingOutOfRange(i64::from(stars)))
            .and_then(Self::new)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Review Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub uuid: ReviewUuid,
    pub product_uuid: ProductUuid,
    pub user_uuid: UserUuid,
    pub rating: Rating,
    pub body: String,
    pub created_at: Timestamp,
}
