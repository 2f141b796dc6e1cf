//! Product reviews (demo data) and review submission.
//!
//! Every product page lists the same five demo reviews and rating
//! breakdown. Submitted reviews are validated and logged, never stored.

use std::str::FromStr;

use chrono::NaiveDate;
use ecommerce_hub_core::ProductId;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: u32,
    pub name: &'static str,
    pub initials: &'static str,
    /// Whole stars, 1 to 5.
    pub rating: u8,
    pub title: &'static str,
    pub comment: &'static str,
    pub date: NaiveDate,
    pub helpful: u32,
    pub verified: bool,
}

/// Share of reviews per star count, from 5 stars down to 1, in percent.
pub const RATING_DISTRIBUTION: [(u8, u8); 5] = [(5, 58), (4, 23), (3, 12), (2, 5), (1, 2)];

/// The demo reviews, in their stored order.
#[must_use]
pub fn demo_reviews() -> Vec<Review> {
    vec![
        Review {
            id: 1,
            name: "Sarah Johnson",
            initials: "SJ",
            rating: 5,
            title: "Exceptional Sound Quality",
            comment: "These headphones exceeded my expectations! The sound quality is crystal \
                clear, and the noise cancellation works perfectly. I use them for work calls and \
                music, and they're comfortable for long periods.",
            date: date(2025, 1, 15),
            helpful: 23,
            verified: true,
        },
        Review {
            id: 2,
            name: "Mike Chen",
            initials: "MC",
            rating: 4,
            title: "Great Value for Money",
            comment: "Good headphones overall. The battery life is impressive, lasting almost \
                the full 30 hours as advertised. Only complaint is they can get a bit tight \
                during extended use.",
            date: date(2025, 1, 10),
            helpful: 18,
            verified: true,
        },
        Review {
            id: 3,
            name: "Emma Davis",
            initials: "ED",
            rating: 5,
            title: "Perfect for Work from Home",
            comment: "Bought these for remote work and they've been a game-changer. The \
                microphone quality is excellent for video calls, and the active noise \
                cancellation helps me focus.",
            date: date(2025, 1, 8),
            helpful: 15,
            verified: false,
        },
        Review {
            id: 4,
            name: "Alex Rodriguez",
            initials: "AR",
            rating: 3,
            title: "Good but not great",
            comment: "Decent headphones but I expected more from the price point. The sound is \
                good but not exceptional. Build quality feels solid though.",
            date: date(2025, 1, 5),
            helpful: 8,
            verified: true,
        },
        Review {
            id: 5,
            name: "Lisa Wang",
            initials: "LW",
            rating: 5,
            title: "Audiophile Approved",
            comment: "As someone who's particular about audio quality, these headphones deliver. \
                The frequency response is balanced, and the detail in the highs and mids is \
                impressive.",
            date: date(2025, 1, 2),
            helpful: 31,
            verified: true,
        },
    ]
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Review list orderings offered on the product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    Helpful,
    Newest,
    Oldest,
    RatingHigh,
    RatingLow,
}

impl ReviewSort {
    pub const ALL: [Self; 5] = [
        Self::Helpful,
        Self::Newest,
        Self::Oldest,
        Self::RatingHigh,
        Self::RatingLow,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helpful => "helpful",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::RatingHigh => "rating-high",
            Self::RatingLow => "rating-low",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Helpful => "Most Helpful",
            Self::Newest => "Newest First",
            Self::Oldest => "Oldest First",
            Self::RatingHigh => "Highest Rating",
            Self::RatingLow => "Lowest Rating",
        }
    }
}

impl FromStr for ReviewSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or(())
    }
}

/// Order reviews for display. Ties keep their stored order.
#[must_use]
pub fn sort_reviews(reviews: &[Review], sort: ReviewSort) -> Vec<Review> {
    let mut sorted = reviews.to_vec();
    match sort {
        ReviewSort::Helpful => sorted.sort_by(|a, b| b.helpful.cmp(&a.helpful)),
        ReviewSort::Newest => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
        ReviewSort::Oldest => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
        ReviewSort::RatingHigh => sorted.sort_by(|a, b| b.rating.cmp(&a.rating)),
        ReviewSort::RatingLow => sorted.sort_by(|a, b| a.rating.cmp(&b.rating)),
    }
    sorted
}

/// Why a submitted review was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Please choose a rating from 1 to 5 stars")]
    InvalidRating,
    #[error("Please fill in your {0}")]
    Missing(&'static str),
}

/// A review posted from the write-review form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub rating: u8,
    pub name: String,
    pub title: String,
    pub comment: String,
}

impl ReviewSubmission {
    /// Parse and check the posted fields.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError` for a rating outside 1 to 5 or a blank field.
    pub fn parse(rating: &str, name: &str, title: &str, comment: &str) -> Result<Self, ReviewError> {
        let rating = rating
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|stars| (1..=5).contains(stars))
            .ok_or(ReviewError::InvalidRating)?;
        let required = |value: &str, label: &'static str| {
            let value = value.trim();
            if value.is_empty() {
                Err(ReviewError::Missing(label))
            } else {
                Ok(value.to_string())
            }
        };
        Ok(Self {
            rating,
            name: required(name, "name")?,
            title: required(title, "review title")?,
            comment: required(comment, "review")?,
        })
    }
}

/// Accept a review. Nothing is stored; the submission is only logged.
#[instrument(skip(review), fields(rating = review.rating))]
pub fn submit(product: ProductId, review: &ReviewSubmission) {
    tracing::info!(
        product = %product,
        title = %review.title,
        "Review submitted"
    );
}
