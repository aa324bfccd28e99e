// SPDX-License-Identifier: MIT OR Apache-2.0
//! Star rating for a completed attempt.

use crate::level::StarRatings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stars earned for a completion, always between 1 and 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stars(u8);

impl Stars {
    /// One star
    pub const ONE: Stars = Stars(1);
    /// Two stars
    pub const TWO: Stars = Stars(2);
    /// Three stars
    pub const THREE: Stars = Stars(3);

    /// Raw star count
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => f.write_str("1 star"),
            n => write!(f, "{n} stars"),
        }
    }
}

/// Stars earned for completing a level in `moves` toggles.
///
/// Without thresholds every completion earns one star. Moves past the
/// one-star ceiling still earn one star.
pub fn score(ratings: Option<&StarRatings>, moves: u32) -> Stars {
    match ratings {
        Some(r) if moves <= r.three_stars => Stars::THREE,
        Some(r) if moves <= r.two_stars => Stars::TWO,
        _ => Stars::ONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_thresholds() {
        let ratings = StarRatings {
            three_stars: 5,
            two_stars: 8,
            one_star: 12,
        };
        assert_eq!(score(Some(&ratings), 0), Stars::THREE);
        assert_eq!(score(Some(&ratings), 5), Stars::THREE);
        assert_eq!(score(Some(&ratings), 6), Stars::TWO);
        assert_eq!(score(Some(&ratings), 8), Stars::TWO);
        assert_eq!(score(Some(&ratings), 12), Stars::ONE);
        assert_eq!(score(Some(&ratings), 13), Stars::ONE);
    }

    #[test]
    fn test_no_thresholds_award_one_star() {
        assert_eq!(score(None, 0), Stars::ONE);
        assert_eq!(score(None, 1000), Stars::ONE);
    }

    #[test]
    fn test_stars_display() {
        assert_eq!(Stars::ONE.to_string(), "1 star");
        assert_eq!(Stars::THREE.to_string(), "3 stars");
        assert_eq!(Stars::TWO.get(), 2);
    }
}
