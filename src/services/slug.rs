//! Slug generation

use crate::utils::generate_random_slug;

/// Source of candidate slugs for new notes
///
/// Candidates are not required to be unique; uniqueness is enforced by the
/// store's set-if-not-exists on reservation.
pub trait SlugGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random slugs from the 64-symbol URL-safe alphabet
///
/// With the default length of 8 the space is 64^8 ≈ 2.8×10^14.
#[derive(Debug, Clone)]
pub struct RandomSlugGenerator {
    length: usize,
}

impl RandomSlugGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomSlugGenerator {
    fn default() -> Self {
        Self::new(8)
    }
}

impl SlugGenerator for RandomSlugGenerator {
    fn generate(&self) -> String {
        generate_random_slug(self.length)
    }
}
