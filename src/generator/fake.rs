//! Fake data helpers.
//!
//! Thin wrapper over the `fake` crate's English locale plus the numeric
//! and date sampling the entity generators need, all drawn from a single
//! RNG so a seeded run is reproducible.

use crate::model::round2;
use chrono::{Days, NaiveDate};
use fake::faker::address::en::CountryName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use std::ops::{Range, RangeInclusive};

/// Fake data generator over a caller-provided RNG
pub struct FakeData<R: Rng> {
    rng: R,
}

impl<R: Rng> FakeData<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a full name
    pub fn full_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    /// Generate an email address on a reserved example domain
    pub fn email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    /// Generate a country name
    pub fn country(&mut self) -> String {
        CountryName().fake_with_rng(&mut self.rng)
    }

    /// Generate a product name: two capitalized words
    pub fn product_name(&mut self) -> String {
        let first: String = Word().fake_with_rng(&mut self.rng);
        let second: String = Word().fake_with_rng(&mut self.rng);
        format!("{} {}", capitalize(&first), capitalize(&second))
    }

    /// Generate a sentence with a word count drawn from `words`
    pub fn sentence(&mut self, words: Range<usize>) -> String {
        Sentence(words).fake_with_rng(&mut self.rng)
    }

    /// Uniform price in `[min, max)`, rounded to cents
    pub fn price(&mut self, min: f64, max: f64) -> f64 {
        round2(self.rng.random_range(min..max))
    }

    /// Uniform integer in an inclusive range
    pub fn int_range(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.random_range(range)
    }

    /// Uniform foreign key into a table of `count` rows (`1..=count`)
    pub fn id_in(&mut self, count: usize) -> u32 {
        self.rng.random_range(1..=count as u32)
    }

    /// Uniform count in an inclusive range
    pub fn count_in(&mut self, min: usize, max: usize) -> usize {
        self.rng.random_range(min..=max)
    }

    /// Uniform calendar date in `[today - days_back, today]`
    pub fn date_within(&mut self, today: NaiveDate, days_back: u64) -> NaiveDate {
        let offset = self.rng.random_range(0..=days_back);
        today.checked_sub_days(Days::new(offset)).unwrap_or(today)
    }

    /// Pick a random element from a non-empty slice
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.random_range(0..items.len())]
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
