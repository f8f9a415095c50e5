//! Interest/token utilities shared by the generator and scorer.
//!
//! Pure functions, no state, no I/O.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::user::User;

/// Tokens shorter than this are noise ("a", "the", "for") and are discarded.
const MIN_TOKEN_LEN: usize = 4;

/// Derives a community's implicit interest set from its free text.
///
/// Lower-cases `description` and `category`, splits on whitespace, discards
/// tokens of length ≤ 3, and de-duplicates.
pub fn community_tokens(description: &str, category: &str) -> HashSet<String> {
    format!("{description} {category}")
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Case-insensitive intersection: the user interests present in the
/// community's token set, in interest order.
pub fn matching_interests<'a>(interests: &'a [String], tokens: &HashSet<String>) -> Vec<&'a str> {
    interests
        .iter()
        .filter(|interest| tokens.contains(&interest.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// One interest with its population-wide frequency.
#[derive(Debug, Clone, Serialize)]
pub struct InterestCount {
    pub interest: String,
    pub count: usize,
}

/// Summarizes a population's interests by frequency, descending, ties broken
/// by first appearance. The display form is the first-seen casing.
pub fn interest_distribution(users: &[User]) -> Vec<InterestCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new(); // (lowercase key, display form)

    for user in users {
        for interest in user.interest_pool() {
            let key = interest.to_lowercase();
            match counts.get_mut(&key) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(key.clone(), 1);
                    order.push((key, interest));
                }
            }
        }
    }

    let mut distribution: Vec<InterestCount> = order
        .into_iter()
        .map(|(key, display)| InterestCount {
            count: counts[&key],
            interest: display,
        })
        .collect();

    // Stable sort keeps first-appearance order on ties
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    distribution
}
