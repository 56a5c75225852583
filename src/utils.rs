use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Fisher-Yates shuffle: walking from the last index down, each slot is
/// swapped with a uniformly chosen slot in `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Keeps candidate URIs that are not in `seen`, in first-seen order, and
/// records them in `seen` so a URI is returned at most once.
pub fn take_unseen<'a, I>(candidates: I, seen: &mut HashSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .filter(|uri| !uri.is_empty())
        .filter_map(|uri| seen.insert(uri.to_string()).then(|| uri.to_string()))
        .collect()
}

/// Rounds a duration to a tenth of a second for summaries.
pub fn format_duration(duration: std::time::Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}
