//! Filler text and synthetic addresses for mock records.

use rand::Rng;
use rand::seq::SliceRandom;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "voluptate",
    "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
];

const FIRST_NAMES: &[&str] = &[
    "ada", "alan", "barbara", "claude", "dennis", "edsger", "frances", "grace", "john", "ken",
    "leslie", "margaret", "niklaus", "radia", "tim",
];

const LAST_NAMES: &[&str] = &[
    "lovelace", "turing", "liskov", "shannon", "ritchie", "dijkstra", "allen", "hopper",
    "backus", "thompson", "lamport", "hamilton", "wirth", "perlman", "berners",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

/// Returns one lower-case filler word.
pub fn word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or("lorem")
}

/// Returns a capitalized sentence of 4 to 10 words ending in a period.
pub fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(4..=10);
    let words: Vec<&str> = (0..count).map(|_| word(rng)).collect();
    let joined = words.join(" ");

    let mut chars = joined.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    out.push('.');
    out
}

/// Returns a plausible recipient address such as `grace.hopper42@example.org`.
pub fn email_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("ada");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("lovelace");
    let domain = DOMAINS.choose(rng).copied().unwrap_or("example.com");
    let suffix: u16 = rng.gen_range(1..=999);
    format!("{first}.{last}{suffix}@{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sentence_is_capitalized_and_terminated() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let s = sentence(&mut rng);
            assert!(s.ends_with('.'));
            assert!(s.chars().next().is_some_and(char::is_uppercase));
            let words = s.trim_end_matches('.').split(' ').count();
            assert!((4..=10).contains(&words));
        }
    }

    #[test]
    fn email_address_has_single_at() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let addr = email_address(&mut rng);
            assert_eq!(addr.matches('@').count(), 1);
            assert!(DOMAINS.iter().any(|d| addr.ends_with(d)));
        }
    }
}
