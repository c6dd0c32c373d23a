//! Internal email synthesis.
//!
//! The auth backend keys accounts by email even though users sign in with
//! a username or phone number, so every account gets a generated address
//! under a private domain. The address is never shown to the user.

use sha2::{Digest, Sha256};

/// Longest slug taken from the username.
const MAX_SLUG_LEN: usize = 32;

/// Builds candidate addresses for a username.
#[derive(Debug, Clone)]
pub struct EmailSynthesizer {
    domain: String,
    max_attempts: u32,
}

impl EmailSynthesizer {
    pub fn new(domain: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            domain: domain.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Candidate address for `username` on the given attempt.
    ///
    /// Deterministic: the same username and attempt always give the same
    /// address; later attempts salt the hash to step past collisions.
    pub fn candidate(&self, username: &str, attempt: u32) -> String {
        let digest = Sha256::digest(format!("{}:{}", username, attempt).as_bytes());
        let tag = hex::encode(&digest[..4]);
        format!("{}.{}@{}", slugify(username), tag, self.domain)
    }

    /// First candidate for which `is_taken` returns false.
    pub fn generate<F>(&self, username: &str, mut is_taken: F) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        (0..self.max_attempts)
            .map(|attempt| self.candidate(username, attempt))
            .find(|candidate| !is_taken(candidate))
    }
}

/// Lowercase ASCII alphanumerics of `username`, or `user` if none remain.
fn slugify(username: &str) -> String {
    let slug: String = username
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        "user".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Alice_99"), "alice99");
        assert_eq!(slugify("张伟"), "user");
        assert_eq!(slugify(&"x".repeat(40)).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_candidate_is_deterministic() {
        let synth = EmailSynthesizer::new("vip.internal", 8);

        let a = synth.candidate("alice", 0);
        let b = synth.candidate("alice", 0);
        let c = synth.candidate("alice", 1);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("alice."));
        assert!(a.ends_with("@vip.internal"));
        // slug + '.' + 8 hex chars + '@' + domain
        assert_eq!(a.len(), "alice.".len() + 8 + "@vip.internal".len());
    }

    #[test]
    fn test_generate_skips_taken() {
        let synth = EmailSynthesizer::new("vip.internal", 8);
        let first = synth.candidate("alice", 0);

        let email = synth.generate("alice", |c| c == first).unwrap();

        assert_eq!(email, synth.candidate("alice", 1));
    }

    #[test]
    fn test_generate_exhausted() {
        let synth = EmailSynthesizer::new("vip.internal", 3);
        assert_eq!(synth.generate("alice", |_| true), None);
    }
}
