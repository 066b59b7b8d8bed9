//! Cache key derivation.
//!
//! Key layout: `<prefix>user:<user segment>:<sha256 hex>`.
//!
//! The digest covers `canonical_json(request) + ":" + user_id`. The user
//! segment is the user id with `%` and `:` percent-encoded, so it never
//! contains the separator and a per-user pattern cannot match another
//! user's keys.

use crate::canonical::to_canonical_json;
use crate::CacheResult;
use cvgen_core::UserId;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;

/// A fully-qualified key in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for `request` issued by `user_id`.
    pub fn derive<R: Serialize + ?Sized>(
        prefix: &str,
        request: &R,
        user_id: &UserId,
    ) -> CacheResult<Self> {
        let normalized = to_canonical_json(request)?;
        Ok(Self::from_normalized(prefix, &normalized, user_id))
    }

    /// Builds the key from an already canonicalized payload.
    #[must_use]
    pub fn from_normalized(prefix: &str, normalized: &str, user_id: &UserId) -> Self {
        Self(format!(
            "{}user:{}:{}",
            prefix,
            user_segment(user_id.as_str()),
            content_digest(normalized, user_id)
        ))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hex-encoded SHA-256 of `normalized + ":" + user_id`.
#[must_use]
pub fn content_digest(normalized: &str, user_id: &UserId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b":");
    hasher.update(user_id.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Glob pattern matching every key owned by `user_id` under `prefix`.
#[must_use]
pub fn user_pattern(prefix: &str, user_id: &UserId) -> String {
    format!(
        "{}user:{}:*",
        escape_glob(prefix),
        escape_glob(&user_segment(user_id.as_str()))
    )
}

fn user_segment(user_id: &str) -> Cow<'_, str> {
    if !user_id.contains(&['%', ':'][..]) {
        return Cow::Borrowed(user_id);
    }
    let mut out = String::with_capacity(user_id.len() + 4);
    for c in user_id.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Escapes Redis glob metacharacters so `s` matches literally.
fn escape_glob(s: &str) -> Cow<'_, str> {
    if !s.contains(&['*', '?', '[', ']', '\\'][..]) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PREFIX: &str = "cv:generation:";

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[test]
    fn test_key_layout() {
        let key = CacheKey::derive(PREFIX, &json!({"fullName": "Ada"}), &user("u1")).unwrap();
        let rest = key.as_str().strip_prefix("cv:generation:user:u1:").unwrap();
        assert_eq!(rest.len(), 64);
        assert!(rest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_same_content_same_key() {
        let a = json!({"fullName": "Ada", "skills": ["rust"]});
        let b = json!({"skills": ["rust"], "fullName": "Ada"});
        assert_eq!(
            CacheKey::derive(PREFIX, &a, &user("u1")).unwrap(),
            CacheKey::derive(PREFIX, &b, &user("u1")).unwrap()
        );
    }

    #[test]
    fn test_different_user_different_key() {
        let request = json!({"fullName": "Ada"});
        assert_ne!(
            CacheKey::derive(PREFIX, &request, &user("u1")).unwrap(),
            CacheKey::derive(PREFIX, &request, &user("u2")).unwrap()
        );
    }

    #[test]
    fn test_different_payload_different_key() {
        assert_ne!(
            CacheKey::derive(PREFIX, &json!({"fullName": "Ada"}), &user("u1")).unwrap(),
            CacheKey::derive(PREFIX, &json!({"fullName": "Grace"}), &user("u1")).unwrap()
        );
    }

    #[test]
    fn test_digest_known_value() {
        // sha256("{}:u1")
        let digest = content_digest("{}", &user("u1"));
        let mut hasher = Sha256::new();
        hasher.update(b"{}:u1");
        assert_eq!(digest, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_user_segment_escapes_separator() {
        let key = CacheKey::from_normalized(PREFIX, "{}", &user("a:b%c"));
        assert!(key.as_str().starts_with("cv:generation:user:a%3Ab%25c:"));
    }

    #[test]
    fn test_user_pattern() {
        assert_eq!(user_pattern(PREFIX, &user("u1")), "cv:generation:user:u1:*");
        assert_eq!(user_pattern(PREFIX, &user("a*b")), "cv:generation:user:a\\*b:*");
        assert_eq!(user_pattern("ns[1]:", &user("x")), "ns\\[1\\]:user:x:*");
    }
}
