//! Deterministic cache keys for review requests

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::ReviewRequest;

/// Prefix shared by every review cache key
pub const CACHE_KEY_PREFIX: &str = "review:";

/// Canonical JSON encoding of a request: all fields, keys sorted
fn canonical_json(request: &ReviewRequest) -> String {
    let fields: BTreeMap<&str, &str> = BTreeMap::from([
        ("assignment_description", request.assignment_description()),
        ("candidate_level", request.candidate_level().as_str()),
        ("github_repo_url", request.repository_url().as_str()),
    ]);

    // Inserted in sorted order, so the output is sorted whichever map
    // implementation serde_json was built with.
    let object: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::from(value)))
        .collect();

    Value::Object(object).to_string()
}

/// Hex SHA-256 over the canonical encoding of a request
pub fn fingerprint(request: &ReviewRequest) -> String {
    let digest = Sha256::digest(canonical_json(request).as_bytes());
    hex::encode(digest)
}

/// Cache key under which the feedback for `request` is stored
pub fn cache_key(request: &ReviewRequest) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, fingerprint(request))
}
