//! Identifier and avatar minting.

use uuid::Uuid;

const AVATAR_BASE_URL: &str = "https://picsum.photos/200/200";

/// Returns a fresh random (v4) identifier as 32 lowercase hex digits.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Returns a random avatar reference for a newly authored persona.
pub fn new_avatar_url() -> String {
    let (token, _) = Uuid::new_v4().as_u64_pair();
    format!("{AVATAR_BASE_URL}?random={token}")
}
