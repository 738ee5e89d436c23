pub mod html;
pub mod ip;

pub use html::{escape_html, excerpt, fill_template, strip_tags};
pub use ip::{UNKNOWN_CLIENT, client_address, client_address_from_headers};

/// URL-safe slug alphabet (64 symbols)
pub const SLUG_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Longest slug accepted on lookup
pub const MAX_SLUG_LOOKUP_LEN: usize = 64;

pub fn generate_random_slug(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| SLUG_ALPHABET[rand::random_range(0..SLUG_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Whether `slug` could have been produced by [`generate_random_slug`]
///
/// Used to reject lookups before they reach the store.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LOOKUP_LEN
        && slug.bytes().all(|b| SLUG_ALPHABET.contains(&b))
}
