//! Storage filename generation.
//!
//! Names are wholly synthesized from entropy, never from the client-supplied
//! name, so directory traversal, double extensions, and null-byte tricks are
//! structurally impossible. Collision avoidance relies on entropy, not on
//! filesystem checks or locks.

use chrono::Utc;

/// Generate a storage filename for the validated extension.
///
/// With `randomize` a 128-bit random hex identifier; otherwise a random
/// 64-bit prefix plus a Unix timestamp still guarantees uniqueness while
/// keeping upload order readable in directory listings.
pub fn generate(extension: &str, randomize: bool) -> String {
    if randomize {
        let id: [u8; 16] = rand::random();
        return format!("{}.{}", hex::encode(id), extension);
    }

    let prefix: [u8; 8] = rand::random();
    format!(
        "{}_{}.{}",
        hex::encode(prefix),
        Utc::now().timestamp(),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomized_shape() {
        let name = generate("png", true);
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "png");
    }

    #[test]
    fn test_prefixed_shape() {
        let name = generate("jpg", false);
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "jpg");
        let (prefix, timestamp) = stem.split_once('_').unwrap();
        assert_eq!(prefix.len(), 16);
        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(timestamp.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_names_are_unique() {
        let names: std::collections::HashSet<_> =
            (0..1000).map(|_| generate("webp", true)).collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn test_prefixed_names_are_unique_within_a_second() {
        let names: std::collections::HashSet<_> =
            (0..100).map(|_| generate("gif", false)).collect();
        assert_eq!(names.len(), 100);
    }
}
