use chrono::{DateTime, Datelike, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default length of the random token inside an asset key
pub const DEFAULT_TOKEN_LEN: usize = 10;

/// Storage path of one blob, e.g. `2024/03/09/Xk3pQ9aZ0b_cat.png`.
///
/// An empty key marks an unset slot on an owner record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    /// Create from existing string
    pub fn from_string(key: String) -> Self {
        Self(key)
    }

    /// The unset key
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for AssetKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for AssetKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strategy for naming freshly uploaded blobs
pub trait KeyGenerator: Send + Sync {
    /// Generate a key for a new blob holding `filename`. Never fails.
    fn generate(&self, filename: &str) -> AssetKey;
}

/// Default key strategy: `YYYY/MM/DD/<token>_<filename>`.
///
/// The date prefix groups uploads by day so operators can find them by
/// hand. The token is drawn from the thread-local CSPRNG, so two keys for
/// the same filename on the same day collide only with negligible
/// probability (62^len outcomes). Uniqueness is probabilistic, not
/// guaranteed; callers never check the store for an existing key.
#[derive(Debug, Clone)]
pub struct DatedKeyGenerator {
    token_len: usize,
}

impl DatedKeyGenerator {
    pub fn new() -> Self {
        Self {
            token_len: DEFAULT_TOKEN_LEN,
        }
    }

    /// Set the random token length
    pub fn with_token_len(mut self, token_len: usize) -> Self {
        self.token_len = token_len.max(1);
        self
    }

    pub fn token_len(&self) -> usize {
        self.token_len
    }
}

impl Default for DatedKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for DatedKeyGenerator {
    fn generate(&self, filename: &str) -> AssetKey {
        dated_key(Utc::now(), &mut rand::thread_rng(), self.token_len, filename)
    }
}

/// Build a key from an explicit clock reading and random source.
pub fn dated_key<R>(now: DateTime<Utc>, rng: &mut R, token_len: usize, filename: &str) -> AssetKey
where
    R: Rng + ?Sized,
{
    let token: String = rng
        .sample_iter(&Alphanumeric)
        .take(token_len)
        .map(char::from)
        .collect();

    AssetKey(format!(
        "{:04}/{:02}/{:02}/{}_{}",
        now.year(),
        now.month(),
        now.day(),
        token,
        sanitize_filename(filename)
    ))
}

/// Reduce a client-supplied filename to something safe inside a key.
///
/// Keeps the last path component and replaces every character outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 0).unwrap()
    }

    #[test]
    fn key_has_date_prefix_token_and_filename() {
        let mut rng = StdRng::seed_from_u64(7);
        let key = dated_key(fixed_now(), &mut rng, 10, "cat.png");

        let parts: Vec<&str> = key.as_str().split('/').collect();
        assert_eq!(&parts[..3], &["2024", "03", "09"]);

        let (token, name) = parts[3].split_once('_').unwrap();
        assert_eq!(token.len(), 10);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(name, "cat.png");
    }

    #[test]
    fn same_seed_same_key() {
        let a = dated_key(fixed_now(), &mut StdRng::seed_from_u64(1), 10, "a.jpg");
        let b = dated_key(fixed_now(), &mut StdRng::seed_from_u64(1), 10, "a.jpg");
        let c = dated_key(fixed_now(), &mut StdRng::seed_from_u64(2), 10, "a.jpg");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn generator_produces_distinct_keys() {
        let keys = DatedKeyGenerator::new();
        let first = keys.generate("video.mp4");
        let second = keys.generate("video.mp4");
        assert_ne!(first, second);
        assert!(first.as_str().ends_with("_video.mp4"));
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\my photo.jpg"), "my_photo.jpg");
        assert_eq!(sanitize_filename("кот.png"), "___.png");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("dir/"), "file");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[test]
    fn empty_key_marks_unset_slot() {
        assert!(AssetKey::default().is_empty());
        assert!(!AssetKey::from("2024/01/01/x_a.png").is_empty());
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = AssetKey::from("2024/01/01/abc_a.png");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024/01/01/abc_a.png\"");
    }
}
