//! Geography disk caching module
//!
//! Keeps the last downloaded geography document on disk so later launches
//! skip the network while the copy is fresh.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Serialized cache entry stored as JSON on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedGeography {
    pub source: String,
    pub body: String,
    pub cached_at: DateTime<Utc>,
}

/// Geography disk cache manager
pub struct GeographyCache {
    cache_dir: PathBuf,
    expiration_days: i64,
}

impl GeographyCache {
    /// Create a cache in the platform cache directory
    ///
    /// - macOS: ~/Library/Caches/arcglobe/geography/
    /// - Linux: ~/.cache/arcglobe/geography/
    /// - Windows: %LOCALAPPDATA%\arcglobe\geography\
    pub fn new(expiration_days: i64) -> Result<Self, anyhow::Error> {
        let proj_dirs = ProjectDirs::from("", "", "arcglobe")
            .ok_or_else(|| anyhow::anyhow!("Failed to resolve cache directory"))?;

        let cache_dir = proj_dirs.cache_dir().join("geography");
        Self::new_in_dir(cache_dir, expiration_days)
    }

    pub fn new_in_dir(cache_dir: PathBuf, expiration_days: i64) -> Result<Self, anyhow::Error> {
        fs::create_dir_all(&cache_dir)?;

        Ok(Self {
            cache_dir,
            expiration_days,
        })
    }

    /// Returns Ok(None) on a cache miss, Err if the entry exists but is unreadable.
    pub fn read(&self, source: &str) -> Result<Option<CachedGeography>, anyhow::Error> {
        let path = self.cache_path(source);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let cached: CachedGeography = serde_json::from_str(&contents)?;

        // Two sources can sanitize to the same file name
        if cached.source != source {
            return Ok(None);
        }
        Ok(Some(cached))
    }

    pub fn write(&self, entry: &CachedGeography) -> Result<(), anyhow::Error> {
        let path = self.cache_path(&entry.source);
        let contents = serde_json::to_string(entry)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Expiry spans beyond chrono's range never expire
    pub fn is_valid(&self, entry: &CachedGeography) -> bool {
        let age = Utc::now().signed_duration_since(entry.cached_at);
        match Duration::try_days(self.expiration_days) {
            Some(limit) => age < limit,
            None => true,
        }
    }

    fn cache_path(&self, source: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", cache_file_stem(source)))
    }
}

/// File-system safe name for a source string
fn cache_file_stem(source: &str) -> String {
    let stem: String = source
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    // Keep the tail: it carries the file name
    let skip = stem.len().saturating_sub(120);
    stem[skip..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    const URL: &str = "https://example.com/datasets/globe-data.json";

    fn unique_temp_dir(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "arcglobe-geo-cache-{}-{}-{}",
            test_name,
            std::process::id(),
            nanos
        ))
    }

    fn entry(age_days: i64) -> CachedGeography {
        CachedGeography {
            source: URL.to_string(),
            body: r#"{"features":[]}"#.to_string(),
            cached_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_cache_miss() {
        let cache = GeographyCache::new_in_dir(unique_temp_dir("miss"), 30).unwrap();
        assert!(cache.read(URL).expect("Read should not error").is_none());
    }

    #[test]
    fn test_cache_write_and_read() {
        let cache = GeographyCache::new_in_dir(unique_temp_dir("write_and_read"), 30).unwrap();
        cache.write(&entry(0)).expect("Failed to write to cache");

        let cached = cache
            .read(URL)
            .expect("Failed to read from cache")
            .expect("Cache entry not found");
        assert_eq!(cached.source, URL);
        assert_eq!(cached.body, r#"{"features":[]}"#);
        assert!(cache.is_valid(&cached));
    }

    #[test]
    fn test_cache_expiration() {
        let cache = GeographyCache::new_in_dir(unique_temp_dir("expiration"), 7).unwrap();
        assert!(cache.is_valid(&entry(3)));
        assert!(!cache.is_valid(&entry(10)));

        let long = GeographyCache::new_in_dir(unique_temp_dir("expiration_long"), 30).unwrap();
        assert!(long.is_valid(&entry(10)));
    }

    #[test]
    fn test_out_of_range_expiration_does_not_panic() {
        let cache =
            GeographyCache::new_in_dir(unique_temp_dir("huge_expiration"), 200_000_000_000)
                .unwrap();
        assert!(cache.is_valid(&entry(10)));
    }

    #[test]
    fn test_cache_persists_across_instances() {
        let dir = unique_temp_dir("persistence");
        let cache = GeographyCache::new_in_dir(dir.clone(), 30).unwrap();
        cache.write(&entry(0)).expect("Write should succeed");

        let reopened = GeographyCache::new_in_dir(dir, 30).unwrap();
        assert!(reopened.read(URL).unwrap().is_some());
    }

    #[test]
    fn test_colliding_names_are_a_miss() {
        let cache = GeographyCache::new_in_dir(unique_temp_dir("collision"), 30).unwrap();
        cache.write(&entry(0)).unwrap();
        // Sanitizes to the same stem as URL
        let other = "https://example.com/datasets/globe_data.json";
        assert_eq!(cache_file_stem(other), cache_file_stem(URL));
        assert!(cache.read(other).unwrap().is_none());
    }

    #[test]
    fn test_file_stem_is_bounded() {
        let long = format!("https://example.com/{}", "a".repeat(500));
        assert_eq!(cache_file_stem(&long).len(), 120);
        assert_eq!(
            cache_file_stem(URL),
            "example_com_datasets_globe_data_json"
        );
    }
}
