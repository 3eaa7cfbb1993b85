use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex SHA-256 digest identifying one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct KeyMaterial<'a, D: ?Sized> {
    v: &'a str,
    descriptor: &'a D,
}

#[derive(Serialize)]
struct NamespaceMaterial<'a, P: ?Sized> {
    v: &'a str,
    params: &'a P,
}

/// Digest of the canonical JSON form of `value`.
///
/// Struct fields serialize in declaration order, so the digest is stable as
/// long as descriptor types are plain records (no maps with random order).
pub fn digest_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(value)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// One payload kind at one version, scoped to a set of shared parameters.
///
/// On disk a namespace is `<kind>-<version>/<params digest>/`, so changing
/// the parameters (voice, audio config) starts a fresh directory without
/// touching entries written under other parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespace {
    kind: String,
    version: String,
    params_digest: String,
    extension: String,
}

impl CacheNamespace {
    pub fn new<P: Serialize + ?Sized>(
        kind: &str,
        version: &str,
        params: &P,
        extension: &str,
    ) -> Result<Self, serde_json::Error> {
        let params_digest = digest_json(&NamespaceMaterial { v: version, params })?;
        Ok(Self {
            kind: kind.to_string(),
            version: version.to_string(),
            params_digest,
            extension: extension.to_string(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn params_digest(&self) -> &str {
        &self.params_digest
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory of this namespace relative to the cache root.
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}-{}", self.kind, self.version)).join(&self.params_digest)
    }

    /// Derive the key for a request descriptor.
    pub fn key<D: Serialize + ?Sized>(&self, descriptor: &D) -> Result<CacheKey, serde_json::Error> {
        digest_json(&KeyMaterial {
            v: &self.version,
            descriptor,
        })
        .map(CacheKey)
    }

    pub fn file_name(&self, key: &CacheKey) -> String {
        format!("{}.{}", key, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Voice {
        language_code: &'static str,
        name: &'static str,
    }

    #[derive(Serialize)]
    struct Request<'a> {
        ssml: &'a str,
    }

    fn namespace(name: &'static str) -> CacheNamespace {
        CacheNamespace::new(
            "tts",
            "v1",
            &Voice {
                language_code: "en-US",
                name,
            },
            "mp3",
        )
        .unwrap()
    }

    #[test]
    fn test_key_is_deterministic() {
        let ns = namespace("en-US-Studio-O");
        let a = ns.key(&Request { ssml: "<speak>cat</speak>" }).unwrap();
        let b = ns.key(&Request { ssml: "<speak>cat</speak>" }).unwrap();
        let c = ns.key(&Request { ssml: "<speak>dog</speak>" }).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_params_change_namespace_dir() {
        let a = namespace("en-US-Studio-O");
        let b = namespace("en-US-Neural2-A");
        assert_ne!(a.relative_dir(), b.relative_dir());
        assert!(a.relative_dir().starts_with("tts-v1"));
    }

    #[test]
    fn test_version_changes_key() {
        let v1 = CacheNamespace::new("breakdown", "v1", &(), "json").unwrap();
        let v2 = CacheNamespace::new("breakdown", "v2", &(), "json").unwrap();
        let req = Request { ssml: "cat" };
        assert_ne!(v1.key(&req).unwrap(), v2.key(&req).unwrap());
    }

    #[test]
    fn test_file_name() {
        let ns = namespace("en-US-Studio-O");
        let key = ns.key(&Request { ssml: "x" }).unwrap();
        assert_eq!(ns.file_name(&key), format!("{key}.mp3"));
    }
}
