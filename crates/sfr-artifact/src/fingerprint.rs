//! Content fingerprints for loaded artifact files
//!
//! Provides [`Fingerprint`], a Blake3 digest of the raw artifact bytes so the
//! startup log and `check-artifacts` report can tell two model drops apart.

use std::fmt::{self, Display, Formatter};

/// A 32-byte content digest (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute Blake3 digest of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn fingerprint_deterministic() {
        let data = br#"{"classes": ["Urea", "DAP"]}"#;
        assert_eq!(Fingerprint::compute(data), Fingerprint::compute(data));
    }

    #[test]
    fn fingerprint_differs_on_content() {
        assert_ne!(Fingerprint::compute(b"v1"), Fingerprint::compute(b"v2"));
    }

    #[test]
    fn fingerprint_short_is_prefix() {
        let fp = Fingerprint::compute(b"scaler");
        let short = fp.short();
        assert_eq!(short.len(), 16);
        assert!(fp.to_string().starts_with(&short));
    }

    #[test]
    fn fingerprint_serializes_as_hex() {
        let fp = Fingerprint::compute(b"model");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
    }
}
