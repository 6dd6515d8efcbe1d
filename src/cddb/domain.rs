//! Internal domain models for CDDB lookups.
//!
//! These types are OUR types - they don't change with the wire grammar.
//! Response text is converted into them by the parsers in `protocol.rs`.

/// Table-of-contents fingerprint identifying a disc to the database.
///
/// No validation happens here; a bogus fingerprint simply produces a
/// request the server will reject.
#[derive(Debug, Clone)]
pub struct DiscFingerprint {
    /// 32-bit CDDB disc id, sent as zero-padded lowercase hex
    pub disc_id: u32,
    /// Number of tracks on the disc
    pub track_count: u32,
    /// Track start offsets in CD frames (1/75 s), one per track
    pub offsets: Vec<u32>,
    /// Total disc playtime in seconds
    pub total_seconds: u32,
}

/// One candidate result of a `query`.
///
/// `category` and `disc_id` together form the key for a `read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscMatch {
    /// Genre-bucket token the server files this disc under
    pub category: String,
    /// Disc id as stored on the server
    pub disc_id: u32,
    /// Raw DTITLE text. By CDDB convention this is "artist / album",
    /// but splitting it is the caller's business - see
    /// [`split_dtitle`](crate::cddb::split_dtitle).
    pub title: String,
}

/// Full metadata record returned by a `read`.
///
/// Fields the server did not send stay `None`; they are never
/// defaulted. Track titles are indexed by zero-based track number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscRecord {
    /// Raw DTITLE value (conventionally "artist / album")
    pub title: Option<String>,
    /// Release year
    pub year: Option<i32>,
    /// Genre as free text (distinct from the category token)
    pub genre: Option<String>,
    /// Track titles in track order, contiguous from track 0
    pub tracks: Vec<String>,
}

/// User/host identity used to build the protocol greeting.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: String,
    pub host: String,
}

impl Identity {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }

    /// Read user and host from the environment, with neutral fallbacks
    /// so the greeting is always well-formed.
    pub fn from_env() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "anonymous".to_string());
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or_else(|_| "localhost".to_string());
        Self { user, host }
    }
}

/// Errors that can occur during a CDDB round trip.
///
/// "No match" is not in here on purpose: an unrecognized query status
/// yields an empty match list and a non-210 read yields `None`, both
/// as ordinary values.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CddbError {
    /// Network/DNS/timeout failure, HTTP error status, or a body that
    /// is not decodable text. Never retried at this layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response text does not follow the CDDB grammar.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response parses but breaks a protocol invariant.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_new() {
        let id = Identity::new("alice", "workstation");
        assert_eq!(id.user, "alice");
        assert_eq!(id.host, "workstation");
    }

    #[test]
    fn test_record_default_is_all_absent() {
        let record = DiscRecord::default();
        assert!(record.title.is_none());
        assert!(record.year.is_none());
        assert!(record.genre.is_none());
        assert!(record.tracks.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = CddbError::ProtocolViolation("track titles are not monotonically increasing".into());
        assert!(err.to_string().contains("protocol violation"));
    }
}
