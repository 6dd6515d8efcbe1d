//! CDDB protocol client - disc metadata lookup by table-of-contents
//! fingerprint.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - fingerprints, matches, records
//!   and the typed error enum
//! - **Protocol** (`protocol.rs`) - command formatting and the
//!   line-oriented response grammar, pure functions over text
//! - **Transport** (`transport.rs`) - the blocking "GET url, return
//!   body text" boundary and its reqwest implementation
//! - **Client** (`client.rs`) - greeting construction, URL assembly,
//!   and the two operations: `query` and `read`
//!
//! Keeping the grammar out of the client means the parsers are tested
//! against fixture text with no network anywhere near them, and the
//! client is tested against a mock transport.
//!
//! # Usage
//!
//! ```ignore
//! use sfdb::cddb::{CddbClient, DiscFingerprint};
//!
//! let client = CddbClient::new();
//! let fingerprint = DiscFingerprint {
//!     disc_id: 0xfd0ce112,
//!     track_count: 18,
//!     offsets: vec![150, 16732, /* ... */ 230517],
//!     total_seconds: 3299,
//! };
//! for m in client.query(&fingerprint)? {
//!     if let Some(record) = client.read(&m.category, m.disc_id)? {
//!         println!("{:?}: {} tracks", record.title, record.tracks.len());
//!     }
//! }
//! ```

pub mod client;
pub mod domain;
pub mod protocol;
pub mod transport;

pub use client::{CddbClient, DEFAULT_SERVER};
pub use domain::{CddbError, DiscFingerprint, DiscMatch, DiscRecord, Identity};
pub use protocol::split_dtitle;
pub use transport::{HttpTransport, Transport};
