//! CDDB HTTP client.
//!
//! Speaks the CDDB command set over its HTTP CGI transport:
//! every command travels as a GET of
//! `<server>?cmd=<encoded command>&hello=<encoded greeting>&proto=6`.
//!
//! The client is read-only (query + read), performs one blocking round
//! trip per call and keeps no state besides the greeting computed at
//! construction. Sharing it across threads is safe exactly when the
//! transport is; resilience (retries, deadlines) is the caller's or
//! the transport's job.

use tracing::debug;

use super::domain::{CddbError, DiscFingerprint, DiscMatch, DiscRecord, Identity};
use super::protocol;
use super::transport::{HttpTransport, Transport};

/// Default CDDB CGI endpoint
pub const DEFAULT_SERVER: &str = "http://freedb.freedb.org/~cddb/cddb.cgi";

/// CDDB protocol level sent with every request
const PROTO_LEVEL: u32 = 6;

/// Client name token in the greeting
const CLIENT_NAME: &str = "sfdb";

/// CDDB client over a blocking transport.
pub struct CddbClient<T = HttpTransport> {
    transport: T,
    server: String,
    /// Form-encoded `hello` greeting, computed once at construction
    hello: String,
}

impl CddbClient<HttpTransport> {
    /// Create a client identifying itself from the environment.
    pub fn new() -> Self {
        Self::with_identity(&Identity::from_env())
    }

    /// Create a client with an explicit user/host identity.
    pub fn with_identity(identity: &Identity) -> Self {
        Self::with_transport(HttpTransport::new(), identity)
    }
}

impl Default for CddbClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> CddbClient<T> {
    /// Create a client over a custom transport (used by tests to avoid
    /// the network, usable by callers for deadlines or pooling).
    pub fn with_transport(transport: T, identity: &Identity) -> Self {
        let greeting = format!(
            "{} {} {} {}",
            identity.user,
            identity.host,
            CLIENT_NAME,
            env!("CARGO_PKG_VERSION")
        );
        Self {
            transport,
            server: DEFAULT_SERVER.to_string(),
            hello: encode_form(&greeting),
        }
    }

    /// Point the client at a different CDDB server.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Look up candidate matches for a disc fingerprint.
    ///
    /// An unrecognized status code (no match, corrupt entry, server
    /// error) is a valid empty result; only transport failures and
    /// grammar violations are errors.
    pub fn query(&self, fingerprint: &DiscFingerprint) -> Result<Vec<DiscMatch>, CddbError> {
        let body = self.cddb_cmd(&protocol::query_command(fingerprint))?;
        protocol::parse_query_response(&body)
    }

    /// Fetch the full metadata record for one match key.
    ///
    /// Returns `Ok(None)` when the server does not have the entry
    /// (any status other than 210).
    pub fn read(&self, category: &str, disc_id: u32) -> Result<Option<DiscRecord>, CddbError> {
        let body = self.cddb_cmd(&protocol::read_command(category, disc_id))?;
        protocol::parse_read_response(&body)
    }

    /// Send one raw CDDB command and return the response body.
    fn cddb_cmd(&self, cmd: &str) -> Result<String, CddbError> {
        let cmd_arg = encode_form(&format!("cddb {cmd}"));
        let url = format!(
            "{}?cmd={}&hello={}&proto={}",
            self.server, cmd_arg, self.hello, PROTO_LEVEL
        );
        debug!(command = cmd, "sending CDDB command");
        self.transport.fetch(&url)
    }
}

/// Percent-encode with form rules: spaces become `+`, reserved
/// characters are escaped. CDDB CGI servers expect form encoding for
/// the `cmd` and `hello` parameters.
fn encode_form(s: &str) -> String {
    urlencoding::encode(s).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cddb::transport::mocks::MockTransport;

    fn identity() -> Identity {
        Identity::new("alice", "workstation.example")
    }

    fn client(body: &str) -> CddbClient<MockTransport> {
        CddbClient::with_transport(MockTransport::replaying(body), &identity())
    }

    /// 18-track read fixture for disc fd0ce112 (3299 s total).
    const READ_FD0CE112: &str = "\
210 rock fd0ce112 CD database entry follows (until terminating `.')
# xmcd CD database file
#
# Track frame offsets:
#	150
#	16732
#
DISCID=fd0ce112
DTITLE=The Gaslight Anthem / The '59 Sound
DYEAR=2008
DGENRE=Rock
TTITLE0=Great Expectations
TTITLE1=The '59 Sound
TTITLE2=Old White Lincoln
TTITLE3=High Lonesome
TTITLE4=Film Noir
TTITLE5=Miles Davis & the Cool
TTITLE6=The Patient Ferris Wheel
TTITLE7=Casanova, Baby!
TTITLE8=Even Cowgirls Get the Blues
TTITLE9=Meet Me by the River's Edge
TTITLE10=Here's Looking at You, Kid
TTITLE11=The Backseat
TTITLE12=Once Upon a Time
TTITLE13=Placeholder
TTITLE14=Another One
TTITLE15=Almost There
TTITLE16=Nearly Done
TTITLE17=The Last Track
EXTD=
PLAYORDER=
.
";

    #[test]
    fn test_encode_form_spaces_and_reserved() {
        assert_eq!(encode_form("cddb query fd0ce112"), "cddb+query+fd0ce112");
        assert_eq!(encode_form("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_form("host.example"), "host.example");
    }

    #[test]
    fn test_query_url_shape() {
        let c = client("202 No match found\n");
        let fp = DiscFingerprint {
            disc_id: 0xfd0c_e112,
            track_count: 2,
            offsets: vec![150, 16732],
            total_seconds: 3299,
        };
        c.query(&fp).unwrap();

        let urls = c.transport.requested_urls();
        assert_eq!(urls.len(), 1);
        let url = &urls[0];
        assert!(url.starts_with(DEFAULT_SERVER));
        assert!(url.contains("cmd=cddb+query+fd0ce112+2+150+16732+3299"));
        assert!(url.contains(&format!(
            "hello=alice+workstation.example+sfdb+{}",
            env!("CARGO_PKG_VERSION")
        )));
        assert!(url.ends_with("&proto=6"));
    }

    #[test]
    fn test_read_url_shape() {
        let c = client("401 rock 000000b2 No such CD entry in database\n");
        c.read("rock", 0xb2).unwrap();

        let urls = c.transport.requested_urls();
        assert!(urls[0].contains("cmd=cddb+read+rock+000000b2"));
    }

    #[test]
    fn test_greeting_is_reused_across_calls() {
        let c = client("202 No match found\n");
        let fp = DiscFingerprint {
            disc_id: 1,
            track_count: 1,
            offsets: vec![150],
            total_seconds: 60,
        };
        c.query(&fp).unwrap();
        c.query(&fp).unwrap();

        let urls = c.transport.requested_urls();
        let hello = |u: &str| {
            u.split('&')
                .find(|p| p.starts_with("hello="))
                .unwrap()
                .to_string()
        };
        assert_eq!(hello(&urls[0]), hello(&urls[1]));
    }

    #[test]
    fn test_with_server_overrides_endpoint() {
        let c = client("202 No match found\n").with_server("http://localhost:8880/~cddb/cddb.cgi");
        c.read("rock", 1).unwrap();
        assert!(
            c.transport.requested_urls()[0].starts_with("http://localhost:8880/~cddb/cddb.cgi?")
        );
    }

    // Scenario: exact single match, then a read of that match.
    #[test]
    fn test_exact_match_then_read() {
        let c = client("200 rock fd0ce112 The Gaslight Anthem / The '59 Sound\n");
        let fp = DiscFingerprint {
            disc_id: 0xfd0c_e112,
            track_count: 18,
            offsets: vec![
                150, 16732, 27750, 43075, 58800, 71690, 86442, 101030, 111812, 128367, 136967,
                152115, 164812, 180337, 194072, 201690, 211652, 230517,
            ],
            total_seconds: 3299,
        };
        let matches = c.query(&fp).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category, "rock");
        assert_eq!(matches[0].disc_id, 0xfd0c_e112);

        let reader = client(READ_FD0CE112);
        let record = reader
            .read(&matches[0].category, matches[0].disc_id)
            .unwrap()
            .unwrap();
        let ttitle_lines = READ_FD0CE112
            .lines()
            .filter(|l| l.starts_with("TTITLE"))
            .count();
        assert_eq!(record.tracks.len(), ttitle_lines);
        assert_eq!(record.tracks.len(), 18);
        assert_eq!(record.year, Some(2008));
    }

    // Scenario: inexact matches come back in server order; a read of a
    // key the server does not have is absent, not an error.
    #[test]
    fn test_inexact_matches_then_missing_read() {
        let c = client(
            "211 Found inexact matches, list follows (until terminating `.')\n\
             rock b70e170e Artist One / Album One\n\
             blues b70e170f Artist Two / Album Two\n\
             folk b70e1710 Artist Three / Album Three\n\
             .\n",
        );
        let fp = DiscFingerprint {
            disc_id: 0xb70e_170e,
            track_count: 14,
            offsets: vec![
                150, 20828, 36008, 53518, 71937, 90777, 109374, 128353, 150255, 172861, 192062,
                216672, 235357, 253890,
            ],
            total_seconds: 3609,
        };
        let matches = c.query(&fp).unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].category, "rock");
        assert_eq!(matches[1].category, "blues");
        assert_eq!(matches[2].category, "folk");

        let reader = client("401 data deadbeef No such CD entry in database\n");
        assert_eq!(reader.read("data", 0xdead_beef).unwrap(), None);
    }

    // Scenario: a garbage status line is a malformed-response error,
    // never a silent empty result.
    #[test]
    fn test_malformed_status_line_is_an_error() {
        let c = client("abc some text\n");
        let fp = DiscFingerprint {
            disc_id: 1,
            track_count: 1,
            offsets: vec![150],
            total_seconds: 60,
        };
        assert!(matches!(
            c.query(&fp),
            Err(CddbError::MalformedResponse(_))
        ));
        assert!(matches!(
            c.read("rock", 1),
            Err(CddbError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_transport_failure_propagates() {
        let c = CddbClient::with_transport(
            MockTransport::failing(CddbError::Transport("dns failure".into())),
            &identity(),
        );
        assert!(matches!(
            c.read("rock", 1),
            Err(CddbError::Transport(_))
        ));
    }
}
