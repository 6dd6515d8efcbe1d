//! CDDB command formatting and response grammar.
//!
//! This is the ONLY place where wire text is produced or consumed.
//! Everything here is a pure function over strings, so the grammar can
//! be tested in isolation from the transport.
//!
//! Response shape (protocol level 6):
//! - line 0 is always `<code> <free text>`
//! - list responses (query matches, read records) end with a line
//!   containing exactly `.`
//! - record lines are `KEY=VALUE`; blank lines and `#` comments are
//!   padding

use super::domain::{CddbError, DiscFingerprint, DiscMatch, DiscRecord};

/// Query matched exactly one disc; the match is on the status line.
const CODE_EXACT_MATCH: u32 = 200;
/// Multiple exact matches follow, one per line.
const CODE_MULTIPLE_EXACT: u32 = 210;
/// Multiple inexact matches follow, one per line.
const CODE_MULTIPLE_INEXACT: u32 = 211;
/// Read found the entry; the record body follows.
const CODE_ENTRY_FOLLOWS: u32 = 210;

/// Format a `query` command for a disc fingerprint.
///
/// `query <discid hex> <track count> <offsets...> <total seconds>`
pub fn query_command(fingerprint: &DiscFingerprint) -> String {
    let offsets = fingerprint
        .offsets
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "query {:08x} {} {} {}",
        fingerprint.disc_id, fingerprint.track_count, offsets, fingerprint.total_seconds
    )
}

/// Format a `read` command for one match key.
pub fn read_command(category: &str, disc_id: u32) -> String {
    format!("read {} {:08x}", category, disc_id)
}

/// Extract the numeric status code from the first response line.
pub fn status_code(line: &str) -> Result<u32, CddbError> {
    line.split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| CddbError::MalformedResponse(format!("unparsable status line {line:?}")))
}

/// Parse the full response to a `query` command.
///
/// Code 200 carries its single match on the status line itself; codes
/// 210/211 are followed by one match per line up to the `.` terminator.
/// Every other code (no match, corrupt disc, server error) is a valid
/// empty result, not an error. Server line order is preserved.
pub fn parse_query_response(body: &str) -> Result<Vec<DiscMatch>, CddbError> {
    let mut lines = body.lines();
    let first = lines
        .next()
        .ok_or_else(|| CddbError::MalformedResponse("empty response".to_string()))?;

    let mut matches = Vec::new();
    match status_code(first)? {
        CODE_EXACT_MATCH => {
            let row = first
                .split_once(' ')
                .map(|(_code, rest)| rest)
                .ok_or_else(|| {
                    CddbError::MalformedResponse(format!("match missing from 200 line {first:?}"))
                })?;
            matches.push(parse_match_row(row)?);
        }
        CODE_MULTIPLE_EXACT | CODE_MULTIPLE_INEXACT => {
            for line in lines {
                if line == "." {
                    break;
                }
                matches.push(parse_match_row(line)?);
            }
        }
        _ => {}
    }
    Ok(matches)
}

/// Parse one `<category> <discid hex> <title>` match row.
///
/// The title is the remainder of the line and may contain anything,
/// including further spaces and slashes.
fn parse_match_row(line: &str) -> Result<DiscMatch, CddbError> {
    let mut fields = line.trim_start().splitn(3, ' ');
    let (category, id_hex, title) = match (fields.next(), fields.next(), fields.next()) {
        (Some(category), Some(id_hex), Some(title)) => (category, id_hex, title),
        _ => {
            return Err(CddbError::MalformedResponse(format!(
                "match row has fewer than three fields: {line:?}"
            )));
        }
    };
    let disc_id = u32::from_str_radix(id_hex, 16).map_err(|_| {
        CddbError::MalformedResponse(format!("non-hex discid {id_hex:?} in match row"))
    })?;
    Ok(DiscMatch {
        category: category.to_string(),
        disc_id,
        title: title.trim_start().to_string(),
    })
}

/// Parse the full response to a `read` command.
///
/// Any status other than 210 means the entry is absent, returned as
/// `Ok(None)`. A missing `.` terminator is treated as an implicit end
/// of the record.
pub fn parse_read_response(body: &str) -> Result<Option<DiscRecord>, CddbError> {
    let mut lines = body.lines();
    let first = lines
        .next()
        .ok_or_else(|| CddbError::MalformedResponse("empty response".to_string()))?;
    if status_code(first)? != CODE_ENTRY_FOLLOWS {
        return Ok(None);
    }

    let mut record = DiscRecord::default();
    let mut next_track = 0usize;

    for line in lines {
        if line == "." {
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            CddbError::MalformedResponse(format!("expected KEY=VALUE record line, got {line:?}"))
        })?;
        if value.is_empty() {
            continue;
        }
        if key == "DTITLE" {
            record.title = Some(value.to_string());
        } else if key == "DYEAR" {
            let year = value.trim().parse().map_err(|_| {
                CddbError::MalformedResponse(format!("non-numeric DYEAR value {value:?}"))
            })?;
            record.year = Some(year);
        } else if key == "DGENRE" {
            record.genre = Some(value.to_string());
        } else if let Some(suffix) = key.strip_prefix("TTITLE") {
            let n: usize = suffix.parse().map_err(|_| {
                CddbError::MalformedResponse(format!("non-numeric TTITLE index {suffix:?}"))
            })?;
            if n != next_track {
                return Err(CddbError::ProtocolViolation(
                    "track titles are not monotonically increasing".to_string(),
                ));
            }
            next_track += 1;
            record.tracks.push(value.to_string());
        }
        // DISCID, EXTD, EXTT<n>, PLAYORDER and anything else: ignored
    }

    Ok(Some(record))
}

/// Split a DTITLE into its conventional `artist / title` halves.
///
/// The split happens at the first slash not escaped as `\/`, with
/// surrounding whitespace trimmed. Returns `None` when the value has
/// no unescaped slash. `query`/`read` never call this; it is offered
/// to callers that want the convention applied.
pub fn split_dtitle(dtitle: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, b) in dtitle.bytes().enumerate() {
        if b == b'/' && !escaped {
            return Some((dtitle[..i].trim_end(), dtitle[i + 1..].trim_start()));
        }
        escaped = b == b'\\';
    }
    None
}
