//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed
//! arguments and returns an `anyhow::Result<()>`.

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cddb::{self, CddbClient, DiscFingerprint, DiscMatch, DiscRecord, Identity};

/// Simple FreeDB/CDDB lookup client
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CDDB server CGI endpoint
    #[arg(long, env = "CDDB_SERVER", default_value = cddb::DEFAULT_SERVER)]
    pub server: String,

    /// User name for the protocol greeting (default: from environment)
    #[arg(long)]
    pub user: Option<String>,

    /// Host name for the protocol greeting (default: from environment)
    #[arg(long)]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Query the database for discs matching a TOC fingerprint
    Query {
        /// Disc id as hex (e.g. fd0ce112)
        #[arg(value_parser = parse_disc_id)]
        disc_id: u32,
        /// Total disc playtime in seconds
        total_seconds: u32,
        /// Track frame offsets, one per track
        #[arg(required = true)]
        offsets: Vec<u32>,
    },
    /// Read the full metadata record for one match
    Read {
        /// Category token from a query match
        category: String,
        /// Disc id as hex
        #[arg(value_parser = parse_disc_id)]
        disc_id: u32,
    },
    /// Query, then read the record of every match
    Lookup {
        /// Disc id as hex (e.g. fd0ce112)
        #[arg(value_parser = parse_disc_id)]
        disc_id: u32,
        /// Total disc playtime in seconds
        total_seconds: u32,
        /// Track frame offsets, one per track
        #[arg(required = true)]
        offsets: Vec<u32>,
    },
}

/// Run the parsed command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let client = build_client(cli);

    match &cli.command {
        Commands::Query {
            disc_id,
            total_seconds,
            offsets,
        } => {
            let matches = client.query(&fingerprint(*disc_id, offsets, *total_seconds))?;
            print_matches(&matches);
        }
        Commands::Read { category, disc_id } => match client.read(category, *disc_id)? {
            Some(record) => print_record(&record),
            None => println!("No entry for {} {:08x}", category, disc_id),
        },
        Commands::Lookup {
            disc_id,
            total_seconds,
            offsets,
        } => {
            let matches = client.query(&fingerprint(*disc_id, offsets, *total_seconds))?;
            print_matches(&matches);
            for m in &matches {
                println!();
                println!("--- {} {:08x} ---", m.category, m.disc_id);
                match client.read(&m.category, m.disc_id)? {
                    Some(record) => print_record(&record),
                    None => println!("No entry (match list was stale)"),
                }
            }
        }
    }

    Ok(())
}

fn build_client(cli: &Cli) -> CddbClient {
    let mut identity = Identity::from_env();
    if let Some(user) = &cli.user {
        identity.user = user.clone();
    }
    if let Some(host) = &cli.host {
        identity.host = host.clone();
    }
    debug!(user = %identity.user, host = %identity.host, server = %cli.server, "using identity");
    CddbClient::with_identity(&identity).with_server(&cli.server)
}

fn fingerprint(disc_id: u32, offsets: &[u32], total_seconds: u32) -> DiscFingerprint {
    DiscFingerprint {
        disc_id,
        track_count: offsets.len() as u32,
        offsets: offsets.to_vec(),
        total_seconds,
    }
}

fn print_matches(matches: &[DiscMatch]) {
    if matches.is_empty() {
        println!("No matches found");
        return;
    }
    println!("{} match(es):", matches.len());
    for m in matches {
        match cddb::split_dtitle(&m.title) {
            Some((artist, album)) => {
                println!("  {:<8} {:08x}  {} - {}", m.category, m.disc_id, artist, album)
            }
            None => println!("  {:<8} {:08x}  {}", m.category, m.disc_id, m.title),
        }
    }
}

fn print_record(record: &DiscRecord) {
    if let Some(title) = &record.title {
        match cddb::split_dtitle(title) {
            Some((artist, album)) => {
                println!("  Artist: {}", artist);
                println!("  Album:  {}", album);
            }
            None => println!("  Title:  {}", title),
        }
    }
    if let Some(year) = record.year {
        println!("  Year:   {}", year);
    }
    if let Some(genre) = &record.genre {
        println!("  Genre:  {}", genre);
    }
    if !record.tracks.is_empty() {
        println!("  Tracks:");
        for (i, track) in record.tracks.iter().enumerate() {
            println!("    {:>2}. {}", i + 1, track);
        }
    }
}

/// Parse a disc id given as hex, with or without a `0x` prefix.
fn parse_disc_id(s: &str) -> Result<u32, String> {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex disc id {s:?}: {e}"))
}
