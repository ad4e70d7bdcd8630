//! Daemon subcommands and their output.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use seedbox_rpc::util::torrent_base64;
use seedbox_rpc::{
    CallContext, Client, PortTestArgs, Torrent, TorrentAddArgs, TorrentGetArgs, TorrentId,
    TorrentIds, TorrentRemoveArgs,
};
use tracing::debug;

/// Fields `list` asks the daemon for.
const LIST_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "percentDone",
    "rateDownload",
    "rateUpload",
    "sizeWhenDone",
];

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the daemon's session settings as JSON.
    Session,

    /// Show transfer rates and totals.
    Stats,

    /// List torrents.
    List {
        /// Only torrents that changed since the previous poll.
        #[arg(long)]
        recent: bool,
    },

    /// Start torrents. IDS are numeric ids, hashes, `all` or `recent`.
    Start {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the download queue.
        #[arg(long)]
        now: bool,
    },

    /// Stop torrents.
    Stop {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Verify local data of torrents.
    Verify {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Ask trackers for more peers.
    Reannounce {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add a torrent from a `.torrent` file, URL or magnet link.
    Add {
        source: String,
        /// Add without starting.
        #[arg(long)]
        paused: bool,
        /// Directory to download into.
        #[arg(long)]
        download_dir: Option<String>,
    },

    /// Remove torrents.
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Also delete downloaded data.
        #[arg(long)]
        delete_data: bool,
    },

    /// Show free space at a path on the daemon host.
    FreeSpace { path: String },

    /// Check whether the daemon's peer port is reachable.
    PortTest {
        /// `ipv4` or `ipv6`.
        #[arg(long)]
        ip_protocol: Option<String>,
    },

    /// Print every field name `torrent-get` understands.
    Fields,

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Interpret id arguments. `all` and `recent` must stand alone.
pub fn parse_ids(args: &[String]) -> Result<TorrentIds> {
    match args {
        [one] if one == "all" => Ok(TorrentIds::All),
        [one] if one == "recent" => Ok(TorrentIds::RecentlyActive),
        _ if args.iter().any(|a| a == "all" || a == "recent") => {
            bail!("`all` and `recent` cannot be combined with other ids")
        }
        _ => Ok(args
            .iter()
            .map(|a| a.parse::<TorrentId>().unwrap_or_else(|never| match never {}))
            .collect()),
    }
}

/// Run a daemon command, writing human-readable output to `out`.
pub async fn run(command: &Command, client: &Client, ctx: &CallContext, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Session => {
            let session = client.session_get(ctx, &[]).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&session)?)?;
        }
        Command::Stats => {
            let stats = client.session_stats(ctx).await?;
            writeln!(
                out,
                "torrents: {} ({} active, {} paused)",
                stats.torrent_count, stats.active_torrent_count, stats.paused_torrent_count
            )?;
            writeln!(out, "down: {}/s  up: {}/s", human_bytes(stats.download_speed), human_bytes(stats.upload_speed))?;
            let total = &stats.cumulative_stats;
            writeln!(
                out,
                "total: {} downloaded, {} uploaded over {} sessions",
                human_bytes(total.downloaded_bytes),
                human_bytes(total.uploaded_bytes),
                total.session_count
            )?;
        }
        Command::List { recent } => {
            let ids = if *recent {
                TorrentIds::RecentlyActive
            } else {
                TorrentIds::All
            };
            let args = TorrentGetArgs::new(ids).fields(LIST_FIELDS.iter().copied());
            let result = client.torrent_get(ctx, &args).await?;
            debug!(count = result.torrents.len(), "fetched torrents");
            write_torrent_table(out, &result.torrents)?;
            if !result.removed.is_empty() {
                writeln!(out, "removed: {:?}", result.removed)?;
            }
        }
        Command::Start { ids, now } => {
            let ids = parse_ids(ids)?;
            if *now {
                client.torrent_start_now(ctx, &ids).await?;
            } else {
                client.torrent_start(ctx, &ids).await?;
            }
            writeln!(out, "started")?;
        }
        Command::Stop { ids } => {
            client.torrent_stop(ctx, &parse_ids(ids)?).await?;
            writeln!(out, "stopped")?;
        }
        Command::Verify { ids } => {
            client.torrent_verify(ctx, &parse_ids(ids)?).await?;
            writeln!(out, "verification queued")?;
        }
        Command::Reannounce { ids } => {
            client.torrent_reannounce(ctx, &parse_ids(ids)?).await?;
            writeln!(out, "reannounce queued")?;
        }
        Command::Add {
            source,
            paused,
            download_dir,
        } => {
            let mut args = add_args(source).await?;
            args.paused = paused.then_some(true);
            args.download_dir = download_dir.clone();
            let result = client.torrent_add(ctx, &args).await?;
            match result.torrent() {
                Some(t) if result.is_duplicate() => writeln!(out, "already present: {} ({})", t.name, t.id)?,
                Some(t) => writeln!(out, "added: {} ({})", t.name, t.id)?,
                None => writeln!(out, "added")?,
            }
        }
        Command::Remove { ids, delete_data } => {
            let args = TorrentRemoveArgs {
                ids: parse_ids(ids)?,
                delete_local_data: *delete_data,
            };
            client.torrent_remove(ctx, &args).await?;
            writeln!(out, "removed")?;
        }
        Command::FreeSpace { path } => {
            let space = client.free_space(ctx, path).await?;
            writeln!(
                out,
                "{}: {} free of {}",
                space.path,
                human_bytes(space.size_bytes),
                human_bytes(space.total_size)
            )?;
        }
        Command::PortTest { ip_protocol } => {
            let args = PortTestArgs {
                ip_protocol: ip_protocol.clone(),
            };
            let result = client.port_test(ctx, &args).await?;
            let state = if result.port_is_open { "open" } else { "closed" };
            writeln!(out, "peer port is {state}")?;
        }
        Command::Fields => write_fields(out)?,
        Command::Config { .. } => bail!("`config` does not talk to the daemon"),
    }
    Ok(())
}

pub fn write_fields(out: &mut impl Write) -> Result<()> {
    for field in Torrent::all_fields() {
        writeln!(out, "{field}")?;
    }
    Ok(())
}

/// URLs and magnet links are handed to the daemon; anything else is read
/// as a local `.torrent` file.
async fn add_args(source: &str) -> Result<TorrentAddArgs> {
    if ["magnet:", "http://", "https://"].iter().any(|p| source.starts_with(p)) {
        return Ok(TorrentAddArgs::from_filename(source));
    }
    let path = PathBuf::from(source);
    let metainfo = torrent_base64(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(TorrentAddArgs::from_metainfo(metainfo))
}

fn write_torrent_table(out: &mut impl Write, torrents: &[Torrent]) -> Result<()> {
    writeln!(out, "{:>5}  {:<13}  {:>6}  {:>10}  {:>10}  {:>10}  NAME", "ID", "STATUS", "DONE", "SIZE", "DOWN", "UP")?;
    for t in torrents {
        writeln!(
            out,
            "{:>5}  {:<13}  {:>5.1}%  {:>10}  {:>10}  {:>10}  {}",
            t.id,
            t.status.label(),
            t.percent_done * 100.0,
            human_bytes(t.size_when_done),
            human_bytes(t.rate_download),
            human_bytes(t.rate_upload),
            t.name
        )?;
    }
    Ok(())
}

/// Binary-prefixed size, e.g. `1.5 GiB`.
pub fn human_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
