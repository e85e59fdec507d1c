//! revfs: inspect a repository revision through the filesystem view.
//!
//! The binary plays the host's role: it supplies the two configuration
//! options, provisions the filesystem once, issues capability calls against
//! it, and decides how errors are rendered (stderr plus a nonzero exit code).
//!
//! ```bash
//! revfs -C /srv/docs.git -r v1.2 ls /
//! revfs -C /srv/docs.git cat /README.md
//! revfs --config site.json stat /index.html
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use revfs::{Filesystem, GitRevisionFs, Metadata, RevisionFsConfig};

#[derive(Parser)]
#[command(name = "revfs", version, about = "Read-only filesystem view of a git revision")]
struct Cli {
    /// Path to the repository root (plain or bare).
    #[arg(short = 'C', long)]
    repository: Option<PathBuf>,

    /// Revision spec: branch, tag, hash, HEAD, HEAD~N. Defaults to HEAD.
    #[arg(short, long)]
    revision: Option<String>,

    /// JSON config file with "repository" and "revision" options.
    #[arg(long, conflicts_with_all = ["repository", "revision"])]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory.
    Ls {
        #[arg(default_value = "/")]
        path: PathBuf,
    },
    /// Print file contents to stdout.
    Cat { path: PathBuf },
    /// Show entry metadata.
    Stat { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let fs = GitRevisionFs::provision(&config)?;
    tracing::debug!(revision = fs.revision(), "filesystem provisioned");

    match cli.command {
        Command::Ls { path } => {
            for entry in fs.read_dir(&path).await? {
                println!("{}", render_row(&entry));
            }
        }
        Command::Cat { path } => {
            let data = fs.read(&path).await?;
            std::io::stdout().write_all(&data)?;
        }
        Command::Stat { path } => {
            let meta = fs.stat(&path).await?;
            print!("{}", render_stat(&meta));
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<RevisionFsConfig> {
    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        return Ok(RevisionFsConfig::from_json(&text)?);
    }
    let repository = cli
        .repository
        .clone()
        .context("--repository is required unless --config is given")?;
    let mut config = RevisionFsConfig::new(repository);
    if let Some(revision) = &cli.revision {
        config = config.with_revision(revision.clone());
    }
    Ok(config)
}

fn render_row(entry: &Metadata) -> String {
    let mode = match entry.mode {
        Some(mode) => format!("{mode:06o}"),
        None => "------".to_string(),
    };
    let size = if entry.is_dir() {
        "-".to_string()
    } else {
        entry.size.to_string()
    };
    format!("{mode} {size:>8} {}", entry.name)
}

fn render_stat(meta: &Metadata) -> String {
    let mut out = String::new();
    out.push_str(&format!("name:     {}\n", meta.name));
    out.push_str(&format!(
        "kind:     {}\n",
        if meta.is_dir() { "directory" } else { "file" }
    ));
    out.push_str(&format!("size:     {}\n", meta.size));
    if let Some(mode) = meta.mode {
        out.push_str(&format!("mode:     {mode:06o}\n"));
    }
    if let Some(modified) = meta.modified {
        if let Ok(epoch) = modified.duration_since(UNIX_EPOCH) {
            out.push_str(&format!("modified: {}\n", epoch.as_secs()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use revfs::EntryKind;

    #[test]
    fn row_rendering() {
        let entry = Metadata {
            name: "readme.txt".to_string(),
            kind: EntryKind::File,
            size: 11,
            modified: None,
            mode: Some(0o100644),
        };
        assert_eq!(render_row(&entry), "100644       11 readme.txt");

        let dir = Metadata {
            name: "docs".to_string(),
            kind: EntryKind::Directory,
            size: 0,
            modified: None,
            mode: Some(0o040000),
        };
        assert_eq!(render_row(&dir), "040000        - docs");
    }

    #[test]
    fn stat_rendering_includes_mode_and_epoch() {
        let meta = Metadata {
            name: "run.sh".to_string(),
            kind: EntryKind::File,
            size: 10,
            modified: Some(UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000)),
            mode: Some(0o100755),
        };
        let rendered = render_stat(&meta);
        assert!(rendered.contains("mode:     100755"));
        assert!(rendered.contains("modified: 1700000000"));
        assert!(rendered.contains("kind:     file"));
    }
}
