use std::io;
use std::path::Path;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use quorum::cli::{Cli, Command};
use quorum::migrate;
use quorum::output::OutputContext;
use quorum::storage::ForumStore;

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let out = OutputContext::from_flags(cli.json, cli.quiet);
    if let Err(err) = run(cli, &out) {
        out.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("QUORUM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli, out: &OutputContext) -> anyhow::Result<()> {
    match cli.command {
        Command::Init => cmd_init(&cli.db, out),
        Command::Migrate => cmd_migrate(&cli.db, out),
        Command::Status => cmd_status(&cli.db, out),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "qm", &mut io::stdout());
            Ok(())
        }
    }
}

fn cmd_init(db: &Path, out: &OutputContext) -> anyhow::Result<()> {
    ForumStore::open(db)?;
    out.success(&format!("initialized schema in {}", db.display()));
    Ok(())
}

fn cmd_migrate(db: &Path, out: &OutputContext) -> anyhow::Result<()> {
    let mut store = ForumStore::open(db)?;

    let spinner = out.is_plain().then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_message("migrating legacy data");
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });
    let result = migrate::run(store.conn_mut());
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = result?;

    out.success(&format!(
        "migration complete: {} users, {} topics, {} posts, {} comments, {} votes",
        report.users_created,
        report.topics_created,
        report.posts_migrated,
        report.comments_migrated,
        report.votes_recorded,
    ));
    if report.rejection_count() > 0 {
        out.warning(&format!("{} rejected records:", report.rejection_count()));
        for rejection in &report.rejected_comments {
            out.warning(&format!(
                "  legacy comment {} (invalid)",
                rejection.legacy_comment_id
            ));
        }
        for rejection in &report.rejected_votes {
            out.warning(&format!(
                "  vote by {} on legacy post {} ({:?})",
                rejection.username, rejection.legacy_post_id, rejection.direction
            ));
        }
    }
    out.json(&report);
    Ok(())
}

fn cmd_status(db: &Path, out: &OutputContext) -> anyhow::Result<()> {
    let store = ForumStore::open(db)?;
    let counts = store.table_counts()?;

    if out.is_json() {
        let map: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(table, count)| ((*table).to_string(), (*count).into()))
            .collect();
        out.json(&map);
    } else {
        for (table, count) in counts {
            out.print(&format!("{table}: {count}"));
        }
    }
    Ok(())
}
