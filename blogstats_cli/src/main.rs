//! Seeds a blog database and prints the comment analytics.
//!
//! Without `--database` (or `BLOGSTATS_DB`) the database lives in a
//! temporary directory that is removed when the program exits.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use blogstats_core::db::{self, ConnectionSpec, DB_ENV_VAR};
use blogstats_core::report::Report;
use blogstats_core::seed;
use clap::Parser;

/// Print how users comment on the seeded blog posts.
#[derive(Debug, Parser)]
#[command(name = "blogstats", version, about)]
struct Cli {
    /// SQLite file to create and seed. Defaults to a throwaway file.
    #[arg(short, long, value_name = "PATH", env = DB_ENV_VAR)]
    database: Option<PathBuf>,
    /// Use an in-memory database. Takes precedence over `--database`.
    #[arg(short, long)]
    memory: bool,
    /// Pretty-print the JSON sections.
    #[arg(short, long)]
    pretty: bool,
    /// Compute the analytics with SQL instead of in memory.
    #[arg(long)]
    sql: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Held until exit so the throwaway database outlives the connection.
    let mut scratch = None;
    let spec = if cli.memory {
        ConnectionSpec::memory()
    } else if let Some(path) = &cli.database {
        ConnectionSpec::sqlite(path)
    } else {
        let dir = tempfile::tempdir().context("creating scratch directory")?;
        let spec = ConnectionSpec::sqlite(dir.path().join("blog.db"));
        scratch = Some(dir);
        spec
    };
    log::debug!("using {spec:?}");

    let mut conn = db::connect(&spec)
        .with_context(|| format!("opening database {}", spec.conn_str))?;
    seed::seed(&mut conn).context("seeding database")?;

    let report = if cli.sql {
        Report::build_sql(&conn)?
    } else {
        Report::build(&conn)?
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report.render(&mut out, cli.pretty)?;
    out.flush()?;

    drop(conn);
    if let Some(dir) = scratch {
        dir.close().context("removing scratch directory")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    // The only test touching the environment, so nothing races on it.
    #[test]
    fn database_from_environment() {
        std::env::set_var(DB_ENV_VAR, "/tmp/from-env.db");
        let from_env = Cli::try_parse_from(["blogstats"]);
        let from_flag = Cli::try_parse_from(["blogstats", "--database", "flag.db"]);
        std::env::remove_var(DB_ENV_VAR);

        assert_eq!(from_env.unwrap().database, Some(PathBuf::from("/tmp/from-env.db")));
        assert_eq!(from_flag.unwrap().database, Some(PathBuf::from("flag.db")));
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["blogstats", "--memory", "--pretty", "--sql"]).unwrap();
        assert!(cli.memory && cli.pretty && cli.sql);
    }
}
