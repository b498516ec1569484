mod convert;
mod glob_util;
mod rules;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mssql2pg")]
#[command(version)]
#[command(about = "Rewrite SQL Server view definitions into PostgreSQL-compatible SQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert T-SQL scripts (GO-separated batches) to PostgreSQL
    Convert {
        /// Input SQL file or glob pattern (e.g., *.sql, views/**/*.sql)
        /// Supports .gz, .bz2, .xz, .zst compression
        file: PathBuf,

        /// Output SQL file or directory (default: stdout for single file, required for glob)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rules to apply, in order (comma-separated; default: all)
        #[arg(short, long)]
        rules: Option<String>,

        /// YAML config file (rule order, strict, header)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Strict mode: fail if any fragment was left unconverted
        #[arg(long)]
        strict: bool,

        /// Show progress during conversion
        #[arg(short, long)]
        progress: bool,

        /// Preview without writing files (dry run)
        #[arg(long)]
        dry_run: bool,

        /// Output statistics as JSON instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Skip header comments
        #[arg(long)]
        no_header: bool,

        /// Stop on first file that fails (for glob patterns)
        #[arg(long)]
        fail_fast: bool,
    },

    /// List available rewrite rules in default pipeline order
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Convert {
            file,
            output,
            rules,
            config,
            strict,
            progress,
            dry_run,
            json,
            no_header,
            fail_fast,
        } => convert::run(convert::ConvertArgs {
            file,
            output,
            rules,
            config,
            strict,
            progress,
            dry_run,
            json,
            no_header,
            fail_fast,
        }),
        Commands::Rules { json } => rules::run(json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "mssql2pg", &mut io::stdout());
            Ok(())
        }
    }
}
