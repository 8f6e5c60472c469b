//! CLI surface for the table synchronizer (spec §6): `config <path>` loads
//! and validates a sync configuration; `update [<path>]` runs one full
//! sync cycle and reports the resulting status.
//!
//! Grounded in the original Python tool's `if __name__ == '__main__':`
//! verb dispatch (`sqlgsheet/sync.py`), expressed as an idiomatic `clap`
//! subcommand enum instead of matching on `sys.argv`.

use clap::{Parser, Subcommand};
use table_sync::{Status, Syncer};

#[derive(Parser)]
#[command(name = "sync-cli", about = "Two-endpoint table synchronizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load sync configuration from `<path>` and report validity.
    Config { path: String },
    /// Run one full sync (apply edits), printing the final status.
    Update {
        #[arg(default_value = "dbsync_config.json")]
        path: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Config { path } => run_config(&path),
        Command::Update { path } => run_update(&path),
    };

    std::process::exit(exit_code);
}

fn run_config(path: &str) -> i32 {
    match table_sync::load_config(path) {
        Ok(spec) => {
            println!(
                "{}",
                serde_json::json!({
                    "status": "ok",
                    "tables": spec.tables.len(),
                })
            );
            0
        }
        Err(e) => {
            eprintln!("config error: {e}");
            1
        }
    }
}

fn run_update(path: &str) -> i32 {
    let spec = table_sync::load_config_or_empty(path);
    let mut syncer = Syncer::from_spec(spec);

    match syncer.sync(true, false) {
        Ok(()) => {
            let status = syncer.status();
            println!("{}", serde_json::json!({ "status": status.to_string() }));
            if status == Status::Synced {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("sync error: {e}");
            1
        }
    }
}
