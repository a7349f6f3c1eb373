// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result};
use sea_orm::ConnectOptions;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::io;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

use pipeline_auth::config::Config;
use pipeline_auth::db::migration::Migrator;

/// Manage the primary store schema of the identity federation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: String,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global=true, action = clap::ArgAction::Count, display_order = 920)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back the last applied migration
    Down,
    /// Show the migration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let args = Args::parse();

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(match args.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        });

    tracing_subscriber::registry().with(log_layer).init();

    let cfg = Config::new(args.config.into())?;
    let mut opt = ConnectOptions::new(cfg.database.get_connection());
    if args.verbose < 2 {
        opt.sqlx_logging(false);
    }

    let conn = Database::connect(opt).await?;

    match args.command.unwrap_or(Command::Up) {
        Command::Up => {
            Migrator::up(&conn, None).await?;
            info!("primary store schema is up to date");
        }
        Command::Down => {
            Migrator::down(&conn, Some(1)).await?;
            info!("last migration rolled back");
        }
        Command::Status => Migrator::status(&conn).await?,
    }
    conn.close().await?;
    Ok(())
}
