// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations CI runs so they can be reproduced locally
//! with `cargo xtask <command>`.
//!
//! `verify-schema` is the one command that does more than shell out: it
//! applies the ledger migrations to a scratch `SQLite` file twice, replays
//! the raw migration SQL against an already-populated database, and checks
//! the resulting tables, foreign keys, and indexes against the layout the
//! ledger relies on.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use diesel::connection::SimpleConnection;
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Raw SQL of the initial migration, replayed to prove it is idempotent.
const CREATE_LEDGER_TABLES_SQL: &str = include_str!(
    "../../crates/persistence/migrations/2026-01-01-000000_create_ledger_tables/up.sql"
);

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, schema)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify the ledger migrations produce the expected schema
    #[command(visible_alias = "vs")]
    VerifySchema,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifySchema => verify_schema(),
        }
    }
}

/// Run CI checks (lint, build, test, schema)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_schema()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run tests for libs and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify the ledger migrations against the expected schema
///
/// ## What This Command Does
///
/// 1. Creates a scratch `SQLite` database under the system temp directory
/// 2. Applies the embedded migrations, then applies them again and
///    requires the second pass to be a no-op
/// 3. Inserts a row into every table and replays the raw migration SQL,
///    which must succeed and leave the rows in place
/// 4. Introspects tables, columns, foreign keys, and indexes and compares
///    them with the layout the ledger queries rely on
///
/// The scratch file is removed whether or not verification passes.
fn verify_schema() -> Result<()> {
    tracing::info!("Starting ledger schema verification");

    let scratch = std::env::temp_dir().join(format!(
        "visit-ledger-verify-schema-{}.db",
        std::process::id()
    ));
    let scratch_url = scratch
        .to_str()
        .ok_or_else(|| eyre!("scratch database path is not valid UTF-8"))?
        .to_string();

    let verification_result = (|| -> Result<()> {
        let mut conn = SqliteConnection::establish(&scratch_url)
            .wrap_err("Failed to create scratch SQLite database")?;

        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut conn)
            .wrap_err("Failed to enable foreign keys on SQLite")?;

        tracing::info!("Applying migrations");
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
        tracing::info!("Applied {} migration(s)", applied.len());

        let reapplied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| eyre!("Failed to re-run migrations: {e}"))?;
        if !reapplied.is_empty() {
            return Err(eyre!(
                "❌ Schema verification FAILED: {} migration(s) ran twice",
                reapplied.len()
            ));
        }

        tracing::info!("Replaying migration SQL over existing data");
        diesel::sql_query("INSERT INTO users (name) VALUES ('verify')")
            .execute(&mut conn)
            .wrap_err("Failed to seed users")?;
        diesel::sql_query("INSERT INTO places (place_name) VALUES ('verify')")
            .execute(&mut conn)
            .wrap_err("Failed to seed places")?;
        diesel::sql_query(
            "INSERT INTO visits (user_id, place_id, visit_date, stay_duration) VALUES (1, 1, '2024-01-01', 30)",
        )
        .execute(&mut conn)
        .wrap_err("Failed to seed visits")?;

        conn.batch_execute(CREATE_LEDGER_TABLES_SQL)
            .wrap_err("Migration SQL is not idempotent")?;
        expect_row_count(&mut conn, "users", 1)?;
        expect_row_count(&mut conn, "places", 1)?;
        expect_row_count(&mut conn, "visits", 1)?;

        tracing::info!("Introspecting schema");
        let schema = introspect_sqlite_schema(&mut conn)?;

        tracing::info!("Comparing schema");
        compare_schemas(&expected_schema(), &schema)?;

        tracing::info!("✓ Schema verification passed");
        Ok(())
    })();

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{scratch_url}{suffix}"));
    }

    verification_result
}

fn expect_row_count(conn: &mut SqliteConnection, table: &str, expected: i64) -> Result<()> {
    #[derive(QueryableByName)]
    struct CountRow {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        count: i64,
    }

    let found = diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
        .get_result::<CountRow>(conn)
        .wrap_err(format!("Failed to count rows in {table}"))?
        .count;

    if found != expected {
        return Err(eyre!(
            "❌ Schema verification FAILED: table '{table}' has {found} row(s) after replay, expected {expected}"
        ));
    }
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    index_columns: BTreeSet<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

fn table(
    columns: &[(&str, &str)],
    primary_key: &str,
    foreign_keys: &[(&str, &str, &str)],
    indexes: &[&str],
) -> Table {
    Table {
        columns: columns
            .iter()
            .map(|(name, ty)| {
                (
                    (*name).to_string(),
                    Column {
                        normalized_type: (*ty).to_string(),
                        nullable: false,
                    },
                )
            })
            .collect(),
        primary_keys: BTreeSet::from([primary_key.to_string()]),
        foreign_keys: foreign_keys
            .iter()
            .map(|(from, to_table, to_column)| ForeignKey {
                from_column: (*from).to_string(),
                to_table: (*to_table).to_string(),
                to_column: (*to_column).to_string(),
            })
            .collect(),
        index_columns: indexes.iter().map(|c| vec![(*c).to_string()]).collect(),
    }
}

/// The layout a fresh migration creates. `diesel_schema.rs` additionally
/// reads the counter and duration columns as nullable for adopted files.
fn expected_schema() -> Schema {
    let mut tables = BTreeMap::new();
    tables.insert(
        "users".to_string(),
        table(
            &[("user_id", "integer"), ("name", "text")],
            "user_id",
            &[],
            &[],
        ),
    );
    tables.insert(
        "places".to_string(),
        table(
            &[
                ("place_id", "integer"),
                ("place_name", "text"),
                ("number_of_visits", "integer"),
            ],
            "place_id",
            &[],
            &[],
        ),
    );
    tables.insert(
        "visits".to_string(),
        table(
            &[
                ("visit_id", "integer"),
                ("user_id", "integer"),
                ("place_id", "integer"),
                ("visit_date", "text"),
                ("stay_duration", "integer"),
            ],
            "visit_id",
            &[
                ("user_id", "users", "user_id"),
                ("place_id", "places", "place_id"),
            ],
            &["user_id", "place_id"],
        ),
    );
    Schema { tables }
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let upper = sqlite_type.to_uppercase();
    if upper.contains("INT") {
        "integer".to_string()
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        "text".to_string()
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        "real".to_string()
    } else if upper.contains("BLOB") || upper.is_empty() {
        "blob".to_string()
    } else {
        "numeric".to_string()
    }
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            index_columns: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            // INTEGER PRIMARY KEY is the rowid alias and reports notnull = 0.
            let nullable = col.notnull == 0 && col.pk == 0;
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            if idx.name.starts_with("sqlite_autoindex_") {
                continue;
            }
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            table_info
                .index_columns
                .insert(index_columns.into_iter().map(|c| c.name).collect());
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Compare schemas and fail on mismatch
fn compare_schemas(expected: &Schema, actual: &Schema) -> Result<()> {
    let expected_tables: BTreeSet<_> = expected.tables.keys().collect();
    let actual_tables: BTreeSet<_> = actual.tables.keys().collect();

    if expected_tables != actual_tables {
        let mut errors = Vec::new();

        for table in expected_tables.difference(&actual_tables) {
            errors.push(format!("  - Table '{table}' is missing"));
        }

        for table in actual_tables.difference(&expected_tables) {
            errors.push(format!("  - Table '{table}' is unexpected"));
        }

        return Err(eyre!(
            "❌ Schema verification FAILED: Table mismatch\n{}",
            errors.join("\n")
        ));
    }

    for table_name in expected_tables {
        let want = &expected.tables[table_name];
        let got = &actual.tables[table_name];

        if want.columns != got.columns {
            return Err(eyre!(
                "❌ Schema verification FAILED: Column mismatch in table '{table_name}'\n  Expected: {:?}\n  Found: {:?}",
                want.columns,
                got.columns
            ));
        }

        if want.primary_keys != got.primary_keys {
            return Err(eyre!(
                "❌ Schema verification FAILED: Primary key mismatch in table '{table_name}'\n  Expected: {:?}\n  Found: {:?}",
                want.primary_keys,
                got.primary_keys
            ));
        }

        if want.foreign_keys != got.foreign_keys {
            return Err(eyre!(
                "❌ Schema verification FAILED: Foreign key mismatch in table '{table_name}'\n  Expected: {:?}\n  Found: {:?}",
                want.foreign_keys,
                got.foreign_keys
            ));
        }

        // Extra indexes are allowed; the ones the ledger depends on are not optional.
        for columns in &want.index_columns {
            if !got.index_columns.contains(columns) {
                return Err(eyre!(
                    "❌ Schema verification FAILED: Index missing for table '{table_name}'\n  Missing index columns: {columns:?}"
                ));
            }
        }
    }

    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
