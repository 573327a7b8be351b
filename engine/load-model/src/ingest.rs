//! # CSV Ingestion
//!
//! Loads the roster, session log and wellness questionnaires from a data
//! directory. Headers are checked before any row is decoded so that a schema
//! problem is reported as such rather than as a row-level decode error.

use crate::error::{ModelError, Result};
use crate::types::{Player, RawDataset, Session, Wellness};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

pub const PLAYERS_FILE: &str = "players.csv";
pub const SESSIONS_FILE: &str = "sessions.csv";
pub const WELLNESS_FILE: &str = "wellness.csv";

pub const REQUIRED_PLAYER_COLUMNS: &[&str] = &["player_id", "player_name", "position", "status"];
pub const REQUIRED_SESSION_COLUMNS: &[&str] = &[
    "date",
    "player_id",
    "session_type",
    "minutes",
    "sRPE",
    "external_load",
    "total_accels",
    "jump_count",
];
pub const REQUIRED_WELLNESS_COLUMNS: &[&str] =
    &["date", "player_id", "sleep_hours", "sleep_quality", "soreness", "fatigue", "stress", "mood"];

#[derive(Debug, Deserialize)]
struct PlayerRow {
    player_id: String,
    player_name: String,
    position: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SessionRow {
    date: String,
    player_id: String,
    session_type: String,
    minutes: Option<f64>,
    #[serde(rename = "sRPE")]
    srpe: Option<f64>,
    external_load: Option<f64>,
    total_accels: Option<f64>,
    jump_count: Option<f64>,
    #[serde(default)]
    avg_hr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WellnessRow {
    date: String,
    player_id: String,
    sleep_hours: Option<f64>,
    sleep_quality: Option<f64>,
    soreness: Option<f64>,
    fatigue: Option<f64>,
    stress: Option<f64>,
    mood: Option<f64>,
}

/// Load players, sessions and wellness from `data_dir`
///
/// Expected paths:
///   data_dir/players.csv
///   data_dir/sessions.csv
///   data_dir/wellness.csv
pub fn load_dataset(data_dir: &Path) -> Result<RawDataset> {
    info!("Loading raw tables from {:?}", data_dir);

    let players = load_players(&data_dir.join(PLAYERS_FILE))?;
    let sessions = load_sessions(&data_dir.join(SESSIONS_FILE))?;
    let wellness = load_wellness(&data_dir.join(WELLNESS_FILE))?;

    info!(
        "Loaded {} players, {} sessions, {} wellness entries",
        players.len(),
        sessions.len(),
        wellness.len()
    );

    Ok(RawDataset { players, sessions, wellness })
}

pub fn load_players(path: &Path) -> Result<Vec<Player>> {
    let rows: Vec<PlayerRow> = read_table(path, "players", REQUIRED_PLAYER_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|row| Player {
            player_id: row.player_id,
            player_name: row.player_name,
            position: row.position,
            status: row.status,
        })
        .collect())
}

pub fn load_sessions(path: &Path) -> Result<Vec<Session>> {
    let rows: Vec<SessionRow> = read_table(path, "sessions", REQUIRED_SESSION_COLUMNS)?;
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| -> Result<Session> {
            Ok(Session {
                date: parse_date("sessions", line_number(index), &row.date)?,
                player_id: row.player_id,
                session_type: row.session_type,
                minutes: row.minutes,
                srpe: row.srpe,
                external_load: row.external_load,
                total_accels: row.total_accels,
                jump_count: row.jump_count,
                avg_hr: row.avg_hr,
            })
        })
        .collect()
}

pub fn load_wellness(path: &Path) -> Result<Vec<Wellness>> {
    let rows: Vec<WellnessRow> = read_table(path, "wellness", REQUIRED_WELLNESS_COLUMNS)?;
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| -> Result<Wellness> {
            Ok(Wellness {
                date: parse_date("wellness", line_number(index), &row.date)?,
                player_id: row.player_id,
                sleep_hours: row.sleep_hours,
                sleep_quality: row.sleep_quality,
                soreness: row.soreness,
                fatigue: row.fatigue,
                stress: row.stress,
                mood: row.mood,
            })
        })
        .collect()
}

/// Ensure a header row contains every required column
pub fn validate_headers(headers: &StringRecord, required: &[&str], table: &str) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ModelError::Schema { table: table.to_string(), missing })
    }
}

/// Parse an ISO date, tolerating a trailing time component
pub fn parse_date(table: &str, line: usize, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| ModelError::Date { table: table.to_string(), line, value: value.to_string() })
}

// Header is line 1
fn line_number(index: usize) -> usize {
    index + 2
}

fn read_table<T: DeserializeOwned>(path: &Path, table: &str, required: &[&str]) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(ModelError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(file);

    let headers = reader.headers()?.clone();
    validate_headers(&headers, required, table)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }

    debug!("Read {} rows from {} ({:?})", rows.len(), table, path);
    Ok(rows)
}
