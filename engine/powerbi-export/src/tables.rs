//! # Star Schema Tables
//!
//! Row types and builders for `dim_calendar`, `dim_players` and `fact_daily`.
//! Facts reference the dimensions by `player_id` and `date`/`date_key` only.

use crate::error::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use load_model::{DailyRecord, ModelError, Player};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// A table that can be written as a headed CSV file
pub trait Table: Serialize {
    /// Base file name without extension
    const NAME: &'static str;

    /// Column names, in field order
    const HEADER: &'static [&'static str];
}

/// One calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarRow {
    pub date: NaiveDate,
    pub date_key: u32,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub week: u32,
    pub day: u32,
    pub day_name: String,
    pub is_weekend: bool,
}

impl Table for CalendarRow {
    const NAME: &'static str = "dim_calendar";
    const HEADER: &'static [&'static str] =
        &["date", "date_key", "year", "month", "month_name", "week", "day", "day_name", "is_weekend"];
}

impl CalendarRow {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            date_key: date_key(date),
            year: date.year(),
            month: date.month(),
            month_name: date.format("%b").to_string(),
            week: date.iso_week().week(),
            day: date.day(),
            day_name: date.format("%a").to_string(),
            is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

/// One squad member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    pub status: String,
}

impl Table for PlayerRow {
    const NAME: &'static str = "dim_players";
    const HEADER: &'static [&'static str] = &["player_id", "player_name", "position", "status"];
}

/// One player-day of workload and readiness
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub date: NaiveDate,
    pub date_key: u32,
    pub player_id: String,
    pub session_type: String,
    pub minutes: Option<f64>,
    pub srpe: Option<f64>,
    pub external_load: Option<f64>,
    pub total_accels: Option<f64>,
    pub jump_count: Option<f64>,
    pub avg_hr: Option<f64>,
    pub internal_load: Option<f64>,
    pub internal_load_7d: Option<f64>,
    pub internal_load_28d: Option<f64>,
    pub readiness_raw: Option<f64>,
    pub readiness_score: Option<f64>,
    pub load_pct_change: Option<f64>,
    pub flag_load_spike: bool,
    pub flag_low_readiness: bool,
}

impl Table for FactRow {
    const NAME: &'static str = "fact_daily";
    const HEADER: &'static [&'static str] = &[
        "date",
        "date_key",
        "player_id",
        "session_type",
        "minutes",
        "srpe",
        "external_load",
        "total_accels",
        "jump_count",
        "avg_hr",
        "internal_load",
        "internal_load_7d",
        "internal_load_28d",
        "readiness_raw",
        "readiness_score",
        "load_pct_change",
        "flag_load_spike",
        "flag_low_readiness",
    ];
}

/// The three exported tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarSchema {
    pub calendar: Vec<CalendarRow>,
    pub players: Vec<PlayerRow>,
    pub facts: Vec<FactRow>,
}

impl StarSchema {
    /// Assemble all three tables from the roster and daily records
    pub fn build(roster: &[Player], daily: &[DailyRecord], float_precision: u32) -> Result<Self> {
        let facts = build_facts(daily, float_precision);
        let players = build_players(roster, &facts)?;
        let calendar = build_calendar(&facts);

        debug!(
            "Star schema: {} calendar rows, {} players, {} facts",
            calendar.len(),
            players.len(),
            facts.len()
        );

        Ok(Self { calendar, players, facts })
    }
}

/// Integer key `YYYYMMDD`
pub fn date_key(date: NaiveDate) -> u32 {
    // Years before 0 do not occur in monitoring data
    date.year().max(0) as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Round for stable, compact output; normalizes negative zero
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Every date from the first to the last fact, inclusive
pub fn build_calendar(facts: &[FactRow]) -> Vec<CalendarRow> {
    let (Some(first), Some(last)) = (facts.iter().map(|f| f.date).min(), facts.iter().map(|f| f.date).max())
    else {
        return Vec::new();
    };

    first.iter_days().take_while(|date| *date <= last).map(CalendarRow::for_date).collect()
}

/// Roster entries for players that appear in the facts, ordered by id
pub fn build_players(roster: &[Player], facts: &[FactRow]) -> Result<Vec<PlayerRow>> {
    let by_id: BTreeMap<&str, &Player> = roster.iter().map(|p| (p.player_id.as_str(), p)).collect();
    let in_facts: BTreeSet<&str> = facts.iter().map(|f| f.player_id.as_str()).collect();

    let mut rows = Vec::with_capacity(in_facts.len());
    for id in &in_facts {
        let player = by_id.get(id).ok_or_else(|| ModelError::UnknownPlayer(id.to_string()))?;
        rows.push(PlayerRow {
            player_id: player.player_id.clone(),
            player_name: player.player_name.clone(),
            position: player.position.clone(),
            status: player.status.clone(),
        });
    }

    let idle = by_id.len() - rows.len();
    if idle > 0 {
        warn!("{} rostered players have no daily records and are left out of dim_players", idle);
    }

    Ok(rows)
}

/// One fact per daily record, ordered by (player, date)
pub fn build_facts(daily: &[DailyRecord], float_precision: u32) -> Vec<FactRow> {
    let round = |value: Option<f64>| value.map(|v| round_to(v, float_precision));

    let mut facts: Vec<FactRow> = daily
        .iter()
        .map(|record| {
            let session = &record.session;
            FactRow {
                date: session.date,
                date_key: date_key(session.date),
                player_id: session.player_id.clone(),
                session_type: session.session_type.clone(),
                minutes: round(session.minutes),
                srpe: round(session.srpe),
                external_load: round(session.external_load),
                total_accels: round(session.total_accels),
                jump_count: round(session.jump_count),
                avg_hr: round(session.avg_hr),
                internal_load: round(record.internal_load),
                internal_load_7d: round(record.load_7d),
                internal_load_28d: round(record.load_28d),
                readiness_raw: round(record.readiness_raw),
                readiness_score: round(record.readiness_score),
                load_pct_change: round(record.load_pct_change),
                flag_load_spike: record.flag_load_spike,
                flag_low_readiness: record.flag_low_readiness,
            }
        })
        .collect();

    facts.sort_by(|a, b| (&a.player_id, a.date).cmp(&(&b.player_id, b.date)));
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use load_model::Session;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn player(id: &str) -> Player {
        Player {
            player_id: id.to_string(),
            player_name: format!("Player {id}"),
            position: "DEF".to_string(),
            status: "Available".to_string(),
        }
    }

    fn record(player: &str, d: u32, load: f64) -> DailyRecord {
        DailyRecord {
            session: Session {
                date: day(d),
                player_id: player.to_string(),
                session_type: "training".to_string(),
                minutes: Some(load),
                srpe: Some(1.0),
                external_load: None,
                total_accels: Some(12.4),
                jump_count: None,
                avg_hr: None,
            },
            internal_load: Some(load),
            load_7d: Some(load / 3.0),
            load_28d: None,
            readiness_raw: None,
            readiness_score: Some(-0.000001),
            load_pct_change: None,
            flag_load_spike: false,
            flag_low_readiness: false,
        }
    }

    #[test]
    fn test_calendar_attributes() {
        // 2024-01-06 is a Saturday in ISO week 1
        let row = CalendarRow::for_date(day(6));
        assert_eq!(row.date_key, 20240106);
        assert_eq!(row.year, 2024);
        assert_eq!(row.month, 1);
        assert_eq!(row.month_name, "Jan");
        assert_eq!(row.week, 1);
        assert_eq!(row.day, 6);
        assert_eq!(row.day_name, "Sat");
        assert!(row.is_weekend);

        assert!(!CalendarRow::for_date(day(8)).is_weekend);
    }

    #[test]
    fn test_calendar_fills_gaps() {
        let facts = build_facts(&[record("P001", 2, 10.0), record("P002", 5, 10.0)], 4);
        let calendar = build_calendar(&facts);

        let dates: Vec<_> = calendar.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![day(2), day(3), day(4), day(5)]);

        assert!(build_calendar(&[]).is_empty());
    }

    #[test]
    fn test_players_limited_to_facts() {
        let roster = vec![player("P002"), player("P001"), player("P003")];
        let facts = build_facts(&[record("P002", 1, 10.0), record("P001", 1, 10.0), record("P001", 2, 10.0)], 4);

        let players = build_players(&roster, &facts).unwrap();
        let ids: Vec<_> = players.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["P001", "P002"]);
    }

    #[test]
    fn test_players_require_roster_entry() {
        let facts = build_facts(&[record("P404", 1, 10.0)], 4);
        assert!(build_players(&[player("P001")], &facts).is_err());
    }

    #[test]
    fn test_facts_sorted_and_rounded() {
        let facts = build_facts(&[record("P002", 1, 100.0), record("P001", 2, 100.0), record("P001", 1, 100.0)], 2);

        let keys: Vec<_> = facts.iter().map(|f| (f.player_id.as_str(), f.date)).collect();
        assert_eq!(keys, vec![("P001", day(1)), ("P001", day(2)), ("P002", day(1))]);

        assert_eq!(facts[0].internal_load_7d, Some(33.33));
        // Counts pass through unchanged apart from rounding
        assert_eq!(facts[0].total_accels, Some(12.4));
        assert_eq!(facts[0].jump_count, None);
        assert_eq!(facts[0].date_key, 20240101);

        // Negative zero is normalized
        assert_eq!(facts[0].readiness_score, Some(0.0));
        assert!(facts[0].readiness_score.unwrap().is_sign_positive());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(50.0, 4), 50.0);
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_headers_match_serialized_fields() {
        fn serialized_header<T: Table>(row: &T) -> Vec<String> {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.serialize(row).unwrap();
            let bytes = writer.into_inner().unwrap();
            let text = String::from_utf8(bytes).unwrap();
            text.lines().next().unwrap().split(',').map(str::to_string).collect()
        }

        let facts = build_facts(&[record("P001", 1, 10.0)], 4);
        assert_eq!(serialized_header(&facts[0]), FactRow::HEADER);
        assert_eq!(serialized_header(&CalendarRow::for_date(day(1))), CalendarRow::HEADER);

        let players = build_players(&[player("P001")], &facts).unwrap();
        assert_eq!(serialized_header(&players[0]), PlayerRow::HEADER);
    }
}
