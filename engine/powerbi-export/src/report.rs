//! # Staff Reports
//!
//! Team table for a single day and a short text summary per player, built
//! from the exported star schema.

use crate::error::{ExportError, Result};
use crate::tables::{FactRow, PlayerRow, Table};
use crate::writer::write_rows;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Days in each summary comparison window
const SUMMARY_WINDOW_DAYS: u64 = 7;

/// One player's row in the team daily report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamReportRow {
    pub date: NaiveDate,
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    pub status: String,
    pub session_type: String,
    pub minutes: Option<f64>,
    pub srpe: Option<f64>,
    pub internal_load: Option<f64>,
    pub internal_load_7d: Option<f64>,
    pub internal_load_28d: Option<f64>,
    pub readiness_score: Option<f64>,
    pub flag_load_spike: bool,
    pub flag_low_readiness: bool,
}

impl Table for TeamReportRow {
    const NAME: &'static str = "team_report";
    const HEADER: &'static [&'static str] = &[
        "date",
        "player_id",
        "player_name",
        "position",
        "status",
        "session_type",
        "minutes",
        "srpe",
        "internal_load",
        "internal_load_7d",
        "internal_load_28d",
        "readiness_score",
        "flag_load_spike",
        "flag_low_readiness",
    ];
}

/// All players on `date`, highest rolling load first
pub fn team_daily_table(facts: &[FactRow], players: &[PlayerRow], date: NaiveDate) -> Vec<TeamReportRow> {
    let mut rows: Vec<TeamReportRow> = facts
        .iter()
        .filter(|fact| fact.date == date)
        .map(|fact| {
            let player = players.iter().find(|p| p.player_id == fact.player_id);
            let attribute = |get: fn(&PlayerRow) -> &String| player.map(get).cloned().unwrap_or_default();

            TeamReportRow {
                date: fact.date,
                player_id: fact.player_id.clone(),
                player_name: attribute(|p| &p.player_name),
                position: attribute(|p| &p.position),
                status: attribute(|p| &p.status),
                session_type: fact.session_type.clone(),
                minutes: fact.minutes,
                srpe: fact.srpe,
                internal_load: fact.internal_load,
                internal_load_7d: fact.internal_load_7d,
                internal_load_28d: fact.internal_load_28d,
                readiness_score: fact.readiness_score,
                flag_load_spike: fact.flag_load_spike,
                flag_low_readiness: fact.flag_low_readiness,
            }
        })
        .collect();

    rows.sort_by(|a, b| descending(a.internal_load_7d, b.internal_load_7d).then_with(|| a.player_id.cmp(&b.player_id)));
    rows
}

// Missing values sort last
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Write `team_report_<date>.csv` into `dir`
pub fn write_team_report(dir: &Path, date: NaiveDate, rows: &[TeamReportRow]) -> Result<PathBuf> {
    let path = dir.join(format!("{}_{}.csv", TeamReportRow::NAME, date));
    write_rows(&path, rows)?;
    info!("Wrote team report for {} ({} players) to {:?}", date, rows.len(), path);
    Ok(path)
}

/// Practitioner summary for one player at a snapshot date
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    pub status: String,
    pub snapshot_date: NaiveDate,

    /// Summed internal load over the 7 days ending at the snapshot
    pub last_7_load: Option<f64>,

    /// Summed internal load over the 7 days before that
    pub prior_7_load: Option<f64>,

    pub readiness_today: Option<f64>,
    pub readiness_7d_avg: Option<f64>,
    pub load_spike: bool,
    pub low_readiness: bool,
}

impl PlayerSummary {
    /// Fractional change of the last 7 days' load against the prior 7 days
    pub fn load_change(&self) -> Option<f64> {
        match (self.last_7_load, self.prior_7_load) {
            (Some(last), Some(prior)) if prior > 0.0 => Some((last - prior) / prior),
            _ => None,
        }
    }

    pub fn alerts(&self) -> Vec<&'static str> {
        let mut alerts = Vec::new();
        if self.load_spike {
            alerts.push("load spike");
        }
        if self.low_readiness {
            alerts.push("low readiness");
        }
        alerts
    }
}

impl fmt::Display for PlayerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Player: {} ({})  Position: {}  Status: {}",
            self.player_name, self.player_id, self.position, self.status
        )?;
        writeln!(f, "Snapshot date: {}", self.snapshot_date)?;

        if let Some(last) = self.last_7_load {
            match self.load_change() {
                Some(change) => writeln!(
                    f,
                    "Last 7 days internal load: {:.0}  (change vs prior 7 days: {:.0}%)",
                    last,
                    change * 100.0
                )?,
                None => writeln!(f, "Last 7 days internal load: {last:.0}")?,
            }
        }

        if let Some(today) = self.readiness_today {
            match self.readiness_7d_avg {
                Some(avg) => writeln!(f, "Readiness (z): today {today:.2},  7-day avg {avg:.2}")?,
                None => writeln!(f, "Readiness (z): today {today:.2}")?,
            }
        }

        let alerts = self.alerts();
        if alerts.is_empty() {
            write!(f, "Alerts: none")
        } else {
            write!(f, "Alerts: {}", alerts.join(", "))
        }
    }
}

/// Summarize `player_id` at `date`, or at their latest day when `date` is `None`
///
/// When the requested date has no row, the latest earlier row is used.
pub fn player_summary(
    facts: &[FactRow],
    players: &[PlayerRow],
    player_id: &str,
    date: Option<NaiveDate>,
) -> Result<PlayerSummary> {
    let player = players
        .iter()
        .find(|p| p.player_id == player_id)
        .ok_or_else(|| ExportError::not_found(format!("player {player_id}")))?;

    let history: Vec<&FactRow> = facts.iter().filter(|f| f.player_id == player_id).collect();
    let snapshot = history
        .iter()
        .filter(|f| date.map_or(true, |limit| f.date <= limit))
        .max_by_key(|f| f.date)
        .ok_or_else(|| match date {
            Some(limit) => ExportError::not_found(format!("data for player {player_id} on or before {limit}")),
            None => ExportError::not_found(format!("data for player {player_id}")),
        })?;

    let snapshot_date = snapshot.date;
    let week_start = snapshot_date.checked_sub_days(Days::new(SUMMARY_WINDOW_DAYS)).unwrap_or(NaiveDate::MIN);
    let prior_start = week_start.checked_sub_days(Days::new(SUMMARY_WINDOW_DAYS)).unwrap_or(NaiveDate::MIN);

    let last_7: Vec<&FactRow> =
        history.iter().copied().filter(|f| f.date > week_start && f.date <= snapshot_date).collect();
    let prior_7: Vec<&FactRow> =
        history.iter().copied().filter(|f| f.date > prior_start && f.date <= week_start).collect();

    let readiness: Vec<f64> = last_7.iter().filter_map(|f| f.readiness_score).collect();

    Ok(PlayerSummary {
        player_id: player.player_id.clone(),
        player_name: player.player_name.clone(),
        position: player.position.clone(),
        status: player.status.clone(),
        snapshot_date,
        last_7_load: load_sum(&last_7),
        prior_7_load: load_sum(&prior_7),
        readiness_today: snapshot.readiness_score,
        readiness_7d_avg: (!readiness.is_empty()).then(|| readiness.iter().sum::<f64>() / readiness.len() as f64),
        load_spike: snapshot.flag_load_spike,
        low_readiness: snapshot.flag_low_readiness,
    })
}

fn load_sum(rows: &[&FactRow]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().filter_map(|f| f.internal_load).sum())
}

/// Write `player_<id>_summary_<date>.txt` into `dir`
///
/// The player id becomes part of the file name, so it must be a plain name:
/// ASCII letters, digits, `-`, `_` or `.`, not starting with `.`.
pub fn write_player_summary(dir: &Path, summary: &PlayerSummary) -> Result<PathBuf> {
    if !is_safe_file_component(&summary.player_id) {
        return Err(ExportError::UnsafeFileName(summary.player_id.clone()));
    }

    let path = dir.join(format!("player_{}_summary_{}.txt", summary.player_id, summary.snapshot_date));
    std::fs::write(&path, format!("{summary}\n"))?;
    info!("Wrote summary for player {} to {:?}", summary.player_id, path);
    Ok(path)
}

fn is_safe_file_component(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::date_key;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn fact(player: &str, d: u32, load: f64, load_7d: Option<f64>, readiness: f64) -> FactRow {
        FactRow {
            date: day(d),
            date_key: date_key(day(d)),
            player_id: player.to_string(),
            session_type: "training".to_string(),
            minutes: Some(load),
            srpe: Some(1.0),
            external_load: None,
            total_accels: None,
            jump_count: None,
            avg_hr: None,
            internal_load: Some(load),
            internal_load_7d: load_7d,
            internal_load_28d: None,
            readiness_raw: None,
            readiness_score: Some(readiness),
            load_pct_change: None,
            flag_load_spike: false,
            flag_low_readiness: readiness < -1.0,
        }
    }

    fn player(id: &str) -> PlayerRow {
        PlayerRow {
            player_id: id.to_string(),
            player_name: format!("Player {id}"),
            position: "MID".to_string(),
            status: "Available".to_string(),
        }
    }

    #[test]
    fn test_team_table_sorted_by_rolling_load() {
        let facts = vec![
            fact("P001", 3, 100.0, Some(150.0), 0.0),
            fact("P002", 3, 100.0, Some(300.0), 0.0),
            fact("P003", 3, 100.0, None, 0.0),
            fact("P004", 3, 100.0, Some(150.0), 0.0),
            fact("P002", 2, 100.0, Some(999.0), 0.0),
        ];
        let players = vec![player("P001"), player("P002"), player("P003"), player("P004")];

        let rows = team_daily_table(&facts, &players, day(3));
        let ids: Vec<_> = rows.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["P002", "P001", "P004", "P003"]);
        assert_eq!(rows[0].player_name, "Player P002");

        assert!(team_daily_table(&facts, &players, day(20)).is_empty());
    }

    #[test]
    fn test_player_summary_windows() {
        // Days 1..=14: prior week loads 10/day, last week 20/day
        let facts: Vec<_> = (1..=14)
            .map(|d| fact("P001", d, if d <= 7 { 10.0 } else { 20.0 }, None, if d == 14 { -1.5 } else { 0.5 }))
            .collect();

        let summary = player_summary(&facts, &[player("P001")], "P001", None).unwrap();
        assert_eq!(summary.snapshot_date, day(14));
        assert_eq!(summary.last_7_load, Some(140.0));
        assert_eq!(summary.prior_7_load, Some(70.0));
        assert_eq!(summary.load_change(), Some(1.0));
        assert_eq!(summary.readiness_today, Some(-1.5));
        assert!(summary.low_readiness);

        let text = summary.to_string();
        assert!(text.starts_with("Player: Player P001 (P001)  Position: MID  Status: Available\n"));
        assert!(text.contains("Snapshot date: 2024-01-14"));
        assert!(text.contains("Last 7 days internal load: 140  (change vs prior 7 days: 100%)"));
        assert!(text.contains("Readiness (z): today -1.50,  7-day avg 0.21"));
        assert!(text.ends_with("Alerts: low readiness"));
    }

    #[test]
    fn test_player_summary_uses_latest_prior_date() {
        let facts = vec![fact("P001", 1, 10.0, None, 0.0), fact("P001", 5, 10.0, None, 0.0)];

        let summary = player_summary(&facts, &[player("P001")], "P001", Some(day(4))).unwrap();
        assert_eq!(summary.snapshot_date, day(1));
        assert_eq!(summary.prior_7_load, None);
        assert!(summary.to_string().contains("Last 7 days internal load: 10\n"));
        assert!(summary.to_string().ends_with("Alerts: none"));
    }

    #[test]
    fn test_player_summary_not_found() {
        let facts = vec![fact("P001", 5, 10.0, None, 0.0)];
        let players = vec![player("P001")];

        assert!(matches!(player_summary(&facts, &players, "P999", None), Err(ExportError::NotFound(_))));
        assert!(matches!(player_summary(&facts, &players, "P001", Some(day(2))), Err(ExportError::NotFound(_))));
    }

    #[test]
    fn test_summary_file_name_stays_in_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        let facts = vec![fact("P001", 5, 10.0, None, 0.0)];
        let mut summary = player_summary(&facts, &[player("P001")], "P001", None).unwrap();

        let path = write_player_summary(&out, &summary).unwrap();
        assert_eq!(path, out.join("player_P001_summary_2024-01-05.txt"));

        for id in ["../escape", "a/b", "a\\b", "..", ".hidden", ""] {
            summary.player_id = id.to_string();
            assert!(matches!(write_player_summary(&out, &summary), Err(ExportError::UnsafeFileName(_))), "{id:?}");
        }
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }
}
