//! # Preprocessing
//!
//! Range checks, ordering, duplicate detection and the explicit policies for
//! missing data. Downstream feature code assumes rows are sorted by
//! (player, date) and unique on that key.

use crate::error::{ModelError, Result};
use crate::types::{Session, Wellness};
use chrono::Days;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How unanswered wellness questions are filled within a player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessFill {
    /// Carry the last answer forward
    #[default]
    Forward,
    /// Use the next answer
    Backward,
    /// Leave gaps missing
    None,
}

/// How calendar gaps in a player's session log are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Leave gaps as-is; rolling windows use fewer points
    #[default]
    Skip,
    /// Insert zero-load "rest" sessions for every missing day inside a player's span
    ZeroFill,
}

pub const REST_SESSION_TYPE: &str = "rest";

/// Basic sanity checks on non-missing values
pub fn validate_ranges(sessions: &[Session], wellness: &[Wellness]) -> Result<()> {
    for s in sessions {
        check_range("sessions", "minutes", s.minutes, 0.0, None)?;
        check_range("sessions", "sRPE", s.srpe, 0.0, Some(10.0))?;
        check_range("sessions", "external_load", s.external_load, 0.0, None)?;
        check_range("sessions", "total_accels", s.total_accels, 0.0, None)?;
        check_range("sessions", "jump_count", s.jump_count, 0.0, None)?;
        check_range("sessions", "avg_hr", s.avg_hr, 0.0, None)?;
    }

    for w in wellness {
        check_range("wellness", "sleep_hours", w.sleep_hours, 0.0, Some(24.0))?;
        check_range("wellness", "sleep_quality", w.sleep_quality, 1.0, Some(5.0))?;
        check_range("wellness", "soreness", w.soreness, 1.0, Some(10.0))?;
        check_range("wellness", "fatigue", w.fatigue, 1.0, Some(10.0))?;
        check_range("wellness", "stress", w.stress, 1.0, Some(10.0))?;
        check_range("wellness", "mood", w.mood, 1.0, Some(10.0))?;
    }

    debug!("Range checks passed for {} sessions, {} wellness entries", sessions.len(), wellness.len());
    Ok(())
}

fn check_range(table: &str, column: &str, value: Option<f64>, min: f64, max: Option<f64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };

    let in_range = value.is_finite() && value >= min && max.map_or(true, |max| value <= max);
    if in_range {
        return Ok(());
    }

    let expected = match max {
        Some(max) => format!("[{min}, {max}]"),
        None => format!(">= {min}"),
    };
    Err(ModelError::range(table, column, value, expected))
}

/// Sort sessions by (player, date), reject duplicates and apply the gap policy
pub fn prep_sessions(mut sessions: Vec<Session>, gaps: GapPolicy) -> Result<Vec<Session>> {
    sessions.sort_by(|a, b| (&a.player_id, a.date).cmp(&(&b.player_id, b.date)));

    if let Some(pair) = sessions.windows(2).find(|pair| same_key(&pair[0], &pair[1])) {
        return Err(ModelError::duplicate_key("sessions", &pair[1].player_id, pair[1].date));
    }

    match gaps {
        GapPolicy::Skip => Ok(sessions),
        GapPolicy::ZeroFill => {
            let (filled, inserted) = fill_session_gaps(sessions);
            info!("Zero-filled {} missing session days", inserted);
            Ok(filled)
        }
    }
}

fn same_key(a: &Session, b: &Session) -> bool {
    a.player_id == b.player_id && a.date == b.date
}

/// Insert rest sessions for missing days between consecutive sessions of a player
///
/// Input must be sorted by (player, date). Returns the filled log and the
/// number of inserted rows.
pub fn fill_session_gaps(sessions: Vec<Session>) -> (Vec<Session>, usize) {
    let mut filled: Vec<Session> = Vec::with_capacity(sessions.len());
    let mut inserted = 0;

    for session in sessions {
        if let Some(previous) = filled.last() {
            if previous.player_id == session.player_id {
                let mut day = previous.date;
                let player_id = previous.player_id.clone();
                while let Some(next) = day.checked_add_days(Days::new(1)) {
                    if next >= session.date {
                        break;
                    }
                    filled.push(rest_session(next, &player_id));
                    inserted += 1;
                    day = next;
                }
            }
        }
        filled.push(session);
    }

    (filled, inserted)
}

fn rest_session(date: chrono::NaiveDate, player_id: &str) -> Session {
    Session {
        date,
        player_id: player_id.to_string(),
        session_type: REST_SESSION_TYPE.to_string(),
        minutes: Some(0.0),
        srpe: Some(0.0),
        external_load: Some(0.0),
        total_accels: Some(0.0),
        jump_count: Some(0.0),
        avg_hr: None,
    }
}

/// Sort wellness by (player, date), reject duplicates and fill within player
pub fn prep_wellness(mut wellness: Vec<Wellness>, fill: WellnessFill) -> Result<Vec<Wellness>> {
    wellness.sort_by(|a, b| (&a.player_id, a.date).cmp(&(&b.player_id, b.date)));

    if let Some(pair) =
        wellness.windows(2).find(|pair| pair[0].player_id == pair[1].player_id && pair[0].date == pair[1].date)
    {
        return Err(ModelError::duplicate_key("wellness", &pair[1].player_id, pair[1].date));
    }

    match fill {
        WellnessFill::Forward => carry_within_player(wellness.iter_mut()),
        WellnessFill::Backward => carry_within_player(wellness.iter_mut().rev()),
        WellnessFill::None => {}
    }

    Ok(wellness)
}

/// Copy the last seen answer into later gaps, resetting at player boundaries
fn carry_within_player<'a>(rows: impl Iterator<Item = &'a mut Wellness>) {
    let mut current: Option<String> = None;
    let mut last: [Option<f64>; 6] = [None; 6];

    for row in rows {
        if current.as_deref() != Some(row.player_id.as_str()) {
            current = Some(row.player_id.clone());
            last = [None; 6];
        }

        for (seen, value) in last.iter_mut().zip(row.metrics_mut()) {
            match *value {
                Some(answer) => *seen = Some(answer),
                None => *value = *seen,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn session(player: &str, d: u32, minutes: f64) -> Session {
        Session {
            date: day(d),
            player_id: player.to_string(),
            session_type: "training".to_string(),
            minutes: Some(minutes),
            srpe: Some(5.0),
            external_load: Some(400.0),
            total_accels: Some(20.0),
            jump_count: Some(10.0),
            avg_hr: Some(140.0),
        }
    }

    fn wellness(player: &str, d: u32, mood: Option<f64>) -> Wellness {
        Wellness { mood, ..Wellness::missing(day(d), player) }
    }

    #[test]
    fn test_range_violation_names_column() {
        let mut bad = session("P001", 1, 60.0);
        bad.srpe = Some(11.0);

        match validate_ranges(&[bad], &[]) {
            Err(ModelError::Range { table, column, value, .. }) => {
                assert_eq!(table, "sessions");
                assert_eq!(column, "sRPE");
                assert_eq!(value, 11.0);
            }
            other => panic!("expected range error, got {other:?}"),
        }

        let negative = session("P001", 1, -5.0);
        assert!(validate_ranges(&[negative], &[]).is_err());

        let mut sleepless = Wellness::missing(day(1), "P001");
        sleepless.sleep_quality = Some(0.0);
        assert!(validate_ranges(&[], &[sleepless]).is_err());
    }

    #[test]
    fn test_missing_values_skip_range_checks() {
        let mut s = session("P001", 1, 60.0);
        s.minutes = None;
        s.srpe = None;
        validate_ranges(&[s], &[Wellness::missing(day(1), "P001")]).unwrap();
    }

    #[test]
    fn test_prep_sessions_sorts() {
        let sessions = vec![session("P002", 1, 60.0), session("P001", 2, 60.0), session("P001", 1, 60.0)];
        let prepared = prep_sessions(sessions, GapPolicy::Skip).unwrap();

        let keys: Vec<_> = prepared.iter().map(|s| (s.player_id.as_str(), s.date)).collect();
        assert_eq!(keys, vec![("P001", day(1)), ("P001", day(2)), ("P002", day(1))]);
    }

    #[test]
    fn test_duplicate_session_rejected() {
        let sessions = vec![session("P001", 1, 60.0), session("P001", 1, 45.0)];
        let result = prep_sessions(sessions, GapPolicy::Skip);
        assert!(matches!(result, Err(ModelError::DuplicateKey { .. })));
    }

    #[test]
    fn test_skip_leaves_gaps() {
        let sessions = vec![session("P001", 1, 60.0), session("P001", 4, 60.0)];
        let prepared = prep_sessions(sessions, GapPolicy::Skip).unwrap();
        assert_eq!(prepared.len(), 2);
    }

    #[test]
    fn test_zero_fill_inserts_rest_days_within_player_span() {
        let sessions = vec![session("P001", 1, 60.0), session("P001", 4, 60.0), session("P002", 3, 60.0)];
        let prepared = prep_sessions(sessions, GapPolicy::ZeroFill).unwrap();

        let keys: Vec<_> = prepared.iter().map(|s| (s.player_id.as_str(), s.date.day0() + 1)).collect();
        assert_eq!(keys, vec![("P001", 1), ("P001", 2), ("P001", 3), ("P001", 4), ("P002", 3)]);

        assert_eq!(prepared[1].session_type, REST_SESSION_TYPE);
        assert_eq!(prepared[1].internal_load(), Some(0.0));
        assert_eq!(prepared[3].session_type, "training");
    }

    #[test]
    fn test_forward_fill_within_player() {
        let rows = vec![
            wellness("P001", 1, Some(7.0)),
            wellness("P001", 2, None),
            wellness("P002", 1, None),
            wellness("P002", 2, Some(5.0)),
        ];
        let filled = prep_wellness(rows, WellnessFill::Forward).unwrap();
        let moods: Vec<_> = filled.iter().map(|w| w.mood).collect();

        // P002's first day has nothing before it within the player
        assert_eq!(moods, vec![Some(7.0), Some(7.0), None, Some(5.0)]);
    }

    #[test]
    fn test_backward_fill_within_player() {
        let rows = vec![
            wellness("P001", 1, Some(7.0)),
            wellness("P001", 2, None),
            wellness("P002", 1, None),
            wellness("P002", 2, Some(5.0)),
        ];
        let filled = prep_wellness(rows, WellnessFill::Backward).unwrap();
        let moods: Vec<_> = filled.iter().map(|w| w.mood).collect();
        assert_eq!(moods, vec![Some(7.0), None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn test_no_fill_keeps_gaps() {
        let rows = vec![wellness("P001", 1, Some(7.0)), wellness("P001", 2, None)];
        let filled = prep_wellness(rows, WellnessFill::None).unwrap();
        assert_eq!(filled[1].mood, None);
    }

    #[test]
    fn test_duplicate_wellness_rejected() {
        let rows = vec![wellness("P001", 1, Some(7.0)), wellness("P001", 1, Some(6.0))];
        assert!(prep_wellness(rows, WellnessFill::Forward).is_err());
    }
}
