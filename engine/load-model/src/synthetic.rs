//! # Synthetic Squad Generator
//!
//! Deterministic stand-in for real monitoring exports. The same configuration
//! (including the seed) always yields the same dataset.

use crate::error::{ModelError, Result};
use crate::types::{Player, RawDataset, Session, Wellness};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

const POSITIONS: [&str; 4] = ["GK", "DEF", "MID", "FWD"];

/// Share of players generated with a "Modified" training status
const MODIFIED_STATUS_RATE: f64 = 0.1;

/// Synthetic generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Number of players in the squad
    pub players: usize,

    /// First day of the series
    pub start_date: NaiveDate,

    /// Number of consecutive days to generate
    pub days: u32,

    /// RNG seed
    pub seed: u64,

    /// Probability that a player skips the wellness questionnaire on a day
    pub wellness_missing_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            players: 20,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days: 84, // 12 weeks
            seed: 42,
            wellness_missing_rate: 0.05,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<()> {
        if self.players == 0 {
            return Err(ModelError::invalid_parameter("synthetic players must be at least 1"));
        }
        if self.days == 0 {
            return Err(ModelError::invalid_parameter("synthetic days must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.wellness_missing_rate) {
            return Err(ModelError::invalid_parameter(format!(
                "wellness_missing_rate must be within [0, 1], got {}",
                self.wellness_missing_rate
            )));
        }
        if self.start_date.checked_add_days(Days::new(u64::from(self.days))).is_none() {
            return Err(ModelError::invalid_parameter("synthetic date range overflows the calendar"));
        }
        Ok(())
    }
}

/// Per-player tendencies drawn once per player
struct Profile {
    volume: f64,
    recovery: f64,
}

/// Generate a squad with one session and one questionnaire per player-day
pub fn generate(config: &SyntheticConfig) -> Result<RawDataset> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut dataset = RawDataset::default();

    for index in 0..config.players {
        let player_id = format!("P{:03}", index + 1);
        let status =
            if rng.gen_bool(MODIFIED_STATUS_RATE) { "Modified" } else { "Available" }.to_string();

        dataset.players.push(Player {
            player_id: player_id.clone(),
            player_name: format!("Player {:03}", index + 1),
            position: POSITIONS[index % POSITIONS.len()].to_string(),
            status,
        });

        let profile = Profile { volume: rng.gen_range(0.85..1.15), recovery: rng.gen_range(-1.0..1.0) };

        let mut previous_type = SessionKind::Recovery;
        for offset in 0..config.days {
            let date = config
                .start_date
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| ModelError::invalid_parameter("synthetic date range overflows"))?;

            let kind = SessionKind::for_weekday(date.weekday());
            dataset.sessions.push(generate_session(&mut rng, &player_id, date, kind, &profile));

            let wellness = if rng.gen_bool(config.wellness_missing_rate) {
                Wellness::missing(date, player_id.clone())
            } else {
                generate_wellness(&mut rng, &player_id, date, previous_type, &profile)
            };
            dataset.wellness.push(wellness);

            previous_type = kind;
        }
    }

    info!(
        "Generated synthetic dataset: {} players x {} days (seed {})",
        config.players, config.days, config.seed
    );

    Ok(dataset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionKind {
    Training,
    Match,
    Recovery,
}

impl SessionKind {
    fn for_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat => Self::Match,
            Weekday::Sun => Self::Recovery,
            _ => Self::Training,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Match => "match",
            Self::Recovery => "recovery",
        }
    }
}

fn generate_session(
    rng: &mut StdRng,
    player_id: &str,
    date: NaiveDate,
    kind: SessionKind,
    profile: &Profile,
) -> Session {
    let (minutes, srpe) = match kind {
        SessionKind::Training => (rng.gen_range(50.0..90.0), rng.gen_range(4.0..7.5)),
        SessionKind::Match => (rng.gen_range(60.0..95.0), rng.gen_range(7.0..9.5)),
        SessionKind::Recovery => (rng.gen_range(20.0..40.0), rng.gen_range(2.0..4.0)),
    };
    let minutes = (minutes * profile.volume).round();
    let srpe = round_to(srpe, 1).min(10.0);

    Session {
        date,
        player_id: player_id.to_string(),
        session_type: kind.label().to_string(),
        minutes: Some(minutes),
        srpe: Some(srpe),
        external_load: Some(round_to(minutes * rng.gen_range(7.0..10.0), 1)),
        total_accels: Some((minutes * rng.gen_range(0.4..0.8)).round()),
        jump_count: Some((minutes * rng.gen_range(0.2..0.6)).round()),
        avg_hr: Some(rng.gen_range(120.0..165.0_f64).round()),
    }
}

fn generate_wellness(
    rng: &mut StdRng,
    player_id: &str,
    date: NaiveDate,
    previous: SessionKind,
    profile: &Profile,
) -> Wellness {
    // Day after a match hurts
    let strain = if previous == SessionKind::Match { 2.0 } else { 0.0 };

    Wellness {
        date,
        player_id: player_id.to_string(),
        sleep_hours: Some(round_to(rng.gen_range(6.0..9.0) + profile.recovery * 0.5, 1)),
        sleep_quality: Some(scale(rng.gen_range(2.0..5.0) + profile.recovery, 1.0, 5.0)),
        soreness: Some(scale(rng.gen_range(2.0..5.0) + strain - profile.recovery, 1.0, 10.0)),
        fatigue: Some(scale(rng.gen_range(2.0..5.0) + strain - profile.recovery, 1.0, 10.0)),
        stress: Some(scale(rng.gen_range(1.0..6.0), 1.0, 10.0)),
        mood: Some(scale(rng.gen_range(4.0..9.0) + profile.recovery, 1.0, 10.0)),
    }
}

/// Round to a whole questionnaire answer within `[min, max]`
fn scale(value: f64, min: f64, max: f64) -> f64 {
    value.round().clamp(min, max)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
