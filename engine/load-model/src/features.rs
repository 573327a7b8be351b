//! # Load and Readiness Features
//!
//! Rolling workload, readiness scoring, the daily merge and practitioner flags.
//! Every function here expects its input sorted by (player, date).

use crate::error::{ModelError, Result};
use crate::preprocess::{self, GapPolicy, WellnessFill};
use crate::types::{Player, RawDataset, Session, Wellness};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use tracing::{debug, info};

/// Acute (rolling workload) window in days
pub const ACUTE_WINDOW_DAYS: i64 = 7;

/// Chronic window in days
pub const CHRONIC_WINDOW_DAYS: i64 = 28;

/// Feature engineering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Day-over-day change in rolling load that counts as a spike
    pub load_spike_pct: f64,

    /// Readiness score below this is flagged
    pub readiness_z_threshold: f64,

    /// Z-score readiness within each player
    pub standardize_readiness: bool,

    pub wellness_fill: WellnessFill,
    pub gap_policy: GapPolicy,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            load_spike_pct: 0.25,
            readiness_z_threshold: -1.0,
            standardize_readiness: true,
            wellness_fill: WellnessFill::Forward,
            gap_policy: GapPolicy::Skip,
        }
    }
}

/// A session with its derived workload values
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLoad {
    pub session: Session,
    pub internal_load: Option<f64>,
    pub load_7d: Option<f64>,
    pub load_28d: Option<f64>,
}

/// A wellness entry with its readiness values
#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub wellness: Wellness,
    pub readiness_raw: Option<f64>,
    pub readiness_score: Option<f64>,
}

/// One row per player-day after merging load and readiness
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub session: Session,
    pub internal_load: Option<f64>,
    pub load_7d: Option<f64>,
    pub load_28d: Option<f64>,
    pub readiness_raw: Option<f64>,
    pub readiness_score: Option<f64>,
    pub load_pct_change: Option<f64>,
    pub flag_load_spike: bool,
    pub flag_low_readiness: bool,
}

impl DailyRecord {
    pub fn player_id(&self) -> &str {
        &self.session.player_id
    }

    pub fn date(&self) -> NaiveDate {
        self.session.date
    }
}

/// Index ranges of consecutive rows sharing a player
pub fn player_runs<T>(rows: &[T], player_of: impl Fn(&T) -> &str) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;

    for index in 1..=rows.len() {
        if index == rows.len() || player_of(&rows[index]) != player_of(&rows[start]) {
            runs.push(start..index);
            start = index;
        }
    }

    runs
}

/// Trailing mean over the `window_days` calendar days ending at each point
///
/// `series` is one player's observations in ascending date order. Missing
/// values and absent days are skipped, so the divisor is the number of
/// values actually present in the window. A window with no values yields
/// `None`, as does every point when `window_days` is not positive.
pub fn rolling_mean(series: &[(NaiveDate, Option<f64>)], window_days: i64) -> Vec<Option<f64>> {
    if window_days <= 0 {
        return vec![None; series.len()];
    }

    let mut out = Vec::with_capacity(series.len());
    let mut start = 0;

    for (index, (date, _)) in series.iter().enumerate() {
        while date.signed_duration_since(series[start].0).num_days() >= window_days {
            start += 1;
        }

        let (sum, count) = series[start..=index]
            .iter()
            .filter_map(|(_, value)| *value)
            .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

        out.push(if count == 0 { None } else { Some(sum / count as f64) });
    }

    out
}

/// Attach internal load and its 7/28-day rolling means to sorted sessions
pub fn compute_rolling_load(sessions: Vec<Session>) -> Vec<SessionLoad> {
    let mut loads: Vec<SessionLoad> = sessions
        .into_iter()
        .map(|session| SessionLoad {
            internal_load: session.internal_load(),
            session,
            load_7d: None,
            load_28d: None,
        })
        .collect();

    for run in player_runs(&loads, |l| l.session.player_id.as_str()) {
        let series: Vec<(NaiveDate, Option<f64>)> =
            loads[run.clone()].iter().map(|l| (l.session.date, l.internal_load)).collect();

        let acute = rolling_mean(&series, ACUTE_WINDOW_DAYS);
        let chronic = rolling_mean(&series, CHRONIC_WINDOW_DAYS);

        for ((load, load_7d), load_28d) in loads[run].iter_mut().zip(acute).zip(chronic) {
            load.load_7d = load_7d;
            load.load_28d = load_28d;
        }
    }

    loads
}

/// readiness_raw = sleep_quality + mood - soreness - fatigue - stress
pub fn readiness_raw(wellness: &Wellness) -> Option<f64> {
    Some(wellness.sleep_quality? + wellness.mood? - wellness.soreness? - wellness.fatigue? - wellness.stress?)
}

/// Score readiness, optionally z-scored within each player
///
/// Standardisation uses the population standard deviation over the player's
/// non-missing raw values; a player with no spread scores 0.
pub fn compute_readiness(wellness: Vec<Wellness>, standardize: bool) -> Vec<Readiness> {
    let mut scored: Vec<Readiness> = wellness
        .into_iter()
        .map(|wellness| {
            let raw = readiness_raw(&wellness);
            Readiness { wellness, readiness_raw: raw, readiness_score: raw }
        })
        .collect();

    if !standardize {
        return scored;
    }

    for run in player_runs(&scored, |r| r.wellness.player_id.as_str()) {
        let values: Vec<f64> = scored[run.clone()].iter().filter_map(|r| r.readiness_raw).collect();
        if values.is_empty() {
            continue;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        for row in &mut scored[run] {
            row.readiness_score = row.readiness_raw.map(|raw| {
                if sd == 0.0 || !sd.is_finite() {
                    0.0
                } else {
                    (raw - mean) / sd
                }
            });
        }
    }

    scored
}

/// Left-join sessions with readiness on (player, date)
///
/// Every session must belong to a rostered player. Player attributes are not
/// copied into the result; they stay in the roster.
pub fn merge_daily(players: &[Player], loads: Vec<SessionLoad>, readiness: Vec<Readiness>) -> Result<Vec<DailyRecord>> {
    let mut roster = BTreeSet::new();
    for player in players {
        if !roster.insert(player.player_id.as_str()) {
            return Err(ModelError::DuplicatePlayer(player.player_id.clone()));
        }
    }

    let mut by_key: BTreeMap<(String, NaiveDate), (Option<f64>, Option<f64>)> = BTreeMap::new();
    for row in readiness {
        let key = (row.wellness.player_id.clone(), row.wellness.date);
        if by_key.insert(key, (row.readiness_raw, row.readiness_score)).is_some() {
            return Err(ModelError::duplicate_key("wellness", &row.wellness.player_id, row.wellness.date));
        }
    }

    let mut daily = Vec::with_capacity(loads.len());
    for load in loads {
        if !roster.contains(load.session.player_id.as_str()) {
            return Err(ModelError::UnknownPlayer(load.session.player_id.clone()));
        }

        let key = (load.session.player_id.clone(), load.session.date);
        let (readiness_raw, readiness_score) = by_key.get(&key).copied().unwrap_or((None, None));

        daily.push(DailyRecord {
            session: load.session,
            internal_load: load.internal_load,
            load_7d: load.load_7d,
            load_28d: load.load_28d,
            readiness_raw,
            readiness_score,
            load_pct_change: None,
            flag_load_spike: false,
            flag_low_readiness: false,
        });
    }

    daily.sort_by(|a, b| (a.player_id(), a.date()).cmp(&(b.player_id(), b.date())));
    Ok(daily)
}

/// Day-over-day change of the rolling load and the two practitioner flags
pub fn add_flags(daily: &mut [DailyRecord], load_spike_pct: f64, readiness_z_threshold: f64) {
    for run in player_runs(daily, |d| d.player_id()) {
        let mut previous: Option<f64> = None;
        for (position, record) in daily[run].iter_mut().enumerate() {
            record.load_pct_change = match (position, previous, record.load_7d) {
                (0, _, _) => None,
                (_, Some(prev), Some(current)) if prev != 0.0 => Some((current - prev) / prev),
                _ => None,
            };
            previous = record.load_7d;

            record.flag_load_spike = record.load_pct_change.map_or(false, |change| change > load_spike_pct);
            record.flag_low_readiness =
                record.readiness_score.map_or(false, |score| score < readiness_z_threshold);
        }
    }
}

/// Run preprocessing and feature engineering over a raw dataset
pub fn build_daily(dataset: RawDataset, config: &FeatureConfig) -> Result<(Vec<Player>, Vec<DailyRecord>)> {
    let RawDataset { players, sessions, wellness } = dataset;

    preprocess::validate_ranges(&sessions, &wellness)?;

    let sessions = preprocess::prep_sessions(sessions, config.gap_policy)?;
    let wellness = preprocess::prep_wellness(wellness, config.wellness_fill)?;
    debug!("Prepared {} sessions and {} wellness entries", sessions.len(), wellness.len());

    let loads = compute_rolling_load(sessions);
    let readiness = compute_readiness(wellness, config.standardize_readiness);

    let mut daily = merge_daily(&players, loads, readiness)?;
    add_flags(&mut daily, config.load_spike_pct, config.readiness_z_threshold);

    let spikes = daily.iter().filter(|d| d.flag_load_spike).count();
    let low = daily.iter().filter(|d| d.flag_low_readiness).count();
    info!("Built {} daily records ({} load spikes, {} low readiness)", daily.len(), spikes, low);

    Ok((players, daily))
}
