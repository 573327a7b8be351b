use chrono::NaiveDate;
use serde::Serialize;

/// An anonymized squad member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    /// Opaque identifier (e.g., "P001")
    pub player_id: String,

    /// Display name; placeholder for anonymized data
    pub player_name: String,

    /// Playing position (e.g., "GK", "DEF", "MID", "FWD")
    pub position: String,

    /// Availability status (e.g., "Available", "Modified", "Injured")
    pub status: String,
}

/// One training or match session for a player on a date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub date: NaiveDate,
    pub player_id: String,

    /// Session kind (e.g., "training", "match", "recovery", "rest")
    pub session_type: String,

    /// Duration in minutes
    pub minutes: Option<f64>,

    /// Session rating of perceived exertion, 0-10
    pub srpe: Option<f64>,

    /// GPS/accelerometer derived external load
    pub external_load: Option<f64>,

    pub total_accels: Option<f64>,
    pub jump_count: Option<f64>,

    /// Average heart rate in bpm
    pub avg_hr: Option<f64>,
}

impl Session {
    /// Internal load: minutes x sRPE, missing if either input is missing
    pub fn internal_load(&self) -> Option<f64> {
        self.minutes.zip(self.srpe).map(|(minutes, srpe)| minutes * srpe)
    }
}

/// Daily wellness questionnaire for a player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wellness {
    pub date: NaiveDate,
    pub player_id: String,
    pub sleep_hours: Option<f64>,

    /// 1 (poor) to 5 (excellent)
    pub sleep_quality: Option<f64>,

    /// 1-10 scales
    pub soreness: Option<f64>,
    pub fatigue: Option<f64>,
    pub stress: Option<f64>,
    pub mood: Option<f64>,
}

impl Wellness {
    /// Empty questionnaire for a player-day
    pub fn missing(date: NaiveDate, player_id: impl Into<String>) -> Self {
        Self {
            date,
            player_id: player_id.into(),
            sleep_hours: None,
            sleep_quality: None,
            soreness: None,
            fatigue: None,
            stress: None,
            mood: None,
        }
    }

    /// Mutable view over every numeric answer, in column order
    pub(crate) fn metrics_mut(&mut self) -> [&mut Option<f64>; 6] {
        [
            &mut self.sleep_hours,
            &mut self.sleep_quality,
            &mut self.soreness,
            &mut self.fatigue,
            &mut self.stress,
            &mut self.mood,
        ]
    }
}

/// Raw inputs for one export run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    pub players: Vec<Player>,
    pub sessions: Vec<Session>,
    pub wellness: Vec<Wellness>,
}

impl RawDataset {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
