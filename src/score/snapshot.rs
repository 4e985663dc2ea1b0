// Score state and wire payload

use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_EVENT_NAME, NO_PLAYER};

/// Names shown alongside the score. Free-form, never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameMeta {
    pub team_a: String,
    pub team_b: String,
    pub team_a_player: String,
    pub team_b_player: String,
    pub event_name: String,
}

impl Default for GameMeta {
    fn default() -> Self {
        Self {
            team_a: String::new(),
            team_b: String::new(),
            team_a_player: String::new(),
            team_b_player: String::new(),
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Everything one score push carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub team_a_score: u32,
    pub team_b_score: u32,
    pub meta: GameMeta,
}

impl ScoreSnapshot {
    pub fn payload(&self) -> ScorePayload<'_> {
        ScorePayload {
            team_a_score: self.team_a_score,
            team_b_score: self.team_b_score,
            team_a_name: &self.meta.team_a,
            team_b_name: &self.meta.team_b,
            team_a_player: &self.meta.team_a_player,
            team_b_player: &self.meta.team_b_player,
            event_name: &self.meta.event_name,
        }
    }
}

/// JSON body of `POST /scores`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload<'a> {
    pub team_a_score: u32,
    pub team_b_score: u32,
    pub team_a_name: &'a str,
    pub team_b_name: &'a str,
    pub team_a_player: &'a str,
    pub team_b_player: &'a str,
    pub event_name: &'a str,
}

/// The two running scores. Neither goes below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    team_a: u32,
    team_b: u32,
}

impl ScoreBoard {
    pub fn new(team_a: u32, team_b: u32) -> Self {
        Self { team_a, team_b }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.team_a,
            Side::B => self.team_b,
        }
    }

    fn slot(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    pub fn increment(&mut self, side: Side) -> u32 {
        let slot = self.slot(side);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Returns false (and changes nothing) when the score is already zero.
    pub fn decrement(&mut self, side: Side) -> bool {
        let slot = self.slot(side);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self, meta: &GameMeta) -> ScoreSnapshot {
        ScoreSnapshot {
            team_a_score: self.team_a,
            team_b_score: self.team_b,
            meta: meta.clone(),
        }
    }
}

fn is_player(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != NO_PLAYER
}

/// Doubles lineup label: "first / second", "first", or "" without a first player.
pub fn combine_players(first: &str, second: &str) -> String {
    match (is_player(first), is_player(second)) {
        (false, _) => String::new(),
        (true, false) => first.trim().to_string(),
        (true, true) => format!("{} / {}", first.trim(), second.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_field_names() {
        let snapshot = ScoreSnapshot {
            team_a_score: 3,
            team_b_score: 1,
            meta: GameMeta {
                team_a: "TFC Leipzig".to_string(),
                team_b: "Kickers Halle".to_string(),
                team_a_player: "Anna Berg / Jonas Wolf".to_string(),
                team_b_player: "Mia Roth".to_string(),
                event_name: "Regionalliga Mitte".to_string(),
            },
        };

        let value = serde_json::to_value(snapshot.payload()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "teamAScore": 3,
                "teamBScore": 1,
                "teamAName": "TFC Leipzig",
                "teamBName": "Kickers Halle",
                "teamAPlayer": "Anna Berg / Jonas Wolf",
                "teamBPlayer": "Mia Roth",
                "eventName": "Regionalliga Mitte"
            })
        );
    }

    #[test]
    fn test_payload_escapes_quotes() {
        let snapshot = ScoreSnapshot {
            team_a_score: 0,
            team_b_score: 0,
            meta: GameMeta {
                team_a: "The \"Reds\"".to_string(),
                ..GameMeta::default()
            },
        };
        let json = serde_json::to_string(&snapshot.payload()).unwrap();
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["teamAName"], "The \"Reds\"");
    }

    #[test]
    fn test_scoreboard_never_negative() {
        let mut board = ScoreBoard::default();
        assert!(!board.decrement(Side::A));
        assert_eq!(board.score(Side::A), 0);

        assert_eq!(board.increment(Side::A), 1);
        assert_eq!(board.increment(Side::A), 2);
        assert_eq!(board.increment(Side::B), 1);
        assert!(board.decrement(Side::A));
        assert_eq!(board, ScoreBoard::new(1, 1));

        board.reset();
        assert_eq!(board, ScoreBoard::default());
    }

    #[test]
    fn test_snapshot_copies_meta() {
        let meta = GameMeta {
            event_name: "Pokal".to_string(),
            ..GameMeta::default()
        };
        let snapshot = ScoreBoard::new(5, 4).snapshot(&meta);
        assert_eq!(snapshot.team_a_score, 5);
        assert_eq!(snapshot.team_b_score, 4);
        assert_eq!(snapshot.meta.event_name, "Pokal");
    }

    #[test]
    fn test_combine_players() {
        assert_eq!(combine_players("Anna", "Jonas"), "Anna / Jonas");
        assert_eq!(combine_players("Anna", NO_PLAYER), "Anna");
        assert_eq!(combine_players("Anna", ""), "Anna");
        assert_eq!(combine_players(NO_PLAYER, "Jonas"), "");
        assert_eq!(combine_players("AC/DC Fan", "Jonas"), "AC/DC Fan / Jonas");
    }
}
