//! Reduces a full match record to the one row we report for a player.

use std::fmt;

use crate::error::AppError;
use crate::riot::MatchDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Loss => "LOSS",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One match, seen from one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub result: GameResult,
    pub champion: String,
    pub lane: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// `M:SS`
    pub duration: String,
}

/// `M:SS`, minutes are not capped at 59.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Picks the participant with the given `puuid` out of `match_dto` and projects it.
pub fn extract_row(
    match_id: &str,
    match_dto: &MatchDto,
    puuid: &str,
) -> Result<ResultRow, AppError> {
    let participant = match_dto.info.participant(puuid).ok_or_else(|| {
        AppError::ParticipantNotFound {
            match_id: match_id.to_string(),
            puuid: puuid.to_string(),
        }
    })?;

    Ok(ResultRow {
        result: if participant.win {
            GameResult::Win
        } else {
            GameResult::Loss
        },
        champion: participant.champion_name.clone(),
        lane: participant.lane.clone(),
        kills: participant.kills,
        deaths: participant.deaths,
        assists: participant.assists,
        duration: format_duration(match_dto.info.game_duration),
    })
}
