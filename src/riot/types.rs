use serde::Deserialize;

// ============================================================================
// Account-v1
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

// ============================================================================
// Match-v5
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub info: InfoDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    /// Seconds.
    pub game_duration: u64,
    #[serde(default)]
    pub queue_id: Option<u16>,
    pub participants: Vec<ParticipantDto>,
}

impl InfoDto {
    pub fn participant(&self, puuid: &str) -> Option<&ParticipantDto> {
        self.participants.iter().find(|p| p.puuid == puuid)
    }

    pub fn queue_name(&self) -> &'static str {
        match self.queue_id {
            Some(400) => "Normal Draft",
            Some(420) => "Ranked Solo/Duo",
            Some(430) => "Normal Blind",
            Some(440) => "Ranked Flex",
            Some(450) => "ARAM",
            Some(490) => "Quickplay",
            _ => "Other",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub win: bool,
    pub champion_name: String,
    pub lane: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}
