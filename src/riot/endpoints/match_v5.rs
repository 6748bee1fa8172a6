use crate::config::PlayerSpec;
use crate::error::{AppError, RequestContext};
use crate::riot::client::RiotClient;
use crate::riot::types::MatchDto;

impl RiotClient {
    /// Get the match ids played since `start_time` (unix seconds) in the given queue.
    ///
    /// Ids are returned in the order Riot lists them, most recent first.
    pub async fn get_match_ids(
        &self,
        player: &PlayerSpec,
        puuid: &str,
        start_time: i64,
        queue_id: u16,
    ) -> Result<Vec<String>, AppError> {
        let url = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?startTime={}&queue={}",
            self.base_url(),
            urlencoding::encode(puuid),
            start_time,
            queue_id
        );
        let context = RequestContext::MatchIds {
            riot_id: player.riot_id(),
        };

        self.get(&url, context).await
    }

    /// Get match details by match ID
    pub async fn get_match(&self, match_id: &str) -> Result<MatchDto, AppError> {
        let url = format!(
            "{}/lol/match/v5/matches/{}",
            self.base_url(),
            urlencoding::encode(match_id)
        );
        let context = RequestContext::Match {
            match_id: match_id.to_string(),
        };

        self.get(&url, context).await
    }
}
