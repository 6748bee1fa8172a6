//! Riot API access: account lookup and match history.

use async_trait::async_trait;

use crate::config::PlayerSpec;
use crate::error::AppError;

pub mod client;
pub mod types;

mod endpoints {
    mod account;
    mod match_v5;
}

pub use client::RiotClient;
pub use types::{AccountDto, MatchDto, ParticipantDto};

/// The three lookups the report pipeline needs from the match-history service.
#[async_trait]
pub trait MatchHistoryApi: Send + Sync {
    async fn account_by_riot_id(&self, player: &PlayerSpec) -> Result<AccountDto, AppError>;

    async fn match_ids(
        &self,
        player: &PlayerSpec,
        puuid: &str,
        start_time: i64,
        queue_id: u16,
    ) -> Result<Vec<String>, AppError>;

    async fn match_by_id(&self, match_id: &str) -> Result<MatchDto, AppError>;
}

#[async_trait]
impl MatchHistoryApi for RiotClient {
    async fn account_by_riot_id(&self, player: &PlayerSpec) -> Result<AccountDto, AppError> {
        self.get_account_by_riot_id(player).await
    }

    async fn match_ids(
        &self,
        player: &PlayerSpec,
        puuid: &str,
        start_time: i64,
        queue_id: u16,
    ) -> Result<Vec<String>, AppError> {
        self.get_match_ids(player, puuid, start_time, queue_id).await
    }

    async fn match_by_id(&self, match_id: &str) -> Result<MatchDto, AppError> {
        self.get_match(match_id).await
    }
}
