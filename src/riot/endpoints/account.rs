use crate::config::PlayerSpec;
use crate::error::{AppError, RequestContext};
use crate::riot::client::RiotClient;
use crate::riot::types::AccountDto;

impl RiotClient {
    /// Get account by Riot ID (game name + tag line)
    pub async fn get_account_by_riot_id(
        &self,
        player: &PlayerSpec,
    ) -> Result<AccountDto, AppError> {
        let url = format!(
            "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
            self.base_url(),
            urlencoding::encode(&player.game_name),
            urlencoding::encode(&player.tag_line)
        );
        let context = RequestContext::Account {
            riot_id: player.riot_id(),
        };

        let account: AccountDto = self.get(&url, context.clone()).await?;
        if account.puuid.is_empty() {
            return Err(AppError::MalformedResponse {
                context,
                reason: "empty `puuid`".into(),
            });
        }

        Ok(account)
    }
}
