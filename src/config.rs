use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// One player to report on, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSpec {
    pub game_name: String,
    pub tag_line: String,
}

impl PlayerSpec {
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            tag_line: tag_line.into(),
        }
    }

    /// `name#tag`, the way Riot displays it.
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

impl fmt::Display for PlayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

/// What the run does once a player fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run on the first failing player.
    #[default]
    Abort,
    /// Record the failure and move on to the next player.
    Continue,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub riot_api_key: String,
    /// Scheme and host, without trailing slash.
    pub riot_api_url: String,
    pub reports_directory_path: PathBuf,
    pub players: Vec<PlayerSpec>,
    pub request_timeout: Duration,
    pub lookback_hours: u32,
    pub queue_id: u16,
    pub on_player_error: FailurePolicy,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    riot_api: RawRiotApi,
    reports_directory_path: Option<PathBuf>,
    #[serde(default)]
    players: Vec<Value>,
    request_timeout_secs: Option<u64>,
    lookback_hours: Option<u32>,
    queue_id: Option<u16>,
    #[serde(default)]
    on_player_error: FailurePolicy,
}

#[derive(Debug, Default, Deserialize)]
struct RawRiotApi {
    riot_api_key: Option<String>,
    riot_api_url: Option<String>,
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "config.json";

    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_LOOKBACK_HOURS: u32 = 24;
    const DEFAULT_QUEUE_ID: u16 = 420;

    /// Reads the JSON config file, letting `RIOT_API_KEY` / `RIOT_API_URL` from the
    /// environment (or a `.env` file) take precedence over the file values.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let text = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;

        Self::from_json(&text, |key| env::var(key).ok())
    }

    pub fn from_json(
        text: &str,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let raw: RawConfig = serde_json::from_str(text)
            .map_err(|e| AppError::Config(format!("invalid JSON in config file: {e}")))?;

        let riot_api_key = env_var("RIOT_API_KEY")
            .or(raw.riot_api.riot_api_key)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Config("riot_api.riot_api_key must be set".into()))?;

        let riot_api_url = env_var("RIOT_API_URL")
            .or(raw.riot_api.riot_api_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Config("riot_api.riot_api_url must be set".into()))?;

        let reports_directory_path = raw
            .reports_directory_path
            .ok_or_else(|| AppError::Config("reports_directory_path must be set".into()))?;

        let request_timeout_secs = raw
            .request_timeout_secs
            .unwrap_or(Self::DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }

        let lookback_hours = raw.lookback_hours.unwrap_or(Self::DEFAULT_LOOKBACK_HOURS);
        if lookback_hours == 0 {
            return Err(AppError::Config(
                "lookback_hours must be greater than zero".into(),
            ));
        }

        let players = check_players(&raw.players)?;

        Ok(Self {
            riot_api_key,
            riot_api_url,
            reports_directory_path,
            players,
            request_timeout: Duration::from_secs(request_timeout_secs),
            lookback_hours,
            queue_id: raw.queue_id.unwrap_or(Self::DEFAULT_QUEUE_ID),
            on_player_error: raw.on_player_error,
        })
    }
}

/// Validates the raw `players` entries before anything touches the network.
///
/// Each entry must be an object with non-empty `game_name` and `tag_line` strings.
pub fn check_players(players: &[Value]) -> Result<Vec<PlayerSpec>, AppError> {
    players
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let object = entry.as_object().ok_or_else(|| {
                AppError::Validation(format!("player #{index} must be an object"))
            })?;

            let field = |name: &str| {
                object
                    .get(name)
                    .and_then(Value::as_str)
                    .filter(|value| !value.trim().is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "player #{index} must define a non-empty '{name}'"
                        ))
                    })
            };

            Ok(PlayerSpec {
                game_name: field("game_name")?,
                tag_line: field("tag_line")?,
            })
        })
        .collect()
}
