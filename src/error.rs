use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Identifies which Riot API call a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestContext {
    /// Account-v1 lookup of a `name#tag`.
    Account { riot_id: String },
    /// Match-v5 id listing for a player.
    MatchIds { riot_id: String },
    /// Match-v5 detail of one match.
    Match { match_id: String },
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account { riot_id } => write!(f, "account lookup for {riot_id}"),
            Self::MatchIds { riot_id } => write!(f, "match listing for {riot_id}"),
            Self::Match { match_id } => write!(f, "match {match_id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid player entry: {0}")]
    Validation(String),

    #[error("Request failed ({context}): {}", transport_cause(source))]
    Transport {
        context: RequestContext,
        #[source]
        source: reqwest::Error,
    },

    #[error("Riot API error ({context}): {status} - {body}")]
    Api {
        context: RequestContext,
        status: u16,
        body: String,
    },

    #[error("Malformed response ({context}): {reason}")]
    MalformedResponse {
        context: RequestContext,
        reason: String,
    },

    #[error("Player {puuid} is not a participant of match {match_id}")]
    ParticipantNotFound { match_id: String, puuid: String },

    #[error("Failed to write report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// Classifies a `reqwest` failure and appends its whole `source()` chain, since the
/// top-level message only names the URL.
fn transport_cause(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "transport error"
    };

    let mut cause = format!("{kind}: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        cause.push_str(": ");
        cause.push_str(&inner.to_string());
        source = inner.source();
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_names_player_and_status() {
        let err = AppError::Api {
            context: RequestContext::Account {
                riot_id: "Faker#KR1".into(),
            },
            status: 403,
            body: "Forbidden".into(),
        };

        assert_eq!(
            err.to_string(),
            "Riot API error (account lookup for Faker#KR1): 403 - Forbidden"
        );
    }

    #[test]
    fn malformed_response_names_match() {
        let err = AppError::MalformedResponse {
            context: RequestContext::Match {
                match_id: "EUW1_1".into(),
            },
            reason: "missing field `championName`".into(),
        };

        let msg = err.to_string();
        assert!(msg.contains("EUW1_1"));
        assert!(msg.contains("championName"));
    }
}
