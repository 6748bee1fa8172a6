//! Per-player report pipeline: resolve → enumerate → fetch/extract → export.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use tracing::{debug, error, info, warn};

use crate::config::{Config, FailurePolicy, PlayerSpec};
use crate::error::AppError;
use crate::report::{self, ReportTable};
use crate::riot::MatchHistoryApi;
use crate::stats::{self, ResultRow};

/// A configured player once Riot has told us its puuid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlayer {
    pub spec: PlayerSpec,
    pub puuid: String,
}

/// Time range covered by one run, fixed when the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    /// Local calendar date written into report file names.
    pub report_date: NaiveDate,
}

impl ReportWindow {
    pub fn ending_now(lookback_hours: u32) -> Self {
        let now = Local::now();
        Self {
            start: now.with_timezone(&Utc) - TimeDelta::hours(i64::from(lookback_hours)),
            report_date: now.date_naive(),
        }
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start.timestamp()
    }
}

/// Milestones of one player's run, in the order they happen.
#[derive(Debug)]
pub enum Stage<'a> {
    Resolved { puuid: &'a str },
    Enumerated { match_count: usize },
    Fetched { match_id: &'a str },
    Extracted { row: &'a ResultRow },
    TableBuilt { rows: usize },
    Exported { path: &'a Path },
    Failed { error: &'a AppError },
}

/// Receives progress of the pipeline.
pub trait Progress: Send + Sync {
    fn on_stage(&self, player: &PlayerSpec, stage: &Stage<'_>);
}

/// Default sink, forwards every stage to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn on_stage(&self, player: &PlayerSpec, stage: &Stage<'_>) {
        match stage {
            Stage::Resolved { puuid } => info!("🔎 {player}: identity resolved ({puuid})"),
            Stage::Enumerated { match_count } => {
                info!("📋 {player}: {match_count} match ids acquired")
            }
            Stage::Fetched { match_id } => debug!("{player}: match {match_id} acquired"),
            Stage::Extracted { row } => debug!(
                "{player}: {} {} {}/{}/{} in {}",
                row.result, row.champion, row.kills, row.deaths, row.assists, row.duration
            ),
            Stage::TableBuilt { rows } => info!("📊 {player}: table built with {rows} rows"),
            Stage::Exported { path } => {
                info!("💾 {player}: report written to {}", path.display())
            }
            Stage::Failed { error } => error!("❌ {player}: {error}"),
        }
    }
}

/// Outcome of a successful player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerReport {
    pub player: ResolvedPlayer,
    pub path: PathBuf,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub exported: Vec<PlayerReport>,
    /// Only filled with [`FailurePolicy::Continue`].
    pub failed: Vec<(PlayerSpec, AppError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything a run needs besides the player list.
pub struct ReportJob<'a, A: MatchHistoryApi + ?Sized> {
    api: &'a A,
    progress: &'a dyn Progress,
    reports_dir: PathBuf,
    queue_id: u16,
    window: ReportWindow,
}

impl<'a, A: MatchHistoryApi + ?Sized> ReportJob<'a, A> {
    pub fn new(
        api: &'a A,
        progress: &'a dyn Progress,
        reports_dir: impl Into<PathBuf>,
        queue_id: u16,
        window: ReportWindow,
    ) -> Self {
        Self {
            api,
            progress,
            reports_dir: reports_dir.into(),
            queue_id,
            window,
        }
    }

    pub fn from_config(config: &Config, api: &'a A, progress: &'a dyn Progress) -> Self {
        Self::new(
            api,
            progress,
            config.reports_directory_path.clone(),
            config.queue_id,
            ReportWindow::ending_now(config.lookback_hours),
        )
    }

    /// Processes `players` in order.
    ///
    /// With [`FailurePolicy::Abort`] the first failure is returned and later players are
    /// skipped; reports already written stay on disk.
    pub async fn run(
        &self,
        players: &[PlayerSpec],
        policy: FailurePolicy,
    ) -> Result<RunSummary, AppError> {
        let mut summary = RunSummary::default();

        if players.is_empty() {
            warn!("No players configured, nothing to report");
        }

        for player in players {
            match self.process_player(player).await {
                Ok(report) => summary.exported.push(report),
                Err(e) => {
                    self.progress.on_stage(player, &Stage::Failed { error: &e });
                    match policy {
                        FailurePolicy::Abort => return Err(e),
                        FailurePolicy::Continue => summary.failed.push((player.clone(), e)),
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Runs the whole chain for one player. Nothing is written unless every match succeeded.
    pub async fn process_player(&self, player: &PlayerSpec) -> Result<PlayerReport, AppError> {
        debug!("🏅 Processing player: {player}");

        let resolved = self.resolve(player).await?;
        let match_ids = self.enumerate(&resolved).await?;
        let rows = self.collect_rows(&resolved, &match_ids).await?;
        let path = self.export(&resolved, &rows)?;

        Ok(PlayerReport {
            player: resolved,
            path,
            rows,
        })
    }

    pub async fn resolve(&self, player: &PlayerSpec) -> Result<ResolvedPlayer, AppError> {
        let account = self.api.account_by_riot_id(player).await?;
        self.progress.on_stage(
            player,
            &Stage::Resolved {
                puuid: &account.puuid,
            },
        );

        Ok(ResolvedPlayer {
            spec: player.clone(),
            puuid: account.puuid,
        })
    }

    pub async fn enumerate(&self, player: &ResolvedPlayer) -> Result<Vec<String>, AppError> {
        let ids = self
            .api
            .match_ids(
                &player.spec,
                &player.puuid,
                self.window.start_timestamp(),
                self.queue_id,
            )
            .await?;
        self.progress.on_stage(
            &player.spec,
            &Stage::Enumerated {
                match_count: ids.len(),
            },
        );

        Ok(ids)
    }

    /// Fetches and reduces each match in `match_ids` order, stopping at the first error.
    pub async fn collect_rows(
        &self,
        player: &ResolvedPlayer,
        match_ids: &[String],
    ) -> Result<Vec<ResultRow>, AppError> {
        let mut rows = Vec::with_capacity(match_ids.len());

        for match_id in match_ids {
            let match_dto = self.api.match_by_id(match_id).await?;
            debug!(
                "{}: {} is a {} game",
                player.spec,
                match_id,
                match_dto.info.queue_name()
            );
            self.progress
                .on_stage(&player.spec, &Stage::Fetched { match_id });

            let row = stats::extract_row(match_id, &match_dto, &player.puuid)?;
            self.progress
                .on_stage(&player.spec, &Stage::Extracted { row: &row });
            rows.push(row);
        }

        Ok(rows)
    }

    pub fn export(&self, player: &ResolvedPlayer, rows: &[ResultRow]) -> Result<PathBuf, AppError> {
        let table = ReportTable::from_rows(rows);
        self.progress
            .on_stage(&player.spec, &Stage::TableBuilt { rows: table.len() });

        let path = report::report_path(
            &self.reports_dir,
            &player.spec.game_name,
            self.window.report_date,
        );
        report::write_report(&path, &table)?;
        self.progress
            .on_stage(&player.spec, &Stage::Exported { path: &path });

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::error::RequestContext;
    use crate::riot::types::{AccountDto, InfoDto, MatchDto, ParticipantDto};
    use crate::stats::GameResult;

    /// In-memory match history that records every call it receives.
    #[derive(Default)]
    struct FakeApi {
        accounts: HashMap<String, String>,
        match_ids: HashMap<String, Vec<String>>,
        matches: HashMap<String, MatchDto>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_player(
            mut self,
            game_name: &str,
            puuid: &str,
            matches: &[(&str, MatchDto)],
        ) -> Self {
            self.accounts.insert(game_name.into(), puuid.into());
            self.match_ids.insert(
                puuid.into(),
                matches.iter().map(|(id, _)| id.to_string()).collect(),
            );
            for (id, dto) in matches {
                self.matches.insert(id.to_string(), dto.clone());
            }
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MatchHistoryApi for FakeApi {
        async fn account_by_riot_id(&self, player: &PlayerSpec) -> Result<AccountDto, AppError> {
            self.calls.lock().unwrap().push(format!("account:{player}"));
            let puuid = self.accounts.get(&player.game_name).ok_or_else(|| AppError::Api {
                context: RequestContext::Account {
                    riot_id: player.riot_id(),
                },
                status: 404,
                body: "Data not found".into(),
            })?;

            Ok(AccountDto {
                puuid: puuid.clone(),
                game_name: Some(player.game_name.clone()),
                tag_line: Some(player.tag_line.clone()),
            })
        }

        async fn match_ids(
            &self,
            player: &PlayerSpec,
            puuid: &str,
            _start_time: i64,
            queue_id: u16,
        ) -> Result<Vec<String>, AppError> {
            assert_eq!(queue_id, 420);
            self.calls.lock().unwrap().push(format!("ids:{player}"));
            Ok(self.match_ids.get(puuid).cloned().unwrap_or_default())
        }

        async fn match_by_id(&self, match_id: &str) -> Result<MatchDto, AppError> {
            self.calls.lock().unwrap().push(format!("match:{match_id}"));
            self.matches
                .get(match_id)
                .cloned()
                .ok_or_else(|| AppError::Api {
                    context: RequestContext::Match {
                        match_id: match_id.into(),
                    },
                    status: 503,
                    body: "Service unavailable".into(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl Progress for RecordingProgress {
        fn on_stage(&self, player: &PlayerSpec, stage: &Stage<'_>) {
            let event = match stage {
                Stage::Resolved { .. } => "resolved",
                Stage::Enumerated { .. } => "enumerated",
                Stage::Fetched { .. } => "fetched",
                Stage::Extracted { .. } => "extracted",
                Stage::TableBuilt { .. } => "table",
                Stage::Exported { .. } => "exported",
                Stage::Failed { .. } => "failed",
            };
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{event}", player.game_name));
        }
    }

    fn solo_match(puuid: &str, win: bool, champion: &str, game_duration: u64) -> MatchDto {
        let mut participants: Vec<_> = (0..9)
            .map(|i| ParticipantDto {
                puuid: format!("other{i}"),
                win: i % 2 == 0,
                champion_name: format!("Other{i}"),
                lane: "NONE".into(),
                kills: 0,
                deaths: 0,
                assists: 0,
            })
            .collect();
        participants.insert(
            3,
            ParticipantDto {
                puuid: puuid.into(),
                win,
                champion_name: champion.into(),
                lane: "MIDDLE".into(),
                kills: 10,
                deaths: 2,
                assists: 8,
            },
        );

        MatchDto {
            info: InfoDto {
                game_duration,
                queue_id: Some(420),
                participants,
            },
        }
    }

    fn window() -> ReportWindow {
        ReportWindow {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            report_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        }
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn single_match_produces_expected_row() {
        let api = FakeApi::default().with_player(
            "Faker",
            "abc",
            &[("m1", solo_match("abc", true, "Ahri", 1500))],
        );
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());

        let report = job.process_player(&PlayerSpec::new("Faker", "KR1")).await.unwrap();

        assert_eq!(
            report.rows,
            vec![ResultRow {
                result: GameResult::Win,
                champion: "Ahri".into(),
                lane: "MIDDLE".into(),
                kills: 10,
                deaths: 2,
                assists: 8,
                duration: "25:00".into(),
            }]
        );
        assert_eq!(report.path, dir.path().join("report_Faker_2024-05-02.xlsx"));
        assert!(report.path.exists());
        assert_eq!(report.player.puuid, "abc");
    }

    #[tokio::test]
    async fn rows_follow_enumeration_order() {
        let api = FakeApi::default().with_player(
            "Faker",
            "abc",
            &[
                ("m3", solo_match("abc", true, "Azir", 1800)),
                ("m1", solo_match("abc", false, "Orianna", 1200)),
                ("m2", solo_match("abc", true, "Syndra", 2000)),
            ],
        );
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());

        let report = job.process_player(&PlayerSpec::new("Faker", "KR1")).await.unwrap();

        let champions: Vec<_> = report.rows.iter().map(|r| r.champion.as_str()).collect();
        assert_eq!(champions, vec!["Azir", "Orianna", "Syndra"]);
        assert_eq!(
            api.calls(),
            vec!["account:Faker#KR1", "ids:Faker#KR1", "match:m3", "match:m1", "match:m2"]
        );
    }

    #[tokio::test]
    async fn progress_follows_stage_order() {
        let api = FakeApi::default().with_player(
            "Faker",
            "abc",
            &[
                ("m1", solo_match("abc", true, "Ahri", 1500)),
                ("m2", solo_match("abc", false, "Ahri", 1500)),
            ],
        );
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());

        job.process_player(&PlayerSpec::new("Faker", "KR1")).await.unwrap();

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec![
                "Faker:resolved",
                "Faker:enumerated",
                "Faker:fetched",
                "Faker:extracted",
                "Faker:fetched",
                "Faker:extracted",
                "Faker:table",
                "Faker:exported",
            ]
        );
    }

    #[tokio::test]
    async fn no_matches_still_exports_header_only_report() {
        let api = FakeApi::default().with_player("Faker", "abc", &[]);
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());

        let report = job.process_player(&PlayerSpec::new("Faker", "KR1")).await.unwrap();

        assert!(report.rows.is_empty());
        assert!(report.path.exists());
    }

    #[tokio::test]
    async fn failing_match_writes_nothing() {
        let mut api = FakeApi::default().with_player(
            "Faker",
            "abc",
            &[
                ("m1", solo_match("abc", true, "Ahri", 1500)),
                ("m2", solo_match("abc", true, "Ahri", 1500)),
            ],
        );
        api.matches.remove("m2");
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());

        let err = job.process_player(&PlayerSpec::new("Faker", "KR1")).await.unwrap_err();

        assert!(matches!(err, AppError::Api { status: 503, .. }));
        assert!(err.to_string().contains("m2"));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn missing_participant_writes_nothing() {
        let api = FakeApi::default().with_player(
            "Faker",
            "abc",
            &[("m1", solo_match("someone-else", true, "Ahri", 1500))],
        );
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());

        let err = job.process_player(&PlayerSpec::new("Faker", "KR1")).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::ParticipantNotFound { ref match_id, .. } if match_id == "m1"
        ));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn abort_policy_stops_at_first_failure() {
        let api = FakeApi::default()
            .with_player("First", "p1", &[("m1", solo_match("p1", true, "Ahri", 1500))])
            .with_player("Third", "p3", &[("m3", solo_match("p3", true, "Lux", 1500))]);
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());
        let players = [
            PlayerSpec::new("First", "EUW"),
            PlayerSpec::new("Unknown", "EUW"),
            PlayerSpec::new("Third", "EUW"),
        ];

        let err = job.run(&players, FailurePolicy::Abort).await.unwrap_err();

        assert!(matches!(err, AppError::Api { status: 404, .. }));
        assert!(dir.path().join("report_First_2024-05-02.xlsx").exists());
        assert!(!dir.path().join("report_Third_2024-05-02.xlsx").exists());
        assert!(!api.calls().iter().any(|c| c.contains("Third")));
        let events = progress.events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| e.ends_with(":failed")).count(), 1);
        assert_eq!(events.last().map(String::as_str), Some("Unknown:failed"));
    }

    #[tokio::test]
    async fn continue_policy_isolates_failures() {
        let api = FakeApi::default()
            .with_player("First", "p1", &[("m1", solo_match("p1", true, "Ahri", 1500))])
            .with_player("Third", "p3", &[("m3", solo_match("p3", false, "Lux", 1500))]);
        let progress = RecordingProgress::default();
        let dir = tempfile::tempdir().unwrap();
        let job = ReportJob::new(&api, &progress, dir.path(), 420, window());
        let players = [
            PlayerSpec::new("First", "EUW"),
            PlayerSpec::new("Unknown", "EUW"),
            PlayerSpec::new("Third", "EUW"),
        ];

        let summary = job.run(&players, FailurePolicy::Continue).await.unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.exported.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, PlayerSpec::new("Unknown", "EUW"));
        assert_eq!(summary.exported[1].rows[0].result, GameResult::Loss);
        assert!(dir.path().join("report_Third_2024-05-02.xlsx").exists());
    }

    #[test]
    fn window_looks_back_the_configured_hours() {
        let window = ReportWindow::ending_now(24);

        let span = Utc::now() - window.start;

        assert!(span >= TimeDelta::hours(24));
        assert!(span < TimeDelta::hours(24) + TimeDelta::minutes(1));
    }
}
