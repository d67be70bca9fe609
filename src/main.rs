use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use league_app::{
    Application, build_application, services::derivation_cache::DerivationCacheConfig,
    workflow::matches::{
        coinflip::{Coin, CoinflipOutcome},
        submit::SubmitMatchCommand,
    },
};
use league_core::{AchievementId, MatchId, PlayerId, SeasonId, SeasonWindow, Side};
use league_persistence_json::JsonFileStore;
use log::info;
use serde::Serialize;

mod logs;

#[derive(Parser, Debug)]
#[command(name = "kick-league", about = "Table football league state derived from the match log")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full derived state of one player.
    Player { id: String },
    /// Current rating of one player.
    Rating { id: String },
    /// Derived state of every player.
    Players,
    /// Standings of a season, the active one when omitted.
    Standings { season: Option<String> },
    /// Aggregate figures of a season, the active one when omitted.
    SeasonStats { season: Option<String> },
    Seasons,
    CreateSeason {
        name: String,
        #[arg(long, value_parser = parse_time)]
        start: Option<DateTime<Utc>>,
    },
    EndSeason {
        id: String,
        #[arg(long, value_parser = parse_time)]
        end: Option<DateTime<Utc>>,
    },
    /// Records a played match.
    Submit {
        #[arg(long)]
        p1: String,
        #[arg(long)]
        p2: String,
        #[arg(long)]
        s1: u32,
        #[arg(long)]
        s2: u32,
        #[arg(long, value_parser = parse_side)]
        side1: Option<Side>,
        #[arg(long, value_parser = parse_side)]
        side2: Option<Side>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },
    DeleteMatch { id: String },
    /// Blue/white figures of one player, or of the whole league.
    SideStats { player: Option<String> },
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    AddPlayer {
        id: String,
        name: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Every achievement with its name and description.
    Achievements,
    /// Flips a coin to decide who starts or who plays which side.
    Coinflip {
        /// Player 1's call, heads or tails.
        #[arg(long, value_parser = parse_coin)]
        call: Option<Coin>,
        /// Best of this many flips (odd).
        #[arg(long, default_value_t = 1)]
        rounds: u32,
        /// Put the winner on the blue side.
        #[arg(long, conflicts_with = "winner_side")]
        sides: bool,
        /// Side the winner picked.
        #[arg(long, value_parser = parse_side)]
        winner_side: Option<Side>,
    },
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
        .ok_or_else(|| format!("invalid date: {}", value))
}

fn parse_side(value: &str) -> Result<Side, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("invalid side: {} (expected blue or white)", value))
}

fn parse_coin(value: &str) -> Result<Coin, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("invalid call: {} (expected heads or tails)", value))
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={}", name, value);
            default
        }),
        Err(_) => default,
    }
}

fn cache_config() -> DerivationCacheConfig {
    let defaults = DerivationCacheConfig::default();
    DerivationCacheConfig {
        max_capacity: env_or("LEAGUE_CACHE_CAPACITY", defaults.max_capacity),
        time_to_live: Duration::from_secs(env_or(
            "LEAGUE_CACHE_TTL_SECS",
            defaults.time_to_live.as_secs(),
        )),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode output: {}", e))
}

async fn resolve_season(app: &Application, season: Option<String>) -> Result<SeasonId, String> {
    if let Some(season) = season {
        return Ok(SeasonId(season));
    }
    app.season_get_active_use_case
        .get_active_season()
        .await
        .map_err(|e| format!("failed to look up active season: {:?}", e))?
        .map(|season: SeasonWindow| season.id)
        .ok_or_else(|| "no active season".to_string())
}

async fn run(app: &Application, command: Command) -> Result<String, String> {
    match command {
        Command::Player { id } => {
            let state = app
                .player_get_state_use_case
                .get_state(&PlayerId(id))
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&state)
        }
        Command::Rating { id } => {
            let rating = app
                .player_get_rating_use_case
                .get_rating(&PlayerId(id))
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&rating)
        }
        Command::Players => {
            let states = app
                .player_list_states_use_case
                .list_states()
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&*states)
        }
        Command::Standings { season } => {
            let season_id = resolve_season(app, season).await?;
            let rows = app
                .season_standings_use_case
                .get_standings(&season_id)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&*rows)
        }
        Command::SeasonStats { season } => {
            let season_id = resolve_season(app, season).await?;
            let statistics = app
                .season_statistics_use_case
                .get_statistics(&season_id)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&*statistics)
        }
        Command::Seasons => {
            let seasons = app
                .season_list_use_case
                .list_seasons()
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&seasons)
        }
        Command::CreateSeason { name, start } => {
            let season = app
                .season_create_use_case
                .create_season(name, start)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&season)
        }
        Command::EndSeason { id, end } => {
            let season = app
                .season_end_use_case
                .end_season(&SeasonId(id), end)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&season)
        }
        Command::Submit {
            p1,
            p2,
            s1,
            s2,
            side1,
            side2,
            notes,
            at,
        } => {
            let command = SubmitMatchCommand {
                player1: PlayerId(p1),
                player2: PlayerId(p2),
                score1: s1,
                score2: s2,
                played_at: at,
                side1,
                side2,
                notes,
            };
            let record = app
                .match_submit_use_case
                .submit_match(command)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&record)
        }
        Command::DeleteMatch { id } => {
            let removed = app
                .match_delete_use_case
                .delete_match(&MatchId(id))
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&serde_json::json!({ "deleted": removed }))
        }
        Command::SideStats { player: Some(player) } => {
            let view = app
                .side_statistics_use_case
                .player_side_statistics(&PlayerId(player))
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&view)
        }
        Command::SideStats { player: None } => {
            let statistics = app
                .side_statistics_use_case
                .global_side_statistics()
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&statistics)
        }
        Command::Recent { limit } => {
            let records = app
                .match_recent_use_case
                .recent_matches(limit)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&records)
        }
        Command::AddPlayer { id, name, nickname } => {
            let profile = app
                .player_register_use_case
                .register_player(PlayerId(id), name, nickname)
                .await
                .map_err(|e| format!("{:?}", e))?;
            to_json(&profile)
        }
        Command::Achievements => to_json(&AchievementId::catalogue()),
        Command::Coinflip {
            call,
            rounds,
            sides,
            winner_side,
        } => {
            let call = call.unwrap_or(Coin::Heads);
            let coinflip = &app.coinflip_use_case;
            let outcome: CoinflipOutcome = if sides {
                coinflip.flip_for_sides(call, rounds)
            } else {
                coinflip.flip_for_winner(call, rounds).map(|mut outcome| {
                    outcome.sides =
                        winner_side.map(|side| coinflip.assign_sides(outcome.winner, side));
                    outcome
                })
            }
            .map_err(|e| format!("{:?}", e))?;
            to_json(&outcome)
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env file: {}", e);
        }
    }

    logs::init_logger();

    let cli = Cli::parse();

    let data_dir = std::env::var("LEAGUE_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    info!("Using league data in {}", data_dir);
    let store = Arc::new(JsonFileStore::new(data_dir));
    let app = build_application(store, &cache_config());

    match run(&app, cli.command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("2025-03-14").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("2025-03-14T18:30:00+01:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, 17, 30, 0).unwrap()
        );
        assert!(parse_time("14.03.2025").is_err());
    }

    #[test]
    fn test_parse_side_accepts_legacy_spelling() {
        assert_eq!(parse_side("Blue").unwrap(), Side::Blue);
        assert_eq!(parse_side("weiss").unwrap(), Side::White);
        assert!(parse_side("red").is_err());
    }

    #[test]
    fn test_cli_parses_coinflip() {
        let cli = Cli::try_parse_from([
            "kick-league", "coinflip", "--call", "zahl", "--rounds", "3", "--winner-side", "white",
        ])
        .unwrap();
        match cli.command {
            Command::Coinflip {
                call,
                rounds,
                sides,
                winner_side,
            } => {
                assert_eq!(call, Some(Coin::Tails));
                assert_eq!(rounds, 3);
                assert!(!sides);
                assert_eq!(winner_side, Some(Side::White));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(
            Cli::try_parse_from(["kick-league", "coinflip", "--sides", "--winner-side", "blue"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["kick-league", "coinflip", "--call", "edge"]).is_err());
    }

    #[tokio::test]
    async fn test_achievements_command_lists_catalogue() {
        let store = Arc::new(league_app::ports::store::InMemoryStore::new());
        let app = build_application(store, &DerivationCacheConfig::default());
        let output = run(&app, Command::Achievements).await.unwrap();
        let catalogue: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(catalogue.len(), AchievementId::ALL.len());
        assert_eq!(catalogue[0]["id"], "winning_streak_3");
        assert_eq!(catalogue[0]["name"], "Winning Streak (3)");
        assert_eq!(catalogue[0]["description"], "3 wins in a row");
    }

    #[tokio::test]
    async fn test_coinflip_command_assigns_sides() {
        let store = Arc::new(league_app::ports::store::InMemoryStore::new());
        let app = build_application(store, &DerivationCacheConfig::default());
        let command = Command::Coinflip {
            call: Some(Coin::Heads),
            rounds: 3,
            sides: true,
            winner_side: None,
        };
        let output = run(&app, command).await.unwrap();
        let outcome: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(outcome["flips"].as_array().unwrap().len(), 3);
        let winner_side = if outcome["winner"] == "player1" {
            &outcome["sides"]["player1Side"]
        } else {
            &outcome["sides"]["player2Side"]
        };
        assert_eq!(winner_side, "blue");

        let even = Command::Coinflip {
            call: None,
            rounds: 2,
            sides: false,
            winner_side: None,
        };
        assert!(run(&app, even).await.is_err());
    }

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from([
            "kick-league", "submit", "--p1", "anna", "--p2", "ben", "--s1", "10", "--s2", "7",
            "--side1", "white",
        ])
        .unwrap();
        match cli.command {
            Command::Submit { s1, side1, side2, .. } => {
                assert_eq!(s1, 10);
                assert_eq!(side1, Some(Side::White));
                assert_eq!(side2, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
