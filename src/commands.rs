use std::path::Path;

use crate::{OutputFormat, ReportKind};
use leaguebook::config::{self, LeaguebookConfig};
use leaguebook::seed::SeedData;
use leaguebook::storage::{PlayerChanges, PlayerFilter, ScoreEventFilter, TeamChanges, TeamFilter};
use leaguebook::ui::{self, Icons, TableBuilder, header, section, status, success, summary_row, theme};
use leaguebook::{LeagueStore, QueryEngine};
use owo_colors::OwoColorize;
use serde::Serialize;

fn emit_json<T: Serialize>(command: &str, data: &T) -> anyhow::Result<()> {
    let payload = serde_json::json!({
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_table(table: String) {
    if table.is_empty() {
        println!("{} No rows.", Icons::EMPTY);
    } else {
        println!("{}", table);
    }
}

pub fn run_init(
    config_path: &Path,
    database: &Path,
    sample: bool,
    force: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let settings = LeaguebookConfig {
        database: Some(database.to_string_lossy().to_string()),
        seed: None,
    };
    config::write_config(config_path, &settings, force)?;
    config::ensure_db_dir(database)?;

    let mut store = LeagueStore::open(database)?;
    let summary = if sample {
        Some(SeedData::sample()?.import(&mut store)?)
    } else {
        None
    };
    store.close()?;

    if format.is_human() {
        header("Leaguebook initialized");
        status(Icons::DATABASE, "Database", &database.display().to_string());
        status(Icons::INFO, "Config", &config_path.display().to_string());
        if let Some(summary) = &summary {
            status(Icons::SEED, "Sample records", &summary.to_string());
        }
        success("Ready.");
    } else {
        emit_json(
            "init",
            &serde_json::json!({
                "database": database.display().to_string(),
                "config": config_path.display().to_string(),
                "imported": summary,
            }),
        )?;
    }
    Ok(())
}

pub fn run_seed(store: &mut LeagueStore, file: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let (data, source) = match file {
        Some(path) => (SeedData::from_file(path)?, path.display().to_string()),
        None => (SeedData::sample()?, "bundled sample".to_string()),
    };

    if data.is_empty() {
        ui::warn(&format!("Dataset {} has no rows", source));
        return Ok(());
    }

    let summary = data.import(store)?;

    if format.is_human() {
        header(&format!("Seeded from {}", source));
        success(&format!("Imported {}", summary));
    } else {
        emit_json("seed", &summary)?;
    }
    Ok(())
}

pub fn run_stats(store: &LeagueStore, format: OutputFormat) -> anyhow::Result<()> {
    let stats = store.stats()?;

    if format.is_human() {
        header("Leaguebook Statistics");
        let mut table = TableBuilder::new();
        table.add_row("leagues", &stats.leagues.to_string());
        table.add_row("teams", &stats.teams.to_string());
        table.add_row("players", &stats.players.to_string());
        table.add_row("matches", &stats.matches.to_string());
        table.add_row("score_events", &stats.score_events.to_string());
        println!("{}", table.build());
    } else {
        emit_json("stats", &stats)?;
    }
    Ok(())
}

pub fn run_report(store: &LeagueStore, kind: ReportKind, format: OutputFormat) -> anyhow::Result<()> {
    let engine = QueryEngine::new(store);

    match kind {
        ReportKind::Matches => {
            let rows = engine.match_report()?;
            if format.is_human() {
                section("Match report");
                print_table(ui::render(&rows));
            } else {
                emit_json("report.matches", &rows)?;
            }
        }
        ReportKind::Roster | ReportKind::Summary => {
            let (title, command, rows) = if kind == ReportKind::Roster {
                ("Player roster", "report.roster", engine.player_roster()?)
            } else {
                ("Player summary", "report.summary", engine.player_summary()?)
            };
            if format.is_human() {
                section(title);
                print_table(ui::render(&rows));
            } else {
                emit_json(command, &rows)?;
            }
        }
        ReportKind::Goals => {
            let rows = engine.goals_per_team()?;
            if format.is_human() {
                section("Goals per team");
                print_table(ui::render(&rows));
            } else {
                emit_json("report.goals", &rows)?;
            }
        }
        ReportKind::Ages => {
            let rows = engine.average_age_per_team()?;
            if format.is_human() {
                section("Average age per team");
                print_table(ui::render(&rows));
            } else {
                emit_json("report.ages", &rows)?;
            }
        }
        ReportKind::TopScorers => {
            let teams = engine.top_scoring_teams()?;
            if format.is_human() {
                section("Teams with the highest-scoring event");
                if teams.is_empty() {
                    println!("{} No score events recorded.", Icons::EMPTY);
                }
                for team in &teams {
                    println!("{} {}", Icons::BALL, team.style(theme().highlight.clone()));
                }
            } else {
                emit_json("report.top-scorers", &teams)?;
            }
        }
        ReportKind::OldestRoster => {
            let roster = engine.oldest_team_roster()?;
            if !format.is_human() {
                return emit_json("report.oldest-roster", &roster);
            }
            section("Oldest team");
            match roster {
                None => println!("{} No player ages recorded.", Icons::EMPTY),
                Some(roster) => {
                    println!(
                        "{} {} (average age {:.2})",
                        Icons::TROPHY,
                        roster.team_name.style(theme().highlight.clone()),
                        roster.average_age
                    );
                    for player in &roster.players {
                        let age = player.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
                        summary_row(&format!("{} {}", Icons::PERSON, player.name), &format!("age {}", age));
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn run_teams(store: &LeagueStore, league: &str, format: OutputFormat) -> anyhow::Result<()> {
    let rows = QueryEngine::new(store).teams_by_league(league)?;

    if format.is_human() {
        section(&format!("Teams in {}", league));
        print_table(ui::render(&rows));
    } else {
        emit_json("teams", &rows)?;
    }
    Ok(())
}

pub fn run_coach(store: &LeagueStore, team: &str, coach: &str, format: OutputFormat) -> anyhow::Result<()> {
    let changed = store.update(&TeamFilter::by_name(team), &TeamChanges::default().coach(coach))?;
    if changed == 0 {
        anyhow::bail!("No team named '{}'", team);
    }

    if format.is_human() {
        success(&format!("{} is now coached by {}", team, coach));
    } else {
        emit_json("coach", &serde_json::json!({ "team": team, "coach": coach }))?;
    }
    Ok(())
}

pub fn run_age(
    store: &mut LeagueStore,
    team: &str,
    years: i32,
    dry_run: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let Some(found) = store.find_team_by_name(team)? else {
        anyhow::bail!("No team named '{}'", team);
    };

    store.begin_transaction()?;
    let changed = match store.update(
        &PlayerFilter::on_team(found.id),
        &PlayerChanges::default().increment_age(years),
    ) {
        Ok(changed) => changed,
        Err(e) => {
            store.rollback()?;
            return Err(e.into());
        }
    };
    if dry_run {
        store.rollback()?;
    } else {
        store.commit()?;
    }

    if format.is_human() {
        let verb = if dry_run { "Would age" } else { "Aged" };
        status(Icons::UP, verb, &format!("{} player(s) on {} by {} year(s)", changed, team, years));
    } else {
        emit_json(
            "age",
            &serde_json::json!({
                "team": team,
                "years": years,
                "players": changed,
                "committed": !dry_run,
            }),
        )?;
    }
    Ok(())
}

pub fn run_delete_event(store: &LeagueStore, id: i64, format: OutputFormat) -> anyhow::Result<()> {
    let removed = store.delete(&ScoreEventFilter::by_id(id))?;
    if removed == 0 {
        anyhow::bail!("No score event with id {}", id);
    }

    if format.is_human() {
        status(Icons::DEL, "Deleted score event", &id.to_string());
    } else {
        emit_json("delete-event", &serde_json::json!({ "id": id }))?;
    }
    Ok(())
}
