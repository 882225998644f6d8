//! Roster management commands.
//!
//! Shows the teams and players in the ledger and adds new ones.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use gavel_core::{Ledger, Player, PlayerStatus, RoleId, Team, UserId, format_amount};

use super::open_ledger;
use crate::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct RosterArgs {
    #[command(subcommand)]
    pub command: RosterCommands,
}

#[derive(Subcommand, Debug)]
pub enum RosterCommands {
    /// Show teams and players
    Show,
    /// Enroll players in the auction pool
    Enroll {
        /// Discord user ids
        #[arg(required = true)]
        players: Vec<u64>,
    },
    /// Register a team
    Team {
        /// Team name
        name: String,
        /// Short tag shown next to the team
        shorthandle: String,
        /// Discord user id of the captain
        #[arg(long)]
        captain: u64,
        /// Role granted to players the team buys
        #[arg(long)]
        team_role: Option<u64>,
        /// Role whose holders may bid for the team
        #[arg(long)]
        captain_role: Option<u64>,
        /// Initial budget
        #[arg(long, default_value_t = 0)]
        budget: u64,
    },
}

pub fn run(args: RosterArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let ledger = open_ledger(&config)?;

    match args.command {
        RosterCommands::Show => {
            println!("{}", teams_table(&ledger.teams()?));
            println!("{}", players_table(&ledger.players()?));
        }
        RosterCommands::Enroll { players } => {
            for player in players {
                ledger.enroll_player(UserId(player))?;
                println!("Enrolled {player}");
            }
        }
        RosterCommands::Team {
            name,
            shorthandle,
            captain,
            team_role,
            captain_role,
            budget,
        } => {
            let team = Team {
                team_role: team_role.map(RoleId),
                captain_role: captain_role.map(RoleId),
                ..Team::new(name, shorthandle, UserId(captain)).with_budget(budget)
            };
            ledger.create_team(&team)?;
            println!("Created team {} [{}]", team.name, team.shorthandle);
        }
    }
    Ok(())
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).fg(Color::Cyan))
        .collect()
}

fn role_cell(role: Option<RoleId>) -> String {
    role.map_or_else(|| "-".to_string(), |role| role.to_string())
}

fn teams_table(teams: &[Team]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&[
        "Team",
        "Tag",
        "Budget",
        "Captain",
        "Team role",
        "Captain role",
    ]));

    for team in teams {
        table.add_row(vec![
            Cell::new(&team.name),
            Cell::new(&team.shorthandle),
            Cell::new(format_amount(team.budget)),
            Cell::new(team.captain),
            Cell::new(role_cell(team.team_role)),
            Cell::new(role_cell(team.captain_role)),
        ]);
    }
    table
}

fn players_table(players: &[Player]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["Player", "Status"]));

    for player in players {
        let status = match &player.status {
            PlayerStatus::Unsold => Cell::new("unsold").fg(Color::Yellow),
            PlayerStatus::Assigned(team) => Cell::new(team).fg(Color::Green),
            PlayerStatus::Skipped => Cell::new("skipped").fg(Color::DarkGrey),
        };
        table.add_row(vec![Cell::new(player.id), status]);
    }
    table
}
