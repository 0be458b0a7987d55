use std::collections::BTreeSet;

use clap::Subcommand;
use rollcall_core::{Config, MemberId, RoleId};

use super::open_tracker;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Member summary: totals, goal progress, recent sessions
    Info {
        /// Member id
        member: u64,
        /// Role ids held by the member (repeatable)
        #[arg(long = "role")]
        roles: Vec<u64>,
    },
    /// Ranking by total recorded time
    Top {
        /// Number of rows to show
        #[arg(long, default_value = "3")]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        StatsAction::Info { member, roles } => {
            let config = Config::load()?;
            let roles: BTreeSet<RoleId> = roles.into_iter().map(RoleId).collect();
            let summary = tracker.summary(MemberId(member), &roles, &config.goals)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Top { limit } => {
            let mut ranking = tracker.ranking()?;
            ranking.truncate(limit);
            println!("{}", serde_json::to_string_pretty(&ranking)?);
        }
    }

    Ok(())
}
