use chrono::Utc;
use clap::Subcommand;
use rollcall_core::MemberId;

use super::open_tracker;

#[derive(Subcommand)]
pub enum ClockAction {
    /// Start an attendance session
    In {
        /// Member id
        member: u64,
    },
    /// Close the open session
    Out {
        /// Member id
        member: u64,
    },
    /// Answer a pending activity check
    Confirm {
        /// Member id
        member: u64,
    },
}

pub fn run(action: ClockAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    let now = Utc::now();

    match action {
        ClockAction::In { member } => {
            let event = tracker.clock_in(MemberId(member), now)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        ClockAction::Out { member } => {
            let event = tracker.clock_out(MemberId(member), now)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        ClockAction::Confirm { member } => {
            match tracker.confirm_active(MemberId(member), now)? {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{{\"type\": \"no_pending_check\"}}"),
            }
        }
    }

    Ok(())
}
