use std::io;
use std::str::FromStr;
use std::time::Instant;

use tracing::debug;

use crate::flows::{self, Session};
use crate::observability::{OPERATION_DURATION_SECONDS, operation_label};

use super::Console;

const MENU: &str = "\n========================================
  Meeting Room Reservation System
========================================
1. Register client
2. Register room
3. Create booking
4. Edit event name
5. Query bookings by date (export)
6. Exit
========================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    RegisterClient,
    RegisterRoom,
    CreateBooking,
    EditEventName,
    QueryByDate,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::RegisterClient),
            "2" => Ok(MenuChoice::RegisterRoom),
            "3" => Ok(MenuChoice::CreateBooking),
            "4" => Ok(MenuChoice::EditEventName),
            "5" => Ok(MenuChoice::QueryByDate),
            "6" => Ok(MenuChoice::Exit),
            _ => Err(()),
        }
    }
}

/// Main menu loop. Returns when the operator confirms exit or input ends.
pub async fn run(session: &Session, console: &mut dyn Console) -> io::Result<()> {
    loop {
        console.write_line(MENU).await?;
        let Some(line) = console.read_line("Select an option: ").await? else {
            return Ok(());
        };
        let Ok(choice) = line.parse::<MenuChoice>() else {
            console.write_line("Invalid option, try again.").await?;
            continue;
        };

        debug!("menu: {choice:?}");
        let started = Instant::now();
        let keep_going = match choice {
            MenuChoice::RegisterClient => {
                flows::register_client(session, console).await?;
                true
            }
            MenuChoice::RegisterRoom => {
                flows::register_room(session, console).await?;
                true
            }
            MenuChoice::CreateBooking => {
                flows::create_booking(session, console).await?;
                true
            }
            MenuChoice::EditEventName => {
                flows::edit_event_name(session, console).await?;
                true
            }
            MenuChoice::QueryByDate => {
                flows::query_by_date(session, console).await?;
                true
            }
            MenuChoice::Exit => !flows::confirm_exit(console).await?,
        };
        metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation_label(choice))
            .record(started.elapsed().as_secs_f64());

        if !keep_going {
            console.write_line("Leaving the system.").await?;
            return Ok(());
        }
    }
}
