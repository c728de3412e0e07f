//! Interactive operations behind the menu. Each flow prompts through a
//! [`Console`], re-prompts on recoverable input errors, and reports every
//! other outcome to the operator before returning.

mod booking;
mod registry;
mod reports;

pub use booking::{BookingOutcome, create_booking};
pub use registry::{register_client, register_room};
pub use reports::{edit_event_name, query_by_date};

use std::io;

use crate::clock::Clock;
use crate::console::{Console, Selection, parse_yes_no, prompt_until};
use tracing::{debug, info, warn};

use crate::engine::{Engine, EngineError};
use crate::export::Exporter;

/// What every flow needs: the store, the export target and today's date.
pub struct Session {
    pub engine: Engine,
    pub exporter: Exporter,
    clock: Box<dyn Clock>,
}

impl Session {
    pub fn new(engine: Engine, exporter: Exporter, clock: Box<dyn Clock>) -> Self {
        Self {
            engine,
            exporter,
            clock,
        }
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Run the menu until the operator leaves or `shutdown` resolves, then
    /// close the store. A pending read on `console` is abandoned on shutdown.
    pub async fn run_until(
        self,
        console: &mut dyn Console,
        shutdown: impl Future<Output = ()>,
    ) -> Result<SessionEnd, Box<dyn std::error::Error>> {
        let (result, end) = tokio::select! {
            r = crate::console::run(&self, console) => (r, SessionEnd::Finished),
            () = shutdown => {
                info!("interrupt received, closing");
                (Ok(()), SessionEnd::Interrupted)
            }
        };
        self.into_engine().close().await?;
        result?;
        Ok(end)
    }
}

/// How [`Session::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    Interrupted,
}

/// Ask until the operator answers Y or N. End of input counts as yes.
pub async fn confirm_exit(console: &mut dyn Console) -> io::Result<bool> {
    let answer = prompt_until(
        console,
        "Are you sure you want to exit? (Y/N): ",
        parse_yes_no,
    )
    .await?;
    Ok(match answer {
        Selection::Selected(yes) => yes,
        Selection::Cancelled => true,
    })
}

/// Show a failed operation to the operator. Failures a retry at the prompt
/// cannot fix are logged as warnings.
async fn report_error(console: &mut dyn Console, error: &EngineError) -> io::Result<()> {
    if error.is_recoverable() {
        debug!("operation rejected: {error}");
    } else {
        warn!("operation failed: {error}");
    }
    console.write_line(&format!("Error: {error}")).await
}
