use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument as _};

use common::Instrument;

use crate::monitor::{Monitor, MonitorDeps, MonitorSettings};

/// Starts one independent monitor task per instrument.
///
/// The tasks share only the read-only collaborators in [`MonitorDeps`]; each
/// owns its own signal state and never talks to the others.
pub struct Supervisor {
    deps: MonitorDeps,
    settings: MonitorSettings,
    tz: Tz,
}

impl Supervisor {
    pub fn new(deps: MonitorDeps, settings: MonitorSettings, tz: Tz) -> Self {
        Self { deps, settings, tz }
    }

    /// Spawn the monitor tasks. They run until the process exits.
    pub fn spawn(&self, instruments: &[Instrument]) -> Vec<JoinHandle<()>> {
        let handles: Vec<_> = instruments
            .iter()
            .map(|instrument| {
                let span = info_span!("monitor", instrument = %instrument);
                let monitor = Monitor::new(
                    instrument.clone(),
                    self.deps.clone(),
                    self.settings,
                    self.tz,
                );
                tokio::spawn(monitor.run().instrument(span))
            })
            .collect();

        info!(tasks = handles.len(), "Monitor tasks spawned");
        handles
    }
}
