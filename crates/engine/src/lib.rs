pub mod clock;
pub mod monitor;
pub mod sources;
pub mod supervisor;
pub mod twelvedata;

pub use clock::{Clock, SystemClock};
pub use monitor::{CycleOutcome, Monitor, MonitorDeps, MonitorSettings, MonitorState};
pub use sources::{load_instruments, StatusFile};
pub use supervisor::Supervisor;
pub use twelvedata::TwelveDataClient;
