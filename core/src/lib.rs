//! Probing engine: session establishment, the MS17-010 oracle and named
//! pipe bind enumeration, driven one target at a time.

pub mod catalog;
pub mod connection;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod pipes;
pub mod report;
pub mod session;

pub use engine::{BatchSummary, Engine, ProbeOutcome, TargetReport};
pub use error::ProbeError;
pub use pipes::PipeOutcome;
pub use report::{ProbeEvent, Reporter};
pub use session::{Connector, SmbSession};
