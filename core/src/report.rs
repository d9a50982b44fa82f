use crate::pipes::PipeOutcome;

/// Progress of a batch, emitted as it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Connecting { target: String },
    ServerOs { target: String, os: String },
    LoginFailed { target: String, reason: String },
    ConnectionFailed { target: String, reason: String },
    Patched { target: String },
    NotPatched { target: String },
    Pipe {
        target: String,
        pipe: &'static str,
        outcome: PipeOutcome,
    },
    Interrupted { target: String },
}

impl ProbeEvent {
    pub fn target(&self) -> &str {
        match self {
            Self::Connecting { target }
            | Self::ServerOs { target, .. }
            | Self::LoginFailed { target, .. }
            | Self::ConnectionFailed { target, .. }
            | Self::Patched { target }
            | Self::NotPatched { target }
            | Self::Pipe { target, .. }
            | Self::Interrupted { target } => target,
        }
    }
}

/// Receives every [`ProbeEvent`] of a batch in order.
pub trait Reporter: Send {
    fn report(&mut self, event: ProbeEvent);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: ProbeEvent) {
        (**self).report(event);
    }
}
