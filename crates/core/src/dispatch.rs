//! Entry-point orchestration: parse → locate → (stage + notify | launch).

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::correlation::CorrelationId;
use crate::error::{HandoffError, HandoffResult};
use crate::launch::Launcher;
use crate::locator::{InstanceHandle, InstanceLocator, WindowSystem};
use crate::notifier::Notifier;
use crate::staging::PayloadStaging;
use crate::uri::Uri;

/// How a URI reached the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// Staged and acknowledged by an already running instance.
    Delivered {
        target: InstanceHandle,
        id: CorrelationId,
    },
    /// No instance was running; a new one was started with the URI.
    Launched,
}

/// The Start state: exactly one argument, and it must be a URI.
pub fn parse_args(program: &str, args: &[String]) -> HandoffResult<Uri> {
    let [raw] = args else {
        return Err(HandoffError::Usage {
            program: program.to_string(),
            given: args.len(),
        });
    };
    Ok(Uri::parse(raw)?)
}

pub struct Dispatcher<W, N, L> {
    program: String,
    class_identity: String,
    locator: InstanceLocator<W>,
    staging: PayloadStaging,
    notifier: N,
    launcher: L,
    orphan_ttl: Option<Duration>,
}

impl<W, N, L> Dispatcher<W, N, L>
where
    W: WindowSystem,
    N: Notifier,
    L: Launcher,
{
    pub fn new(
        class_identity: impl Into<String>,
        locator: InstanceLocator<W>,
        staging: PayloadStaging,
        notifier: N,
        launcher: L,
    ) -> Self {
        Self {
            program: "uri-handoff".to_string(),
            class_identity: class_identity.into(),
            locator,
            staging,
            notifier,
            launcher,
            orphan_ttl: None,
        }
    }

    /// Name shown in usage messages.
    pub fn with_program_name(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sweep unconsumed payloads older than `ttl` before staging a new one.
    pub fn with_orphan_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.orphan_ttl = ttl;
        self
    }

    /// Validate the positional arguments and hand off the single URI.
    ///
    /// Arity and syntax errors return before anything is located, staged,
    /// signalled or launched.
    pub fn dispatch_args(&self, args: &[String]) -> HandoffResult<Handoff> {
        let uri = parse_args(&self.program, args)?;
        self.dispatch(&uri)
    }

    pub fn dispatch(&self, uri: &Uri) -> HandoffResult<Handoff> {
        match self.locator.locate(&self.class_identity) {
            Some(target) => self.hand_off(target, uri),
            None => {
                debug!(class = %self.class_identity, "no running instance, launching");
                self.launcher.launch_new(uri)?;
                Ok(Handoff::Launched)
            }
        }
    }

    // Stage first, then signal. A failed signal is reported as-is; launching
    // here would start a second instance next to an unresponsive one.
    fn hand_off(&self, target: InstanceHandle, uri: &Uri) -> HandoffResult<Handoff> {
        if let Some(ttl) = self.orphan_ttl {
            if let Err(err) = self.staging.sweep(ttl) {
                warn!(dir = %self.staging.dir().display(), error = %err, "orphan sweep failed");
            }
        }

        let id = CorrelationId::generate();
        self.staging
            .stage(id, uri)
            .map_err(|source| HandoffError::Staging {
                path: self.staging.path_for(id),
                source,
            })?;

        self.notifier.notify(target, id)?;
        info!(window = target.as_raw(), id = %id, "URI handed to running instance");
        Ok(Handoff::Delivered { target, id })
    }
}
