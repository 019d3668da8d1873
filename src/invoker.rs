use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::ReportDescriptor;
use crate::client::ApiClient;
use crate::error::{ReportError, Result};
use crate::params::ParamMap;

/// Shared flag a pending request checks before publishing its result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handed out by [`ReportSession::begin`]; redeemed by
/// [`ReportSession::complete`].
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    report: String,
    cancel: CancelToken,
}

impl RequestTicket {
    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading {
        report: String,
    },
    Loaded {
        report: String,
        payload: Value,
    },
    Failed {
        report: String,
        message: String,
    },
}

/// View-model state for one report view. Results for a request that was
/// superseded or closed are dropped instead of overwriting newer state.
#[derive(Debug, Default)]
pub struct ReportSession {
    state: ViewState,
    generation: u64,
    active: Option<CancelToken>,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }

    pub fn begin(&mut self, report: &str) -> RequestTicket {
        if let Some(prev) = self.active.take() {
            prev.cancel();
        }
        self.generation += 1;
        let cancel = CancelToken::new();
        self.active = Some(cancel.clone());
        self.state = ViewState::Loading {
            report: report.to_string(),
        };
        RequestTicket {
            generation: self.generation,
            report: report.to_string(),
            cancel,
        }
    }

    /// Apply a finished request. Returns `false` if the ticket is stale and
    /// the outcome was discarded.
    pub fn complete(&mut self, ticket: RequestTicket, outcome: Result<Value>) -> bool {
        if ticket.generation != self.generation || ticket.cancel.is_cancelled() {
            tracing::debug!(report = %ticket.report, "discarding stale report result");
            return false;
        }
        self.active = None;
        self.state = match outcome {
            Ok(payload) => ViewState::Loaded {
                report: ticket.report,
                payload,
            },
            Err(e) => ViewState::Failed {
                report: ticket.report,
                message: e.to_string(),
            },
        };
        true
    }

    /// Drop the current payload and cancel anything in flight.
    pub fn close(&mut self) {
        if let Some(prev) = self.active.take() {
            prev.cancel();
        }
        self.state = ViewState::Idle;
    }
}

pub struct ReportInvoker<'a> {
    client: &'a ApiClient,
}

impl<'a> ReportInvoker<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn invoke(&self, descriptor: &ReportDescriptor, params: &ParamMap) -> Result<Value> {
        if !descriptor.has_preview {
            return Err(ReportError::NoPreview(descriptor.id.to_string()));
        }
        self.client
            .get_json(descriptor.preview_endpoint, params)
            .map_err(ReportError::Preview)
    }

    /// Run a preview through `session`. Failures land in the session state
    /// rather than being returned.
    pub fn run<'s>(
        &self,
        session: &'s mut ReportSession,
        descriptor: &ReportDescriptor,
        params: &ParamMap,
    ) -> &'s ViewState {
        let ticket = session.begin(descriptor.id);
        let outcome = self.invoke(descriptor, params);
        session.complete(ticket, outcome);
        session.state()
    }
}
