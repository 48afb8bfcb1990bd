//! The tracked session value and its presentation view.

use chrono::{DateTime, Utc};
use common::{Generation, SessionId};

use catalog::{self, OrderVariant, StepDefinition, StepId};

use crate::status::{SagaStatus, SessionStatus};

/// One recorded wire-status change, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// When the change was observed.
    pub at: DateTime<Utc>,
    /// The wire status reported.
    pub status: SagaStatus,
    /// The step reported as executing at that moment.
    pub current_step: Option<StepId>,
}

/// One tracked transaction.
///
/// A session is created at submission time and mutated only by the
/// reconciler in response to poll results or cancellation intents.
/// `completed_steps` never shrinks; `revealed_steps` is the subset the
/// view has finished animating and grows one element at a time.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) variant: OrderVariant,
    pub(crate) generation: Generation,
    pub(crate) status: SessionStatus,
    pub(crate) reported_status: Option<SagaStatus>,
    pub(crate) current_step: Option<StepId>,
    pub(crate) completed_steps: Vec<StepId>,
    pub(crate) revealed_steps: Vec<StepId>,
    pub(crate) failure_reason: Option<String>,
    pub(crate) cancel_in_flight: bool,
    /// Derived once on compensation entry, immutable thereafter.
    pub(crate) compensation_plan: Option<&'static [StepDefinition]>,
    pub(crate) history: Vec<StatusChange>,
}

impl Session {
    /// Creates a freshly submitted session.
    pub(crate) fn new(id: SessionId, variant: OrderVariant, generation: Generation) -> Self {
        Self {
            id,
            variant,
            generation,
            status: SessionStatus::Submitting,
            reported_status: None,
            current_step: None,
            completed_steps: Vec::new(),
            revealed_steps: Vec::new(),
            failure_reason: None,
            cancel_in_flight: false,
            compensation_plan: None,
            history: Vec::new(),
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the order variant.
    pub fn variant(&self) -> OrderVariant {
        self.variant
    }

    /// Returns the generation this session was created under.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns the local session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the last wire status the backend reported.
    pub fn reported_status(&self) -> Option<SagaStatus> {
        self.reported_status
    }

    /// Returns the step reported as presently executing.
    pub fn current_step(&self) -> Option<StepId> {
        self.current_step
    }

    /// Returns the steps the backend has confirmed done, in observation
    /// order.
    pub fn completed_steps(&self) -> &[StepId] {
        &self.completed_steps
    }

    /// Returns the completed steps the view has finished animating.
    pub fn revealed_steps(&self) -> &[StepId] {
        &self.revealed_steps
    }

    /// Returns the failure reason, set only for failed sessions.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns true while a cancellation request is awaiting its outcome.
    pub fn cancel_in_flight(&self) -> bool {
        self.cancel_in_flight
    }

    /// Returns the derived compensation plan, if compensation has begun.
    pub fn compensation_plan(&self) -> Option<&'static [StepDefinition]> {
        self.compensation_plan
    }

    /// Returns the recorded wire-status changes.
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Returns the step catalog currently driving the view: the forward
    /// flow for the variant, or the derived compensation plan once the
    /// session is on the compensation track.
    pub fn active_catalog(&self) -> &'static [StepDefinition] {
        if self.status.is_compensation_track() {
            self.compensation_plan
                .unwrap_or_else(catalog::compensation_steps)
        } else {
            catalog::forward_steps(self.variant)
        }
    }

    /// Returns true if a cancellation intent would currently be accepted.
    pub fn can_cancel(&self) -> bool {
        self.status.can_request_cancel()
            && self.reported_status.is_some_and(|s| s.is_cancelable())
            && !self.cancel_in_flight
    }

    pub(crate) fn merge_completed(&mut self, steps: &[StepId]) {
        for step in steps {
            if !self.completed_steps.contains(step) {
                self.completed_steps.push(*step);
            }
        }
    }

    pub(crate) fn reveal(&mut self, step: StepId) {
        if !self.revealed_steps.contains(&step) {
            self.revealed_steps.push(step);
        }
    }

    pub(crate) fn record_status(&mut self, status: SagaStatus, current_step: Option<StepId>) {
        if self.history.last().map(|c| c.status) != Some(status) {
            self.history.push(StatusChange {
                at: Utc::now(),
                status,
                current_step,
            });
        }
    }

    /// Builds the presentation-boundary view of this session.
    pub fn view(&self) -> SessionView {
        let steps = self
            .active_catalog()
            .iter()
            .map(|def| StepView {
                id: def.id,
                display_name: def.display_name,
                revealed: self.revealed_steps.contains(&def.id),
                active: self.current_step == Some(def.id),
            })
            .collect();

        SessionView {
            session_id: self.id,
            variant: self.variant,
            status: self.status,
            reported_status: self.reported_status,
            steps,
            can_cancel: self.can_cancel(),
            cancel_in_flight: self.cancel_in_flight,
            failure_reason: self.failure_reason.clone(),
        }
    }
}

/// One row of the progress view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    /// The step identifier.
    pub id: StepId,
    /// Human-readable step name.
    pub display_name: &'static str,
    /// True once the reveal animation has acknowledged the step.
    pub revealed: bool,
    /// True if the backend reports this step as presently executing.
    pub active: bool,
}

/// What the presentation layer sees: the active catalog with per-step
/// reveal state plus cancel availability.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// The session this view describes.
    pub session_id: SessionId,
    /// The order variant.
    pub variant: OrderVariant,
    /// Local session status.
    pub status: SessionStatus,
    /// Last reported wire status.
    pub reported_status: Option<SagaStatus>,
    /// Ordered rows for the active catalog.
    pub steps: Vec<StepView>,
    /// True if a cancellation intent would currently be accepted.
    pub can_cancel: bool,
    /// True while a cancellation request is awaiting its outcome.
    pub cancel_in_flight: bool,
    /// Failure reason for failed sessions.
    pub failure_reason: Option<String>,
}

impl SessionView {
    /// Returns the rows that have been revealed so far.
    pub fn revealed(&self) -> impl Iterator<Item = &StepView> {
        self.steps.iter().filter(|s| s.revealed)
    }
}
