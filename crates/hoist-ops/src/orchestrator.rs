//! The per-unit deploy state machine.
//!
//! Units move `Pending -> Skipped | Deployed | Deferred`. In deferred mode the
//! collected records are grouped by the publisher's batch key and flushed in
//! one pass once every participating unit has reported a state.

use indexmap::IndexMap;

use hoist_core::artifact::Coordinates;
use hoist_core::config::{DeploySettings, SkipPolicy};
use hoist_core::destination::{Destination, DestinationOverrides};
use hoist_core::unit::BuildUnit;
use hoist_util::errors::HoistError;

use crate::collect::collect_unit;
use crate::publisher::{PublishOutcome, Publisher, PushRequest};

/// Terminal (or waiting) state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Skipped,
    Deployed,
    Deferred,
}

/// Deploy behaviour that does not depend on where artifacts go.
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub skip: SkipPolicy,
    pub deploy_at_end: bool,
    pub allow_incomplete: bool,
    pub offline: bool,
    pub overrides: DestinationOverrides,
    /// Sends every unit here instead of resolving a destination per unit.
    pub destination: Option<Destination>,
}

impl DeployOptions {
    /// Fails on malformed override strings before anything touches the disk.
    pub fn from_settings(settings: &DeploySettings) -> Result<Self, HoistError> {
        Ok(Self {
            skip: settings.skip,
            deploy_at_end: settings.deploy_at_end,
            allow_incomplete: settings.allow_incomplete_projects,
            offline: settings.offline,
            overrides: settings.overrides()?,
            destination: None,
        })
    }
}

/// Final unit states plus everything the publisher reported.
#[derive(Debug, Clone, Default)]
pub struct DeploySummary {
    pub states: IndexMap<Coordinates, UnitState>,
    pub outcomes: Vec<PublishOutcome>,
}

impl DeploySummary {
    pub fn count(&self, state: UnitState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn files(&self) -> usize {
        self.outcomes.iter().map(|o| o.files).sum()
    }
}

/// Drives units through the state machine against one publisher.
pub struct Orchestrator {
    options: DeployOptions,
    publisher: Box<dyn Publisher>,
    states: IndexMap<Coordinates, UnitState>,
    pending: IndexMap<String, PushRequest>,
    outcomes: Vec<PublishOutcome>,
}

impl Orchestrator {
    pub fn new(options: DeployOptions, publisher: Box<dyn Publisher>) -> Self {
        Self {
            options,
            publisher,
            states: IndexMap::new(),
            pending: IndexMap::new(),
            outcomes: Vec::new(),
        }
    }

    /// Process every participating unit in order.
    ///
    /// The first error aborts the run; deferred requests are then dropped
    /// without being published.
    pub async fn run(mut self, units: &[BuildUnit]) -> miette::Result<DeploySummary> {
        let participants: Vec<&BuildUnit> = units.iter().filter(|u| u.participates).collect();
        tracing::debug!(
            "Deploying {} of {} units with the {} publisher",
            participants.len(),
            units.len(),
            self.publisher.name()
        );

        for (index, unit) in participants.iter().enumerate() {
            let state = self.process(unit).await?;
            self.states.insert(unit.coordinates.clone(), state);

            let complete = index + 1 == participants.len();
            if state == UnitState::Deferred && !complete {
                tracing::info!("Deferring deploy for {} at end", unit.coordinates);
            }
            if complete && !self.pending.is_empty() {
                self.flush().await?;
            }
        }

        Ok(DeploySummary {
            states: self.states,
            outcomes: self.outcomes,
        })
    }

    async fn process(&mut self, unit: &BuildUnit) -> miette::Result<UnitState> {
        let policy = unit.skip.unwrap_or(self.options.skip);
        if policy.skips(&unit.coordinates.version) {
            tracing::info!("Skipping artifact deployment for {}", unit.coordinates);
            return Ok(UnitState::Skipped);
        }

        if self.options.offline && self.publisher.needs_network() {
            return Err(HoistError::Offline.into());
        }

        let destination = match &self.options.destination {
            Some(fixed) => fixed.clone(),
            None => self
                .options
                .overrides
                .resolve(&unit.coordinates, unit.distribution_repository.as_ref())?,
        };

        if self.options.deploy_at_end {
            let key = self.publisher.batch_key(&destination)?;
            let records = collect_unit(unit, self.options.allow_incomplete)?;
            self.pending
                .entry(key)
                .or_insert_with(|| PushRequest::new(destination))
                .records
                .extend(records);
            return Ok(UnitState::Deferred);
        }

        let records = collect_unit(unit, self.options.allow_incomplete)?;
        let request = PushRequest::with_records(destination, records);
        tracing::info!(
            "Deploying {} ({} files) to {}",
            unit.coordinates,
            request.len(),
            request.destination
        );
        let outcome = self.publisher.publish(&request).await?;
        self.outcomes.push(outcome);
        Ok(UnitState::Deployed)
    }

    async fn flush(&mut self) -> miette::Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for request in pending.into_values() {
            tracing::info!(
                "Deploying {} deferred artifacts to {}",
                request.len(),
                request.destination
            );
            let outcome = self.publisher.publish(&request).await?;
            self.outcomes.push(outcome);
        }
        for state in self.states.values_mut() {
            if *state == UnitState::Deferred {
                *state = UnitState::Deployed;
            }
        }
        Ok(())
    }
}
