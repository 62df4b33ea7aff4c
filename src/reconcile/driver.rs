//! The create / update / no-op state machine.

use super::state::{Desired, Outcome, State};
use crate::cli::CommandResult;
use crate::error::{Error, Result};
use crate::value::Value;
use tracing::{info, warn};

/// Reconcile is implemented once per resource kind.
///
/// `fetch` must run before any other method: it loads the live object and
/// decides what `exists` reports. Every mutating method returns the tool
/// output to report and fails on a non-zero exit. `needs_update` is called
/// again after every write to confirm the result.
pub trait Reconcile {
    /// Names the resource in logs, as `kind/name`.
    fn describe(&self) -> String;

    /// Loads the live state. An object that is not found is not an error:
    /// `exists` then returns false and the returned results are empty.
    fn fetch(&mut self) -> Result<Value>;

    fn exists(&self) -> bool;

    fn create(&mut self) -> Result<Value>;

    /// Compares the desired definition with the fetched one.
    fn needs_update(&mut self) -> Result<bool>;

    /// Brings the fetched object in line. Returns `None` when there was
    /// nothing to write.
    fn update(&mut self) -> Result<Option<Value>>;

    fn delete(&mut self) -> Result<Value>;
}

/// Driver walks a [`Reconcile`] to the desired state.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    check_mode: bool,
    force: bool,
    state: State,
}

impl Driver {
    pub fn new() -> Self {
        Driver::default()
    }

    /// In check mode mutations are reported, not performed.
    pub fn check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Updates present objects even when no drift is found.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Returns the last state reached.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn run<R: Reconcile + ?Sized>(&mut self, resource: &mut R, desired: Desired) -> Result<Outcome> {
        match desired {
            Desired::Present => self.ensure_present(resource),
            Desired::Absent => self.ensure_absent(resource),
            Desired::List => self.list(resource),
        }
    }

    /// Reports the live state without comparing it.
    pub fn list<R: Reconcile + ?Sized>(&mut self, resource: &mut R) -> Result<Outcome> {
        let results = self.fetch(resource)?;
        Ok(Outcome::unchanged(self.state, results))
    }

    pub fn ensure_present<R: Reconcile + ?Sized>(&mut self, resource: &mut R) -> Result<Outcome> {
        let results = self.fetch(resource)?;

        if !resource.exists() {
            if self.check_mode {
                return Ok(Outcome::would(self.state, "a create"));
            }
            info!(resource = %resource.describe(), "creating");
            resource.create()?;
            let results = self.verify(resource)?;
            return Ok(Outcome::changed(self.state, results));
        }

        let drifted = resource.needs_update()?;
        if !drifted && !self.force {
            self.transition(resource, State::PresentMatching);
            return Ok(Outcome::unchanged(self.state, results));
        }
        let next = if drifted {
            State::PresentDrifted
        } else {
            State::PresentMatching
        };
        self.transition(resource, next);

        if self.check_mode {
            return Ok(Outcome::would(self.state, "an update"));
        }
        info!(resource = %resource.describe(), "updating");
        if resource.update()?.is_none() {
            warn!(resource = %resource.describe(), "no edit applies to the live object");
            return Ok(Outcome::unchanged(self.state, results));
        }
        let results = self.verify(resource)?;
        Ok(Outcome::changed(self.state, results))
    }

    pub fn ensure_absent<R: Reconcile + ?Sized>(&mut self, resource: &mut R) -> Result<Outcome> {
        let results = self.fetch(resource)?;

        if !resource.exists() {
            return Ok(Outcome::unchanged(self.state, results));
        }
        if self.check_mode {
            return Ok(Outcome::would(self.state, "a delete"));
        }
        info!(resource = %resource.describe(), "deleting");
        let results = resource.delete()?;
        self.transition(resource, State::Absent);
        Ok(Outcome::changed(self.state, results))
    }

    fn fetch<R: Reconcile + ?Sized>(&mut self, resource: &mut R) -> Result<Value> {
        let results = resource.fetch()?;
        let next = if resource.exists() {
            State::Unknown
        } else {
            State::Absent
        };
        self.transition(resource, next);
        Ok(results)
    }

    /// Fetches again after a write. The object must be there, and it only
    /// counts as matching when the comparison finds no drift left.
    fn verify<R: Reconcile + ?Sized>(&mut self, resource: &mut R) -> Result<Value> {
        let results = resource.fetch()?;
        if !resource.exists() {
            return Err(Error::Vanished(resource.describe()));
        }
        let next = if resource.needs_update()? {
            warn!(resource = %resource.describe(), "still drifted after the write");
            State::PresentDrifted
        } else {
            State::PresentMatching
        };
        self.transition(resource, next);
        Ok(results)
    }

    fn transition<R: Reconcile + ?Sized>(&mut self, resource: &R, next: State) {
        if self.state != next {
            info!(resource = %resource.describe(), from = %self.state, to = %next, "state");
            self.state = next;
        }
    }
}

/// Accepts a failed delete whose object is already gone.
pub fn absorb_not_found(result: CommandResult) -> Result<CommandResult> {
    if result.is_not_found() {
        warn!(cmd = %result.cmd, "already absent");
        return Ok(result);
    }
    result.check()
}
