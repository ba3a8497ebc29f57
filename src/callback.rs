#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::Result;

use crate::{error::MissingRequiredResource, registry::CallbackDescriptor};

/// Lifecycle hooks observed around a grading run.
///
/// Every hook defaults to doing nothing, so an implementor only overrides the
/// events it cares about.
pub trait Callback {
    /// Checks that every external resource the graders need is available.
    /// Runs before setup; an error aborts the run with a fatal report.
    fn on_validate_required_resources(&mut self) -> Result<(), MissingRequiredResource> {
        Ok(())
    }

    /// Runs once before any suite.
    fn on_setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs once after the suites, whatever they did.
    fn on_teardown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs before every graded method.
    fn on_before_test(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs after every graded method.
    fn on_after_test(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Broadcasts each lifecycle event to a list of callbacks, in registration
/// order. The first failing member stops the broadcast and its error is
/// returned as is.
#[derive(Default)]
pub struct AutobadgerCallback {
    /// Members, in registration order
    callbacks: Vec<Box<dyn Callback>>,
}

impl AutobadgerCallback {
    /// Wraps already constructed callbacks.
    pub fn new(callbacks: Vec<Box<dyn Callback>>) -> Self {
        Self { callbacks }
    }

    /// Instantiates one member per descriptor.
    pub fn from_descriptors(descriptors: &[&CallbackDescriptor]) -> Self {
        Self::new(descriptors.iter().map(|d| d.instantiate()).collect())
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Calls `hook` on every member in order, stopping at the first error.
    fn broadcast<E>(
        &mut self,
        mut hook: impl FnMut(&mut dyn Callback) -> Result<(), E>,
    ) -> Result<(), E> {
        self.callbacks
            .iter_mut()
            .try_for_each(|cb| hook(cb.as_mut()))
    }
}

impl Callback for AutobadgerCallback {
    fn on_validate_required_resources(&mut self) -> Result<(), MissingRequiredResource> {
        self.broadcast(|cb| cb.on_validate_required_resources())
    }

    fn on_setup(&mut self) -> Result<()> {
        self.broadcast(|cb| cb.on_setup())
    }

    fn on_teardown(&mut self) -> Result<()> {
        self.broadcast(|cb| cb.on_teardown())
    }

    fn on_before_test(&mut self) -> Result<()> {
        self.broadcast(|cb| cb.on_before_test())
    }

    fn on_after_test(&mut self) -> Result<()> {
        self.broadcast(|cb| cb.on_after_test())
    }
}
