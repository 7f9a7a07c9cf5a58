//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which runs work on background threads and hands the results back to the main thread.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread
//! 5. The result fills the model library

use crate::engine_state::assets::ModelLibrary;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks own all the data they need. They never touch main-thread state.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Errors are carried inside the result rather than returned, so that every
    /// task yields exactly one result.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`, applied on the main thread.
pub trait TaskResult: Send {
    /// Applies the result.
    ///
    /// # Arguments
    /// * `library` - Library receiving loaded models and failures
    fn handle_result(self: Box<Self>, library: &mut ModelLibrary);
}
