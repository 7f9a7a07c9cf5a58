//! # Task Management System
//!
//! A small worker-thread pool for work that should not block the event loop, which
//! in this crate means reading and parsing model files.
//!
//! ## Architecture Overview
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, applied on the main thread
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are applied on the main thread in `process_completed_tasks()`
//!
//! Dropping the manager closes every channel. Workers finish the task they are on,
//! fail to send its result and exit; nothing waits for them.

pub mod task;

use log::{info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

use super::assets::ModelLibrary;

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// A worker that cannot be spawned is skipped with a warning. With no workers at
    /// all, published tasks stay queued.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    pub fn new(num_workers: usize) -> Self {
        info!(
            "Available parallelism: {:?}, starting {} workers",
            thread::available_parallelism(),
            num_workers
        );

        let mut channels = Vec::with_capacity(num_workers);
        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(error) => warn!("Failed to spawn worker {index}: {error}"),
            }
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker has gone away, handing the task back
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&index| self.channels[index].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Sends queued tasks to free workers, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // worker disconnected
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Applies every result the workers have produced so far.
    ///
    /// # Arguments
    /// * `library` - Library the results are applied to
    ///
    /// # Returns
    /// The number of results applied
    pub fn process_completed_tasks(&mut self, library: &mut ModelLibrary) -> usize {
        let mut handled = 0;
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                handled += 1;
                result.handle_result(library);
            }
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_kind::BlockKind;
    use std::time::{Duration, Instant};

    struct FailingLoad(BlockKind);

    struct FailedLoad(BlockKind);

    impl Task for FailingLoad {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(FailedLoad(self.0))
        }
    }

    impl TaskResult for FailedLoad {
        fn handle_result(self: Box<Self>, library: &mut ModelLibrary) {
            library.record_failure(self.0, "missing".to_string());
        }
    }

    #[test]
    fn queued_tasks_run_once_a_worker_frees_up() {
        let mut manager = TaskManager::new(1);
        assert!(manager.publish_task(Box::new(FailingLoad(BlockKind::Lava))));
        assert!(!manager.publish_task(Box::new(FailingLoad(BlockKind::Ghast))));

        let mut library = ModelLibrary::default();
        let started = Instant::now();
        let mut handled = 0;
        while handled < 2 && started.elapsed() < Duration::from_secs(10) {
            handled += manager.process_completed_tasks(&mut library);
            manager.process_queued_tasks();
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(handled, 2);
        assert_eq!(library.resolved(), 2);
    }
}
