use crate::metrics;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::task::Task;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    aborted: bool,
    total_pushed: u64,
    total_popped: u64,
}

/// Unbounded FIFO of routing tasks
///
/// Any number of producers may push; a single consumer blocks in
/// [`TaskQueue::pop_blocking`] until a task arrives or the queue is aborted.
/// Once aborted, the queue refuses new tasks and never hands out another one.
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            available: Condvar::new(),
        }
    }

    /// Enqueue a task and wake the consumer
    pub fn push(&self, task: Task) -> QueueResult<()> {
        let depth = {
            let mut state = self.state.lock();
            if state.aborted {
                return Err(QueueError::Aborted);
            }
            state.tasks.push_back(task);
            state.total_pushed += 1;
            state.tasks.len()
        };

        metrics::set_queue_depth(depth);
        self.available.notify_one();
        Ok(())
    }

    /// Block until a task is available or the queue is aborted
    pub fn pop_blocking(&self) -> QueueResult<Task> {
        let mut state = self.state.lock();
        loop {
            if state.aborted {
                return Err(QueueError::Aborted);
            }
            if let Some(task) = Self::take(&mut state) {
                return Ok(task);
            }
            self.available.wait(&mut state);
        }
    }

    /// Remove and return every pending task
    pub fn drain(&self) -> Vec<Task> {
        let mut state = self.state.lock();
        let drained: Vec<Task> = state.tasks.drain(..).collect();
        state.total_popped += drained.len() as u64;
        metrics::set_queue_depth(0);
        drained
    }

    /// Wake every blocked consumer and close the queue
    pub fn abort(&self) {
        self.state.lock().aborted = true;
        self.available.notify_all();
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            pending: state.tasks.len(),
            total_pushed: state.total_pushed,
            total_popped: state.total_popped,
            aborted: state.aborted,
        }
    }

    fn take(state: &mut QueueState) -> Option<Task> {
        let task = state.tasks.pop_front()?;
        state.total_popped += 1;
        metrics::set_queue_depth(state.tasks.len());
        Some(task)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub total_pushed: u64,
    pub total_popped: u64,
    pub aborted: bool,
}
