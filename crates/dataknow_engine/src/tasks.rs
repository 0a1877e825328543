use std::collections::HashMap;
use std::hash::Hash;

use tokio::task::JoinHandle;
use tokio_util::task::AbortOnDropHandle;

/// Spawned tasks keyed by what they drive. Dropping an entry aborts its task.
pub struct TaskSet<K> {
    tasks: HashMap<K, AbortOnDropHandle<()>>,
}

impl<K: Eq + Hash> Default for TaskSet<K> {
    fn default() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> TaskSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `handle` under `key`, aborting whatever task held the key before.
    pub fn insert(&mut self, key: K, handle: JoinHandle<()>) {
        self.tasks.retain(|_, task| !task.is_finished());
        self.tasks.insert(key, AbortOnDropHandle::new(handle));
    }

    /// Aborts the task under `key`. Returns whether it was still running.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.tasks.remove(key) {
            Some(task) => !task.is_finished(),
            None => false,
        }
    }

    /// Aborts every task whose key matches `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|key, _| !predicate(key));
        before - self.tasks.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let running = self.running();
        self.tasks.clear();
        running
    }

    pub fn running(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }

    pub fn is_running(&self, key: &K) -> bool {
        self.tasks.get(key).is_some_and(|task| !task.is_finished())
    }
}
