//! Deferred work returned from `Player::update`
//!
//! A `Task` is a bag of boxed futures, each resolving to one message that the
//! runtime feeds back into `update`. The player never awaits anything itself.

use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

/// Zero or more futures that each produce a message
#[must_use = "a Task does nothing unless handed to the runtime"]
pub struct Task<T> {
    futures: Vec<BoxFuture<'static, T>>,
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

impl<T: Send + 'static> Task<T> {
    /// A task that does nothing
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// A task that immediately yields `value`
    pub fn done(value: T) -> Self {
        Self {
            futures: vec![future::ready(value).boxed()],
        }
    }

    /// Run `fut` and map its output into a message
    pub fn perform<F, O>(fut: F, map: impl FnOnce(O) -> T + Send + 'static) -> Self
    where
        F: Future<Output = O> + Send + 'static,
        O: Send + 'static,
    {
        Self {
            futures: vec![fut.map(map).boxed()],
        }
    }

    /// Combine several tasks into one
    pub fn batch(tasks: impl IntoIterator<Item = Task<T>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    /// Hand the individual futures to an executor
    pub fn into_futures(self) -> Vec<BoxFuture<'static, T>> {
        self.futures
    }

    /// Await every future concurrently and collect the messages in order
    pub async fn collect(self) -> Vec<T> {
        future::join_all(self.futures).await
    }
}

impl<T: Send + 'static> Default for Task<T> {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_flattens() {
        let task = Task::batch([Task::done(1), Task::none(), Task::perform(async { 2 }, |n| n * 10)]);
        assert_eq!(task.len(), 2);
        assert_eq!(task.collect().await, vec![1, 20]);
    }

    #[test]
    fn test_none_is_empty() {
        let task: Task<u8> = Task::none();
        assert!(task.is_none());
        assert!(task.into_futures().is_empty());
    }
}
