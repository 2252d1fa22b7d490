// ============================================
// Completion Queue - Очередь готовых результатов
// ============================================
//
// Воркеры кладут сообщения, главный поток забирает их раз в тик.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::runner::TaskRunner;

/// Потокобезопасная FIFO очередь сообщений о завершении
pub struct CompletionQueue<M> {
    inner: Arc<Mutex<VecDeque<M>>>,
}

impl<M> Clone for CompletionQueue<M> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<M> Default for CompletionQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> CompletionQueue<M> {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(VecDeque::new())) }
    }

    pub fn push(&self, message: M) {
        self.inner.lock().push_back(message);
    }

    /// Забрать всё, что лежит в очереди на момент вызова.
    /// Сообщения, пришедшие позже, останутся до следующего drain.
    pub fn drain(&self) -> VecDeque<M> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Отправка работы в TaskRunner с доставкой результата в CompletionQueue
pub struct WorkQueue<M> {
    runner: Arc<dyn TaskRunner>,
    completions: CompletionQueue<M>,
    in_flight: Arc<AtomicUsize>,
}

impl<M: Send + 'static> WorkQueue<M> {
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            runner,
            completions: CompletionQueue::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Выполнить work в фоне, результат попадёт в очередь завершений
    pub fn submit<F>(&self, work: F)
    where
        F: FnOnce() -> M + Send + 'static,
    {
        let completions = self.completions.clone();
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);

        self.runner.spawn(Box::new(move || {
            let message = work();
            completions.push(message);
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }));
    }

    pub fn drain(&self) -> VecDeque<M> {
        self.completions.drain()
    }

    /// Задачи, которые ещё не положили результат
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Результаты, ждущие следующего drain
    pub fn ready(&self) -> usize {
        self.completions.len()
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }
}
