// ============================================
// Tasks Module - Фоновые задачи и очередь завершений
// ============================================

mod queue;
mod runner;

pub use queue::{CompletionQueue, WorkQueue};
pub use runner::{InlineTaskRunner, Job, RayonTaskRunner, TaskRunner};
