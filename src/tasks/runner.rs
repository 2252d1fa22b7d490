// ============================================
// Task Runner - Запуск фоновых задач генерации
// ============================================

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Задача для фонового выполнения
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Исполнитель задач: куда уходят генерация высот и мешинг
pub trait TaskRunner: Send + Sync {
    fn spawn(&self, job: Job);

    /// Имя для логов
    fn name(&self) -> &str;
}

/// Пул потоков rayon - основной исполнитель
pub struct RayonTaskRunner {
    pool: ThreadPool,
}

impl RayonTaskRunner {
    /// num_threads = 0 -> по числу ядер
    pub fn new(num_threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("terrain-worker-{}", i))
            .build()?;

        log::info!("Terrain worker pool started: {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl TaskRunner for RayonTaskRunner {
    fn spawn(&self, job: Job) {
        self.pool.spawn(job);
    }

    fn name(&self) -> &str {
        "rayon"
    }
}

/// Выполняет задачу сразу в вызывающем потоке.
/// Детерминированный порядок - для тестов и утилит.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineTaskRunner;

impl TaskRunner for InlineTaskRunner {
    fn spawn(&self, job: Job) {
        job();
    }

    fn name(&self) -> &str {
        "inline"
    }
}
