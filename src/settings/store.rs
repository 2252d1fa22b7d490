// ============================================
// Settings Store - Текущие настройки + версия
// ============================================
//
// Редактор/инструменты меняют настройки, стример сверяет версию раз в тик.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::config::{ConfigError, TerrainConfig};

pub struct SettingsStore {
    config: RwLock<Arc<TerrainConfig>>,
    version: AtomicU64,
}

impl SettingsStore {
    /// Настройки проверяются здесь: в хранилище лежит только валидный конфиг
    pub fn new(config: TerrainConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            version: AtomicU64::new(0),
        })
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Текущая версия и снимок настроек
    pub fn snapshot(&self) -> (u64, Arc<TerrainConfig>) {
        let config = self.config.read();
        (self.version(), config.clone())
    }

    pub fn config(&self) -> Arc<TerrainConfig> {
        self.config.read().clone()
    }

    /// Заменить настройки; новая версия после проверки
    pub fn update(&self, config: TerrainConfig) -> Result<u64, ConfigError> {
        let config = config.validate()?;
        let mut current = self.config.write();
        *current = Arc::new(config);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        log::info!("Terrain settings updated (version {})", version);
        Ok(version)
    }

    /// Изменить копию текущих настроек
    pub fn modify<F>(&self, f: F) -> Result<u64, ConfigError>
    where
        F: FnOnce(&mut TerrainConfig),
    {
        let mut config = (*self.config()).clone();
        f(&mut config);
        self.update(config)
    }
}
