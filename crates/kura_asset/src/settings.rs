use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{PhysicalIO, Worker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// 0 uses one thread per logical CPU
    pub threads: usize,
    pub thread_name: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            threads: 0,
            thread_name: "kura-worker".to_owned(),
        }
    }
}

impl WorkerSettings {
    pub fn single_threaded() -> Self {
        Self {
            threads: 1,
            ..Default::default()
        }
    }
    pub fn build(&self) -> anyhow::Result<Worker> {
        Worker::new(self.threads, &self.thread_name)
    }
}

/// Library configuration, usually read from a YAML file:
///
/// ```yaml
/// root: assets
/// worker:
///   threads: 4
///   thread_name: kura-worker
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub root: PathBuf,
    pub worker: WorkerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            worker: Default::default(),
        }
    }
}

impl Settings {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
    /// Reads settings from a YAML file. A relative `root` is resolved against
    /// the directory containing the file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read settings {}: {}", path.display(), err))?;
        let mut settings = Self::from_yaml_str(&text)?;

        if settings.root.is_relative() {
            if let Some(dir) = path.parent() {
                settings.root = dir.join(&settings.root);
            }
        }

        Ok(settings)
    }
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        serde_yaml::to_writer(file, self)?;

        Ok(())
    }
    pub fn physical_io(&self) -> PhysicalIO {
        PhysicalIO::new(&self.root)
    }
}
