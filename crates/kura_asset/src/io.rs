use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fxhash::FxHashMap;
use parking_lot::RwLock;

use crate::{Address, LoadError};

/// Source of raw bytes for loaders
pub trait IO: Send + Sync + 'static {
    fn read_file(&self, address: &Address) -> Result<Vec<u8>, LoadError>;
    fn exists(&self, address: &Address) -> bool;
}

/// Reads content from the file system below a root directory
pub struct PhysicalIO {
    root: PathBuf,
}

impl PhysicalIO {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    pub fn path_of(&self, address: &Address) -> PathBuf {
        self.root.join(address.as_str())
    }
}

impl IO for PhysicalIO {
    fn read_file(&self, address: &Address) -> Result<Vec<u8>, LoadError> {
        let path = self.path_of(address);
        if path.is_dir() {
            return Err(LoadError::NotFound(address.clone()));
        }

        std::fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => LoadError::NotFound(address.clone()),
            _ => LoadError::Io {
                address: address.clone(),
                reason: err.to_string(),
            },
        })
    }
    fn exists(&self, address: &Address) -> bool {
        self.path_of(address).is_file()
    }
}

/// In-memory content, mostly useful for tests and embedded assets
#[derive(Default)]
pub struct MemoryIO {
    files: RwLock<FxHashMap<Address, Vec<u8>>>,
}

impl MemoryIO {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&self, address: impl Into<Address>, data: impl Into<Vec<u8>>) {
        self.files.write().insert(address.into(), data.into());
    }
    pub fn remove(&self, address: impl Into<Address>) -> Option<Vec<u8>> {
        self.files.write().remove(&address.into())
    }
}

impl IO for MemoryIO {
    fn read_file(&self, address: &Address) -> Result<Vec<u8>, LoadError> {
        self.files
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(address.clone()))
    }
    fn exists(&self, address: &Address) -> bool {
        self.files.read().contains_key(address)
    }
}
