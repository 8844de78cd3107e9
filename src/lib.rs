pub mod task {
    pub use kura_task::*;
}
pub mod asset {
    pub use kura_asset::*;
}
pub mod content {
    pub use kura_content::*;
}
pub mod math {
    pub use glam::*;
}

use std::{path::Path, sync::Arc};

use kura_asset::{Library, Settings, Worker, IO};

/// Library with every built-in content type registered
pub fn default_library(worker: Worker, io: Arc<dyn IO>) -> Library {
    kura_content::default_library(worker, io)
}

/// Reads the settings file at `path` and builds a library from it
pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Library> {
    let settings = Settings::load(path)?;
    let library = kura_content::library_from_settings(&settings)?;
    log::debug!("Opened {:?}", library);

    Ok(library)
}
