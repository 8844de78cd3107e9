//! Built-in content types and their loaders

use std::sync::Arc;

use kura_asset::{Library, LibraryBuilder, Settings, Worker, IO};

mod binary;
mod document;
mod image;
mod material;
mod mesh;
mod model;
mod sprite;
mod text;
mod texture;

pub use crate::image::*;
pub use binary::*;
pub use material::*;
pub use mesh::*;
pub use model::*;
pub use sprite::*;
pub use text::*;
pub use texture::*;

/// Registers every built-in content type, dependencies first
pub fn register_default_assets(builder: &mut LibraryBuilder) -> &mut LibraryBuilder {
    builder
        .register::<Binary, _>(BinaryLoader)
        .register::<Text, _>(TextLoader)
        .register::<Image, _>(ImageLoader)
        .register::<Texture, _>(TextureLoader)
        .register::<Mesh, _>(MeshLoader)
        .register::<Material, _>(MaterialLoader)
        .register::<Sprite, _>(SpriteLoader)
        .register::<Model, _>(ModelLoader)
}

pub fn default_library(worker: Worker, io: Arc<dyn IO>) -> Library {
    let mut builder = LibraryBuilder::new(worker, io);
    register_default_assets(&mut builder);
    builder.build()
}

pub fn library_from_settings(settings: &Settings) -> anyhow::Result<Library> {
    let worker = settings.worker.build()?;
    log::info!(
        "Loading content from {} with {} worker threads",
        settings.root.display(),
        worker.thread_count()
    );

    Ok(default_library(worker, Arc::new(settings.physical_io())))
}
