use glam::Vec2;
use kura_asset::{Address, Asset, Handle, Library, LoadError, LoadResult, Loader};
use serde::Deserialize;

use crate::{document::load_yaml, Material, Texture};

/// Axis aligned rectangle in texture space
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }
}

#[derive(Clone, Debug)]
pub struct Sprite {
    size: Vec2,
    pivot: Vec2,
    texrect: Rect,
    texture: Handle<Texture>,
    material: Handle<Material>,
}

impl Sprite {
    pub fn size(&self) -> Vec2 {
        self.size
    }
    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }
    pub fn texrect(&self) -> Rect {
        self.texrect
    }
    pub fn texture(&self) -> &Handle<Texture> {
        &self.texture
    }
    pub fn material(&self) -> &Handle<Material> {
        &self.material
    }
}

impl Asset for Sprite {
    const NAME: &'static str = "Sprite";
}

#[derive(Deserialize)]
struct SpriteDocument {
    size: Vec2,
    #[serde(default)]
    pivot: Vec2,
    #[serde(default)]
    texrect: Rect,
    texture: String,
    material: String,
}

pub struct SpriteLoader;

impl Loader<Sprite> for SpriteLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Sprite> {
        load_yaml(library, address, |library, address, document: SpriteDocument| {
            let texture = library.load_dependency::<Texture>(address, &document.texture);
            let material = library.load_dependency::<Material>(address, &document.material);

            texture
                .zip(&material, library.worker())
                .then(library.worker(), move |(texture, material)| {
                    Ok::<_, LoadError>(Sprite {
                        size: document.size,
                        pivot: document.pivot,
                        texrect: document.texrect,
                        texture,
                        material,
                    })
                })
        })
    }
}
