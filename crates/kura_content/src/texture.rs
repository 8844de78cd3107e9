use kura_asset::{Address, Asset, Handle, Library, LoadError, LoadResult, Loader};

use crate::Image;

/// Image prepared for sampling. Keeps its source image alive.
#[derive(Clone, Debug)]
pub struct Texture {
    image: Handle<Image>,
}

impl Texture {
    pub fn image(&self) -> &Handle<Image> {
        &self.image
    }
    pub fn size(&self) -> (u32, u32) {
        let image = self.image.content();
        (image.width(), image.height())
    }
}

impl Asset for Texture {
    const NAME: &'static str = "Texture";
}

pub struct TextureLoader;

impl Loader<Texture> for TextureLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Texture> {
        let parent = address.clone();

        library
            .load_asset::<Image>(address)
            .map_err(library.worker(), move |err| match err {
                LoadError::NotFound(missing) if missing == parent => LoadError::NotFound(missing),
                err => LoadError::dependency(&parent, err),
            })
            .then(library.worker(), |image| Ok::<_, LoadError>(Texture { image }))
    }
}
