use std::sync::Arc;

use kura_asset::{Address, Asset, Library, LoadError, LoadResult, Loader};

use crate::Binary;

/// Decoded image with 8 bit RGBA pixels
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl Image {
    pub fn from_memory(bytes: &[u8]) -> image::ImageResult<Self> {
        let image = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = image.dimensions();

        Ok(Self {
            width,
            height,
            data: image.into_raw().into(),
        })
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Asset for Image {
    const NAME: &'static str = "Image";
}

/// Decodes the [`Binary`] at the same address. The binary is only held while
/// decoding.
pub struct ImageLoader;

impl Loader<Image> for ImageLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Image> {
        let address = address.clone();

        library
            .load_asset::<Binary>(&address)
            .then(library.worker(), move |binary| {
                Image::from_memory(binary.content().data())
                    .map_err(|err| LoadError::decode::<Image>(&address, err))
            })
    }
}
