use std::sync::Arc;

use kura_asset::{Address, Asset, Library, LoadResult, Loader};

/// Raw bytes of a file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary {
    data: Arc<[u8]>,
}

impl Binary {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Asset for Binary {
    const NAME: &'static str = "Binary";
}

pub struct BinaryLoader;

impl Loader<Binary> for BinaryLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Binary> {
        let io = library.io().clone();
        let address = address.clone();

        library
            .worker()
            .schedule(move || io.read_file(&address).map(Binary::new))
    }
}
