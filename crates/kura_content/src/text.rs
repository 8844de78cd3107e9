use kura_asset::{Address, Asset, Library, LoadError, LoadResult, Loader};

/// UTF-8 text file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    content: String,
}

impl Text {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl Asset for Text {
    const NAME: &'static str = "Text";
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.content == other
    }
}
impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.content == *other
    }
}

pub struct TextLoader;

impl Loader<Text> for TextLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Text> {
        let io = library.io().clone();
        let address = address.clone();

        library.worker().schedule(move || {
            let bytes = io.read_file(&address)?;
            String::from_utf8(bytes)
                .map(|content| Text { content })
                .map_err(|err| LoadError::decode::<Text>(&address, err))
        })
    }
}
