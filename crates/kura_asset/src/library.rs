use std::{
    any::{type_name, TypeId},
    sync::Arc,
};

use fxhash::FxHashMap;

use crate::{
    cache::ErasedCache, Address, Asset, AssetCache, AsyncResult, Handle, LoadError, LoadResult,
    Loader, Worker, IO,
};

struct LibraryInner {
    index: FxHashMap<TypeId, usize>,
    caches: Vec<Box<dyn ErasedCache>>,
    worker: Worker,
    io: Arc<dyn IO>,
}

/// Routes typed load requests to the cache registered for each asset type.
///
/// Cloning is cheap, every clone refers to the same caches. The set of
/// registered types is fixed once the library is built.
#[derive(Clone)]
pub struct Library {
    inner: Arc<LibraryInner>,
}

impl Library {
    pub fn builder(worker: Worker, io: Arc<dyn IO>) -> LibraryBuilder {
        LibraryBuilder::new(worker, io)
    }
    pub fn cache<A: Asset>(&self) -> Option<&AssetCache<A>> {
        let index = *self.inner.index.get(&TypeId::of::<A>())?;
        self.inner.caches[index].as_any().downcast_ref::<AssetCache<A>>()
    }
    pub fn is_registered<A: Asset>(&self) -> bool {
        self.inner.index.contains_key(&TypeId::of::<A>())
    }
    /// Starts loading `address` as `A`, or attaches to the load or content
    /// already cached for it
    pub fn load_asset<A: Asset>(&self, address: impl Into<Address>) -> LoadResult<Handle<A>> {
        let address = address.into();
        match self.cache::<A>() {
            Some(cache) => cache.load_async(self, &address),
            None => {
                log::error!("Cannot load {}, {} is not registered", address, type_name::<A>());
                AsyncResult::failed(LoadError::Unregistered(A::NAME))
            }
        }
    }
    /// Blocks until the asset is loaded. Failures are logged and reported as
    /// `None`. Must not be called from a worker thread.
    pub fn load_asset_blocking<A: Asset>(&self, address: impl Into<Address>) -> Option<Handle<A>> {
        let address = address.into();
        match self.load_asset::<A>(&address).wait() {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::warn!("Failed to load {} {}: {}", A::NAME, address, err);
                None
            }
        }
    }
    /// Loads content referenced from inside the content at `parent`. The
    /// reference is resolved relative to `parent` and failures are reported as
    /// [`LoadError::Dependency`] of `parent`.
    pub fn load_dependency<A: Asset>(&self, parent: &Address, reference: &str) -> LoadResult<Handle<A>> {
        let parent = parent.clone();
        self.load_asset::<A>(parent.sibling(reference))
            .map_err(self.worker(), move |err| LoadError::dependency(&parent, err))
    }
    pub fn find_asset<A: Asset>(&self, address: impl Into<Address>) -> Option<Handle<A>> {
        self.cache::<A>()?.find(&address.into())
    }
    /// Sweeps every cache and returns the number of removed entries.
    ///
    /// Caches are swept in reverse registration order so content that holds
    /// dependencies is released before the caches of its dependencies are
    /// visited.
    pub fn unload_unused_assets(&self) -> usize {
        let removed = self
            .inner
            .caches
            .iter()
            .rev()
            .map(|cache| cache.unload_self_unused_assets())
            .sum();

        log::debug!("Sweep removed {} assets", removed);
        removed
    }
    /// Number of loaded entries across all caches
    pub fn asset_count(&self) -> usize {
        self.inner.caches.iter().map(|cache| cache.asset_count()).sum()
    }
    pub fn registered_assets(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.caches.iter().map(|cache| cache.asset_name())
    }
    pub fn worker(&self) -> &Worker {
        &self.inner.worker
    }
    pub fn io(&self) -> &Arc<dyn IO> {
        &self.inner.io
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("assets", &self.registered_assets().collect::<Vec<_>>())
            .field("loaded", &self.asset_count())
            .finish()
    }
}

pub struct LibraryBuilder {
    index: FxHashMap<TypeId, usize>,
    caches: Vec<Box<dyn ErasedCache>>,
    worker: Worker,
    io: Arc<dyn IO>,
}

impl LibraryBuilder {
    pub fn new(worker: Worker, io: Arc<dyn IO>) -> Self {
        Self {
            index: Default::default(),
            caches: Vec::new(),
            worker,
            io,
        }
    }
    /// Registers the loader for `A`. Types that other types depend on should
    /// be registered first.
    ///
    /// # Panics
    /// If `A` was already registered
    pub fn register<A: Asset, L: Loader<A>>(&mut self, loader: L) -> &mut Self {
        let type_id = TypeId::of::<A>();
        if self.index.contains_key(&type_id) {
            panic!("Asset type {} is already registered", type_name::<A>());
        }

        self.index.insert(type_id, self.caches.len());
        self.caches.push(Box::new(AssetCache::new(loader)));

        self
    }
    pub fn is_registered<A: Asset>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<A>())
    }
    pub fn worker(&self) -> &Worker {
        &self.worker
    }
    pub fn build(self) -> Library {
        Library {
            inner: Arc::new(LibraryInner {
                index: self.index,
                caches: self.caches,
                worker: self.worker,
                io: self.io,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryIO;

    #[derive(Clone, Debug, PartialEq)]
    struct Word(String);
    impl Asset for Word {
        const NAME: &'static str = "Word";
    }

    #[derive(Clone, Debug)]
    struct Sentence {
        words: Vec<Handle<Word>>,
    }
    impl Asset for Sentence {
        const NAME: &'static str = "Sentence";
    }

    fn load_word(library: &Library, address: &Address) -> LoadResult<Word> {
        let io = library.io().clone();
        let address = address.clone();
        library.worker().schedule(move || {
            let bytes = io.read_file(&address)?;
            String::from_utf8(bytes)
                .map(Word)
                .map_err(|err| LoadError::decode::<Word>(&address, err))
        })
    }

    fn load_sentence(library: &Library, address: &Address) -> LoadResult<Sentence> {
        let inner = library.clone();
        let address = address.clone();
        library
            .worker()
            .schedule(move || {
                let text = String::from_utf8(inner.io().read_file(&address)?)
                    .map_err(|err| LoadError::decode::<Sentence>(&address, err))?;
                Ok::<_, LoadError>(
                    text.split_whitespace()
                        .map(|reference| inner.load_dependency::<Word>(&address, reference))
                        .collect::<Vec<_>>(),
                )
            })
            .then(library.worker(), |words| crate::join_all(words))
            .then(library.worker(), |words| Ok::<_, LoadError>(Sentence { words }))
    }

    fn library() -> Library {
        let _ = simple_logger::SimpleLogger::new().init();
        let io = MemoryIO::new();
        io.insert("words/hello", "hello");
        io.insert("words/world", "world");
        io.insert("words/broken", vec![0xffu8, 0xfe]);
        io.insert("words/greeting", "hello world");
        io.insert("words/bad_greeting", "hello broken");
        io.insert("words/lonely_greeting", "hello nobody");

        let worker = Worker::new(2, "library-test").unwrap();
        let mut builder = Library::builder(worker, Arc::new(io));
        builder
            .register::<Word, _>(load_word)
            .register::<Sentence, _>(load_sentence);
        builder.build()
    }

    #[test]
    fn unregistered_type_fails() {
        #[derive(Clone)]
        struct Unknown;
        impl Asset for Unknown {
            const NAME: &'static str = "Unknown";
        }

        let library = library();
        assert_eq!(
            library.load_asset::<Unknown>("words/hello").wait().err(),
            Some(LoadError::Unregistered("Unknown"))
        );
        assert!(library.load_asset_blocking::<Unknown>("words/hello").is_none());
        assert!(!library.is_registered::<Unknown>());
    }

    #[test]
    #[should_panic]
    fn duplicate_registration_panics() {
        let worker = Worker::new(1, "duplicate-test").unwrap();
        let mut builder = LibraryBuilder::new(worker, Arc::new(MemoryIO::new()));
        builder.register::<Word, _>(load_word);
        builder.register::<Word, _>(load_word);
    }

    #[test]
    fn composite_shares_cached_dependency() {
        let library = library();
        let hello = library.load_asset_blocking::<Word>("words/hello").unwrap();
        let greeting = library.load_asset_blocking::<Sentence>("words/greeting").unwrap();

        let words = &greeting.content().words;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0], hello);
        assert_eq!(words[1].content(), &Word("world".to_owned()));
        assert_eq!(library.asset_count(), 3);
    }

    #[test]
    fn dependency_failures_are_wrapped() {
        let library = library();

        let err = library.load_asset::<Sentence>("words/bad_greeting").wait().unwrap_err();
        assert!(matches!(
            &err,
            LoadError::Dependency { address, source }
                if address.as_str() == "words/bad_greeting"
                    && matches!(**source, LoadError::Decode { asset: "Word", .. })
        ));

        let err = library.load_asset::<Sentence>("words/lonely_greeting").wait().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.root_cause(), &LoadError::NotFound(Address::new("words/nobody")));

        library.worker().wait_all();
        assert!(library.find_asset::<Sentence>("words/bad_greeting").is_none());
        assert!(library.find_asset::<Word>("words/hello").is_some());
    }

    #[test]
    fn sweeps_release_dependents_first() {
        let library = library();
        let greeting = library.load_asset_blocking::<Sentence>("words/greeting").unwrap();
        library.worker().wait_all();
        assert_eq!(library.asset_count(), 3);
        assert_eq!(library.unload_unused_assets(), 0);

        drop(greeting);
        assert_eq!(library.unload_unused_assets(), 3);
        assert_eq!(library.asset_count(), 0);
    }

    #[test]
    fn missing_content_is_not_cached() {
        let library = library();
        assert!(library.load_asset_blocking::<Word>("empty_asset").is_none());
        library.worker().wait_all();
        assert_eq!(library.asset_count(), 0);
        assert!(library.find_asset::<Word>("empty_asset").is_none());
    }
}
