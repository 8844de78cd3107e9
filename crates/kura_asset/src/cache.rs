use std::{any::Any, sync::Arc};

use fxhash::FxHashMap;
use parking_lot::Mutex;

use crate::{Address, Asset, AsyncResult, Handle, Library, LoadResult, Loader, Promise};

enum Entry<A: Asset> {
    Loading(LoadResult<Handle<A>>),
    Loaded(Handle<A>),
}

/// Per type cache of loaded content.
///
/// Requests for an address that is already loaded or loading share the same
/// outcome, so each address has at most one load in flight. Loaded content is
/// only evicted by an explicit sweep, see
/// [`AssetCache::unload_self_unused_assets`].
pub struct AssetCache<A: Asset> {
    entries: Arc<Mutex<FxHashMap<Address, Entry<A>>>>,
    loader: Arc<dyn Loader<A>>,
}

impl<A: Asset> AssetCache<A> {
    pub fn new(loader: impl Loader<A>) -> Self {
        Self {
            entries: Default::default(),
            loader: Arc::new(loader),
        }
    }
    /// Returns the loaded content at `address` without starting a load
    pub fn find(&self, address: &Address) -> Option<Handle<A>> {
        match self.entries.lock().get(address)? {
            Entry::Loaded(handle) => Some(handle.clone()),
            Entry::Loading(_) => None,
        }
    }
    pub fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Handle<A>> {
        let (promise, result) = {
            let mut entries = self.entries.lock();
            match entries.get(address) {
                Some(Entry::Loaded(handle)) => {
                    log::debug!("{} {} already loaded", A::NAME, address);
                    return AsyncResult::ready(handle.clone());
                }
                Some(Entry::Loading(result)) => {
                    log::debug!("{} {} is loading, attaching", A::NAME, address);
                    return result.clone();
                }
                None => {}
            }

            let (promise, result) = Promise::new();
            entries.insert(address.clone(), Entry::Loading(result.clone()));
            (promise, result)
        };

        log::info!("Loading {} {}", A::NAME, address);
        let guard = LoadingGuard {
            entries: &self.entries,
            address,
            armed: true,
        };
        let content = self.loader.load_async(library, address);
        guard.disarm();

        let entries = self.entries.clone();
        let address = address.clone();
        let published = content.then_result(library.worker(), move |outcome| {
            let mut entries = entries.lock();
            match outcome {
                Ok(content) => {
                    let handle = Handle::new(address.clone(), content);
                    entries.insert(address.clone(), Entry::Loaded(handle.clone()));
                    log::info!("Loaded {} {}", A::NAME, address);
                    Ok(handle)
                }
                Err(err) => {
                    if let Some(Entry::Loading(_)) = entries.get(&address) {
                        entries.remove(&address);
                    }
                    log::debug!("Failed to load {} {}: {}", A::NAME, address, err);
                    Err(err)
                }
            }
        });
        promise.resolve_with(published);

        result
    }
    /// Removes loaded entries that nothing outside of this cache holds on to.
    /// Entries that are still loading are left alone. Returns the number of
    /// removed entries.
    pub fn unload_self_unused_assets(&self) -> usize {
        let removed: Vec<Handle<A>> = {
            let mut entries = self.entries.lock();
            let unused: Vec<Address> = entries
                .iter()
                .filter_map(|(address, entry)| match entry {
                    Entry::Loaded(handle) if handle.is_unique() => Some(address.clone()),
                    _ => None,
                })
                .collect();

            unused
                .iter()
                .filter_map(|address| match entries.remove(address) {
                    Some(Entry::Loaded(handle)) => Some(handle),
                    _ => None,
                })
                .collect()
        };

        if !removed.is_empty() {
            log::debug!("Unloaded {} unused {} assets", removed.len(), A::NAME);
        }

        removed.len()
    }
    /// Number of loaded entries
    pub fn asset_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| matches!(entry, Entry::Loaded(_)))
            .count()
    }
    pub fn loading_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| matches!(entry, Entry::Loading(_)))
            .count()
    }
}

// Removes the loading entry if the loader unwinds before handing back a result
struct LoadingGuard<'a, A: Asset> {
    entries: &'a Mutex<FxHashMap<Address, Entry<A>>>,
    address: &'a Address,
    armed: bool,
}

impl<A: Asset> LoadingGuard<'_, A> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<A: Asset> Drop for LoadingGuard<'_, A> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let removed = {
            let mut entries = self.entries.lock();
            match entries.get(self.address) {
                Some(Entry::Loading(_)) => entries.remove(self.address),
                _ => None,
            }
        };
        if removed.is_some() {
            log::error!("Loader for {} {} panicked", A::NAME, self.address);
        }
    }
}

/// Type erased view of an [`AssetCache`] used by the [`Library`] registry
pub(crate) trait ErasedCache: Send + Sync + 'static {
    fn asset_name(&self) -> &'static str;
    fn unload_self_unused_assets(&self) -> usize;
    fn asset_count(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

impl<A: Asset> ErasedCache for AssetCache<A> {
    fn asset_name(&self) -> &'static str {
        A::NAME
    }
    fn unload_self_unused_assets(&self) -> usize {
        AssetCache::unload_self_unused_assets(self)
    }
    fn asset_count(&self) -> usize {
        AssetCache::asset_count(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}
