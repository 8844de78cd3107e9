use crate::{Address, Asset, Library, LoadResult};

/// Produces the content of one asset type.
///
/// A loader never caches: the [`crate::AssetCache`] it is registered with owns
/// that. It may be invoked concurrently for different addresses and may load
/// further assets through `library`. Missing or malformed content is reported
/// through the returned result.
pub trait Loader<A: Asset>: Send + Sync + 'static {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<A>;
}

impl<A, F> Loader<A> for F
where
    A: Asset,
    F: Fn(&Library, &Address) -> LoadResult<A> + Send + Sync + 'static,
{
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<A> {
        (self)(library, address)
    }
}
