use kura_asset::{Address, Asset, AsyncResult, IntoAsyncResult, Library, LoadError, LoadResult, IO};
use serde::de::DeserializeOwned;

pub(crate) fn read_yaml<A: Asset, D: DeserializeOwned>(io: &dyn IO, address: &Address) -> Result<D, LoadError> {
    let bytes = io.read_file(address)?;
    serde_yaml::from_slice(&bytes).map_err(|err| LoadError::decode::<A>(address, err))
}

/// Parses the YAML document at `address` on the worker and passes it to
/// `build`, which typically starts the loads of the referenced content
pub(crate) fn load_yaml<A, D, R, F>(library: &Library, address: &Address, build: F) -> LoadResult<A>
where
    A: Asset,
    D: DeserializeOwned,
    R: IntoAsyncResult<A, LoadError>,
    F: FnOnce(&Library, &Address, D) -> R + Send + 'static,
{
    let inner = library.clone();
    let address = address.clone();

    library
        .worker()
        .schedule(move || match read_yaml::<A, D>(inner.io().as_ref(), &address) {
            Ok(document) => build(&inner, &address, document).into_async_result(),
            Err(err) => AsyncResult::failed(err),
        })
}
