use std::{
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use crate::{Address, Asset};

/// Decoded content together with the address it was loaded from
pub struct ContentAsset<A> {
    address: Address,
    content: A,
}

impl<A> ContentAsset<A> {
    pub fn address(&self) -> &Address {
        &self.address
    }
    pub fn content(&self) -> &A {
        &self.content
    }
}

/// Shared reference to a cached [`ContentAsset`].
///
/// The owning cache keeps one handle per loaded address. Content stays cached
/// for as long as any other handle is alive and becomes eligible for eviction
/// once the cache's own handle is the last one.
pub struct Handle<A> {
    inner: Arc<ContentAsset<A>>,
}

impl<A: Asset> Handle<A> {
    pub(crate) fn new(address: Address, content: A) -> Self {
        Self {
            inner: Arc::new(ContentAsset { address, content }),
        }
    }
}

impl<A> Handle<A> {
    /// Number of live handles to this content, including the cache's own
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
    pub(crate) fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Deref for Handle<A> {
    type Target = ContentAsset<A>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<A> Clone for Handle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A> PartialEq for Handle<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
impl<A> Eq for Handle<A> {}

impl<A> Hash for Handle<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl<A: Asset> std::fmt::Debug for Handle<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("asset", &A::NAME)
            .field("address", &self.inner.address)
            .field("holders", &self.strong_count())
            .finish()
    }
}
