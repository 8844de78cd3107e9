/// Marker for decoded content that can be cached by a [`crate::Library`].
///
/// Content is immutable once published and is cloned when handed between
/// chained load steps, so large payloads should be cheap to clone.
pub trait Asset: Clone + Send + Sync + 'static {
    const NAME: &'static str;
}
