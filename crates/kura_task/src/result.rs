use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::Worker;

/// Error type carried by an [`AsyncResult`]. It must be cloneable since every
/// observer of a result receives its own copy of the outcome.
pub trait TaskError: Clone + Send + Sync + 'static {
    /// Reported when the [`Promise`] backing a result is dropped unresolved
    fn abandoned() -> Self;
}

type Callback<T, E> = Box<dyn FnOnce(&Result<T, E>) + Send + 'static>;

enum State<T, E> {
    Pending(Vec<Callback<T, E>>),
    Done(Result<T, E>),
}

struct Shared<T, E> {
    state: Mutex<State<T, E>>,
    done: Condvar,
}

impl<T, E> Shared<T, E>
where
    T: Clone + Send + 'static,
    E: TaskError,
{
    fn with_state(state: State<T, E>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            done: Condvar::new(),
        })
    }
    fn complete(&self, result: Result<T, E>) {
        let callbacks = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, State::Done(result.clone())) {
                State::Pending(callbacks) => callbacks,
                State::Done(previous) => {
                    *state = State::Done(previous);
                    return;
                }
            }
        };

        self.done.notify_all();

        for callback in callbacks {
            callback(&result);
        }
    }
}

/// The eventual outcome of one asynchronous unit of work.
///
/// A result starts out pending and transitions exactly once to either a value
/// or an error. Clones observe the same outcome.
pub struct AsyncResult<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for AsyncResult<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T, E> AsyncResult<T, E>
where
    T: Clone + Send + 'static,
    E: TaskError,
{
    pub fn ready(value: T) -> Self {
        Self {
            shared: Shared::with_state(State::Done(Ok(value))),
        }
    }
    pub fn failed(error: E) -> Self {
        Self {
            shared: Shared::with_state(State::Done(Err(error))),
        }
    }
    pub fn is_ready(&self) -> bool {
        matches!(*self.shared.state.lock(), State::Done(_))
    }
    /// Returns the outcome if the result has already completed
    pub fn try_get(&self) -> Option<Result<T, E>> {
        match &*self.shared.state.lock() {
            State::Pending(_) => None,
            State::Done(result) => Some(result.clone()),
        }
    }
    /// Blocks the calling thread until the result completes.
    ///
    /// Meant for tests and bootstrap code. Calling this from a worker thread
    /// can starve the pool of the very task it is waiting on.
    pub fn wait(&self) -> Result<T, E> {
        let mut state = self.shared.state.lock();
        loop {
            match &*state {
                State::Done(result) => return result.clone(),
                State::Pending(_) => self.shared.done.wait(&mut state),
            }
        }
    }
    /// Registers a callback that runs on whichever thread completes the
    /// result, or immediately if it already has.
    pub fn on_complete(&self, callback: impl FnOnce(&Result<T, E>) + Send + 'static) {
        let mut state = self.shared.state.lock();
        match &mut *state {
            State::Pending(callbacks) => callbacks.push(Box::new(callback)),
            State::Done(result) => {
                let result = result.clone();
                drop(state);
                callback(&result);
            }
        }
    }
    /// Chains `continuation` after this result is fulfilled.
    ///
    /// The continuation runs on `worker` and may return either a plain
    /// `Result` or another `AsyncResult`, which is flattened into the returned
    /// one. A failure skips the continuation and is propagated unchanged.
    pub fn then<U, R, F>(&self, worker: &Worker, continuation: F) -> AsyncResult<U, E>
    where
        U: Clone + Send + 'static,
        R: IntoAsyncResult<U, E>,
        F: FnOnce(T) -> R + Send + 'static,
    {
        self.then_result(worker, move |result| match result {
            Ok(value) => continuation(value).into_async_result(),
            Err(error) => AsyncResult::failed(error),
        })
    }
    /// Like [`AsyncResult::then`] but the continuation sees failures as well
    pub fn then_result<U, R, F>(&self, worker: &Worker, continuation: F) -> AsyncResult<U, E>
    where
        U: Clone + Send + 'static,
        R: IntoAsyncResult<U, E>,
        F: FnOnce(Result<T, E>) -> R + Send + 'static,
    {
        let (promise, result) = Promise::new();
        let worker = worker.clone();

        self.on_complete(move |outcome| {
            let outcome = outcome.clone();
            worker.spawn(move || promise.resolve_with(continuation(outcome).into_async_result()));
        });

        result
    }
    pub fn map_err<F>(&self, worker: &Worker, f: F) -> Self
    where
        F: FnOnce(E) -> E + Send + 'static,
    {
        self.then_result(worker, move |result| result.map_err(f))
    }
    /// Combines two results, failing with whichever error is observed first
    pub fn zip<U>(&self, other: &AsyncResult<U, E>, worker: &Worker) -> AsyncResult<(T, U), E>
    where
        U: Clone + Send + 'static,
    {
        let other = other.clone();
        let inner_worker = worker.clone();

        self.then(worker, move |first| {
            other.then(&inner_worker, move |second| Ok::<_, E>((first, second)))
        })
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T, E> std::fmt::Debug for AsyncResult<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.shared.state.lock() {
            State::Pending(_) => "Pending",
            State::Done(Ok(_)) => "Fulfilled",
            State::Done(Err(_)) => "Failed",
        };
        f.debug_tuple("AsyncResult").field(&state).finish()
    }
}

/// Waits for every result and collects the values in order.
/// The first failure fails the combined result.
pub fn join_all<T, E>(results: impl IntoIterator<Item = AsyncResult<T, E>>) -> AsyncResult<Vec<T>, E>
where
    T: Clone + Send + 'static,
    E: TaskError,
{
    struct Join<T: Clone + Send + 'static, E: TaskError> {
        values: Vec<Option<T>>,
        remaining: usize,
        promise: Option<Promise<Vec<T>, E>>,
    }

    let results: Vec<_> = results.into_iter().collect();
    if results.is_empty() {
        return AsyncResult::ready(Vec::new());
    }

    let (promise, joined) = Promise::new();
    let join = Arc::new(Mutex::new(Join {
        values: vec![None; results.len()],
        remaining: results.len(),
        promise: Some(promise),
    }));

    for (index, result) in results.into_iter().enumerate() {
        let join = join.clone();
        result.on_complete(move |outcome| {
            let mut join = join.lock();
            match outcome {
                Ok(value) => {
                    join.values[index] = Some(value.clone());
                    join.remaining -= 1;
                    if join.remaining == 0 {
                        let values = join.values.drain(..).flatten().collect();
                        let promise = join.promise.take();
                        drop(join);

                        if let Some(promise) = promise {
                            promise.fulfill(values);
                        }
                    }
                }
                Err(error) => {
                    let promise = join.promise.take();
                    drop(join);

                    if let Some(promise) = promise {
                        promise.fail(error.clone());
                    }
                }
            }
        });
    }

    joined
}

/// The producing side of an [`AsyncResult`]. Consumed on resolution, so a
/// result can only ever be assigned once.
pub struct Promise<T: Clone + Send + 'static, E: TaskError> {
    shared: Option<Arc<Shared<T, E>>>,
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: TaskError,
{
    pub fn new() -> (Self, AsyncResult<T, E>) {
        let shared = Shared::with_state(State::Pending(Vec::new()));
        (
            Self {
                shared: Some(shared.clone()),
            },
            AsyncResult { shared },
        )
    }
    pub fn fulfill(self, value: T) {
        self.resolve(Ok(value))
    }
    pub fn fail(self, error: E) {
        self.resolve(Err(error))
    }
    pub fn resolve(mut self, result: Result<T, E>) {
        if let Some(shared) = self.shared.take() {
            shared.complete(result);
        }
    }
    /// Completes this promise with the outcome of `result` once it is known
    pub fn resolve_with(self, result: AsyncResult<T, E>) {
        result.on_complete(move |outcome| self.resolve(outcome.clone()));
    }
}

impl<T, E> Drop for Promise<T, E>
where
    T: Clone + Send + 'static,
    E: TaskError,
{
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.complete(Err(E::abandoned()));
        }
    }
}

/// Anything a scheduled closure or continuation may hand back: a finished
/// `Result` or a further `AsyncResult` to be flattened.
pub trait IntoAsyncResult<T, E> {
    fn into_async_result(self) -> AsyncResult<T, E>;
}

impl<T, E> IntoAsyncResult<T, E> for Result<T, E>
where
    T: Clone + Send + 'static,
    E: TaskError,
{
    fn into_async_result(self) -> AsyncResult<T, E> {
        match self {
            Ok(value) => AsyncResult::ready(value),
            Err(error) => AsyncResult::failed(error),
        }
    }
}

impl<T, E> IntoAsyncResult<T, E> for AsyncResult<T, E> {
    fn into_async_result(self) -> AsyncResult<T, E> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    enum TestError {
        Abandoned,
        Failed(&'static str),
    }

    impl TaskError for TestError {
        fn abandoned() -> Self {
            TestError::Abandoned
        }
    }

    fn worker() -> Worker {
        Worker::new(2, "result-test").unwrap()
    }

    #[test]
    fn promise_fulfills_every_clone() {
        let (promise, result) = Promise::<u32, TestError>::new();
        let other = result.clone();
        assert!(!result.is_ready());
        assert!(result.try_get().is_none());

        promise.fulfill(7);

        assert_eq!(result.wait(), Ok(7));
        assert_eq!(other.try_get(), Some(Ok(7)));
    }

    #[test]
    fn dropped_promise_is_abandoned() {
        let (promise, result) = Promise::<u32, TestError>::new();
        drop(promise);
        assert_eq!(result.wait(), Err(TestError::Abandoned));
    }

    #[test]
    fn schedule_flattens_nested_result() {
        let worker = worker();
        let inner_worker = worker.clone();

        let result: AsyncResult<u32, TestError> =
            worker.schedule(move || inner_worker.schedule(|| Ok::<_, TestError>(21)));
        let doubled = result.then(&worker, |value| Ok::<_, TestError>(value * 2));

        assert_eq!(doubled.wait(), Ok(42));
    }

    #[test]
    fn failure_short_circuits_continuations() {
        let worker = worker();
        let runs = Arc::new(AtomicUsize::new(0));

        let failed = AsyncResult::<u32, TestError>::failed(TestError::Failed("decode"));
        let counter = runs.clone();
        let chained = failed
            .then(&worker, move |value| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(value + 1)
            })
            .then(&worker, |value| Ok::<_, TestError>(value.to_string()));

        assert_eq!(chained.wait(), Err(TestError::Failed("decode")));
        worker.wait_all();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn continuation_runs_on_worker() {
        let worker = worker();
        let (promise, result) = Promise::<u32, TestError>::new();
        let caller = std::thread::current().id();

        let chained = result.then(&worker, move |value| {
            Ok::<_, TestError>((value, std::thread::current().id() != caller))
        });
        promise.fulfill(1);

        assert_eq!(chained.wait(), Ok((1, true)));
    }

    #[test]
    fn then_result_observes_failures() {
        let worker = worker();
        let result = AsyncResult::<u32, TestError>::failed(TestError::Failed("missing"));
        let recovered = result.then_result(&worker, |outcome| match outcome {
            Ok(value) => Ok::<_, TestError>(value),
            Err(_) => Ok(0),
        });
        assert_eq!(recovered.wait(), Ok(0));

        let renamed = result.map_err(&worker, |_| TestError::Failed("renamed"));
        assert_eq!(renamed.wait(), Err(TestError::Failed("renamed")));
    }

    #[test]
    fn join_all_keeps_order() {
        let worker = worker();
        let (first, first_result) = Promise::<u32, TestError>::new();
        let second_result = worker.schedule(|| Ok::<_, TestError>(2));

        let joined = join_all(vec![first_result, second_result]);
        first.fulfill(1);

        assert_eq!(joined.wait(), Ok(vec![1, 2]));
        assert_eq!(join_all(Vec::<AsyncResult<u32, TestError>>::new()).wait(), Ok(vec![]));
    }

    #[test]
    fn join_all_fails_on_first_error() {
        let (pending, pending_result) = Promise::<u32, TestError>::new();
        let joined = join_all(vec![
            pending_result,
            AsyncResult::failed(TestError::Failed("second")),
        ]);

        assert_eq!(joined.wait(), Err(TestError::Failed("second")));
        pending.fulfill(1);
        assert_eq!(joined.try_get(), Some(Err(TestError::Failed("second"))));
    }

    #[test]
    fn zip_pairs_values() {
        let worker = worker();
        let a = AsyncResult::<u32, TestError>::ready(1);
        let b = worker.schedule(|| Ok::<_, TestError>("b"));

        assert_eq!(a.zip(&b, &worker).wait(), Ok((1, "b")));

        let failed = AsyncResult::<&str, TestError>::failed(TestError::Failed("b"));
        assert_eq!(a.zip(&failed, &worker).wait(), Err(TestError::Failed("b")));
    }
}
