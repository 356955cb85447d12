use std::fmt::Debug;

use futures::stream::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value with a single writer and any number of non-blocking readers.
///
/// Writes replace the value in one step, so readers observe either the
/// previous or the new value, never a partially updated one.
#[derive(Clone)]
pub struct Property<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
    rx: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(initial: T) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self { tx, rx }
    }

    /// Mutate the value in place.
    ///
    /// The closure reports whether it modified the value and a result that is
    /// handed back to the caller. Watchers are notified only on modification.
    pub(crate) fn update<R, F>(&self, f: F) -> R
    where
        R: Default,
        F: FnOnce(&mut T) -> (bool, R),
    {
        let mut result = R::default();
        self.tx.send_if_modified(|current| {
            let (modified, output) = f(current);
            result = output;
            modified
        });
        result
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Watch for changes to this property.
    ///
    /// The stream immediately yields the current value, then yields
    /// whenever the value changes.
    pub fn watch(&self) -> impl Stream<Item = T> + Send + use<T> {
        WatchStream::new(self.rx.clone())
    }
}

impl<T: Clone + Send + Sync + Debug + 'static> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}
