use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

type Calls<T> = DashMap<String, watch::Receiver<Option<T>>>;

/// Collapses concurrent loads of the same key into one execution.
///
/// The first caller for a key starts the load on its own tokio task; callers arriving while
/// it is in flight wait for the same outcome and receive a clone of it. The registration is
/// dropped as soon as the load finishes, so the next wave of callers loads again.
///
/// The load task is detached from every caller. Dropping any caller, the first one included,
/// leaves the load running, and whoever is still waiting gets its result.
///
/// Registration, lookup and removal go through a sharded `DashMap`; no map lock is held
/// while a load runs, and unrelated keys rarely share a shard.
pub struct FlightGroup<T> {
    calls: Arc<Calls<T>>,
}

impl<T> FlightGroup<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(DashMap::new()),
        }
    }

    /// Runs `load` for `key` unless a run is already in flight, in which case its
    /// result is shared instead.
    ///
    /// Must be called from within a tokio runtime. If a load panics, the caller that started
    /// it sees the panic; the other waiters retry and the next of them starts a fresh load.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> T
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut load = Some(load);
        let mut started: Option<JoinHandle<()>> = None;

        loop {
            let mut rx = match self.calls.entry(key.to_string()) {
                Entry::Occupied(call) => {
                    tracing::debug!("Joining in-flight load for key {}", key);
                    call.get().clone()
                }
                Entry::Vacant(slot) => {
                    let Some(load) = load.take() else {
                        panic!("load for key {} ended without a result", key);
                    };
                    let (tx, rx) = watch::channel(None);
                    slot.insert(rx.clone());
                    started = Some(self.spawn_load(key, tx, load));
                    rx
                }
            };

            if let Some(value) = Self::wait(&mut rx).await {
                return value;
            }

            // The load we started unwound: hand its panic to our caller
            if let Some(handle) = started.take()
                && let Err(e) = handle.await
                && e.is_panic()
            {
                std::panic::resume_unwind(e.into_panic());
            }
            tracing::warn!("In-flight load for key {} ended without a result, retrying", key);
        }
    }

    /// Number of keys with a load currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.len()
    }

    fn spawn_load<F, Fut>(&self, key: &str, tx: watch::Sender<Option<T>>, load: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let registration = Registration {
            calls: Arc::clone(&self.calls),
            key: key.to_string(),
        };

        tokio::spawn(async move {
            // Drops after the registration: waiters woken by a closed channel find the key gone
            let tx = tx;
            let _registration = registration;
            let value = load().await;
            tx.send_replace(Some(value));
        })
    }

    async fn wait(rx: &mut watch::Receiver<Option<T>>) -> Option<T> {
        rx.wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|value| (*value).clone())
    }
}

impl<T> Default for FlightGroup<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the load's registration when its task completes or unwinds.
struct Registration<T> {
    calls: Arc<Calls<T>>,
    key: String,
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        self.calls.remove(&self.key);
    }
}
