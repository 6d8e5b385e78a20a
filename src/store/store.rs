use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};

use super::StoreError;

new_key_type! {
    /// Handle returned by [`Store::subscribe`], accepted by [`Store::unsubscribe`].
    pub struct SubscriptionId;
}

type Subscriber<V> = Arc<dyn Fn(&V) + Send + Sync>;

struct Entry<V> {
    key: String,
    callback: Subscriber<V>,
}

struct Inner<V> {
    // Declared keys in declaration order. Never grows or shrinks.
    state: IndexMap<String, V>,
    subscribers: SlotMap<SubscriptionId, Entry<V>>,
    // Per-key subscription order.
    observers: HashMap<String, Vec<SubscriptionId>>,
}

impl<V> Inner<V> {
    fn subscribers_for(&self, key: &str) -> Vec<Subscriber<V>> {
        self.observers
            .get(key)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.subscribers.get(*id))
                    .map(|entry| Arc::clone(&entry.callback))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A keyed reactive store.
///
/// The set of keys is fixed when the store is created. Writing a key
/// updates its value and then synchronously calls every subscriber of
/// that key, in the order they subscribed, with the new value.
///
/// Cloning a `Store` yields another handle to the same state.
///
/// # Examples
///
/// ```
/// use heropy::Store;
/// use std::sync::{Arc, Mutex};
///
/// let store = Store::new([("message", String::from("hello"))]);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let seen_clone = seen.clone();
/// store.subscribe("message", move |value: &String| {
///     seen_clone.lock().unwrap().push(value.clone());
/// });
///
/// store.set("message", "world".to_string()).unwrap();
/// assert_eq!(store.get("message").as_deref(), Some("world"));
/// assert_eq!(*seen.lock().unwrap(), vec!["world".to_string()]);
/// ```
pub struct Store<V> {
    inner: Arc<RwLock<Inner<V>>>,
}

impl<V: Clone> Store<V> {
    /// Create a store whose keys are exactly the keys of `initial`.
    ///
    /// Later duplicates of a key overwrite earlier values but keep the
    /// position of the first occurrence.
    pub fn new<I, K>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let state = initial
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(Inner {
                state,
                subscribers: SlotMap::with_key(),
                observers: HashMap::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a clone of the current value of `key`.
    ///
    /// Returns `None` only when `key` was never declared.
    pub fn get(&self, key: &str) -> Option<V> {
        self.read().state.get(key).cloned()
    }

    /// Read the value of `key` without cloning it.
    ///
    /// # Deadlocks
    ///
    /// `f` runs while the store's lock is held. Calling back into this
    /// store (or any clone of it) from inside `f` may deadlock; copy what
    /// is needed out of `f` and make further store calls afterwards.
    pub fn with<F, R>(&self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        self.read().state.get(key).map(f)
    }

    /// Write `value` to `key` and notify the key's subscribers.
    ///
    /// The stored value is updated before the first subscriber runs. A
    /// subscriber that panics is logged and skipped; the remaining
    /// subscribers still run and the panic does not reach the caller.
    pub fn set(&self, key: &str, value: V) -> Result<(), StoreError> {
        let subscribers = {
            let mut inner = self.write();
            let slot = inner
                .state
                .get_mut(key)
                .ok_or_else(|| StoreError::UndeclaredKey(key.to_string()))?;
            *slot = value.clone();
            inner.subscribers_for(key)
        };

        notify(key, &subscribers, &value);
        Ok(())
    }

    /// Apply `f` to a copy of the value of `key`, store the result, then
    /// notify the key's subscribers.
    ///
    /// No lock is held while `f` runs, so `f` may read or write the store.
    /// A write to `key` made from inside `f` is overwritten by the result.
    pub fn update<F>(&self, key: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut V),
    {
        let mut value = self
            .get(key)
            .ok_or_else(|| StoreError::UndeclaredKey(key.to_string()))?;
        f(&mut value);
        self.set(key, value)
    }

    /// Subscribe to writes of `key`.
    ///
    /// Subscriptions accumulate; each one is called once per write, in
    /// subscription order. Subscribing to a key the store was not created
    /// with is allowed, but such a subscriber is never called because the
    /// key can never be written. Use [`Store::try_subscribe`] to reject
    /// those keys instead.
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        let key = key.into();
        let mut inner = self.write();
        if !inner.state.contains_key(&key) {
            tracing::warn!(key = %key, "subscribed to undeclared store key, callback will never fire");
        }

        let id = inner.subscribers.insert(Entry {
            key: key.clone(),
            callback: Arc::new(callback),
        });
        inner.observers.entry(key).or_default().push(id);
        id
    }

    /// Like [`Store::subscribe`], but fails for keys the store was not
    /// created with.
    pub fn try_subscribe<F>(
        &self,
        key: impl Into<String>,
        callback: F,
    ) -> Result<SubscriptionId, StoreError>
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        let key = key.into();
        if !self.contains_key(&key) {
            return Err(StoreError::UndeclaredKey(key));
        }
        Ok(self.subscribe(key, callback))
    }

    /// Remove a subscription. Returns `false` if it was already removed.
    ///
    /// Other subscribers of the same key keep their relative order. A write
    /// fixes its list of subscribers before the first one runs, so a
    /// subscription removed during a fan-out is still called for that
    /// write and for none after it.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        // The entry is dropped after the lock is released.
        let removed = {
            let mut inner = self.write();
            let removed = inner.subscribers.remove(id);
            if let Some(entry) = &removed {
                if let Some(ids) = inner.observers.get_mut(&entry.key) {
                    ids.retain(|other| *other != id);
                }
            }
            removed
        };
        removed.is_some()
    }

    /// Number of live subscriptions for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.read().observers.get(key).map_or(0, Vec::len)
    }

    /// Check whether `key` was declared at construction.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().state.contains_key(key)
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.read().state.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every key and value, in declaration order.
    pub fn snapshot(&self) -> IndexMap<String, V> {
        self.read().state.clone()
    }

    /// A handle that can read and subscribe but not write.
    pub fn reader(&self) -> StoreReader<V> {
        StoreReader {
            store: self.clone(),
        }
    }
}

impl<V: Clone + Serialize> Store<V> {
    /// Serialize the current state as a JSON object.
    pub fn to_json(&self) -> Result<Value, StoreError> {
        serde_json::to_value(self.snapshot()).map_err(|e| StoreError::Serialize(e.to_string()))
    }
}

impl Store<Value> {
    /// Create a JSON-valued store with one key per field of `state`.
    ///
    /// ```
    /// use heropy::Store;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct State {
    ///     search_text: String,
    ///     page: u32,
    /// }
    ///
    /// let store: Store<serde_json::Value> = Store::from_state(&State { search_text: String::new(), page: 1 }).unwrap();
    /// assert_eq!(store.keys(), vec!["search_text", "page"]);
    /// ```
    pub fn from_state<S>(state: &S) -> Result<Self, StoreError>
    where
        S: Serialize + ?Sized,
    {
        match serde_json::to_value(state).map_err(|e| StoreError::Serialize(e.to_string()))? {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(StoreError::NotAnObject(json_kind(&other))),
        }
    }
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Store")
            .field("keys", &inner.state.keys().collect::<Vec<_>>())
            .field("subscriptions", &inner.subscribers.len())
            .finish()
    }
}

/// Read-only view of a [`Store`].
///
/// Views that only display state should hold one of these instead of the
/// store itself.
pub struct StoreReader<V> {
    store: Store<V>,
}

impl<V: Clone> StoreReader<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.get(key)
    }

    pub fn with<F, R>(&self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        self.store.with(key, f)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.store.subscribe(key, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}

impl<V> Clone for StoreReader<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<V> fmt::Debug for StoreReader<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreReader").field(&self.store).finish()
    }
}

fn notify<V>(key: &str, subscribers: &[Subscriber<V>], value: &V) {
    for (position, subscriber) in subscribers.iter().enumerate() {
        if catch_unwind(AssertUnwindSafe(|| subscriber(value))).is_err() {
            tracing::error!(key, position, "store subscriber panicked");
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct AppState {
        search_text: String,
        page: u32,
        movies: Vec<String>,
    }

    fn movie_store() -> Store<Value> {
        Store::from_state(&AppState {
            search_text: String::new(),
            page: 1,
            movies: Vec::new(),
        })
        .unwrap()
    }

    #[test]
    fn store_get_set() {
        let store = Store::new([("count", 0), ("total", 10)]);

        assert_eq!(store.get("count"), Some(0));

        store.set("count", 42).unwrap();

        assert_eq!(store.get("count"), Some(42));
        assert_eq!(store.get("total"), Some(10));
    }

    #[test]
    fn store_set_undeclared_key_fails() {
        let store = Store::new([("count", 0)]);

        let err = store.set("missing", 1).unwrap_err();

        assert_eq!(err, StoreError::UndeclaredKey("missing".to_string()));
        assert!(!store.contains_key("missing"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_update() {
        let store = Store::new([("count", 0)]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        store.subscribe("count", move |v| seen_clone.lock().unwrap().push(*v));

        store.update("count", |n| *n += 10).unwrap();
        store.update("count", |n| *n += 1).unwrap();

        assert_eq!(store.get("count"), Some(11));
        assert_eq!(*seen.lock().unwrap(), vec![10, 11]);
    }

    #[test]
    fn store_subscribers_run_in_order() {
        let store = Store::new([("page", 1)]);
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = calls.clone();
            store.subscribe("page", move |v: &i32| {
                calls.lock().unwrap().push((name, *v));
            });
        }

        store.set("page", 2).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![("first", 2), ("second", 2), ("third", 2)]
        );
    }

    #[test]
    fn store_subscriber_sees_new_value_in_store() {
        let store = Store::new([("page", 1)]);
        let observed = Arc::new(AtomicUsize::new(0));

        let store_clone = store.clone();
        let observed_clone = observed.clone();
        store.subscribe("page", move |_| {
            let current = store_clone.get("page").unwrap();
            observed_clone.store(current as usize, Ordering::SeqCst);
        });

        store.set("page", 7).unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn store_panicking_subscriber_does_not_stop_fan_out() {
        let store = Store::new([("page", 1)]);
        let after = Arc::new(AtomicUsize::new(0));

        store.subscribe("page", |_| panic!("subscriber failure"));
        let after_clone = after.clone();
        store.subscribe("page", move |_| {
            after_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.set("page", 2).unwrap();

        assert_eq!(store.get("page"), Some(2));
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn store_subscriber_can_write_reentrantly() {
        let store = Store::new([("search_text", json!("")), ("page", json!(5))]);

        let store_clone = store.clone();
        store.subscribe("search_text", move |_| {
            store_clone.set("page", json!(1)).unwrap();
        });

        store.set("search_text", json!("frozen")).unwrap();
        assert_eq!(store.get("page"), Some(json!(1)));
        assert_eq!(store.get("search_text"), Some(json!("frozen")));
    }

    #[test]
    fn store_update_closure_can_use_store() {
        let store = Store::new([("count", 2), ("step", 3)]);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        store.subscribe("count", move |v| seen_clone.lock().unwrap().push(*v));

        let store_clone = store.clone();
        store
            .update("count", |n| *n += store_clone.get("step").unwrap_or(0))
            .unwrap();

        let store_clone = store.clone();
        store
            .update("count", |n| {
                store_clone.set("step", 10).unwrap();
                *n += store_clone.get("step").unwrap_or(0);
            })
            .unwrap();

        assert_eq!(store.get("count"), Some(15));
        assert_eq!(*seen.lock().unwrap(), vec![5, 15]);
    }

    #[test]
    fn store_with_reads_without_cloning() {
        let store = Store::new([("movies", vec!["Frozen".to_string(), "Up".to_string()])]);

        // Copy what is needed out of `with`, then touch the store again.
        let first = store.with("movies", |movies| movies.first().cloned()).flatten();
        store.update("movies", |movies| movies.clear()).unwrap();

        assert_eq!(first.as_deref(), Some("Frozen"));
        assert_eq!(store.with("movies", Vec::len), Some(0));
        assert_eq!(store.with("ghost", Vec::len), None);
    }

    #[test]
    fn store_unsubscribe_during_fan_out_applies_to_next_write() {
        let store = Store::new([("page", 0)]);
        let hits = Arc::new(AtomicUsize::new(0));
        let later = Arc::new(Mutex::new(None));

        let store_clone = store.clone();
        let later_clone = later.clone();
        store.subscribe("page", move |_| {
            if let Some(id) = later_clone.lock().unwrap().take() {
                store_clone.unsubscribe(id);
            }
        });
        let hits_clone = hits.clone();
        let id = store.subscribe("page", move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        *later.lock().unwrap() = Some(id);

        store.set("page", 1).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count("page"), 1);

        store.set("page", 2).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn store_unsubscribe_keeps_remaining_order() {
        let store = Store::new([("page", 0)]);
        let calls = Arc::new(Mutex::new(Vec::new()));

        let ids: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let calls = calls.clone();
                store.subscribe("page", move |_| calls.lock().unwrap().push(name))
            })
            .collect();

        assert!(store.unsubscribe(ids[1]));
        assert!(!store.unsubscribe(ids[1]));
        assert_eq!(store.subscriber_count("page"), 2);

        store.set("page", 1).unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn store_dormant_subscription_never_fires() {
        let store = Store::new([("page", 0)]);
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        store.subscribe("ghost", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(store.subscriber_count("ghost"), 1);
        assert!(store.set("ghost", 1).is_err());
        store.set("page", 1).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn store_try_subscribe_rejects_undeclared_key() {
        let store = Store::new([("page", 0)]);

        assert_eq!(
            store.try_subscribe("ghost", |_| {}).unwrap_err(),
            StoreError::UndeclaredKey("ghost".to_string())
        );
        assert!(store.try_subscribe("page", |_| {}).is_ok());
        assert_eq!(store.subscriber_count("ghost"), 0);
    }

    #[test]
    fn store_from_state_keeps_field_order() {
        let store = movie_store();

        assert_eq!(store.keys(), vec!["search_text", "page", "movies"]);
        assert_eq!(store.get("page"), Some(json!(1)));

        store.set("movies", json!(["Frozen"])).unwrap();
        assert_eq!(
            store.to_json().unwrap(),
            json!({ "search_text": "", "page": 1, "movies": ["Frozen"] })
        );
    }

    #[test]
    fn store_from_state_rejects_non_object() {
        let err = Store::<Value>::from_state(&[1, 2, 3]).unwrap_err();
        assert_eq!(err, StoreError::NotAnObject("an array"));
    }

    #[test]
    fn store_reader_reads_and_subscribes() {
        let store = movie_store();
        let reader = store.reader();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        reader.subscribe("search_text", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.set("search_text", json!("frozen")).unwrap();

        assert_eq!(reader.get("search_text"), Some(json!("frozen")));
        assert_eq!(reader.with("page", |v| v.as_u64()), Some(Some(1)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
