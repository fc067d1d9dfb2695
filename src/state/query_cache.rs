// ============================================================================
// QUERY CACHE - resultados cacheados, deduplicación por key, invalidación por tags
// ============================================================================
// Un solo hilo (Rc<RefCell>). Los lectores concurrentes de una key comparten
// un único future en curso. Una entrada vive mientras tenga suscriptores.
// ============================================================================

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::{FutureExt, LocalBoxFuture, Shared};

use super::tags::{CacheTag, QueryKey};
use crate::services::error::ApiError;

pub type CachedValue = Rc<dyn Any>;
pub type FetchResult = Result<CachedValue, ApiError>;
type SharedFetch = Shared<LocalBoxFuture<'static, FetchResult>>;
type InvalidateCallback = Rc<dyn Fn()>;

struct CacheEntry {
    value: Option<CachedValue>,
    error: Option<ApiError>,
    tags: Vec<CacheTag>,
    stale: bool,
    in_flight: Option<(u64, SharedFetch)>,
    invalidated_in_flight: bool,
    subscribers: BTreeMap<u64, Option<InvalidateCallback>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn new(tags: Vec<CacheTag>) -> Self {
        Self {
            value: None,
            error: None,
            tags,
            stale: false,
            in_flight: None,
            invalidated_in_flight: false,
            subscribers: BTreeMap::new(),
            fetched_at: None,
        }
    }

    fn fresh_value(&self) -> Option<CachedValue> {
        if self.stale || self.error.is_some() {
            return None;
        }
        self.value.clone()
    }
}

/// Foto de una entrada en un momento dado
#[derive(Clone)]
pub struct EntrySnapshot {
    pub value: Option<CachedValue>,
    pub error: Option<ApiError>,
    pub is_loading: bool,
    pub is_stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub subscribers: usize,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    next_id: u64,
}

impl CacheInner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Rc<RefCell<CacheInner>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un suscriptor en `key`; crea la entrada la primera vez
    pub fn register(&self, key: &QueryKey, tags: Vec<CacheTag>) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        let entry = inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(tags));
        entry.subscribers.insert(id, None);
        id
    }

    pub fn set_invalidate_callback(&self, key: &QueryKey, id: u64, callback: InvalidateCallback) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner
            .entries
            .get_mut(key)
            .and_then(|entry| entry.subscribers.get_mut(&id))
        {
            *slot = Some(callback);
        }
    }

    /// Quita un suscriptor. El último desaloja la entrada; un request en curso
    /// sigue, pero su resultado se descarta.
    pub fn release(&self, key: &QueryKey, id: u64) {
        let mut inner = self.inner.borrow_mut();
        let now_empty = match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.subscribers.remove(&id);
                entry.subscribers.is_empty()
            }
            None => false,
        };
        if now_empty {
            inner.entries.remove(key);
            log::debug!("🗑️ Desalojada {:?}", key);
        }
    }

    /// Devuelve datos frescos de `key`, se une al request en curso o lanza
    /// `fetch` y guarda el resultado.
    pub async fn read<F>(&self, key: &QueryKey, tags: &[CacheTag], fetch: F) -> FetchResult
    where
        F: FnOnce() -> LocalBoxFuture<'static, FetchResult>,
    {
        let (generation, pending) = {
            let mut inner = self.inner.borrow_mut();
            let generation = inner.next_id();
            let entry = inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(tags.to_vec()));

            if let Some(value) = entry.fresh_value() {
                log::debug!("📋 Cache hit {:?}", key);
                return Ok(value);
            }

            match &entry.in_flight {
                Some((in_flight_generation, pending)) => (*in_flight_generation, pending.clone()),
                None => {
                    log::debug!("🔄 Pidiendo {:?}", key);
                    let pending = fetch().shared();
                    entry.in_flight = Some((generation, pending.clone()));
                    entry.invalidated_in_flight = false;
                    entry.tags = tags.to_vec();
                    (generation, pending)
                }
            }
        };

        let result = pending.await;
        self.settle(key, generation, &result);
        result
    }

    /// Guarda un fetch terminado, reemplazando entero el valor o error de la entrada
    fn settle(&self, key: &QueryKey, generation: u64, result: &FetchResult) {
        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.entries.get_mut(key) else {
            log::debug!("Descartando resultado de {:?} (desalojada)", key);
            return;
        };
        if !matches!(entry.in_flight, Some((g, _)) if g == generation) {
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.error = None;
                entry.fetched_at = Some(Utc::now());
            }
            Err(error) => {
                entry.value = None;
                entry.error = Some(error.clone());
            }
        }
        // Invalidada con el request en curso: la respuesta puede ser anterior a la mutation
        entry.stale = entry.invalidated_in_flight;
        entry.invalidated_in_flight = false;
    }

    /// Marca como stale toda entrada con alguno de `tags` y ejecuta los callbacks
    /// de sus suscriptores. Devuelve cuántas entradas se vieron afectadas.
    pub fn invalidate(&self, tags: &[CacheTag]) -> usize {
        if tags.is_empty() {
            return 0;
        }

        let (count, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let mut count = 0;
            let mut callbacks: Vec<InvalidateCallback> = Vec::new();
            for entry in inner.entries.values_mut() {
                if !entry.tags.iter().any(|tag| tags.contains(tag)) {
                    continue;
                }
                count += 1;
                entry.stale = true;
                if entry.in_flight.is_some() {
                    entry.invalidated_in_flight = true;
                }
                callbacks.extend(entry.subscribers.values().flatten().cloned());
            }
            (count, callbacks)
        };

        for callback in callbacks {
            callback();
        }
        count
    }

    pub fn invalidate_key(&self, key: &QueryKey) {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.stale = true;
            if entry.in_flight.is_some() {
                entry.invalidated_in_flight = true;
            }
        }
    }

    pub fn snapshot(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        let inner = self.inner.borrow();
        inner.entries.get(key).map(|entry| EntrySnapshot {
            value: entry.value.clone(),
            error: entry.error.clone(),
            is_loading: entry.in_flight.is_some(),
            is_stale: entry.stale,
            fetched_at: entry.fetched_at,
            subscribers: entry.subscribers.len(),
        })
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Olvida todos los datos cacheados (login/logout). Las entradas sin
    /// suscriptores se eliminan; las demás se vacían y quedan stale para que los
    /// handles vivos conserven su registro. Los requests en curso se descartan.
    pub fn reset(&self) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.entries.retain(|_, entry| !entry.subscribers.is_empty());
            let mut callbacks: Vec<InvalidateCallback> = Vec::new();
            for entry in inner.entries.values_mut() {
                entry.value = None;
                entry.error = None;
                entry.in_flight = None;
                entry.invalidated_in_flight = false;
                entry.fetched_at = None;
                entry.stale = true;
                callbacks.extend(entry.subscribers.values().flatten().cloned());
            }
            callbacks
        };

        for callback in callbacks {
            callback();
        }
        log::info!("🗑️ Query cache vaciada");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    fn counted_fetch(counter: Rc<Cell<usize>>, value: u32) -> impl FnOnce() -> LocalBoxFuture<'static, FetchResult> {
        move || {
            async move {
                counter.set(counter.get() + 1);
                Ok(Rc::new(value) as CachedValue)
            }
            .boxed_local()
        }
    }

    fn as_u32(value: CachedValue) -> u32 {
        *value.downcast::<u32>().unwrap()
    }

    #[test]
    fn fresh_entries_are_served_from_cache() {
        let cache = QueryCache::new();
        let calls = Rc::new(Cell::new(0));
        let tags = [CacheTag::Leaderboard];
        let id = cache.register(&QueryKey::Leaderboard, tags.to_vec());

        let first = block_on(cache.read(&QueryKey::Leaderboard, &tags, counted_fetch(calls.clone(), 7)));
        let second = block_on(cache.read(&QueryKey::Leaderboard, &tags, counted_fetch(calls.clone(), 8)));

        assert_eq!(as_u32(first.unwrap()), 7);
        assert_eq!(as_u32(second.unwrap()), 7);
        assert_eq!(calls.get(), 1);
        cache.release(&QueryKey::Leaderboard, id);
    }

    #[test]
    fn invalidation_forces_refetch_and_notifies() {
        let cache = QueryCache::new();
        let calls = Rc::new(Cell::new(0));
        let notified = Rc::new(Cell::new(0));
        let tags = [CacheTag::Clues("lisbon".to_string())];
        let key = QueryKey::CluesForCity {
            city_id: "lisbon".to_string(),
        };
        let id = cache.register(&key, tags.to_vec());
        let seen = notified.clone();
        cache.set_invalidate_callback(&key, id, Rc::new(move || seen.set(seen.get() + 1)));

        block_on(cache.read(&key, &tags, counted_fetch(calls.clone(), 1))).unwrap();
        assert_eq!(cache.invalidate(&[CacheTag::Clues("porto".to_string())]), 0);
        assert_eq!(cache.invalidate(&[CacheTag::Clues("lisbon".to_string())]), 1);
        assert!(cache.snapshot(&key).unwrap().is_stale);
        assert_eq!(notified.get(), 1);

        let refreshed = block_on(cache.read(&key, &tags, counted_fetch(calls.clone(), 2))).unwrap();
        assert_eq!(as_u32(refreshed), 2);
        assert_eq!(calls.get(), 2);
        assert!(!cache.snapshot(&key).unwrap().is_stale);
    }

    #[test]
    fn last_release_evicts() {
        let cache = QueryCache::new();
        let a = cache.register(&QueryKey::Friends, vec![CacheTag::Friends]);
        let b = cache.register(&QueryKey::Friends, vec![CacheTag::Friends]);

        cache.release(&QueryKey::Friends, a);
        assert!(cache.contains(&QueryKey::Friends));
        cache.release(&QueryKey::Friends, b);
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_replace_value_and_are_not_cached() {
        let cache = QueryCache::new();
        let tags = [CacheTag::Profile];
        let _id = cache.register(&QueryKey::Profile, tags.to_vec());

        let failed = block_on(cache.read(&QueryKey::Profile, &tags, || {
            async {
                Err::<CachedValue, _>(ApiError::Http {
                    status: 503,
                    message: None,
                    body: None,
                })
            }
            .boxed_local()
        }));
        assert!(failed.is_err());
        let snapshot = cache.snapshot(&QueryKey::Profile).unwrap();
        assert!(snapshot.value.is_none());
        assert!(snapshot.error.is_some());

        let calls = Rc::new(Cell::new(0));
        let recovered = block_on(cache.read(&QueryKey::Profile, &tags, counted_fetch(calls.clone(), 3)));
        assert_eq!(as_u32(recovered.unwrap()), 3);
        assert!(cache.snapshot(&QueryKey::Profile).unwrap().error.is_none());
    }

    #[test]
    fn reset_keeps_live_subscribers() {
        let cache = QueryCache::new();
        let calls = Rc::new(Cell::new(0));
        let tags = [CacheTag::Friends];
        let held = cache.register(&QueryKey::Friends, tags.to_vec());
        let notified = Rc::new(Cell::new(0));
        let seen = notified.clone();
        cache.set_invalidate_callback(&QueryKey::Friends, held, Rc::new(move || seen.set(seen.get() + 1)));
        block_on(cache.read(&QueryKey::Friends, &tags, counted_fetch(calls.clone(), 1))).unwrap();
        // Lectura sin suscriptor: nadie retiene esta entrada
        block_on(cache.read(&QueryKey::Leaderboard, &[CacheTag::Leaderboard], counted_fetch(calls.clone(), 9))).unwrap();
        assert_eq!(cache.len(), 2);

        cache.reset();

        let snapshot = cache.snapshot(&QueryKey::Friends).unwrap();
        assert!(snapshot.value.is_none());
        assert!(snapshot.is_stale);
        assert_eq!(snapshot.subscribers, 1);
        assert_eq!(notified.get(), 1);
        assert_eq!(cache.len(), 1);

        assert!(!cache.contains(&QueryKey::Leaderboard));

        let refetched = block_on(cache.read(&QueryKey::Friends, &tags, counted_fetch(calls.clone(), 2))).unwrap();
        assert_eq!(as_u32(refetched), 2);
        assert_eq!(calls.get(), 3);
    }
}
