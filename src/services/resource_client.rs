// ============================================================================
// RESOURCE CLIENT - queries y mutations tipadas sobre la query cache
// ============================================================================

use std::any::Any;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::FutureExt;
use serde::de::DeserializeOwned;

use super::api_client::ApiClient;
use super::error::{ApiError, ApiResult};
use super::http::ApiRequest;
use crate::state::query_cache::{CachedValue, QueryCache};
use crate::state::tags::{CacheTag, QueryKey};

/// Lectura cuyo resultado se cachea bajo `key()`
pub trait Query {
    type Output: DeserializeOwned + 'static;

    fn key(&self) -> QueryKey;
    fn request(&self) -> ApiRequest;
    fn provides(&self) -> Vec<CacheTag>;
}

/// Escritura; si va bien, toda entrada con un tag de `invalidates()` queda stale
pub trait Mutation {
    type Output: DeserializeOwned;

    fn request(&self) -> ApiRequest;
    fn invalidates(&self) -> Vec<CacheTag>;
}

#[derive(Clone)]
pub struct ResourceClient {
    api: ApiClient,
    cache: QueryCache,
}

impl ResourceClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Registra interés en `query`. La entrada vive hasta que cae el último handle.
    pub fn subscribe<Q: Query>(&self, query: Q) -> QueryHandle<Q> {
        let key = query.key();
        let id = self.cache.register(&key, query.provides());
        QueryHandle {
            client: self.clone(),
            query,
            key,
            id,
        }
    }

    /// Lectura puntual: suscribir, leer, liberar
    pub async fn fetch<Q: Query>(&self, query: Q) -> ApiResult<Rc<Q::Output>> {
        let handle = self.subscribe(query);
        handle.get().await
    }

    pub async fn mutate<M: Mutation>(&self, mutation: &M) -> ApiResult<M::Output> {
        let output = self.api.execute::<M::Output>(mutation.request()).await?;
        let tags = mutation.invalidates();
        let stale = self.cache.invalidate(&tags);
        if stale > 0 {
            log::debug!("🔄 {} entradas de caché invalidadas por {:?}", stale, tags);
        }
        Ok(output)
    }

    pub fn reset(&self) {
        self.cache.reset();
    }
}

/// Estado de una query suscrita, para renderizar
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Rc<T>>,
    pub error: Option<ApiError>,
    pub is_loading: bool,
    pub is_stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_stale: false,
            fetched_at: None,
        }
    }
}

/// Suscripción viva a una query. Al hacer drop se libera.
pub struct QueryHandle<Q: Query> {
    client: ResourceClient,
    query: Q,
    key: QueryKey,
    id: u64,
}

impl<Q: Query> QueryHandle<Q> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Datos en caché si están frescos; si no, se une al request en curso
    /// de esta key o lo inicia.
    pub async fn get(&self) -> ApiResult<Rc<Q::Output>> {
        let api = self.client.api.clone();
        let request = self.query.request();
        let tags = self.query.provides();

        let value = self
            .client
            .cache
            .read(&self.key, &tags, move || {
                async move {
                    api.execute::<Q::Output>(request)
                        .await
                        .map(|output| Rc::new(output) as CachedValue)
                }
                .boxed_local()
            })
            .await?;

        downcast::<Q::Output>(value, &self.key)
    }

    /// Marca la entrada como stale y la vuelve a leer
    pub async fn refetch(&self) -> ApiResult<Rc<Q::Output>> {
        self.client.cache.invalidate_key(&self.key);
        self.get().await
    }

    pub fn state(&self) -> QueryState<Q::Output> {
        let Some(snapshot) = self.client.cache.snapshot(&self.key) else {
            return QueryState::default();
        };
        QueryState {
            data: snapshot.value.and_then(|value| value.downcast::<Q::Output>().ok()),
            error: snapshot.error,
            is_loading: snapshot.is_loading,
            is_stale: snapshot.is_stale,
            fetched_at: snapshot.fetched_at,
        }
    }

    /// Ejecuta `callback` cada vez que una mutation deja esta entrada stale
    pub fn on_invalidate<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.client
            .cache
            .set_invalidate_callback(&self.key, self.id, Rc::new(callback));
    }
}

impl<Q: Query> Drop for QueryHandle<Q> {
    fn drop(&mut self) {
        self.client.cache.release(&self.key, self.id);
    }
}

fn downcast<T: Any>(value: CachedValue, key: &QueryKey) -> ApiResult<Rc<T>> {
    value.downcast::<T>().map_err(|_| ApiError::Parse {
        original_status: 200,
        message: format!("cached value for {:?} has an unexpected type", key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, ChatRoom, LeaderboardEntry};
    use crate::services::endpoints::{ChatMessages, CreateChatRoom, Leaderboard, SendMessage};
    use crate::test_support::harness;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::Cell;

    fn leaderboard_body(points: u64) -> serde_json::Value {
        json!([{ "rank": 1, "userId": "u1", "displayName": "Ana", "points": points }])
    }

    fn message_body(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "roomId": "r1",
            "senderId": "u1",
            "body": "hi",
            "sentAt": "2026-01-01T10:00:00Z"
        })
    }

    #[test]
    fn fresh_data_needs_no_network_call() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport.respond_json(200, leaderboard_body(10));

        let handle = client.subscribe(Leaderboard);
        let first = block_on(handle.get()).unwrap();
        let second = block_on(handle.get()).unwrap();

        assert_eq!(first[0].points, 10);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(h.transport.calls(), 1);
    }

    #[test]
    fn concurrent_subscribers_share_one_request() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport.respond_json(200, leaderboard_body(42));
        let gate = h.transport.hold();

        let a = client.subscribe(Leaderboard);
        let b = client.subscribe(Leaderboard);
        let c = client.subscribe(Leaderboard);

        let (ra, rb, rc, _) = block_on(async {
            futures::join!(a.get(), b.get(), c.get(), async {
                let _ = gate.send(());
            })
        });

        assert_eq!(h.transport.calls(), 1);
        let ra: Rc<Vec<LeaderboardEntry>> = ra.unwrap();
        assert_eq!(ra[0].points, 42);
        assert!(Rc::ptr_eq(&ra, &rb.unwrap()));
        assert!(Rc::ptr_eq(&ra, &rc.unwrap()));
    }

    #[test]
    fn mutation_marks_tagged_entries_stale() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        let messages = client.subscribe(ChatMessages {
            room_id: "r1".to_string(),
        });
        let leaderboard = client.subscribe(Leaderboard);
        let invalidated = Rc::new(Cell::new(false));
        let flag = invalidated.clone();
        messages.on_invalidate(move || flag.set(true));

        h.transport
            .respond_json(200, json!([message_body("m1")]))
            .respond_json(200, leaderboard_body(1));
        block_on(messages.get()).unwrap();
        block_on(leaderboard.get()).unwrap();

        h.transport.respond_json(201, message_body("m2"));
        let sent: ChatMessage = block_on(client.mutate(&SendMessage {
            room_id: "r1".to_string(),
            body: "hi".to_string(),
        }))
        .unwrap();
        assert_eq!(sent.id, "m2");

        assert!(invalidated.get());
        assert!(messages.state().is_stale);
        assert!(!leaderboard.state().is_stale);

        h.transport
            .respond_json(200, json!([message_body("m1"), message_body("m2")]));
        let refreshed = block_on(messages.get()).unwrap();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(h.transport.calls(), 4);

        block_on(leaderboard.get()).unwrap();
        assert_eq!(h.transport.calls(), 4);
    }

    #[test]
    fn failed_mutation_invalidates_nothing() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        let rooms = client.subscribe(crate::services::endpoints::ChatRooms);
        h.transport
            .respond_json(200, json!([]))
            .respond_json(400, json!({ "message": "name required" }));
        block_on(rooms.get()).unwrap();

        let result: ApiResult<ChatRoom> = block_on(client.mutate(&CreateChatRoom {
            name: String::new(),
            member_ids: vec![],
        }));

        assert_eq!(result.unwrap_err().status(), Some(400));
        assert!(!rooms.state().is_stale);
    }

    #[test]
    fn dropping_last_handle_evicts_entry() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport
            .respond_json(200, leaderboard_body(1))
            .respond_json(200, leaderboard_body(2));

        let first = block_on(client.fetch(Leaderboard)).unwrap();
        assert!(client.cache().is_empty());

        let second = block_on(client.fetch(Leaderboard)).unwrap();
        assert_eq!(first[0].points, 1);
        assert_eq!(second[0].points, 2);
        assert_eq!(h.transport.calls(), 2);
    }

    #[test]
    fn invalidation_during_flight_leaves_entry_stale() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport.respond_json(200, leaderboard_body(1));
        let gate = h.transport.hold();
        let handle = client.subscribe(Leaderboard);

        let (result, _) = block_on(async {
            futures::join!(handle.get(), async {
                client.cache().invalidate(&[CacheTag::Leaderboard]);
                let _ = gate.send(());
            })
        });

        assert!(result.is_ok());
        let state = handle.state();
        assert!(state.is_stale);
        assert!(state.data.is_some());
        assert!(!state.is_loading);
    }

    #[test]
    fn state_reports_errors() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport.respond_json(503, json!({ "message": "maintenance" }));
        let handle = client.subscribe(Leaderboard);

        assert!(block_on(handle.get()).is_err());

        let state = handle.state();
        assert!(state.data.is_none());
        assert_eq!(state.error.unwrap().status(), Some(503));
    }

    #[test]
    fn refetch_goes_to_network() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport
            .respond_json(200, leaderboard_body(1))
            .respond_json(200, leaderboard_body(5));
        let handle = client.subscribe(Leaderboard);

        block_on(handle.get()).unwrap();
        let refreshed = block_on(handle.refetch()).unwrap();

        assert_eq!(refreshed[0].points, 5);
        assert_eq!(h.transport.calls(), 2);
    }

    #[test]
    fn live_handle_survives_reset() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport
            .respond_json(200, leaderboard_body(1))
            .respond_json(200, leaderboard_body(2));
        let board = client.subscribe(Leaderboard);
        let invalidations = Rc::new(Cell::new(0));
        let counter = invalidations.clone();
        board.on_invalidate(move || counter.set(counter.get() + 1));
        block_on(board.get()).unwrap();

        client.reset();
        assert!(board.state().data.is_none());
        assert_eq!(invalidations.get(), 1);

        let after = block_on(board.get()).unwrap();
        assert_eq!(after[0].points, 2);

        // Un suscriptor efímero no puede desalojar la entrada que el board sigue usando
        drop(client.subscribe(Leaderboard));
        assert!(client.cache().contains(&QueryKey::Leaderboard));

        client.cache().invalidate(&[CacheTag::Leaderboard]);
        assert_eq!(invalidations.get(), 2);

        drop(board);
        assert!(client.cache().is_empty());
    }

    #[test]
    fn result_landing_after_reset_is_discarded() {
        let h = harness();
        let client = ResourceClient::new(h.api.clone());
        h.transport
            .respond_json(200, leaderboard_body(3))
            .respond_json(200, leaderboard_body(4));
        let gate = h.transport.hold();

        let (one_shot, _) = block_on(async {
            futures::join!(client.fetch(Leaderboard), async {
                client.reset();
                let _ = gate.send(());
            })
        });

        assert_eq!(one_shot.unwrap()[0].points, 3);
        assert!(client.cache().is_empty());

        let board = client.subscribe(Leaderboard);
        let gate = h.transport.hold();
        let (held, _) = block_on(async {
            futures::join!(board.get(), async {
                client.reset();
                let _ = gate.send(());
            })
        });

        assert_eq!(held.unwrap()[0].points, 4);
        let state = board.state();
        assert!(state.data.is_none());
        assert!(state.is_stale);
        assert!(!state.is_loading);
    }
}
