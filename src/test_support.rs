// Dobles de test compartidos por los módulos de tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Once;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::{Level, LevelFilter, Log, Metadata, Record};
use url::Url;

use crate::models::Credential;
use crate::services::api_client::ApiClient;
use crate::services::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::state::auth_state::CredentialStore;
use crate::storage::{KeyValueStorage, MemoryStorage, StorageError};

pub const BASE_URL: &str = "https://api.test.local";

/// Storage en el que todas las operaciones fallan
pub struct FailingStorage;

impl KeyValueStorage for FailingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read {
            key: key.to_string(),
            message: "disk unavailable".to_string(),
        })
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_string(),
            message: "disk full".to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_string(),
            message: "disk full".to_string(),
        })
    }
}

/// Storage en memoria que puede rechazar las escrituras de una key
#[derive(Clone, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing_key: Rc<RefCell<Option<String>>>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        *self.failing_key.borrow_mut() = Some(key.to_string());
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }
}

impl KeyValueStorage for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing_key.borrow().as_deref() == Some(key) {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

type Scripted = Result<HttpResponse, TransportError>;

/// Transporte que responde desde una cola de respuestas y registra cada
/// request. `hold()` retiene los envíos hasta que se dispara el sender devuelto.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Rc<RefCell<VecDeque<Scripted>>>,
    requests: Rc<RefCell<Vec<HttpRequest>>>,
    gate: Rc<RefCell<Option<Shared<oneshot::Receiver<()>>>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.respond_raw(status, body.to_string().into_bytes())
    }

    pub fn respond_raw(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError(message.to_string())));
        self
    }

    pub fn hold(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.gate.borrow_mut() = Some(receiver.shared());
        sender
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        self.requests.borrow_mut().push(request);
        let responses = self.responses.clone();
        let gate = self.gate.borrow().clone();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
        }
        .boxed_local()
    }
}

pub struct Harness {
    pub transport: ScriptedTransport,
    pub storage: MemoryStorage,
    pub credentials: CredentialStore,
    pub api: ApiClient,
}

pub fn harness() -> Harness {
    let transport = ScriptedTransport::new();
    let storage = MemoryStorage::new();
    let credentials = CredentialStore::new(Rc::new(storage.clone()));
    let api = ApiClient::new(
        Url::parse(BASE_URL).unwrap(),
        Rc::new(transport.clone()),
        credentials.clone(),
    );
    Harness {
        transport,
        storage,
        credentials,
        api,
    }
}

pub fn credential(token: &str) -> Credential {
    Credential {
        access_token: token.to_string(),
        refresh_token: "refresh".to_string(),
        role: "player".to_string(),
    }
}

// Captura de logs: un logger global, registros por hilo de test

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT_LOGGER: Once = Once::new();

pub fn capture_logs() {
    INIT_LOGGER.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

pub fn logged_errors() -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, message)| message.clone())
            .collect()
    })
}
