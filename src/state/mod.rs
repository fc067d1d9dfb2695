// ============================================================================
// STATE MODULE - estado Rc<RefCell>: credencial, query cache, slice persistido
// ============================================================================

pub mod app_state;
pub mod auth_state;
pub mod persisted;
pub mod query_cache;
pub mod reactivity;
pub mod tags;

pub use app_state::AppContext;
pub use auth_state::CredentialStore;
pub use persisted::PersistedSlice;
pub use query_cache::QueryCache;
pub use reactivity::{ReactiveState, SubscriptionId};
pub use tags::{CacheTag, QueryKey};
