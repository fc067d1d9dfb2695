// ============================================================================
// ROUTING - pantallas de la app y deep links
// ============================================================================

pub mod deep_link;

pub use deep_link::{DeepLinkError, DeepLinkRouter, PaymentCallback, PaymentStatus, Route};
