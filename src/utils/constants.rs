// Keys de storage y valores fijos compartidos por el cliente

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// Bearer token que se añade a cada request
pub const STORAGE_KEY_ACCESS_TOKEN: &str = "accessToken";
pub const STORAGE_KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const STORAGE_KEY_ROLE: &str = "role";

/// Selección "home" persistida (id + nombre)
pub const STORAGE_KEY_HOME: &str = "persist:home";

pub const DEFAULT_DEEP_LINK_SCHEME: &str = "treasurehunt";

/// Host de los deep links de resultado de pago
pub const PAYMENT_CALLBACK_HOST: &str = "payment-callback";

/// Caracteres escapados dentro de un segmento de path (los no reservados quedan legibles)
pub const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');
