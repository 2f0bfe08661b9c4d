//! Application constants
//!
//! Single source of truth for paths, wire identifiers and other constants.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/ardf.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Uri under which the server exposes its ARDF index as a resource
pub const ARDF_INDEX_URI: &str = "ardf://index";

/// Media type of a serialized ARDF index and the default descriptor media type
pub const ARDF_MEDIA_TYPE: &str = "application/vnd.ardf+json";

/// ARDF format version stamped on descriptors and listings
pub const ARDF_VERSION: &str = "1.0";

/// Default Gemini API path
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

/// Default bind address of the JSON-RPC server
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default timeout applied to outbound HTTP calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
