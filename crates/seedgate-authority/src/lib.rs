//! Seed Authority Server
//!
//! The authority is the trusted half of the seed protocol:
//! - Issues signed seeds to authenticated principals for allowlisted hashes
//! - Validates seeds presented back with a sign request
//! - Mints time-limited signed URLs for validated requests
//!
//! Every check can be enforced or merely logged through
//! [`EnforcementPolicy`], so new checks can be rolled out gradually.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /seed` - Issue a seed for the authenticated requestor
//! - `POST /sign` - Validate a seed and return a signed URL
//!
//! All failures answer HTTP 500 with `{"Status": ..., "ErrorCode": ...}`.

pub mod api;
pub mod config;
pub mod core;
pub mod keys;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{AuthorityConfig, ConfigError, EnforcementPolicy, ServerSettings};
pub use crate::core::{
    AllowlistLoader, AllowlistSource, AuthorityError, CachedAllowlist, Clock, FixedClock,
    SeedIssuer, SignRequestValidator, SignedUrlMinter, SystemClock,
};
pub use keys::{IdentityService, LocalIdentity};
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectStore, QuerySignedUrls, UrlSigningPlatform};
