//! # Roster Core
//!
//! Core types for the Roster user service.
//!
//! This crate provides the foundational types used throughout Roster:
//!
//! - [`RequestContext`] - Immutable per-request context carrying the request ID and identity
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Identity`] / [`TokenRegistry`] - Authenticated caller (username, role) and the token allow-list
//! - [`ApiError`] / [`ErrorResponse`] - Expected errors and their `{message, statusCode}` body
//! - [`User`] / [`UserPayload`] - The user resource and its validation rules
//! - [`UserStore`] - Lock-guarded in-memory user collection
//!
//! ## Example
//!
//! ```
//! use roster_core::{UserPayload, UserStore};
//!
//! let store = UserStore::with_seed_data();
//! let payload: UserPayload =
//!     serde_json::from_str(r#"{"name":"Ann","email":"ann@x.com"}"#).unwrap();
//!
//! let user = store.create(payload.validate().unwrap()).unwrap();
//! assert_eq!(user.id, 3);
//! assert_eq!(user.role, "User");
//! ```

#![doc(html_root_url = "https://docs.rs/roster-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod identity;
mod store;
mod user;

pub use context::{RequestContext, RequestId};
pub use error::{
    ApiError, ErrorCategory, ErrorResponse, FieldErrors, DUPLICATE_EMAIL,
    INTERNAL_SERVER_ERROR, INVALID_USER_ID, RESOURCE_NOT_FOUND, USER_DATA_REQUIRED,
};
pub use identity::{Identity, TokenRegistry};
pub use store::{StoreError, UserStore};
pub use user::{NewUser, User, UserPayload, DEFAULT_ROLE, MAX_NAME_LEN, MAX_ROLE_LEN};
