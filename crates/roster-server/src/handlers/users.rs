//! Handlers for the `/users` resource.
//!
//! Each handler turns its expected failures (bad ids, bad bodies, missing
//! users, duplicate emails) into a precise 4xx response itself. Only
//! unexpected failures, such as a response that cannot be serialized, leave
//! as a [`Fault`] for the exception stage.

use std::sync::Arc;

use http::header::LOCATION;
use http::{HeaderValue, StatusCode};
use roster_core::{ApiError, StoreError, User, UserPayload, UserStore};
use roster_middleware::{Fault, Outcome, Response, ResponseExt};

/// Why a handler did not produce its success response.
#[derive(Debug)]
enum Failure {
    /// Expected; answered with the error's own status code.
    Api(ApiError),
    /// Unexpected; left to the exception stage.
    Fault(Fault),
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

impl From<StoreError> for Failure {
    fn from(error: StoreError) -> Self {
        Self::Api(error.into())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(error: serde_json::Error) -> Self {
        Self::Fault(error.into())
    }
}

/// Converts a handler body's result into an [`Outcome`].
fn settle(result: Result<Response, Failure>) -> Outcome {
    match result {
        Ok(response) => Ok(response),
        Err(Failure::Api(error)) => {
            tracing::debug!(status = error.status_code().as_u16(), error = %error, "request rejected");
            Ok(Response::api_error(&error))
        }
        Err(Failure::Fault(fault)) => Err(fault),
    }
}

/// Parses a path id. Non-numeric and non-positive ids are both invalid.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::invalid_user_id()),
    }
}

/// Parses a request body into a payload.
///
/// An empty body and a JSON `null` both mean "no user data".
pub(crate) fn parse_payload(body: &[u8]) -> Result<UserPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::user_data_required());
    }
    match serde_json::from_slice::<Option<UserPayload>>(body) {
        Ok(Some(payload)) => Ok(payload),
        Ok(None) => Err(ApiError::user_data_required()),
        Err(e) => Err(ApiError::bad_request(format!("Invalid JSON body: {e}"))),
    }
}

/// Serializes the user list for `GET /users`.
pub type ListEncoder = fn(&[User]) -> Result<Response, serde_json::Error>;

fn encode_list(users: &[User]) -> Result<Response, serde_json::Error> {
    Response::json(StatusCode::OK, users)
}

/// The five user operations over a shared [`UserStore`].
#[derive(Debug, Clone)]
pub struct UserHandlers {
    store: Arc<UserStore>,
    encode_list: ListEncoder,
}

impl UserHandlers {
    /// Creates handlers over `store`.
    #[must_use]
    pub fn new(store: Arc<UserStore>) -> Self {
        Self {
            store,
            encode_list,
        }
    }

    /// Replaces the serializer used by [`list`](Self::list).
    #[must_use]
    pub fn with_list_encoder(mut self, encoder: ListEncoder) -> Self {
        self.encode_list = encoder;
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    /// `GET /users`: always 200, even when empty.
    pub fn list(&self) -> Outcome {
        settle(self.try_list())
    }

    /// `GET /users/{id}`
    pub fn get(&self, raw_id: &str) -> Outcome {
        settle(self.try_get(raw_id))
    }

    /// `POST /users`: 201 with the new user and a `Location` header.
    pub fn create(&self, body: &[u8]) -> Outcome {
        settle(self.try_create(body))
    }

    /// `PUT /users/{id}`: 204 on success.
    pub fn update(&self, raw_id: &str, body: &[u8]) -> Outcome {
        settle(self.try_update(raw_id, body))
    }

    /// `DELETE /users/{id}`: 204 on success.
    pub fn delete(&self, raw_id: &str) -> Outcome {
        settle(self.try_delete(raw_id))
    }

    fn try_list(&self) -> Result<Response, Failure> {
        let users = self.store.list();
        Ok((self.encode_list)(&users)?)
    }

    fn try_get(&self, raw_id: &str) -> Result<Response, Failure> {
        let id = parse_id(raw_id)?;
        let user = self.store.get(id)?;
        Ok(Response::json(StatusCode::OK, &user)?)
    }

    fn try_create(&self, body: &[u8]) -> Result<Response, Failure> {
        let candidate = parse_payload(body)?.validate()?;
        let user = self.store.create(candidate)?;
        tracing::info!(user_id = user.id, "user created");

        let mut response = Response::json(StatusCode::CREATED, &user)?;
        if let Ok(location) = HeaderValue::from_str(&format!("/users/{}", user.id)) {
            response.headers_mut().insert(LOCATION, location);
        }
        Ok(response)
    }

    // Id first, then body, then the store's own not-found/conflict order.
    fn try_update(&self, raw_id: &str, body: &[u8]) -> Result<Response, Failure> {
        let id = parse_id(raw_id)?;
        let patch = parse_payload(body)?.validate()?;
        self.store.update(id, patch)?;
        tracing::info!(user_id = id, "user updated");
        Ok(Response::empty(StatusCode::NO_CONTENT))
    }

    fn try_delete(&self, raw_id: &str) -> Result<Response, Failure> {
        let id = parse_id(raw_id)?;
        self.store.delete(id)?;
        tracing::info!(user_id = id, "user deleted");
        Ok(Response::empty(StatusCode::NO_CONTENT))
    }
}
