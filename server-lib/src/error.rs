use actix_web::error as awe;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, info};
use rusqlite;
use serde_json;
use spprotocol::MessageReply;
use std::fmt;

pub enum Error {
  Rusqlite(rusqlite::Error),
  SystemTimeError(std::time::SystemTimeError),
  String(String),
  ActixError(awe::Error),
  SerdeJson(serde_json::Error),
  IoError(std::io::Error),
  Uuid(uuid::Error),
  Orgauth(orgauth::error::Error),
  Annotated(AnnotatedE),
  NotLoggedIn,
  Validation(String),
  NotFound(String),
  Unauthorized(String),
  Conflict(String),
}

pub struct AnnotatedE {
  pub error: Box<Error>,
  pub source: Box<Error>,
}

pub fn annotate(e: Error, source: Error) -> Error {
  Error::Annotated(AnnotatedE {
    error: Box::new(e),
    source: Box::new(source),
  })
}

pub fn annotate_string(s: String, source: Error) -> Error {
  annotate(Error::String(s), source)
}

impl fmt::Display for AnnotatedE {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} \n source: {}", self.error, self.source)
  }
}

pub fn to_orgauth_error(e: Error) -> orgauth::error::Error {
  match e {
    Error::Rusqlite(ze) => orgauth::error::Error::Rusqlite(ze),
    Error::SystemTimeError(ze) => orgauth::error::Error::SystemTimeError(ze),
    Error::String(ze) => orgauth::error::Error::String(ze),
    Error::ActixError(ze) => orgauth::error::Error::String(ze.to_string()),
    Error::SerdeJson(ze) => orgauth::error::Error::SerdeJson(ze),
    Error::IoError(ze) => orgauth::error::Error::IoError(ze),
    Error::Uuid(ze) => orgauth::error::Error::Uuid(ze),
    Error::Orgauth(ze) => ze,
    Error::Annotated(e) => orgauth::error::Error::String(e.to_string()),
    Error::NotLoggedIn => orgauth::error::Error::NotLoggedIn,
    Error::Validation(s) => orgauth::error::Error::Validation(s),
    Error::NotFound(s) => orgauth::error::Error::NotFound(s),
    Error::Unauthorized(s) => orgauth::error::Error::Unauthorized(s),
    Error::Conflict(s) => orgauth::error::Error::Conflict(s),
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    None
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self {
      Error::Rusqlite(rue) => write!(f, "{}", rue),
      Error::SystemTimeError(e) => write!(f, "{}", e),
      Error::String(e) => write!(f, "{}", e),
      Error::ActixError(e) => write!(f, "{}", e),
      Error::SerdeJson(e) => write!(f, "{}", e),
      Error::IoError(e) => write!(f, "{}", e),
      Error::Uuid(e) => write!(f, "{}", e),
      Error::Orgauth(e) => write!(f, "{}", e),
      Error::Annotated(e) => write!(f, "{}", e),
      Error::NotLoggedIn => write!(f, "not logged in"),
      Error::Validation(e) => write!(f, "{}", e),
      Error::NotFound(e) => write!(f, "{}", e),
      Error::Unauthorized(e) => write!(f, "{}", e),
      Error::Conflict(e) => write!(f, "{}", e),
    }
  }
}

impl fmt::Debug for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self {
      Error::Rusqlite(rue) => write!(f, "rusqlite: {:?}", rue),
      Error::Orgauth(e) => write!(f, "orgauth: {:?}", e),
      Error::Validation(e) => write!(f, "validation: {}", e),
      Error::NotFound(e) => write!(f, "not found: {}", e),
      Error::Unauthorized(e) => write!(f, "unauthorized: {}", e),
      Error::Conflict(e) => write!(f, "conflict: {}", e),
      _ => write!(f, "{}", self),
    }
  }
}

impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::Conflict(_) => StatusCode::BAD_REQUEST,
      Error::NotLoggedIn => StatusCode::UNAUTHORIZED,
      Error::Unauthorized(_) => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      error!("request failed: {:?}", self);
    } else {
      info!("request rejected: {:?}", self);
    }
    HttpResponse::build(status).json(MessageReply {
      message: self.to_string(),
    })
  }
}

impl From<rusqlite::Error> for Error {
  fn from(error: rusqlite::Error) -> Self {
    Error::Rusqlite(error)
  }
}

impl From<std::time::SystemTimeError> for Error {
  fn from(error: std::time::SystemTimeError) -> Self {
    Error::SystemTimeError(error)
  }
}

impl From<String> for Error {
  fn from(s: String) -> Self {
    Error::String(s)
  }
}

impl From<&str> for Error {
  fn from(s: &str) -> Self {
    Error::String(s.to_string())
  }
}

impl From<awe::Error> for Error {
  fn from(e: awe::Error) -> Self {
    Error::ActixError(e)
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Error::SerdeJson(e)
  }
}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Error::IoError(e)
  }
}

impl From<uuid::Error> for Error {
  fn from(e: uuid::Error) -> Self {
    Error::Uuid(e)
  }
}

// keep the orgauth error kinds so they map to the same status codes.
impl From<orgauth::error::Error> for Error {
  fn from(e: orgauth::error::Error) -> Self {
    match e {
      orgauth::error::Error::NotLoggedIn => Error::NotLoggedIn,
      orgauth::error::Error::Validation(s) => Error::Validation(s),
      orgauth::error::Error::Conflict(s) => Error::Conflict(s),
      orgauth::error::Error::Unauthorized(s) => Error::Unauthorized(s),
      orgauth::error::Error::NotFound(s) => Error::NotFound(s),
      orgauth::error::Error::Rusqlite(e) => Error::Rusqlite(e),
      e => Error::Orgauth(e),
    }
  }
}

impl From<spprotocol::constants::UnknownValue> for Error {
  fn from(e: spprotocol::constants::UnknownValue) -> Self {
    Error::Validation(e.to_string())
  }
}
