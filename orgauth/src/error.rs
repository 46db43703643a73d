use rusqlite;
use serde_json;
use std::fmt;

pub enum Error {
  Rusqlite(rusqlite::Error),
  SystemTimeError(std::time::SystemTimeError),
  String(String),
  SerdeJson(serde_json::Error),
  IoError(std::io::Error),
  Reqwest(reqwest::Error),
  Uuid(uuid::Error),
  NotLoggedIn,
  Validation(String),
  Conflict(String),
  Unauthorized(String),
  NotFound(String),
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
      Error::SerdeJson(e) => write!(f, "{}", e),
      Error::IoError(e) => write!(f, "{}", e),
      Error::Reqwest(e) => write!(f, "{}", e),
      Error::Uuid(e) => write!(f, "{}", e),
      Error::NotLoggedIn => write!(f, "not logged in"),
      Error::Validation(e) => write!(f, "{}", e),
      Error::Conflict(e) => write!(f, "{}", e),
      Error::Unauthorized(e) => write!(f, "{}", e),
      Error::NotFound(e) => write!(f, "{}", e),
    }
  }
}

impl fmt::Debug for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self {
      Error::Rusqlite(rue) => write!(f, "rusqlite: {:?}", rue),
      Error::Validation(e) => write!(f, "validation: {}", e),
      Error::Conflict(e) => write!(f, "conflict: {}", e),
      Error::Unauthorized(e) => write!(f, "unauthorized: {}", e),
      Error::NotFound(e) => write!(f, "not found: {}", e),
      _ => write!(f, "{}", self),
    }
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

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    Error::Reqwest(e)
  }
}

impl From<uuid::Error> for Error {
  fn from(e: uuid::Error) -> Self {
    Error::Uuid(e)
  }
}

impl From<simple_error::SimpleError> for Error {
  fn from(e: simple_error::SimpleError) -> Self {
    Error::String(e.to_string())
  }
}
