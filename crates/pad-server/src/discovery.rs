//! Directory registration.
//!
//! The directory maps a join code to this process's address so players
//! can find it:
//! - `POST {base}/api/ip` with `{ "code": ..., "ip": ... }`
//! - `DELETE {base}/api/ip/{code}`
//!
//! A 409 on registration means the code is already taken; the caller
//! retries with a fresh code. Every other failure is non-fatal.

use std::time::Duration;

use pad_core::SessionCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("code {0} is already registered")]
    CodeTaken(SessionCode),

    #[error("directory answered {0}")]
    Rejected(u16),

    #[error("directory unreachable: {0}")]
    Unreachable(String),
}

pub trait DirectoryClient: Send + Sync {
    fn register(&self, code: &SessionCode, ip: &str) -> Result<(), DirectoryError>;
    fn deregister(&self, code: &SessionCode) -> Result<(), DirectoryError>;
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    code: &'a str,
    ip: &'a str,
}

#[derive(Debug)]
pub struct HttpDirectory {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        HttpDirectory {
            base_url: base_url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl DirectoryClient for HttpDirectory {
    fn register(&self, code: &SessionCode, ip: &str) -> Result<(), DirectoryError> {
        let url = format!("{}/api/ip", self.base_url);
        let body = Registration {
            code: code.as_str(),
            ip,
        };

        match self.agent.post(&url).send_json(&body) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(409, _)) => Err(DirectoryError::CodeTaken(code.clone())),
            Err(ureq::Error::Status(status, _)) => Err(DirectoryError::Rejected(status)),
            Err(e) => Err(DirectoryError::Unreachable(e.to_string())),
        }
    }

    fn deregister(&self, code: &SessionCode) -> Result<(), DirectoryError> {
        let url = format!("{}/api/ip/{}", self.base_url, code);

        match self.agent.delete(&url).call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(DirectoryError::Rejected(status)),
            Err(e) => Err(DirectoryError::Unreachable(e.to_string())),
        }
    }
}

/// Used when no directory is configured: the session runs without
/// discoverability.
#[derive(Debug, Default)]
pub struct NoDirectory;

impl DirectoryClient for NoDirectory {
    fn register(&self, _code: &SessionCode, _ip: &str) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn deregister(&self, _code: &SessionCode) -> Result<(), DirectoryError> {
        Ok(())
    }
}
