//! Game catalog client.
//!
//! The catalog is an external HTTP service:
//! `GET {base}/api/games/{id}` -> game definition JSON, 404 when unknown.
//!
//! Fetches are blocking; callers run them on the blocking pool and
//! bound them with their own timeout.

use std::time::Duration;

use pad_core::GameDefinition;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("game {0} not found in catalog")]
    NotFound(String),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("catalog returned an unusable game: {0}")]
    Invalid(String),

    #[error("catalog fetch timed out after {0:?}")]
    Timeout(Duration),
}

pub trait Catalog: Send + Sync {
    fn fetch(&self, game_id: &str) -> Result<GameDefinition, CatalogError>;
}

#[derive(Debug)]
pub struct HttpCatalog {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpCatalog {
    /// `timeout` bounds the whole HTTP exchange.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        HttpCatalog {
            base_url: base_url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Catalog for HttpCatalog {
    fn fetch(&self, game_id: &str) -> Result<GameDefinition, CatalogError> {
        let url = format!("{}/api/games/{}", self.base_url, game_id);

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => {
                return Err(CatalogError::NotFound(game_id.to_string()))
            }
            Err(ureq::Error::Status(code, _)) => {
                return Err(CatalogError::Unavailable(format!("{url} answered {code}")))
            }
            Err(e) => return Err(CatalogError::Unavailable(e.to_string())),
        };

        response
            .into_json()
            .map_err(|e| CatalogError::Invalid(e.to_string()))
    }
}
