use async_trait::async_trait;
use derive_more::{Display, Error, From};
use lib::engine::{Engine, EngineReply, EngineRequest};
use reqwest::{Client, StatusCode};
use tracing::instrument;

/// The reason why the engine service failed to reply.
#[derive(Debug, Display, Error, From)]
pub enum HttpError {
    #[display(fmt = "failed to reach the engine service")]
    Transport(reqwest::Error),
    #[display(fmt = "engine service replied with status {_0}: {_1}")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode, #[error(not(source))] String),
}

/// A client for an engine behind an HTTP service.
#[derive(Debug, Clone)]
pub struct Http {
    client: Client,
    url: String,
}

impl Http {
    /// Constructs [`Http`] for the service at the given base url.
    pub fn new(url: &str) -> Self {
        Http {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    /// The address where moves are requested.
    pub fn endpoint(&self) -> String {
        format!("{}/engine-move", self.url)
    }
}

#[async_trait]
impl Engine for Http {
    type Error = HttpError;

    #[instrument(level = "debug", skip(self), ret, err)]
    async fn play(&mut self, req: &EngineRequest) -> Result<EngineReply, Self::Error> {
        let response = self.client.post(self.endpoint()).json(req).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status(status, response.text().await?));
        }

        Ok(response.json().await?)
    }
}
