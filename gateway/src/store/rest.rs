use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client, RequestBuilder, Response};
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::types::{NewTodo, Todo, TodoChanges};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Todo table hosted behind a PostgREST-compatible endpoint
/// (`{base_url}/rest/v1/{table}`), authenticated with an anon API key.
pub struct RestStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Misconfigured(e.to_string()))?;
        HeaderValue::from_str(api_key).map_err(|_| {
            StoreError::Misconfigured("api key is not a valid header value".to_string())
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{table}", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), response.text().await));
        }
        Ok(response)
    }

    async fn rows(response: Response) -> Result<Vec<Todo>, StoreError> {
        response
            .json::<Vec<Todo>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// A non-success reply. An unreadable body is kept as its read error.
fn rejection<E: Display>(status: u16, body: Result<String, E>) -> StoreError {
    let body = body.unwrap_or_else(|e| {
        tracing::warn!(status, error = %e, "failed to read store error body");
        format!("<unreadable body: {e}>")
    });
    StoreError::Rejected { status, body }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select_all_ordered(&self) -> Result<Vec<Todo>, StoreError> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        Self::rows(self.send(request).await?).await
    }

    async fn insert(&self, row: NewTodo) -> Result<Todo, StoreError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&row);
        Self::rows(self.send(request).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update_by_id(&self, id: Uuid, changes: TodoChanges) -> Result<Option<Todo>, StoreError> {
        let request = self
            .client
            .patch(&self.endpoint)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&changes);
        Ok(Self::rows(self.send(request).await?).await?.into_iter().next())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(&self.endpoint)
            .query(&[("id", format!("eq.{id}"))]);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let store = RestStore::new("https://example.supabase.co/", "key", "todos").unwrap();
        assert_eq!(store.endpoint(), "https://example.supabase.co/rest/v1/todos");
    }

    #[test]
    fn rejects_key_that_cannot_be_a_header() {
        let err = RestStore::new("https://example.supabase.co", "bad\nkey", "todos")
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Misconfigured(_)), "{err}");
    }

    #[test]
    fn rejection_keeps_body_read_failure() {
        match rejection(502, Err::<String, _>("connection reset")) {
            StoreError::Rejected { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("connection reset"), "{body}");
            }
            other => panic!("unexpected {other:?}"),
        }

        match rejection::<String>(401, Ok("bad key".to_string())) {
            StoreError::Rejected { body, .. } => assert_eq!(body, "bad key"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
