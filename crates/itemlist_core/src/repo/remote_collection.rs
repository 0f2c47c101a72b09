//! Remote collection collaborators.
//!
//! # Responsibility
//! - Define the per-record capability set of a remote item collection.
//! - Provide a blocking REST client and an in-process stand-in.
//!
//! # Invariants
//! - The collection, not the caller, assigns `id` and `createdAt`.
//! - `fetch_all` presents records newest-first.
//! - Deleting an id the collection no longer has is not an error.

use crate::clock::{Clock, SystemClock};
use crate::model::record::{Record, RecordDraft, RecordId};
use crate::repo::store_error::{StoreError, StoreResult};
use chrono::SecondsFormat;
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Backing collaborator that owns authoritative record state.
pub trait RemoteCollection {
    fn fetch_all(&mut self) -> StoreResult<Vec<Record>>;
    fn create_remote(&mut self, draft: &RecordDraft) -> StoreResult<Record>;
    fn update_remote(&mut self, id: &RecordId, draft: &RecordDraft) -> StoreResult<()>;
    fn delete_remote(&mut self, id: &RecordId) -> StoreResult<()>;
}

/// Sorts newest-first; equal timestamps fall back to descending id.
pub(crate) fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    created_at: String,
}

// `description: null` clears a previously set description.
#[derive(Serialize)]
struct UpdateBody<'a> {
    title: &'a str,
    description: Option<&'a str>,
}

/// REST client for `{base}/items` and `{base}/items/{id}`.
pub struct HttpCollection {
    base_url: Url,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl HttpCollection {
    /// Builds a client with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            client,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock used to stamp `createdAt` on new records.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn items_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("items");
        }
        url
    }

    pub fn item_url(&self, id: &RecordId) -> Url {
        let mut url = self.items_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }

    fn send(
        &self,
        method: Method,
        url: Url,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> StoreResult<Response> {
        let started_at = Instant::now();
        let request = build(self.client.request(method.clone(), url));
        let response = request.send()?;
        debug!(
            "event=remote_request module=repo method={} status={} duration_ms={}",
            method,
            response.status().as_u16(),
            started_at.elapsed().as_millis()
        );
        Ok(response)
    }
}

impl RemoteCollection for HttpCollection {
    fn fetch_all(&mut self) -> StoreResult<Vec<Record>> {
        let url = self.items_url();
        let response = ensure_success(self.send(Method::GET, url.clone(), |req| req)?, &url)?;
        let mut records: Vec<Record> = decode_json(response)?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn create_remote(&mut self, draft: &RecordDraft) -> StoreResult<Record> {
        let url = self.items_url();
        let body = CreateBody {
            title: &draft.title,
            description: draft.description.as_deref(),
            created_at: self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let response = self.send(Method::POST, url.clone(), |req| req.json(&body))?;
        let record: Record = decode_json(ensure_success(response, &url)?)?;
        record
            .validate()
            .map_err(|err| StoreError::InvalidData(format!("created record: {err}")))?;
        Ok(record)
    }

    fn update_remote(&mut self, id: &RecordId, draft: &RecordDraft) -> StoreResult<()> {
        let url = self.item_url(id);
        let body = UpdateBody {
            title: &draft.title,
            description: draft.description.as_deref(),
        };
        let response = self.send(Method::PATCH, url.clone(), |req| req.json(&body))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        ensure_success(response, &url)?;
        Ok(())
    }

    fn delete_remote(&mut self, id: &RecordId) -> StoreResult<()> {
        let url = self.item_url(id);
        let response = self.send(Method::DELETE, url.clone(), |req| req)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response, &url)?;
        Ok(())
    }
}

/// In-process collection that assigns sequence ids like a REST backend.
pub struct InMemoryCollection {
    records: Vec<Record>,
    next_seq: u64,
    clock: Arc<dyn Clock>,
}

impl InMemoryCollection {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Vec::new(),
            next_seq: 1,
            clock,
        }
    }

    /// Authoritative records, newest-first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl Default for InMemoryCollection {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RemoteCollection for InMemoryCollection {
    fn fetch_all(&mut self) -> StoreResult<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn create_remote(&mut self, draft: &RecordDraft) -> StoreResult<Record> {
        let record = Record::new(RecordId::Seq(self.next_seq), draft.clone(), self.clock.now());
        self.next_seq += 1;
        self.records.insert(0, record.clone());
        Ok(record)
    }

    fn update_remote(&mut self, id: &RecordId, draft: &RecordDraft) -> StoreResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.apply_draft(draft);
        Ok(())
    }

    fn delete_remote(&mut self, id: &RecordId) -> StoreResult<()> {
        self.records.retain(|record| &record.id != id);
        Ok(())
    }
}

fn parse_base_url(value: &str) -> StoreResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|err| StoreError::InvalidData(format!("invalid base url `{value}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(StoreError::InvalidData(format!(
            "base url must be http(s), got `{value}`"
        )));
    }
    Ok(url)
}

fn ensure_success(response: Response, url: &Url) -> StoreResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(StoreError::Status {
        code: response.status().as_u16(),
        url: url.to_string(),
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> StoreResult<T> {
    let bytes = response.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::{sort_newest_first, CreateBody, HttpCollection, UpdateBody};
    use crate::model::record::{Record, RecordId};
    use crate::repo::store_error::StoreError;
    use std::time::Duration;

    #[test]
    fn item_urls_are_built_from_base() {
        let http = HttpCollection::new("http://example.test/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(http.items_url().as_str(), "http://example.test/api/items");
        assert_eq!(
            http.item_url(&RecordId::Seq(7)).as_str(),
            "http://example.test/api/items/7"
        );
        assert_eq!(
            http.item_url(&RecordId::key("a b")).as_str(),
            "http://example.test/api/items/a%20b"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpCollection::new("file:///tmp/items", Duration::from_secs(1))
            .err()
            .expect("file scheme must be rejected");
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn wire_bodies_use_camel_case_and_explicit_null_on_update() {
        let create = CreateBody {
            title: "Buy milk",
            description: None,
            created_at: "2024-05-01T08:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&create).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T08:00:00.000Z");
        assert!(json.get("description").is_none());

        let update = UpdateBody {
            title: "Buy milk",
            description: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json["description"].is_null());
    }

    #[test]
    fn server_records_are_sorted_newest_first() {
        let mut records: Vec<Record> = serde_json::from_str(
            r#"[{"id":1,"title":"old","createdAt":"2024-05-01T08:00:00.000Z"},
                {"id":2,"title":"new","createdAt":"2024-05-02T08:00:00.000Z"},
                {"id":3,"title":"same","createdAt":"2024-05-02T08:00:00.000Z"}]"#,
        )
        .unwrap();
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|record| record.id.clone()).collect();
        assert_eq!(ids, vec![RecordId::Seq(3), RecordId::Seq(2), RecordId::Seq(1)]);
    }
}
