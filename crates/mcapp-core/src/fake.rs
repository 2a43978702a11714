//! In-memory [`ResourceClient`] for tests.
//!
//! Records are stored as JSON keyed by type and ID, so any [`Resource`]
//! can be inserted and read back. List filters compare top-level string
//! fields for equality, matching the server's `field=value` filters.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ResourceClient;
use crate::error::{Error, Result};
use crate::types::{Collection, ListOpts, Pagination, Resource, ResourceType};

const PAGE_URL_PREFIX: &str = "fake://page/";

/// An action invocation recorded by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAction {
    /// Resource type the action ran on.
    pub kind: ResourceType,
    /// Record ID.
    pub id: String,
    /// Action name.
    pub action: String,
    /// Action input.
    pub input: Value,
}

#[derive(Default)]
struct FakeState {
    records: HashMap<ResourceType, BTreeMap<String, Value>>,
    scripted: HashMap<(ResourceType, String), VecDeque<Value>>,
    links: HashMap<String, Value>,
    pages: HashMap<String, (Vec<Value>, Option<String>)>,
    page_size: Option<usize>,
    next_page: usize,
    next_id: usize,
    by_id_calls: HashMap<(ResourceType, String), usize>,
    created: Vec<(ResourceType, Value)>,
    updated: Vec<(ResourceType, Value)>,
    deleted: Vec<(ResourceType, String)>,
    actions: Vec<RecordedAction>,
}

impl FakeState {
    /// Splits `items` into pages, registering every page after the first.
    fn paginate(&mut self, items: Vec<Value>) -> (Vec<Value>, Option<String>) {
        let Some(size) = self.page_size.filter(|s| *s > 0) else {
            return (items, None);
        };

        let mut chunks: Vec<Vec<Value>> = items.chunks(size).map(<[Value]>::to_vec).collect();
        if chunks.is_empty() {
            return (Vec::new(), None);
        }

        // Register from the back so each page knows its successor.
        let mut successor: Option<String> = None;
        while chunks.len() > 1 {
            let chunk = chunks.pop().unwrap_or_default();
            self.next_page += 1;
            let url = format!("{PAGE_URL_PREFIX}{}", self.next_page);
            self.pages.insert(url.clone(), (chunk, successor.take()));
            successor = Some(url);
        }
        (chunks.pop().unwrap_or_default(), successor)
    }
}

fn to_page<T: Resource>(items: Vec<Value>, next: Option<String>) -> Result<Collection<T>> {
    let data = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()?;
    let pagination = next.map(|url| Pagination {
        next: Some(url),
        partial: true,
    });
    Ok(Collection { data, pagination })
}

fn filter_matches(record: &Value, opts: &ListOpts) -> bool {
    opts.filters
        .iter()
        .all(|(field, want)| record.get(field).and_then(Value::as_str) == Some(want.as_str()))
}

/// A fake management API backed by in-memory maps.
#[derive(Clone, Default)]
pub struct FakeResourceClient {
    state: Arc<Mutex<FakeState>>,
}

impl std::fmt::Debug for FakeResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeResourceClient").finish_non_exhaustive()
    }
}

impl FakeResourceClient {
    /// Creates an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits list results into pages of `size` records.
    #[must_use]
    pub fn with_page_size(self, size: usize) -> Self {
        self.state.lock().page_size = Some(size);
        self
    }

    /// Stores a record, replacing any record with the same ID.
    ///
    /// # Panics
    ///
    /// Panics if the record cannot be serialized.
    pub fn insert<T: Resource>(&self, record: T) {
        let id = record.id().to_string();
        #[allow(clippy::expect_used)]
        let value = serde_json::to_value(&record).expect("fake records must serialize");
        self.state
            .lock()
            .records
            .entry(T::KIND)
            .or_default()
            .insert(id, value);
    }

    /// Makes successive `by_id` calls for `id` return `responses` in order.
    ///
    /// The last response is repeated once the sequence is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if a response cannot be serialized.
    pub fn script_by_id<T: Resource>(&self, id: &str, responses: Vec<T>) {
        #[allow(clippy::expect_used)]
        let values = responses
            .iter()
            .map(|r| serde_json::to_value(r).expect("fake records must serialize"))
            .collect();
        self.state
            .lock()
            .scripted
            .insert((T::KIND, id.to_string()), values);
    }

    /// Serves `body` for `get_link(url)`.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be serialized.
    pub fn insert_link<B: Serialize>(&self, url: &str, body: &B) {
        #[allow(clippy::expect_used)]
        let value = serde_json::to_value(body).expect("fake links must serialize");
        self.state.lock().links.insert(url.to_string(), value);
    }

    /// Reads a stored record.
    pub fn get<T: Resource>(&self, id: &str) -> Option<T> {
        let state = self.state.lock();
        let value = state.records.get(&T::KIND)?.get(id)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Number of `by_id` calls made for a record.
    pub fn by_id_calls(&self, kind: ResourceType, id: &str) -> usize {
        self.state
            .lock()
            .by_id_calls
            .get(&(kind, id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Records passed to `create`, in call order.
    pub fn created<T: Resource>(&self) -> Vec<T> {
        Self::decode_log(&self.state.lock().created)
    }

    /// Records passed to `update`, in call order.
    pub fn updated<T: Resource>(&self) -> Vec<T> {
        Self::decode_log(&self.state.lock().updated)
    }

    /// Type and ID of every deleted record, in call order.
    pub fn deleted(&self) -> Vec<(ResourceType, String)> {
        self.state.lock().deleted.clone()
    }

    /// Every action invoked, in call order.
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.state.lock().actions.clone()
    }

    fn decode_log<T: Resource>(log: &[(ResourceType, Value)]) -> Vec<T> {
        log.iter()
            .filter(|(kind, _)| *kind == T::KIND)
            .filter_map(|(_, v)| serde_json::from_value(v.clone()).ok())
            .collect()
    }

    fn not_found(kind: ResourceType, id: &str) -> Error {
        Error::NotFound {
            kind,
            name: id.to_string(),
        }
    }
}

impl ResourceClient for FakeResourceClient {
    async fn list<T: Resource>(&self, opts: &ListOpts) -> Result<Collection<T>> {
        let mut state = self.state.lock();
        let items: Vec<Value> = state
            .records
            .get(&T::KIND)
            .map(|records| records.values().filter(|r| filter_matches(r, opts)).cloned().collect())
            .unwrap_or_default();
        let (first, next) = state.paginate(items);
        to_page(first, next)
    }

    async fn next<T: Resource>(&self, page: &Collection<T>) -> Result<Option<Collection<T>>> {
        let Some(url) = page.next_url() else {
            return Ok(None);
        };
        let (items, next) = self
            .state
            .lock()
            .pages
            .remove(url)
            .ok_or_else(|| Error::transport(format!("unknown page {url}")))?;
        let mut collection = to_page(items, next)?;
        if collection.pagination.is_none() {
            collection.pagination = Some(Pagination::default());
        }
        Ok(Some(collection))
    }

    async fn by_id<T: Resource>(&self, id: &str) -> Result<T> {
        let mut state = self.state.lock();
        let key = (T::KIND, id.to_string());
        *state.by_id_calls.entry(key.clone()).or_default() += 1;

        if let Some(queue) = state.scripted.get_mut(&key) {
            let value = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(value) = value {
                return Ok(serde_json::from_value(value)?);
            }
        }

        let value = state
            .records
            .get(&T::KIND)
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or_else(|| Self::not_found(T::KIND, id))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create<T: Resource>(&self, record: &T) -> Result<T> {
        let mut value = serde_json::to_value(record)?;
        let mut state = self.state.lock();
        state.created.push((T::KIND, value.clone()));

        let id = if record.id().is_empty() {
            state.next_id += 1;
            let id = format!("{}-{}", T::KIND.collection(), state.next_id);
            if let Value::Object(map) = &mut value {
                map.insert("id".into(), Value::String(id.clone()));
            }
            id
        } else {
            record.id().to_string()
        };
        state
            .records
            .entry(T::KIND)
            .or_default()
            .insert(id, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update<T: Resource>(&self, record: &T) -> Result<T> {
        let value = serde_json::to_value(record)?;
        let mut state = self.state.lock();
        let records = state.records.entry(T::KIND).or_default();
        if !records.contains_key(record.id()) {
            return Err(Self::not_found(T::KIND, record.id()));
        }
        records.insert(record.id().to_string(), value.clone());
        state.updated.push((T::KIND, value.clone()));
        Ok(serde_json::from_value(value)?)
    }

    async fn delete<T: Resource>(&self, record: &T) -> Result<()> {
        let mut state = self.state.lock();
        let removed = state
            .records
            .get_mut(&T::KIND)
            .and_then(|records| records.remove(record.id()));
        if removed.is_none() {
            return Err(Self::not_found(T::KIND, record.id()));
        }
        state.deleted.push((T::KIND, record.id().to_string()));
        Ok(())
    }

    async fn action<T: Resource, I: Serialize>(
        &self,
        record: &T,
        action: &str,
        input: &I,
    ) -> Result<()> {
        let input = serde_json::to_value(input)?;
        self.state.lock().actions.push(RecordedAction {
            kind: T::KIND,
            id: record.id().to_string(),
            action: action.to_string(),
            input,
        });
        Ok(())
    }

    async fn get_link<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let value = self
            .state
            .lock()
            .links
            .get(url)
            .cloned()
            .ok_or_else(|| Error::transport(format!("no such link: {url}")))?;
        Ok(serde_json::from_value(value)?)
    }
}
