//! Generic resource client interface and lookup helpers.
//!
//! The control plane exposes every resource type through the same
//! collection API. [`ResourceClient`] captures that surface;
//! [`list_all`] drains paginated listings and [`lookup`] turns a
//! user-supplied name or ID into exactly one record.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::types::{Collection, ListOpts, Resource};

/// Trait for talking to the management API.
///
/// Missing records must surface as [`Error::NotFound`]; every other
/// failure of the underlying call is reported as [`Error::Transport`].
#[allow(async_fn_in_trait)]
pub trait ResourceClient {
    /// Lists the first page of a collection.
    async fn list<T: Resource>(&self, opts: &ListOpts) -> Result<Collection<T>>;

    /// Fetches the page after `page`, or `None` when there is none.
    async fn next<T: Resource>(&self, page: &Collection<T>) -> Result<Option<Collection<T>>>;

    /// Fetches a record by ID.
    async fn by_id<T: Resource>(&self, id: &str) -> Result<T>;

    /// Creates a record and returns the server's copy.
    async fn create<T: Resource>(&self, record: &T) -> Result<T>;

    /// Replaces a record and returns the server's copy.
    async fn update<T: Resource>(&self, record: &T) -> Result<T>;

    /// Deletes a record.
    async fn delete<T: Resource>(&self, record: &T) -> Result<()>;

    /// Invokes a named action on a record.
    async fn action<T: Resource, I: Serialize>(
        &self,
        record: &T,
        action: &str,
        input: &I,
    ) -> Result<()>;

    /// Follows a link URL taken from a record's `links` map.
    async fn get_link<R: DeserializeOwned>(&self, url: &str) -> Result<R>;
}

/// Lists every record matching `opts`, following pagination to the end.
///
/// # Errors
///
/// Returns the first error raised while fetching any page.
pub async fn list_all<T, C>(client: &C, opts: &ListOpts) -> Result<Vec<T>>
where
    T: Resource,
    C: ResourceClient,
{
    let first = client.list::<T>(opts).await?;
    drain(client, first).await
}

/// Collects `first` and every page after it.
///
/// A page that is not partial ends the walk even if it carries a next
/// link.
///
/// # Errors
///
/// Returns the first error raised while fetching a page.
pub async fn drain<T, C>(client: &C, first: Collection<T>) -> Result<Vec<T>>
where
    T: Resource,
    C: ResourceClient,
{
    let mut page = first;
    let mut data = std::mem::take(&mut page.data);
    let mut pages = 1_usize;

    while page.pagination.as_ref().is_some_and(|p| p.partial) {
        let Some(mut next) = client.next(&page).await? else {
            break;
        };
        pages += 1;
        data.append(&mut next.data);
        page = next;
    }

    trace!(kind = %T::KIND, pages, records = data.len(), "listed collection");
    Ok(data)
}

/// Resolves a name or ID to a single record.
///
/// Names win over IDs: the collection is first filtered by `name`
/// (together with any filters already in `opts`). One match is returned
/// directly, several matches are ambiguous, and no match falls back to
/// fetching `name_or_id` as an ID.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when neither form matches and
/// [`Error::Ambiguous`] when the name matches more than one record.
pub async fn lookup<T, C>(client: &C, name_or_id: &str, opts: ListOpts) -> Result<T>
where
    T: Resource,
    C: ResourceClient,
{
    let not_found = || Error::NotFound {
        kind: T::KIND,
        name: name_or_id.to_string(),
    };

    if name_or_id.is_empty() {
        return Err(not_found());
    }

    let opts = opts.with_filter("name", name_or_id);
    let mut matches: Vec<T> = list_all(client, &opts).await?;

    if matches.len() > 1 {
        return Err(Error::Ambiguous {
            kind: T::KIND,
            name: name_or_id.to_string(),
            ids: matches.iter().map(|r| r.id().to_string()).collect(),
        });
    }
    if let Some(found) = matches.pop() {
        debug!(kind = %T::KIND, name = %name_or_id, id = %found.id(), "resolved by name");
        return Ok(found);
    }

    debug!(kind = %T::KIND, reference = %name_or_id, "no name match, trying ID");
    client.by_id::<T>(name_or_id).await.map_err(|e| {
        if e.is_not_found() { not_found() } else { e }
    })
}
