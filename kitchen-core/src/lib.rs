use filter::EqFilter;
use model::Entity;
use result::{OptRepoResult, RepoResult};

pub mod barcode;
pub mod filter;
pub mod model;
pub mod result;
pub mod timestamp;
pub mod views;

/// Process-wide handle to everything a request needs. Built once at startup and
/// handed to the routes, so tests can swap the storage backend.
pub trait KitchenEngine: Clone + Send + Sync + 'static {
    type Repo: KitchenRepository;

    fn repo(&self) -> Self::Repo;
}

/// Storage for every record type. Each [`Entity`] lives in its own collection,
/// addressed by its key field rather than whatever primary key the store uses natively.
///
/// Implementations must keep insertion order stable for [`KitchenRepository::list`].
pub trait KitchenRepository: Clone + Send + Sync + 'static {
    /// Every record in the collection, oldest first, optionally narrowed by one equality filter.
    fn list<E: Entity>(
        &self,
        filter: Option<EqFilter>,
    ) -> impl Future<Output = RepoResult<Vec<E>>> + Send;

    fn find<E: Entity>(&self, key: &str) -> impl Future<Output = OptRepoResult<E>> + Send;

    /// Fails if a record with the same key already exists.
    fn insert<E: Entity>(&self, entity: &E) -> impl Future<Output = RepoResult<()>> + Send;

    /// Overwrites the whole record stored under `key`. `None` means nothing matched.
    fn replace<E: Entity>(
        &self,
        key: &str,
        entity: &E,
    ) -> impl Future<Output = OptRepoResult<()>> + Send;

    /// `None` means nothing matched.
    fn delete<E: Entity>(&self, key: &str) -> impl Future<Output = OptRepoResult<()>> + Send;
}
