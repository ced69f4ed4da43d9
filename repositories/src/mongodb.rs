use crate::{ConnectionDetails, RepoInitErr, RepoInitResult};
use ::mongodb::options::{FindOptions, IndexOptions};
use ::mongodb::{Client, Collection, Database, IndexModel};
use bson::{Bson, Document};
use error_stack::{Report, ResultExt};
use kitchen_core::KitchenRepository;
use kitchen_core::filter::EqFilter;
use kitchen_core::model::{
    BarcodeProduct, Challenge, Deal, Entity, InventoryItem, Recipe, User, WasteItem,
};
use kitchen_core::result::{OptRepoResult, RepoError, RepoResult};
use kitchen_core::timestamp;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use transcode::{NATIVE_ID_KEY, transcode};

pub mod transcode;

const DEFAULT_DB_NAME: &str = "smartkitchen";

#[derive(Debug, thiserror::Error)]
#[error("failed to create client connection to mongodb instance")]
pub struct ConnectError;

/// Every collection lives in one database. Documents are addressed by their
/// entity key field, which carries a unique index; `_id` only orders them.
#[derive(Debug, Clone)]
pub struct KitchenRepo {
    db: Database,
}

impl KitchenRepo {
    /// Uses the database named in the connection string, or `smartkitchen` if there isn't one.
    pub fn new(client: Client) -> Self {
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DB_NAME));
        Self { db }
    }

    pub async fn init(connection_details: ConnectionDetails) -> RepoInitResult<KitchenRepo> {
        let client = match connection_details {
            ConnectionDetails::Url(url) => Client::with_uri_str(url)
                .await
                .change_context(ConnectError)
                .change_context(RepoInitErr)?,
        };

        let repo = Self::new(client);
        info!("using mongodb database '{}'", repo.db.name());

        repo.ensure_key_index::<InventoryItem>().await?;
        repo.ensure_key_index::<Recipe>().await?;
        repo.ensure_key_index::<Challenge>().await?;
        repo.ensure_key_index::<User>().await?;
        repo.ensure_key_index::<WasteItem>().await?;
        repo.ensure_key_index::<Deal>().await?;
        repo.ensure_key_index::<BarcodeProduct>().await?;

        Ok(repo)
    }

    async fn ensure_key_index<E: Entity>(&self) -> RepoInitResult<()> {
        let index = IndexModel::builder()
            .keys(single_field(E::KEY_FIELD, 1))
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection::<E>()
            .create_index(index)
            .await
            .change_context(RepoInitErr)
            .attach_with(|| format!("could not create key index on '{}'", E::COLLECTION))?;

        debug!("key index on {}.{} is in place", E::COLLECTION, E::KEY_FIELD);
        Ok(())
    }

    fn collection<E: Entity>(&self) -> Collection<Document> {
        self.db.collection::<Document>(E::COLLECTION)
    }
}

fn single_field(field: &str, value: impl Into<Bson>) -> Document {
    let mut document = Document::new();
    document.insert(field, value);
    document
}

fn key_filter<E: Entity>(key: &str) -> Document {
    single_field(E::KEY_FIELD, key)
}

/// Serializes `entity`, turning its timestamp fields into native datetimes so the
/// database can compare them.
fn encode<E: Entity>(entity: &E) -> Result<Document, Report<bson::ser::Error>> {
    let mut document = bson::to_document(entity)?;

    for field in E::TIMESTAMP_FIELDS {
        let parsed = match document.get(*field) {
            Some(Bson::String(text)) => timestamp::parse(text),
            _ => continue,
        };

        match parsed {
            Some(at) => {
                document.insert(*field, Bson::DateTime(bson::DateTime::from_chrono(at)));
            }
            None => warn!("{}.{field} is not a timestamp, storing as text", E::COLLECTION),
        }
    }

    Ok(document)
}

fn decode<E: Entity>(document: Document) -> Result<E, Report<serde_json::Error>> {
    Ok(serde_json::from_value(transcode(document))?)
}

impl KitchenRepository for KitchenRepo {
    async fn list<E: Entity>(&self, filter: Option<EqFilter>) -> RepoResult<Vec<E>> {
        let filter = filter
            .map(|f| single_field(f.field, f.value))
            .unwrap_or_default();

        let options = FindOptions::builder()
            .sort(single_field(NATIVE_ID_KEY, 1))
            .build();

        let documents = self
            .collection::<E>()
            .find(filter)
            .with_options(options)
            .await
            .change_context(RepoError::List)?
            .collect::<Result<Vec<_>, _>>()
            .await
            .change_context(RepoError::List)
            .attach_with(|| format!("could not read from '{}'", E::COLLECTION))?;

        documents
            .into_iter()
            .map(|d| decode(d).change_context(RepoError::List))
            .collect()
    }

    async fn find<E: Entity>(&self, key: &str) -> OptRepoResult<E> {
        self.collection::<E>()
            .find_one(key_filter::<E>(key))
            .await
            .change_context(RepoError::Find)?
            .map(|d| decode(d).change_context(RepoError::Find))
            .transpose()
    }

    async fn insert<E: Entity>(&self, entity: &E) -> RepoResult<()> {
        let document = encode(entity).change_context(RepoError::Insert)?;

        self.collection::<E>()
            .insert_one(document)
            .await
            .change_context(RepoError::Insert)
            .attach_with(|| format!("{} '{}'", E::COLLECTION, entity.key()))?;

        Ok(())
    }

    async fn replace<E: Entity>(&self, key: &str, entity: &E) -> OptRepoResult<()> {
        let document = encode(entity).change_context(RepoError::Replace)?;

        let result = self
            .collection::<E>()
            .replace_one(key_filter::<E>(key), document)
            .await
            .change_context(RepoError::Replace)?;

        Ok((result.matched_count > 0).then_some(()))
    }

    async fn delete<E: Entity>(&self, key: &str) -> OptRepoResult<()> {
        let result = self
            .collection::<E>()
            .delete_one(key_filter::<E>(key))
            .await
            .change_context(RepoError::Delete)?;

        Ok((result.deleted_count > 0).then_some(()))
    }
}
