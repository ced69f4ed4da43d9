use crate::error::KitchenServiceError;
use crate::metrics;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use error_stack::ResultExt;
use kitchen_core::filter::EqFilter;
use kitchen_core::model::{
    BarcodeProduct, Challenge, Entity, InventoryItem, NewEntity, NewInventoryItem, Recipe,
};
use kitchen_core::views::{self, ExpiryNotification};
use kitchen_core::{KitchenEngine, KitchenRepository, barcode};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct KitchenService<T> {
    engine: T,
}

impl<T> KitchenService<T>
where
    T: KitchenEngine,
{
    pub fn new(engine: T) -> Self {
        KitchenService { engine }
    }

    #[instrument(skip_all, name = "service#list", fields(collection = E::COLLECTION))]
    pub async fn list<E: Entity>(&self) -> ServiceResult<Vec<E>> {
        self.engine
            .repo()
            .list(None)
            .await
            .change_context(KitchenServiceError)
    }

    #[instrument(skip_all, name = "service#active_challenges")]
    pub async fn active_challenges(&self) -> ServiceResult<Vec<Challenge>> {
        self.engine
            .repo()
            .list(Some(EqFilter::new("status", Challenge::ACTIVE)))
            .await
            .change_context(KitchenServiceError)
    }

    #[instrument(skip_all, name = "service#create", fields(collection = <N::Entity as Entity>::COLLECTION))]
    pub async fn create<N: NewEntity>(&self, new: N) -> ServiceResult<N::Entity> {
        let entity = new.into_entity();

        self.engine
            .repo()
            .insert(&entity)
            .await
            .change_context(KitchenServiceError)?;

        metrics::increment_records_created(<N::Entity as Entity>::COLLECTION);
        Ok(entity)
    }

    /// `None` if no item has this id.
    #[instrument(skip_all, name = "service#replace_inventory", fields(item.id = %item_id))]
    pub async fn replace_inventory(
        &self,
        item_id: String,
        item: NewInventoryItem,
    ) -> OptServiceResult<InventoryItem> {
        let item = item.into_entity_with_id(item_id);

        let replaced = self
            .engine
            .repo()
            .replace(&item.id, &item)
            .await
            .change_context(KitchenServiceError)?;

        if replaced.is_some() {
            metrics::increment_records_updated();
        }
        Ok(replaced.map(|_| item))
    }

    #[instrument(skip_all, name = "service#delete_inventory", fields(item.id = %item_id))]
    pub async fn delete_inventory(&self, item_id: &str) -> OptServiceResult<()> {
        let deleted = self
            .engine
            .repo()
            .delete::<InventoryItem>(item_id)
            .await
            .change_context(KitchenServiceError)?;

        if deleted.is_some() {
            metrics::increment_records_deleted();
        }
        Ok(deleted)
    }

    #[instrument(skip_all, name = "service#lookup_barcode", fields(barcode = code))]
    pub async fn lookup_barcode(&self, code: &str) -> ServiceResult<BarcodeProduct> {
        let (product, source) = barcode::lookup(&self.engine.repo(), code)
            .await
            .change_context(KitchenServiceError)?;

        debug!("barcode {code} answered from {}", source.as_str());
        metrics::increment_barcode_lookups(source.as_str());
        Ok(product)
    }

    #[instrument(skip_all, name = "service#expiring_recipes")]
    pub async fn expiring_recipes(&self) -> ServiceResult<Vec<Recipe>> {
        let repo = self.engine.repo();

        let items = repo
            .list::<InventoryItem>(None)
            .await
            .change_context(KitchenServiceError)?;

        let expiring = views::expiring_items(items, Utc::now());
        if expiring.is_empty() {
            return Ok(Vec::new());
        }

        let recipes = repo
            .list::<Recipe>(None)
            .await
            .change_context(KitchenServiceError)?;

        Ok(views::recipes_using(&expiring, recipes))
    }

    #[instrument(skip_all, name = "service#expiry_notifications")]
    pub async fn expiry_notifications(&self) -> ServiceResult<Vec<ExpiryNotification>> {
        let items = self
            .engine
            .repo()
            .list::<InventoryItem>(None)
            .await
            .change_context(KitchenServiceError)?;

        let now = Utc::now();
        Ok(views::expiry_notifications(
            &views::expiring_items(items, now),
            now,
        ))
    }
}
