//! Behaviour every storage backend has to share. Each backend's test file runs
//! all of these through `backend_tests!`.

use chrono::{TimeDelta, Utc};
use kitchen_core::KitchenRepository;
use kitchen_core::barcode::{self, LookupSource};
use kitchen_core::filter::EqFilter;
use kitchen_core::model::{
    BarcodeProduct, Challenge, Entity, InventoryItem, NewChallenge, NewEntity, NewInventoryItem,
    NewUser, User,
};
use kitchen_core::result::{OptRepoResult, RepoResult};
use serde_json::json;

macro_rules! backend_tests {
    ($runtime:path => $($name:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $name() {
                let runtime = $runtime().await;
                scenarios::$name(runtime.repo.clone()).await;
            }
        )*
    };
}

fn inventory_item(name: &str, quantity: i64) -> InventoryItem {
    serde_json::from_value::<NewInventoryItem>(json!({
        "name": name,
        "quantity": quantity,
        "unit": "pieces",
        "expiry_date": (Utc::now() + TimeDelta::days(2)).to_rfc3339(),
        "category": "produce",
    }))
    .unwrap()
    .into_entity()
}

fn challenge(title: &str, status: &str) -> Challenge {
    serde_json::from_value::<NewChallenge>(json!({
        "title": title,
        "description": "save food",
        "points": 25,
        "type": "weekly",
        "status": status,
    }))
    .unwrap()
    .into_entity()
}

/// Hands control back to the scheduler after every `find`, so two lookups can
/// both miss before either of them inserts.
#[derive(Clone)]
struct YieldAfterFind<R>(R);

impl<R: KitchenRepository> KitchenRepository for YieldAfterFind<R> {
    async fn list<E: Entity>(&self, filter: Option<EqFilter>) -> RepoResult<Vec<E>> {
        self.0.list(filter).await
    }

    async fn find<E: Entity>(&self, key: &str) -> OptRepoResult<E> {
        let found = self.0.find(key).await;
        tokio::task::yield_now().await;
        found
    }

    async fn insert<E: Entity>(&self, entity: &E) -> RepoResult<()> {
        self.0.insert(entity).await
    }

    async fn replace<E: Entity>(&self, key: &str, entity: &E) -> OptRepoResult<()> {
        self.0.replace(key, entity).await
    }

    async fn delete<E: Entity>(&self, key: &str) -> OptRepoResult<()> {
        self.0.delete::<E>(key).await
    }
}

pub async fn empty_collection_lists_nothing<R: KitchenRepository>(repo: R) {
    let items = repo.list::<InventoryItem>(None).await.unwrap();

    assert!(items.is_empty());
}

pub async fn insert_then_list_returns_record<R: KitchenRepository>(repo: R) {
    let item = inventory_item("Tomato", 2);

    repo.insert(&item).await.unwrap();
    let items = repo.list::<InventoryItem>(None).await.unwrap();

    assert_eq!(1, items.len());
    let stored = &items[0];
    assert_eq!(item.id, stored.id);
    assert_eq!(item.name, stored.name);
    assert_eq!(item.quantity, stored.quantity);
    assert_eq!(item.category, stored.category);
    assert_eq!(
        item.expiry_date.map(|d| d.timestamp_millis()),
        stored.expiry_date.map(|d| d.timestamp_millis())
    );
}

pub async fn list_keeps_insertion_order<R: KitchenRepository>(repo: R) {
    let names = ["c", "a", "b", "e", "d"];
    for name in names {
        repo.insert(&inventory_item(name, 1)).await.unwrap();
    }

    let listed = repo
        .list::<InventoryItem>(None)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect::<Vec<_>>();

    assert_eq!(names.to_vec(), listed);
}

pub async fn find_by_key<R: KitchenRepository>(repo: R) {
    let item = inventory_item("Milk", 1);
    repo.insert(&item).await.unwrap();

    let found = repo.find::<InventoryItem>(&item.id).await.unwrap();
    let missing = repo.find::<InventoryItem>("not-an-id").await.unwrap();

    assert_eq!(Some(item.id), found.map(|i| i.id));
    assert!(missing.is_none());
}

pub async fn duplicate_key_fails<R: KitchenRepository>(repo: R) {
    let item = inventory_item("Milk", 1);
    repo.insert(&item).await.unwrap();

    assert!(repo.insert(&item).await.is_err());
    assert_eq!(1, repo.list::<InventoryItem>(None).await.unwrap().len());
}

pub async fn replace_overwrites_whole_record<R: KitchenRepository>(repo: R) {
    let item = inventory_item("Milk", 1);
    repo.insert(&item).await.unwrap();

    let replacement = serde_json::from_value::<NewInventoryItem>(json!({
        "name": "Oat milk",
        "quantity": 3,
    }))
    .unwrap()
    .into_entity_with_id(item.id.clone());

    let outcome = repo.replace(&item.id, &replacement).await.unwrap();
    let stored = repo.find::<InventoryItem>(&item.id).await.unwrap().unwrap();

    assert_eq!(Some(()), outcome);
    assert_eq!("Oat milk", stored.name);
    assert_eq!(3, stored.quantity);
    assert_eq!("other", stored.category);
    assert!(stored.expiry_date.is_none());
}

pub async fn replace_missing_changes_nothing<R: KitchenRepository>(repo: R) {
    let item = inventory_item("Milk", 1);
    repo.insert(&item).await.unwrap();

    let mut ghost = inventory_item("Ghost", 1);
    ghost.id = "missing-id".to_string();

    let outcome = repo.replace("missing-id", &ghost).await.unwrap();
    let items = repo.list::<InventoryItem>(None).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(1, items.len());
    assert_eq!("Milk", items[0].name);
}

pub async fn delete_twice_reports_missing_second_time<R: KitchenRepository>(repo: R) {
    let item = inventory_item("Milk", 1);
    repo.insert(&item).await.unwrap();

    let first = repo.delete::<InventoryItem>(&item.id).await.unwrap();
    let second = repo.delete::<InventoryItem>(&item.id).await.unwrap();

    assert_eq!(Some(()), first);
    assert!(second.is_none());
    assert!(repo.list::<InventoryItem>(None).await.unwrap().is_empty());
}

pub async fn filter_narrows_list<R: KitchenRepository>(repo: R) {
    repo.insert(&challenge("one", "active")).await.unwrap();
    repo.insert(&challenge("two", "completed")).await.unwrap();
    repo.insert(&challenge("three", "active")).await.unwrap();
    repo.insert(&challenge("four", "expired")).await.unwrap();

    let active = repo
        .list::<Challenge>(Some(EqFilter::new("status", Challenge::ACTIVE)))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect::<Vec<_>>();

    assert_eq!(vec!["one", "three"], active);
}

pub async fn nested_preferences_survive<R: KitchenRepository>(repo: R) {
    let user = serde_json::from_value::<NewUser>(json!({
        "name": "Sam",
        "email": "sam@example.com",
        "preferences": { "diet": "vegetarian", "alerts": { "email": true, "days": [1, 2] } },
    }))
    .unwrap()
    .into_entity();

    repo.insert(&user).await.unwrap();
    let users = repo.list::<User>(None).await.unwrap();

    assert_eq!(
        json!({ "diet": "vegetarian", "alerts": { "email": true, "days": [1, 2] } }),
        serde_json::Value::Object(users[0].preferences.clone())
    );
}

pub async fn reference_barcode_is_stored_on_first_lookup<R: KitchenRepository>(repo: R) {
    let (first, first_source) = barcode::lookup(&repo, "123456789").await.unwrap();
    let (second, second_source) = barcode::lookup(&repo, "123456789").await.unwrap();

    assert_eq!(LookupSource::Reference, first_source);
    assert_eq!(LookupSource::Stored, second_source);
    assert_eq!(first, second);
    assert_eq!("Milk", second.name);
    assert_eq!(1, repo.list::<BarcodeProduct>(None).await.unwrap().len());
}

pub async fn unknown_barcode_is_never_stored<R: KitchenRepository>(repo: R) {
    let (first, first_source) = barcode::lookup(&repo, "000000000").await.unwrap();
    let (_, second_source) = barcode::lookup(&repo, "000000000").await.unwrap();

    assert_eq!(LookupSource::Placeholder, first_source);
    assert_eq!(LookupSource::Placeholder, second_source);
    assert_eq!("Product 000000000", first.name);
    assert!(repo.list::<BarcodeProduct>(None).await.unwrap().is_empty());
}

pub async fn concurrent_reference_lookups_both_succeed<R: KitchenRepository>(repo: R) {
    let repo = YieldAfterFind(repo);

    let (first, second) = tokio::join!(
        barcode::lookup(&repo, "123456789"),
        barcode::lookup(&repo, "123456789"),
    );
    let (first, first_source) = first.unwrap();
    let (second, second_source) = second.unwrap();

    assert_eq!(first, second);
    assert_eq!("Milk", first.name);
    assert_eq!(
        1,
        [first_source, second_source]
            .iter()
            .filter(|s| **s == LookupSource::Reference)
            .count()
    );
    assert_eq!(1, repo.list::<BarcodeProduct>(None).await.unwrap().len());
}
