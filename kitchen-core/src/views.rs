//! Read-only views computed from the inventory and recipe collections.

use crate::model::{InventoryItem, Recipe};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// How far ahead an item counts as expiring.
pub const EXPIRY_HORIZON_DAYS: i64 = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Items still in stock whose expiry falls on or before `now` plus the horizon.
/// Items without a readable expiry never qualify.
pub fn expiring_items(items: Vec<InventoryItem>, now: DateTime<Utc>) -> Vec<InventoryItem> {
    let horizon = now + TimeDelta::days(EXPIRY_HORIZON_DAYS);

    items
        .into_iter()
        .filter(|item| item.quantity > 0)
        .filter(|item| item.expiry_date.is_some_and(|expiry| expiry <= horizon))
        .collect()
}

/// Recipes listing at least one of the expiring items as an ingredient.
///
/// Item names are lower-cased before comparing, recipe ingredients are compared
/// exactly as stored.
pub fn recipes_using(expiring: &[InventoryItem], recipes: Vec<Recipe>) -> Vec<Recipe> {
    if expiring.is_empty() {
        return Vec::new();
    }

    let names = expiring
        .iter()
        .map(|item| item.name.to_lowercase())
        .collect::<HashSet<_>>();

    recipes
        .into_iter()
        .filter(|recipe| recipe.ingredients.iter().any(|i| names.contains(i)))
        .collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ExpiryNotification {
    /// Identifier of the inventory item.
    pub id: String,
    pub message: String,
    pub urgency: Urgency,
    pub item_name: String,
    pub expiry_date: DateTime<Utc>,
    pub days_left: i64,
}

/// Whole days until `expiry`, rounded down. Past expiries are negative.
pub fn days_left(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// One warning per item, in the order given. Expects items already narrowed by [`expiring_items`].
pub fn expiry_notifications(
    expiring: &[InventoryItem],
    now: DateTime<Utc>,
) -> Vec<ExpiryNotification> {
    expiring
        .iter()
        .filter_map(|item| {
            let expiry = item.expiry_date?;
            let days_left = days_left(expiry, now);

            let (message, urgency) = match days_left {
                n if n <= 0 => (format!("⚠️ {} has expired!", item.name), Urgency::High),
                1 => (format!("🔥 {} expires tomorrow!", item.name), Urgency::High),
                n => (
                    format!("⏰ {} expires in {n} days", item.name),
                    Urgency::Medium,
                ),
            };

            Some(ExpiryNotification {
                id: item.id.clone(),
                message,
                urgency,
                item_name: item.name.clone(),
                expiry_date: expiry,
                days_left,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn item(name: &str, quantity: i64, expiry: Option<DateTime<Utc>>) -> InventoryItem {
        InventoryItem {
            id: format!("{name}-id"),
            name: name.to_string(),
            barcode: None,
            quantity,
            unit: "pieces".to_string(),
            expiry_date: expiry,
            category: "other".to_string(),
            added_date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            user_id: "default".to_string(),
        }
    }

    fn recipe(name: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: format!("{name}-id"),
            name: name.to_string(),
            ingredients: ingredients.iter().map(ToString::to_string).collect(),
            instructions: vec!["cook".to_string()],
            prep_time: 15,
            difficulty: "easy".to_string(),
            category: "main".to_string(),
            affiliate_links: Default::default(),
            expiring_ingredients: vec![],
            created_date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[rstest]
    fn selects_in_stock_items_inside_horizon(now: DateTime<Utc>) {
        let items = vec![
            item("soon", 1, Some(now + TimeDelta::days(1))),
            item("edge", 1, Some(now + TimeDelta::days(3))),
            item("later", 1, Some(now + TimeDelta::days(3) + TimeDelta::seconds(1))),
            item("past", 4, Some(now - TimeDelta::days(2))),
            item("empty", 0, Some(now + TimeDelta::days(1))),
            item("negative", -1, Some(now + TimeDelta::days(1))),
            item("no-expiry", 3, None),
        ];

        let names = expiring_items(items, now)
            .into_iter()
            .map(|i| i.name)
            .collect::<Vec<_>>();

        assert_eq!(vec!["soon", "edge", "past"], names);
    }

    #[rstest]
    fn matches_recipes_on_lowercased_item_names(now: DateTime<Utc>) {
        let expiring = expiring_items(vec![item("Tomato", 2, Some(now + TimeDelta::days(1)))], now);
        let recipes = vec![
            recipe("salad", &["lettuce", "tomato"]),
            recipe("shouting", &["Tomato"]),
            recipe("substring", &["tomatoes"]),
            recipe("soup", &["tomato", "basil"]),
        ];

        let names = recipes_using(&expiring, recipes)
            .into_iter()
            .map(|r| r.name)
            .collect::<Vec<_>>();

        assert_eq!(vec!["salad", "soup"], names);
    }

    #[rstest]
    fn out_of_stock_item_matches_nothing(now: DateTime<Utc>) {
        let expiring = expiring_items(vec![item("Tomato", 0, Some(now + TimeDelta::days(1)))], now);

        assert!(recipes_using(&expiring, vec![recipe("salad", &["tomato"])]).is_empty());
    }

    #[rstest]
    #[case::already_expired(-TimeDelta::hours(2), -1, Urgency::High, "⚠️ Milk has expired!")]
    #[case::later_today(TimeDelta::hours(5), 0, Urgency::High, "⚠️ Milk has expired!")]
    #[case::tomorrow(TimeDelta::days(1) + TimeDelta::hours(1), 1, Urgency::High, "🔥 Milk expires tomorrow!")]
    #[case::two_days(TimeDelta::days(2) + TimeDelta::hours(1), 2, Urgency::Medium, "⏰ Milk expires in 2 days")]
    #[case::five_days(TimeDelta::days(5) + TimeDelta::hours(1), 5, Urgency::Medium, "⏰ Milk expires in 5 days")]
    fn classifies_by_days_left(
        now: DateTime<Utc>,
        #[case] offset: TimeDelta,
        #[case] expected_days: i64,
        #[case] expected_urgency: Urgency,
        #[case] expected_message: &str,
    ) {
        let milk = item("Milk", 1, Some(now + offset));

        let notifications = expiry_notifications(&[milk], now);

        assert_eq!(1, notifications.len());
        let notification = &notifications[0];
        assert_eq!("Milk-id", notification.id);
        assert_eq!("Milk", notification.item_name);
        assert_eq!(now + offset, notification.expiry_date);
        assert_eq!(expected_days, notification.days_left);
        assert_eq!(expected_urgency, notification.urgency);
        assert_eq!(expected_message, notification.message);
    }

    #[rstest]
    fn notifications_follow_input_order(now: DateTime<Utc>) {
        let items = vec![
            item("b", 1, Some(now + TimeDelta::days(2))),
            item("a", 1, Some(now - TimeDelta::days(2))),
            item("b", 1, Some(now + TimeDelta::days(2))),
        ];

        let names = expiry_notifications(&expiring_items(items, now), now)
            .into_iter()
            .map(|n| n.item_name)
            .collect::<Vec<_>>();

        assert_eq!(vec!["b", "a", "b"], names);
    }

    #[rstest]
    fn urgency_serializes_lowercase() {
        assert_eq!("\"high\"", serde_json::to_string(&Urgency::High).unwrap());
        assert_eq!("\"medium\"", serde_json::to_string(&Urgency::Medium).unwrap());
    }
}
