//! Facade behaviour against the in-memory backend.

use bytes::Bytes;
use chrono::{Days, Utc};
use serde_json::json;
use ss_api::random::{SeededRandom, ThreadRandom};
use ss_api::{FacadeOptions, Ports, StyleSync};
use ss_backend_memory::{MemoryBackend, MemoryLocalStore};
use ss_core::error::AppError;
use ss_core::models::*;
use ss_core::query::Table;
use ss_core::traits::{LocalKey, LocalStore, MockAuthProvider, MockObjectStore, RandomSource};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_err;

struct Harness {
    backend: Arc<MemoryBackend>,
    local: Arc<MemoryLocalStore>,
    app: StyleSync,
}

fn harness_with(backend: MemoryBackend, random: Arc<dyn RandomSource>, options: FacadeOptions) -> Harness {
    let backend = Arc::new(backend);
    let local = Arc::new(MemoryLocalStore::new());
    let ports = Ports {
        rows: backend.clone(),
        objects: backend.clone(),
        auth: Arc::new(MockAuthProvider::new()),
        local: local.clone(),
        random,
    };
    Harness { app: StyleSync::new(ports, options), backend, local }
}

fn harness() -> Harness {
    harness_with(MemoryBackend::with_buckets(&["items", "avatars"]), Arc::new(ThreadRandom), FacadeOptions::default())
}

fn new_item(name: &str, category: &str) -> NewItem {
    NewItem { name: name.into(), category_id: Some(category.into()), ..Default::default() }
}

fn image(name: &str) -> ImageUpload {
    ImageUpload { file_name: name.into(), content_type: Some("image/png".into()), data: Bytes::from_static(b"\x89PNG") }
}

#[tokio::test]
async fn create_item_offline_returns_local_record() {
    let h = harness();
    h.backend.set_offline(true);

    let item = h.app.items().create("u1", new_item("Linen Shirt", "shirts")).await.unwrap();

    let millis = item.id.strip_prefix("local-").expect("local id");
    assert!(millis.parse::<i64>().is_ok());
    assert_eq!(item.user_id, "u1");
    assert_eq!(item.name, "Linen Shirt");

    let raw = h.local.get(LocalKey::Items).await.unwrap().unwrap();
    let stored: Vec<Item> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0].id, item.id);

    let listed = h.app.items().list("u1").await;
    assert_eq!(listed.iter().map(|i| &i.id).collect::<Vec<_>>(), vec![&item.id]);
}

/// Local store whose reads take long enough for concurrent writers to overlap.
struct SlowLocalStore(Arc<MemoryLocalStore>);

#[async_trait]
impl LocalStore for SlowLocalStore {
    async fn get(&self, key: LocalKey) -> anyhow::Result<Option<String>> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.0.get(key).await
    }

    async fn set(&self, key: LocalKey, value: &str) -> anyhow::Result<()> {
        self.0.set(key, value).await
    }

    async fn clear(&self, key: LocalKey) -> anyhow::Result<()> {
        self.0.clear(key).await
    }
}

#[tokio::test]
async fn concurrent_offline_creates_keep_both_records() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_offline(true);
    let local = Arc::new(MemoryLocalStore::new());
    let ports = Ports {
        rows: backend.clone(),
        objects: backend.clone(),
        auth: Arc::new(MockAuthProvider::new()),
        local: Arc::new(SlowLocalStore(local.clone())),
        random: Arc::new(ThreadRandom),
    };
    let app = StyleSync::new(ports, FacadeOptions::default());

    let (items_a, items_b) = (app.items(), app.items());
    let (tee, boots) =
        tokio::join!(items_a.create("u1", new_item("Tee", "shirts")), items_b.create("u1", new_item("Boots", "shoes")));
    let (tee, boots) = (tee.unwrap(), boots.unwrap());

    assert_ne!(tee.id, boots.id);
    let raw = local.get(LocalKey::Items).await.unwrap().unwrap();
    let stored: Vec<Item> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn back_to_back_offline_creates_get_distinct_ids() {
    let h = harness();
    h.backend.set_offline(true);

    let a = h.app.items().create("u1", new_item("A", "shirts")).await.unwrap();
    let b = h.app.items().create("u1", new_item("B", "shirts")).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(h.app.items().list("u1").await.len(), 2);
}

#[tokio::test]
async fn local_records_can_be_starred_and_deleted_by_their_owner() {
    let h = harness();
    h.backend.set_offline(true);
    let item = h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    let outfit = h.app.outfits().create("u1", NewOutfit { name: "Rainy".into(), ..Default::default() }).await.unwrap();

    let err = assert_err!(h.app.items().set_favorite("u2", &item.id, true).await);
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Item"));
    let err = assert_err!(h.app.outfits().delete("u2", &outfit.id).await);
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Outfit"));

    let favorite = h.app.items().set_favorite("u1", &item.id, true).await.unwrap();
    assert!(favorite.is_favorite);
    assert_eq!(h.app.items().list_favorites("u1").await.len(), 1);
    let starred = h.app.outfits().set_starred("u1", &outfit.id, true).await.unwrap();
    assert!(starred.is_starred);

    h.app.items().delete("u1", &item.id).await.unwrap();
    h.app.outfits().delete("u1", &outfit.id).await.unwrap();
    assert!(h.local.get(LocalKey::Items).await.unwrap().is_none());
    assert!(h.local.get(LocalKey::Outfits).await.unwrap().is_none());
    let err = assert_err!(h.app.items().delete("u1", &item.id).await);
    assert!(matches!(err, AppError::NotFound(_, _)));
}

#[tokio::test]
async fn clearing_local_records_keeps_other_owners() {
    let h = harness();
    h.backend.set_offline(true);
    h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    h.app.items().create("u2", new_item("Cap", "hats")).await.unwrap();
    h.app.outfits().create("u1", NewOutfit { name: "A".into(), ..Default::default() }).await.unwrap();

    let report = h.app.diagnostics().clear_local_records("u1").await;

    assert_eq!((report.items, report.outfits, report.events), (1, 1, 0));
    let raw = h.local.get(LocalKey::Items).await.unwrap().unwrap();
    let left: Vec<Item> = serde_json::from_str(&raw).unwrap();
    assert_eq!(left.iter().map(|i| i.user_id.as_str()).collect::<Vec<_>>(), ["u2"]);
    assert!(h.local.get(LocalKey::Outfits).await.unwrap().is_none());
}

#[tokio::test]
async fn create_item_online_attaches_category() {
    let h = harness();
    h.backend.seed(Table::Categories, [json!({ "id": "shirts", "name": "Shirts", "created_at": Utc::now() })]);

    let item = h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();

    assert!(!item.id.starts_with("local-"));
    assert_eq!(item.category.map(|c| c.name), Some("Shirts".to_string()));
    assert!(h.local.get(LocalKey::Items).await.unwrap().is_none());
}

#[tokio::test]
async fn create_item_requires_name_and_category() {
    let h = harness();
    let err = h.app.items().create("u1", new_item(" ", "shirts")).await.unwrap_err();
    assert!(err.is_validation());
    let err = h.app.items().create("u1", NewItem { name: "Tee".into(), ..Default::default() }).await.unwrap_err();
    assert!(err.is_validation());
    assert!(h.backend.rows(Table::Items).is_empty());
}

#[tokio::test]
async fn empty_remote_answer_wins_over_local_data() {
    let h = harness();
    h.backend.set_offline(true);
    h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    h.backend.set_offline(false);

    assert!(h.app.items().list("u1").await.is_empty());
}

#[tokio::test]
async fn offline_with_nothing_local_serves_demo_items_but_no_outfits() {
    let h = harness();
    h.backend.set_offline(true);

    let items = h.app.items().list("u1").await;
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|i| i.user_id == "demo-user"));
    assert_eq!(h.app.categories().list().await.len(), 4);
    assert!(h.app.outfits().list("u1").await.is_empty());
    assert!(h.app.events().list("u1").await.is_empty());
}

#[tokio::test]
async fn demo_data_can_be_switched_off() {
    let options = FacadeOptions { mock_data: false, ..Default::default() };
    let h = harness_with(MemoryBackend::new(), Arc::new(ThreadRandom), options);
    h.backend.set_offline(true);

    assert!(h.app.items().list("u1").await.is_empty());
    assert!(h.app.categories().list().await.is_empty());
}

#[tokio::test]
async fn updates_have_no_offline_fallback() {
    let h = harness();
    let item = h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    h.backend.set_offline(true);

    let err = assert_err!(h.app.items().set_favorite("u1", &item.id, true).await);
    assert!(matches!(err, AppError::OperationFailed(_)));
    let err = assert_err!(h.app.items().delete("u1", &item.id).await);
    assert!(matches!(err, AppError::OperationFailed(_)));
}

#[tokio::test]
async fn writes_to_another_users_rows_are_not_found() {
    let h = harness();
    let item = h.app.items().create("alice", new_item("Tee", "shirts")).await.unwrap();
    let event = h
        .app
        .events()
        .create(
            "alice",
            NewEvent {
                title: "Gala".into(),
                date: Utc::now().date_naive(),
                description: None,
                time: None,
                location: None,
                weather_condition: None,
                outfit_id: None,
            },
        )
        .await
        .unwrap();

    let err = assert_err!(h.app.items().delete("bob", &item.id).await);
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Item"));
    let patch = ItemUpdate { name: Some("Mine now".into()), ..Default::default() };
    assert_err!(h.app.items().update("bob", &item.id, patch).await);
    assert_err!(h.app.events().delete("bob", &event.id).await);

    assert_eq!(h.app.items().list("alice").await[0].name, "Tee");
    assert_eq!(h.app.events().list("alice").await.len(), 1);
}

#[tokio::test]
async fn upload_without_bucket_inlines_image() {
    let h = harness_with(MemoryBackend::new(), Arc::new(ThreadRandom), FacadeOptions::default());

    let url = h.app.items().upload_image("u1", image("shirt.png")).await;

    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(h.backend.upload_count(), 0);
}

#[tokio::test]
async fn upload_with_bucket_returns_public_url() {
    let h = harness();

    let url = h.app.items().upload_image("u1", image("shirt.png")).await;

    assert!(url.starts_with("memory://storage/items/items/u1-"), "{url}");
    assert!(url.ends_with(".png"));
    assert_eq!(h.backend.upload_count(), 1);
}

#[tokio::test]
async fn failed_upload_inlines_image() {
    let mut objects = MockObjectStore::new();
    objects.expect_list_buckets().returning(|| Ok(vec!["items".to_string()]));
    objects.expect_upload().times(1).returning(|_, _, _, _| Err(anyhow::anyhow!("payload too large")));
    let ports = Ports {
        rows: Arc::new(MemoryBackend::new()),
        objects: Arc::new(objects),
        auth: Arc::new(MockAuthProvider::new()),
        local: Arc::new(MemoryLocalStore::new()),
        random: Arc::new(ThreadRandom),
    };
    let app = StyleSync::new(ports, FacadeOptions::default());

    let url = app.items().upload_image("u1", image("coat.jpg")).await;
    assert!(url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn avatar_upload_errors_propagate() {
    let h = harness_with(MemoryBackend::new(), Arc::new(ThreadRandom), FacadeOptions::default());
    let err = assert_err!(h.app.users().upload_avatar("u1", image("me.png")).await);
    assert!(matches!(err, AppError::OperationFailed(_)));
}

#[tokio::test]
async fn search_matches_name_brand_and_colour() {
    let h = harness();
    let mut coat = new_item("Trench Coat", "outerwear");
    coat.brand = Some("Burberry".into());
    let mut tee = new_item("Tee", "shirts");
    tee.color = Some("Navy".into());
    h.app.items().create("u1", coat).await.unwrap();
    h.app.items().create("u1", tee).await.unwrap();

    assert_eq!(h.app.items().search("u1", "burb", None).await.len(), 1);
    assert_eq!(h.app.items().search("u1", "NAVY", None).await.len(), 1);
    assert_eq!(h.app.items().search("u1", "", Some("shirts")).await.len(), 1);
    assert!(h.app.items().search("u1", "navy", Some("outerwear")).await.is_empty());
}

#[tokio::test]
async fn random_outfit_takes_one_item_per_category() {
    let h = harness();
    for (name, cat) in [("A", "shirts"), ("B", "shirts"), ("C", "shirts"), ("D", "shoes"), ("E", "shoes")] {
        h.app.items().create("u1", new_item(name, cat)).await.unwrap();
    }
    let wardrobe = h.app.items().list("u1").await;

    let outfit = h.app.outfits().generate_random("u1", &[]).await.unwrap();

    assert!(outfit.items.len() <= 2);
    let cats: Vec<_> = outfit
        .items
        .iter()
        .map(|id| wardrobe.iter().find(|i| &i.id == id).unwrap().category_id.clone())
        .collect();
    assert!(cats.contains(&Some("shirts".into())));
    assert!(cats.contains(&Some("shoes".into())));
    assert!(outfit.name.starts_with("Random Outfit "));
    assert_eq!(outfit.description.as_deref(), Some("AI-generated random outfit"));
    assert!(!outfit.is_starred);
}

#[tokio::test]
async fn random_outfit_respects_category_filter() {
    let h = harness();
    h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    let boots = h.app.items().create("u1", new_item("Boots", "shoes")).await.unwrap();

    let outfit = h.app.outfits().generate_random("u1", &["shoes".to_string()]).await.unwrap();
    assert_eq!(outfit.items, vec![boots.id]);
}

#[tokio::test]
async fn random_outfit_without_items_fails() {
    let h = harness();
    let err = assert_err!(h.app.outfits().generate_random("u1", &[]).await);
    assert!(matches!(err, AppError::NoItems));
}

#[tokio::test]
async fn seeded_random_outfits_are_reproducible() {
    let rows: Vec<_> = (0..12)
        .map(|n| {
            json!({
                "id": format!("i{n}"), "user_id": "u1", "name": format!("item {n}"),
                "category_id": (["shirts", "shoes", "hats"][n % 3]),
                "created_at": "2026-01-01T00:00:00Z", "updated_at": "2026-01-01T00:00:00Z",
            })
        })
        .collect();

    let mut picks = Vec::new();
    for _ in 0..2 {
        let backend = MemoryBackend::new();
        backend.seed(Table::Items, rows.clone());
        let h = harness_with(backend, Arc::new(SeededRandom::new(99)), FacadeOptions::default());
        picks.push(h.app.outfits().generate_random("u1", &[]).await.unwrap().items);
    }
    assert_eq!(picks[0], picks[1]);
}

#[tokio::test]
async fn unstarring_removes_outfit_from_starred_list() {
    let h = harness();
    let outfit = h
        .app
        .outfits()
        .create("u1", NewOutfit { name: "Date night".into(), is_starred: true, ..Default::default() })
        .await
        .unwrap();
    assert_eq!(h.app.outfits().list_starred("u1").await.len(), 1);

    h.app.outfits().set_starred("u1", &outfit.id, false).await.unwrap();

    assert!(h.app.outfits().list_starred("u1").await.is_empty());
    assert_eq!(h.app.outfits().list("u1").await.len(), 1);
}

#[tokio::test]
async fn deleted_items_are_dropped_from_starred_outfits() {
    let h = harness();
    let tee = h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    let boots = h.app.items().create("u1", new_item("Boots", "shoes")).await.unwrap();
    h.app
        .outfits()
        .create(
            "u1",
            NewOutfit { name: "Weekend".into(), items: vec![tee.id.clone(), boots.id.clone()], is_starred: true, ..Default::default() },
        )
        .await
        .unwrap();

    h.app.items().delete("u1", &tee.id).await.unwrap();

    let starred = h.app.outfits().list_starred_with_items("u1").await;
    assert_eq!(starred.len(), 1);
    assert_eq!(starred[0].outfit.items.len(), 2);
    assert_eq!(starred[0].resolved_items.iter().map(|i| &i.id).collect::<Vec<_>>(), vec![&boots.id]);
}

#[tokio::test]
async fn upcoming_events_start_today_and_respect_limit() {
    let h = harness();
    let today = Utc::now().date_naive();
    for offset in [-2i64, 0, 1, 3, 5] {
        let date = if offset < 0 {
            today.checked_sub_days(Days::new(offset.unsigned_abs())).unwrap()
        } else {
            today.checked_add_days(Days::new(offset as u64)).unwrap()
        };
        let draft = NewEvent {
            title: format!("day {offset}"),
            date,
            description: None,
            time: None,
            location: None,
            weather_condition: None,
            outfit_id: None,
        };
        h.app.events().create("u1", draft).await.unwrap();
    }

    let all = h.app.events().list("u1").await;
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].date <= w[1].date));

    let upcoming = h.app.events().upcoming("u1", Some(2)).await;
    assert_eq!(upcoming.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(), ["day 0", "day 1"]);
    assert_eq!(h.app.events().upcoming("u1", None).await.len(), 4);
}

#[tokio::test]
async fn event_create_requires_title() {
    let h = harness();
    let draft = NewEvent {
        title: "".into(),
        date: Utc::now().date_naive(),
        description: None,
        time: None,
        location: None,
        weather_condition: None,
        outfit_id: None,
    };
    assert!(h.app.events().create("u1", draft).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn board_detail_skips_deleted_items() {
    let h = harness();
    let tee = h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    let hat = h.app.items().create("u1", new_item("Hat", "hats")).await.unwrap();
    let board = h
        .app
        .boards()
        .create("u1", NewBoard { name: "Summer".into(), ..Default::default() })
        .await
        .unwrap();
    h.app.boards().add_item("u1", &board.id, &tee.id, Position { x: 10.0, y: 20.0 }).await.unwrap();
    let placed = h.app.boards().add_item("u1", &board.id, &hat.id, Position { x: 0.0, y: 0.0 }).await.unwrap();
    h.app.boards().move_item("u1", &placed.id, Position { x: 55.5, y: 1.0 }).await.unwrap();

    h.app.items().delete("u1", &tee.id).await.unwrap();

    let detail = h.app.boards().get(Some("u1"), &board.id).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].item.id, hat.id);
    assert_eq!(detail.items[0].placement.position_x, 55.5);
}

#[tokio::test]
async fn missing_board_is_not_found() {
    let h = harness();
    let err = assert_err!(h.app.boards().get(None, "nope").await);
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Board"));
}

#[tokio::test]
async fn private_boards_are_hidden_from_other_viewers() {
    let h = harness();
    let private = h.app.boards().create("alice", NewBoard { name: "Drafts".into(), ..Default::default() }).await.unwrap();
    let open =
        h.app.boards().create("alice", NewBoard { name: "Lookbook".into(), is_public: true, ..Default::default() }).await.unwrap();

    assert!(h.app.boards().get(Some("alice"), &private.id).await.is_ok());
    let err = assert_err!(h.app.boards().get(None, &private.id).await);
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Board"));
    assert_err!(h.app.boards().get(Some("bob"), &private.id).await);
    assert!(h.app.boards().get(None, &open.id).await.is_ok());
    assert!(h.app.boards().get(Some("bob"), &open.id).await.is_ok());
}

#[tokio::test]
async fn board_placements_follow_the_board_owner() {
    let h = harness();
    let tee = h.app.items().create("alice", new_item("Tee", "shirts")).await.unwrap();
    let cap = h.app.items().create("bob", new_item("Cap", "hats")).await.unwrap();
    let board = h
        .app
        .boards()
        .create("alice", NewBoard { name: "Summer".into(), is_public: true, ..Default::default() })
        .await
        .unwrap();
    let placed = h.app.boards().add_item("alice", &board.id, &tee.id, Position { x: 1.0, y: 2.0 }).await.unwrap();

    assert_err!(h.app.boards().add_item("bob", &board.id, &cap.id, Position { x: 0.0, y: 0.0 }).await);
    assert_err!(h.app.boards().add_item("alice", &board.id, &cap.id, Position { x: 0.0, y: 0.0 }).await);
    let err = assert_err!(h.app.boards().move_item("bob", &placed.id, Position { x: 9.0, y: 9.0 }).await);
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Board item"));
    assert_err!(h.app.boards().remove_item("bob", &placed.id).await);
    assert_err!(h.app.boards().delete("bob", &board.id).await);

    let detail = h.app.boards().get(None, &board.id).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].placement.position_x, 1.0);

    h.app.boards().remove_item("alice", &placed.id).await.unwrap();
    h.app.boards().delete("alice", &board.id).await.unwrap();
    assert!(h.backend.rows(Table::Boards).is_empty());
}

#[tokio::test]
async fn public_boards_carry_owner_summary() {
    let h = harness();
    h.backend.seed(
        Table::Users,
        [json!({ "id": "u1", "email": "ada@example.com", "full_name": "Ada", "avatar_url": null,
                 "created_at": Utc::now(), "updated_at": Utc::now() })],
    );
    h.app.boards().create("u1", NewBoard { name: "Open".into(), is_public: true, ..Default::default() }).await.unwrap();
    h.app.boards().create("u1", NewBoard { name: "Private".into(), ..Default::default() }).await.unwrap();

    let public = h.app.boards().list_public().await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].user.as_ref().and_then(|u| u.full_name.as_deref()), Some("Ada"));
    assert_eq!(h.app.boards().list("u1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn profile_stats_count_everything() {
    let h = harness();
    h.app.items().create("u1", new_item("Tee", "shirts")).await.unwrap();
    h.app.outfits().create("u1", NewOutfit { name: "A".into(), is_starred: true, ..Default::default() }).await.unwrap();
    h.app.outfits().create("u1", NewOutfit { name: "B".into(), ..Default::default() }).await.unwrap();

    let stats = h.app.users().stats("u1").await;
    assert_eq!(stats, ProfileStats { items: 1, outfits: 2, starred: 1, events: 0 });
}

#[tokio::test]
async fn storage_check_reports_missing_bucket_and_cleans_up() {
    let h = harness_with(MemoryBackend::with_buckets(&["items"]), Arc::new(ThreadRandom), FacadeOptions::default());

    let report = h.app.diagnostics().test_storage().await;

    assert!(report.success);
    assert_eq!(report.missing_buckets, vec!["avatars".to_string()]);
    assert!(!report.has_required_buckets);
    assert!(report.access.iter().all(|a| a.accessible));
    let upload = report.upload.unwrap();
    assert!(upload.uploaded && upload.cleaned_up);
    assert_eq!(h.backend.upload_count(), 1);
}

#[tokio::test]
async fn diagnostics_report_instead_of_failing() {
    let h = harness();
    h.backend.set_offline(true);

    assert!(!h.app.diagnostics().test_connection().await.success);
    assert!(!h.app.diagnostics().test_storage().await.success);
    let db = h.app.diagnostics().debug_database().await;
    assert_eq!(db.probes.len(), 4);
    assert!(!db.all_ok());
}

#[tokio::test]
async fn sign_up_creates_profile_row() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_up().returning(|email, _, name| {
        Ok(SignUpOutcome {
            user: AuthUser { id: "new-user".into(), email: email.into(), full_name: Some(name.into()) },
            session: None,
        })
    });
    let backend = Arc::new(MemoryBackend::new());
    let ports = Ports {
        rows: backend.clone(),
        objects: backend.clone(),
        auth: Arc::new(auth),
        local: Arc::new(MemoryLocalStore::new()),
        random: Arc::new(ThreadRandom),
    };
    let app = StyleSync::new(ports, FacadeOptions::default());

    let request = SignUpRequest {
        email: " ada@example.com ".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        full_name: "Ada".into(),
    };
    let outcome = app.auth().sign_up(request).await.unwrap();

    assert!(outcome.session.is_none());
    let profile = app.users().get_profile("new-user").await.unwrap();
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.full_name.as_deref(), Some("Ada"));
}
