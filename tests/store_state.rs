// tests/store_state.rs
use chrono::{TimeZone, Utc};
use ddo_news_herald::post::EnrichedPost;
use ddo_news_herald::store::Store;

fn post(title: &str, day: u32) -> EnrichedPost {
    EnrichedPost {
        title: title.to_string(),
        date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        link: Some(format!("https://www.ddo.com/en/news/{title}")),
        image: None,
        desc: None,
    }
}

#[test]
fn absent_file_means_no_prior_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::load(tmp.path().join("store.json")).unwrap();
    assert!(store.watermark().is_none());
    assert!(store.latest_news().is_none());
}

#[test]
fn malformed_file_is_fatal_at_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(Store::load(path).is_err());
}

#[test]
fn update_persists_the_maximum_dated_post() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.json");
    let store = Store::load(&path).unwrap();

    let now = Utc::now();
    // deliberately unsorted batch
    store
        .update(&[post("older", 8), post("newest", 10), post("middle", 9)], now)
        .unwrap();

    assert_eq!(store.latest_news().unwrap().title, "newest");
    assert_eq!(store.watermark().unwrap().timestamp_millis(), now.timestamp_millis());

    // survives a reload
    let reloaded = Store::load(&path).unwrap();
    assert_eq!(reloaded.latest_news().unwrap().title, "newest");
    assert_eq!(reloaded.watermark(), store.watermark());
}

#[test]
fn empty_batch_leaves_the_store_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.json");
    let store = Store::load(&path).unwrap();
    store.update(&[], Utc::now()).unwrap();
    assert!(store.watermark().is_none());
    assert!(!path.exists());
}

#[test]
fn update_creates_missing_parent_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(".data/nested/store.json");
    let store = Store::load(&path).unwrap();
    store.update(&[post("only", 10)], Utc::now()).unwrap();
    assert!(path.exists());
}

#[test]
fn persisted_layout_uses_camel_case_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.json");
    let store = Store::load(&path).unwrap();
    store.update(&[post("only", 10)], Utc::now()).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json.get("latestNews").is_some());
    assert!(json.get("lastUpdate").is_some());
    assert_eq!(json["latestNews"]["title"], "only");
    // image/desc omitted when absent
    assert!(json["latestNews"].get("image").is_none());
}
