// tests/listing_extract.rs
use chrono::{DateTime, TimeZone, Utc};
use ddo_news_herald::config::SourceConfig;
use ddo_news_herald::listing::extract_posts;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

#[test]
fn listing_yields_posts_in_page_order() {
    let cfg = SourceConfig::default();
    let posts = extract_posts(include_bytes!("fixtures/listing.html"), &cfg).unwrap();

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].title, "Update 60 Released");
    assert_eq!(posts[0].date, day(10));
    assert_eq!(posts[0].link.as_deref(), Some("/en/news/update-60"));

    assert_eq!(posts[1].title, "Weekly Coupon Code");
    assert_eq!(posts[1].date, day(9));

    // absolute links survive as-is
    assert_eq!(
        posts[2].link.as_deref(),
        Some("https://forums.ddo.com/threads/lamannia-preview")
    );

    // newest-first page order preserved
    assert!(posts[0].date > posts[1].date && posts[1].date > posts[2].date);
}

#[test]
fn empty_listing_is_a_normal_empty_result() {
    let cfg = SourceConfig::default();
    let posts = extract_posts(include_bytes!("fixtures/listing_empty.html"), &cfg).unwrap();
    assert!(posts.is_empty());
}

#[test]
fn block_with_missing_pieces_gets_defaults() {
    let cfg = SourceConfig::default();
    let html = br#"
        <div class="article-item">
            <time datetime="2024-03-10">March 10</time>
        </div>"#;
    let posts = extract_posts(html, &cfg).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "No title found");
    // the date lives in the `title` attribute; `datetime` alone does not count
    assert_eq!(posts[0].date, DateTime::UNIX_EPOCH);
    assert_eq!(posts[0].link, None);
}

#[test]
fn custom_selectors_are_honored() {
    let cfg = SourceConfig {
        post_selector: "li.entry".into(),
        title_selector: "h2".into(),
        date_attr: "datetime".into(),
        ..SourceConfig::default()
    };
    let html = br#"
        <ul>
          <li class="entry">
            <h2>Custom layout</h2>
            <time datetime="2024-03-10T12:00:00Z">today</time>
            <a href="/custom">more</a>
          </li>
        </ul>"#;
    let posts = extract_posts(html, &cfg).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Custom layout");
    assert_eq!(posts[0].date, day(10));
    assert_eq!(posts[0].link.as_deref(), Some("/custom"));
}
