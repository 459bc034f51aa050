//! End-to-end transition tests driving `NavigationManager` against an
//! in-memory site.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use url::Url;

use crate::config::TransitionConfig;
use crate::core::Location;
use crate::dom::{Document, Node, render};
use crate::engine::manager::NavigationManager;
use crate::error::NavigationError;
use crate::fetch::StaticSite;

fn page(head: &str, body: &str) -> String {
    format!("<html><head>{head}</head><body>{body}</body></html>")
}

fn manager_at(
    initial: &str,
    url: &str,
    site: StaticSite,
) -> NavigationManager<StaticSite> {
    let document = Document::parse(initial).unwrap();
    let location = Location::parse(url).unwrap();
    NavigationManager::new(document, location, site, TransitionConfig::default())
}

fn head_html(manager: &NavigationManager<StaticSite>) -> String {
    manager.with_document(|doc| render::render_element(doc.head()))
}

fn body_html(manager: &NavigationManager<StaticSite>) -> String {
    manager.with_document(|doc| render::render_element(doc.body()))
}

// =============================================================================
// Script execution
// =============================================================================

#[tokio::test]
async fn test_shared_script_executes_exactly_once() {
    let shared = "<script src=\"/js/shared.js\"></script>";
    let site = StaticSite::new()
        .page("/one/", page("", &format!("<p>one</p>{shared}")))
        .page("/two/", page("", &format!("<p>two</p>{shared}")));
    let manager = manager_at(&page("", "<p>home</p>"), "https://site.example/", site);

    manager.navigate("/one/").await.unwrap();
    // First encounter: a fresh script node is installed.
    assert!(body_html(&manager).contains("/js/shared.js"));

    manager.navigate("/two/").await.unwrap();
    // Second encounter: suppressed, the node is gone entirely.
    assert!(!body_html(&manager).contains("/js/shared.js"));
    assert_eq!(manager.executed_scripts(), vec!["/js/shared.js".to_string()]);
}

#[tokio::test]
async fn test_initial_page_scripts_seeded_not_reexecuted() {
    let site = StaticSite::new().page(
        "/next/",
        page("", "<script src=\"/js/boot.js\"></script><p>next</p>"),
    );
    let manager = manager_at(
        &page("", "<script src=\"/js/boot.js\"></script><p>home</p>"),
        "https://site.example/",
        site,
    );

    manager.navigate("/next/").await.unwrap();
    assert!(!body_html(&manager).contains("boot.js"));
}

#[tokio::test]
async fn test_script_dedup_across_page_depths() {
    // The initial page at /a/page/ loads the shared script as ../shared.js;
    // the target page at /page/ loads it as shared.js. Same resource, one
    // registry key.
    let site = StaticSite::new().page(
        "/page/",
        page("", "<script src=\"shared.js\"></script><p>top</p>"),
    );
    let manager = manager_at(
        &page("", "<script src=\"../shared.js\"></script><p>deep</p>"),
        "https://site.example/a/page/",
        site,
    );

    manager.navigate("/page/").await.unwrap();
    assert!(!body_html(&manager).contains("shared.js"));
}

#[tokio::test]
async fn test_inline_scripts_always_reinstalled() {
    let inline = "<script>window.hits = (window.hits || 0) + 1;</script>";
    let site = StaticSite::new()
        .page("/one/", page("", &format!("<p>one</p>{inline}")))
        .page("/two/", page("", &format!("<p>two</p>{inline}")));
    let manager = manager_at(&page("", ""), "https://site.example/", site);

    manager.navigate("/one/").await.unwrap();
    assert!(body_html(&manager).contains("window.hits"));

    manager.navigate("/two/").await.unwrap();
    assert!(body_html(&manager).contains("window.hits"));
}

// =============================================================================
// Head reconciliation
// =============================================================================

#[tokio::test]
async fn test_stylesheet_continuity() {
    let sheet = "<link rel=\"stylesheet\" href=\"/site.css\">";
    let site = StaticSite::new().page(
        "/about/",
        page(&format!("<title>About</title>{sheet}"), "<p>about</p>"),
    );
    let manager = manager_at(
        &page(&format!("<title>Home</title>{sheet}"), "<p>home</p>"),
        "https://site.example/",
        site,
    );

    manager.navigate("/about/").await.unwrap();

    let occurrences = head_html(&manager).matches("/site.css").count();
    assert_eq!(occurrences, 1);
    assert!(head_html(&manager).contains("<title>About</title>"));
    assert!(!head_html(&manager).contains("Home"));
}

#[tokio::test]
async fn test_preconnect_dedup_across_navigation() {
    let hint = "<link rel=\"preconnect\" href=\"https://cdn.example.com\">";
    let site = StaticSite::new().page("/next/", page(hint, "<p>next</p>"));
    let manager = manager_at(&page(hint, "<p>home</p>"), "https://site.example/", site);

    manager.navigate("/next/").await.unwrap();
    assert_eq!(head_html(&manager).matches("preconnect").count(), 1);
}

#[tokio::test]
async fn test_body_referenced_stylesheet_not_doubled() {
    let sheet = "<link rel=\"stylesheet\" href=\"/site.css\">";
    let site = StaticSite::new().page("/next/", page("", &format!("{sheet}<p>next</p>")));
    let manager = manager_at(&page(sheet, "<p>home</p>"), "https://site.example/", site);

    manager.navigate("/next/").await.unwrap();

    // The target page references the live sheet from its body; exactly one
    // node for it may survive in the whole document.
    let html = manager.with_document(Document::to_html);
    assert_eq!(html.matches("/site.css").count(), 1);
}

#[tokio::test]
async fn test_noscript_content_literalized() {
    let site = StaticSite::new().page(
        "/next/",
        page(
            "<noscript><img src=\"/pixel.gif\"></noscript>",
            "<p>next</p>",
        ),
    );
    let manager = manager_at(&page("", "<p>home</p>"), "https://site.example/", site);

    manager.navigate("/next/").await.unwrap();

    manager.with_document(|doc| {
        let noscript = doc
            .head()
            .child_elements()
            .find(|el| el.tag == "noscript")
            .unwrap();
        assert!(matches!(noscript.children.as_slice(), [Node::Text(_)]));
    });
}

// =============================================================================
// Root attributes and failure behavior
// =============================================================================

#[tokio::test]
async fn test_html_attribute_reconciliation() {
    let site = StaticSite::new().page(
        "/fr/",
        "<html lang=\"fr\" data-new=\"y\"><head></head><body></body></html>",
    );
    let manager = manager_at(
        "<html lang=\"en\" data-old=\"x\"><head></head><body></body></html>",
        "https://site.example/",
        site,
    );

    manager.navigate("/fr/").await.unwrap();

    manager.with_document(|doc| {
        assert_eq!(doc.root.attr("lang"), Some("fr"));
        assert_eq!(doc.root.attr("data-new"), Some("y"));
        assert!(!doc.root.has_attr("data-old"));
    });
}

#[tokio::test]
async fn test_relative_target_fetched_at_resolved_path() {
    let site = StaticSite::new().page("/guide/about/", page("", "<p>about the guide</p>"));
    let manager = manager_at(&page("", "<p>guide</p>"), "https://site.example/guide/", site);

    manager.navigate("about/").await.unwrap();

    assert!(body_html(&manager).contains("about the guide"));
    assert_eq!(manager.location().short_form(), "/guide/about/");
}

#[tokio::test]
async fn test_404_leaves_document_untouched() {
    let site = StaticSite::new();
    let manager = manager_at(
        &page("<title>Home</title>", "<p>home</p>"),
        "https://site.example/",
        site,
    );
    let before = manager.with_document(Document::to_html);

    let err = manager.navigate("/missing/").await.unwrap_err();
    match err {
        NavigationError::Http { uri, status } => {
            assert_eq!(uri, "/missing/");
            assert_eq!(status, 404);
        }
        other => panic!("expected http error, got {other:?}"),
    }

    assert_eq!(manager.with_document(Document::to_html), before);
    assert_eq!(manager.location().short_form(), "/");
}

// =============================================================================
// Lifecycle listeners
// =============================================================================

#[tokio::test]
async fn test_listener_scoping_by_predicate() {
    let site = StaticSite::new()
        .page("/guide/x/", page("", "<p>guide</p>"))
        .page("/other/", page("", "<p>other</p>"));
    let manager = manager_at(&page("", ""), "https://site.example/", site);

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    manager.on_after(
        |url: &Url| url.path().starts_with("/guide"),
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );

    manager.navigate("/guide/x/").await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    manager.navigate("/other/").await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_before_listener_sees_old_url() {
    let site = StaticSite::new().page("/about/", page("", "<p>about</p>"));
    let manager = manager_at(&page("", ""), "https://site.example/start/", site);

    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let paths = seen.clone();
    manager.on_before(
        move |url: &Url| {
            paths.lock().push(url.path().to_string());
            true
        },
        || {},
    );

    manager.navigate("/about/").await.unwrap();
    assert_eq!(*seen.lock(), vec!["/start/".to_string()]);
}

#[tokio::test]
async fn test_listener_panic_does_not_abort_transition() {
    let site = StaticSite::new().page("/next/", page("", "<p>next</p>"));
    let manager = manager_at(&page("", ""), "https://site.example/", site);

    let hits = Arc::new(AtomicUsize::new(0));
    manager.on_after(|_: &Url| true, || panic!("listener bug"));
    let counter = hits.clone();
    manager.on_after(|_: &Url| true, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    manager.navigate("/next/").await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(body_html(&manager).contains("next"));
}

#[tokio::test]
async fn test_listener_may_register_listener_mid_fire() {
    let site = StaticSite::new()
        .page("/next/", page("", "<p>next</p>"))
        .page("/again/", page("", "<p>again</p>"));
    let manager = Arc::new(manager_at(&page("", ""), "https://site.example/", site));

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let handle = manager.clone();
    manager.on_after(|_: &Url| true, move || {
        let counter = counter.clone();
        handle.on_after(|_: &Url| true, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    });

    // Registering from inside a callback must not wedge the navigation,
    // and the new listener only applies from the next event on.
    manager.navigate("/next/").await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    manager.navigate("/again/").await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_overlapping_navigation_superseded() {
    let site = StaticSite::new()
        .page("/a/", page("", "<p>a</p>"))
        .page("/b/", page("", "<p>b</p>"))
        .with_latency(Duration::from_millis(20));
    let manager = manager_at(&page("", "<p>home</p>"), "https://site.example/", site);

    let (first, second) = tokio::join!(manager.navigate("/a/"), manager.navigate("/b/"));

    assert!(matches!(first, Err(NavigationError::Superseded { uri }) if uri == "/a/"));
    second.unwrap();
    assert!(body_html(&manager).contains("<p>b</p>"));
    assert_eq!(manager.location().short_form(), "/b/");
}

#[tokio::test]
async fn test_supersede_guard_can_be_disabled() {
    let site = StaticSite::new()
        .page("/a/", page("", "<p>a</p>"))
        .page("/b/", page("", "<p>b</p>"))
        .with_latency(Duration::from_millis(20));

    let config = TransitionConfig {
        supersede_in_flight: false,
        ..TransitionConfig::default()
    };
    let document = Document::parse(&page("", "<p>home</p>")).unwrap();
    let location = Location::parse("https://site.example/").unwrap();
    let manager = NavigationManager::new(document, location, site, config);

    let (first, second) = tokio::join!(manager.navigate("/a/"), manager.navigate("/b/"));
    first.unwrap();
    second.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_navigation_to_scriptless_pages_completes() {
    // Script-free pages keep the registry empty, so every navigation takes
    // the seeding path; two tasks hammering it exercise the nesting of the
    // document and scripts locks.
    let site = StaticSite::new()
        .page("/a/", page("", "<p>a</p>"))
        .page("/b/", page("", "<p>b</p>"));
    let config = TransitionConfig {
        supersede_in_flight: false,
        ..TransitionConfig::default()
    };
    let document = Document::parse(&page("", "<p>home</p>")).unwrap();
    let location = Location::parse("https://site.example/").unwrap();
    let manager = Arc::new(NavigationManager::new(document, location, site, config));

    let left = {
        let manager = manager.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                manager.navigate("/a/").await.unwrap();
            }
        })
    };
    let right = {
        let manager = manager.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                manager.navigate("/b/").await.unwrap();
            }
        })
    };

    left.await.unwrap();
    right.await.unwrap();
}

// =============================================================================
// Installation
// =============================================================================

#[tokio::test]
async fn test_install_claims_process_slot_once() {
    let document = Document::parse(&page("", "")).unwrap();
    let location = Location::parse("https://site.example/").unwrap();
    let first = NavigationManager::install(
        document.clone(),
        location.clone(),
        StaticSite::new(),
        TransitionConfig::default(),
    );
    assert!(first.is_ok());

    let second = NavigationManager::install(
        document,
        location,
        StaticSite::new(),
        TransitionConfig::default(),
    );
    assert!(matches!(second, Err(NavigationError::AlreadyInstalled)));
}
