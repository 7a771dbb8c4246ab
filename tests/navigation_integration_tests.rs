use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wayfinder::core::NavigationStore;
use wayfinder::core::path::{encode_legacy_redirect, normalize, resolve};
use wayfinder::loader::{
    LoadError, Loader, Module, Prefetcher, RELOAD_MARKER_KEY, Render, ResilientLoader, loader,
};
use wayfinder::platform::{
    HistoryPort, Location, MemoryHistory, MemoryStorage, RecordingReloader, SessionStorage,
};
use wayfinder::routes::{AvailabilityPolicy, Fallbacks, Resolution, RouteTable, Visibility};

// ============================================================================
// Helper Functions
// ============================================================================

struct Page(&'static str);

impl Render for Page {
    fn render(&self) -> String {
        self.0.to_string()
    }
}

fn page(name: &'static str) -> Loader {
    loader(move || async move { Ok(Module::new(Page(name))) })
}

/// Loader that fails with `message` until `healthy` is flipped, counting calls.
fn flaky(message: &'static str, healthy: Arc<AtomicUsize>, calls: Arc<AtomicUsize>) -> Loader {
    loader(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        let healthy = healthy.load(Ordering::SeqCst) > 0;
        async move {
            tokio::task::yield_now().await;
            if healthy {
                Ok(Module::new(Page("ok")))
            } else {
                Err(LoadError::module(message))
            }
        }
    })
}

fn fallbacks() -> Fallbacks {
    Fallbacks {
        coming_soon: page("coming-soon"),
        not_found: page("not-found"),
    }
}

struct Session {
    storage: Arc<MemoryStorage>,
    reloader: Arc<RecordingReloader>,
    loader: ResilientLoader,
}

fn session(url: &str) -> Session {
    let storage = Arc::new(MemoryStorage::new());
    let reloader = Arc::new(RecordingReloader::new());
    let history = Arc::new(MemoryHistory::new(url));
    let loader = ResilientLoader::new(storage.clone(), history, reloader.clone());
    Session {
        storage,
        reloader,
        loader,
    }
}

// ============================================================================
// Path Resolution
// ============================================================================

#[test]
fn test_normalization_properties() {
    assert_eq!(normalize("/"), "/");
    assert_eq!(normalize(""), "/");
    assert_eq!(normalize("/foo/"), "/foo");
    assert_eq!(normalize("/foo//"), "/foo");
    for input in ["/foo//", "", "x/", "/a/b/c/", "////"] {
        assert_eq!(normalize(&normalize(input)), normalize(input));
    }
}

#[test]
fn test_legacy_redirect_round_trip() {
    let cases = [
        ("/govern/audit-detail", "?decision=GV-1"),
        ("/govern/audit-detail", "?decision=GV-1%26GV-2"),
        ("/grow", ""),
        ("/docs/style-guide", "?a=1&b=two%20words"),
    ];
    for (path, search) in cases {
        let encoded = encode_legacy_redirect(path, search);
        let state = resolve(&Location::parse(&encoded));
        assert_eq!(state.path, path, "encoded as {encoded}");
        assert_eq!(state.search, search, "encoded as {encoded}");
    }
}

// ============================================================================
// Navigation Store
// ============================================================================

#[test]
fn test_repeated_navigation_to_current_location_adds_no_entries() {
    let history = Arc::new(MemoryHistory::new("/govern?decision=GV-1"));
    let store = NavigationStore::new(history.clone());

    store.navigate("/govern?decision=GV-1");
    store.navigate("/govern?decision=GV-1");
    assert_eq!(history.len(), 1);
}

#[test]
fn test_scroll_reset_only_on_path_change() {
    let history = Arc::new(MemoryHistory::new("/grow"));
    let store = NavigationStore::new(history.clone());

    store.navigate("/grow?view=cards");
    assert_eq!(history.scroll_resets(), 0);

    store.navigate("/govern");
    assert_eq!(history.scroll_resets(), 1);
}

#[test]
fn test_back_behaves_like_fresh_load() {
    let history = Arc::new(MemoryHistory::new("/?/govern/audit-detail&decision=GV-1"));
    let store = NavigationStore::new(history.clone());
    let initial = store.current();

    store.navigate("/grow");
    history.back();
    store.sync_from_location();

    assert_eq!(store.current(), initial);
    assert_eq!(store.current(), resolve(&history.location()));
}

// ============================================================================
// Resilient Loader
// ============================================================================

#[tokio::test]
async fn test_one_shot_reload_guard() {
    let s = session("/grow");
    let healthy = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let load = flaky("ChunkLoadError: Loading chunk 12 failed.", healthy, calls.clone());

    for _ in 0..4 {
        assert!(s.loader.load(&load).await.is_err());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(s.reloader.count(), 1);
    assert_eq!(s.storage.get(RELOAD_MARKER_KEY).unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_marker_self_heals_after_success() {
    let s = session("/grow");
    let healthy = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let load = flaky("ChunkLoadError", healthy.clone(), calls);

    assert!(s.loader.load(&load).await.is_err());
    assert_eq!(s.reloader.count(), 1);

    healthy.store(1, Ordering::SeqCst);
    assert!(s.loader.load(&load).await.is_ok());
    assert_eq!(s.storage.get(RELOAD_MARKER_KEY).unwrap(), None);

    healthy.store(0, Ordering::SeqCst);
    assert!(s.loader.load(&load).await.is_err());
    assert!(s.loader.load(&load).await.is_err());
    assert_eq!(s.reloader.count(), 2);
}

#[tokio::test]
async fn test_success_on_other_route_also_heals() {
    let s = session("/grow");
    let broken = flaky(
        "TypeError: Failed to fetch dynamically imported module",
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    );

    assert!(s.loader.load(&broken).await.is_err());
    assert!(s.loader.load(&page("home")).await.is_ok());
    assert!(s.loader.load(&broken).await.is_err());
    assert_eq!(s.reloader.count(), 2);
}

// ============================================================================
// Route Table
// ============================================================================

#[tokio::test]
async fn test_forced_hidden_wins_over_ready() {
    let policy = AvailabilityPolicy {
        production: false,
        always_public: vec![],
        forced_hidden: vec!["/test/spectacular".to_string()],
        ready: vec!["/test/spectacular".to_string()],
    };
    let table = RouteTable::new(policy, fallbacks()).with_route(
        "/test/spectacular",
        Visibility::Public,
        page("spectacular"),
    );

    let (resolution, load) = table.resolve("/test/spectacular");
    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(load().await.unwrap().render(), "not-found");
}

// ============================================================================
// Prefetcher
// ============================================================================

#[tokio::test]
async fn test_prefetch_dedup_and_retry() {
    let healthy = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let policy = AvailabilityPolicy {
        ready: vec!["/grow".to_string()],
        ..Default::default()
    };
    let table = RouteTable::new(policy, fallbacks()).with_route(
        "/grow",
        Visibility::Public,
        flaky("Loading chunk 1 failed.", healthy.clone(), calls.clone()),
    );
    let prefetcher = Prefetcher::new(Arc::new(table));

    futures::join!(prefetcher.prefetch("/grow"), prefetcher.prefetch("/grow"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    healthy.store(1, Ordering::SeqCst);
    prefetcher.prefetch("/grow").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    prefetcher.prefetch("/grow").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
