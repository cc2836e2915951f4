use std::sync::Once;

static LOGGING: Once = Once::new();

/// Set up logging once per test binary, filtered by `RENDEZVOUS_LOG`
pub fn setup_logging() {
    LOGGING.call_once(|| {
        dotenv::dotenv().ok();

        let filter = std::env::var_os("RENDEZVOUS_LOG").unwrap_or_default();
        let filter = filter
            .to_str()
            .expect("RENDEZVOUS_LOG env var is not UTF-8");
        let filter = if filter.is_empty() { "warn" } else { filter };

        rendezvous_hash::logging::setup_raw(false, filter).expect("failed to setup logging");
    });
}

pub fn cache_nodes(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("cache-{}.internal:11211", i))
        .collect()
}

pub fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key-{}", i)).collect()
}
