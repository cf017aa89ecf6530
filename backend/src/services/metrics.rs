use lazy_static::lazy_static;
use prometheus::{CounterVec, Opts, Registry};

lazy_static! {
    /// Registry scraped by `GET /metrics`.
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref ANNOUNCEMENT_REQUESTS_COUNTER: CounterVec = {
        let counter = CounterVec::new(
            Opts::new(
                "announcements_requests_total",
                "Announcement operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .unwrap();
        REGISTRY.register(Box::new(counter.clone())).unwrap();
        counter
    };
}

/// Count one finished operation; `outcome` is `ok` or an error kind.
pub fn record(operation: &str, outcome: &str) {
    ANNOUNCEMENT_REQUESTS_COUNTER
        .with_label_values(&[operation, outcome])
        .inc();
}
