use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::Uptime;

const DEFAULT_FILTER: &str = "info";

pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let tree = HierarchicalLayer::default()
        .with_indent_amount(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_deferred_spans(true)
        .with_timer(Uptime::default());
    if let Err(e) = Registry::default().with(filter).with(tree).try_init() {
        eprintln!("logging already initialized: {e}");
    }
}
