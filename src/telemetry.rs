use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber once, before any request is served.
/// Safe to call again (tests do); later calls are no-ops.
pub fn init() {
    INIT.get_or_init(|| {
        let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt::Subscriber::builder().with_env_filter(env).try_init();
    });
}
