pub mod build_info;

use std::sync::Once;

use tracing_subscriber::filter::Directive;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber. `RUST_LOG` adds to the default `salesboard=info`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "salesboard=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
