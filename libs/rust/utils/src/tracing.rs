use futures::{Future, FutureExt};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const QUIET_TARGETS: [&str; 4] = ["hyper_util=off", "reqwest=off", "reqwest_retry=warn", "h2=off"];

pub fn setup_tracing() {
    let mut filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    for target in QUIET_TARGETS {
        match target.parse() {
            Ok(directive) => filter_layer = filter_layer.add_directive(directive),
            Err(e) => eprintln!("invalid tracing directive {target}: {e}"),
        }
    }

    // Ensure the fmt layer logs to the console
    let fmt_layer = fmt::layer()
        .with_line_number(true)
        .compact()
        .with_writer(std::io::stdout);

    // try_init so tests and repeated calls do not panic on a second global subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}

/// Runs the service future with tracing installed; panics are logged with a backtrace.
pub async fn run_with_tracing<F, Fut>(future: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
{
    setup_tracing();

    // Wrap the async block in a catch_unwind
    let result = std::panic::AssertUnwindSafe(future()).catch_unwind().await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!(error = %e, error_chain = ?e, "Service exited with error");
            Err(e)
        }
        Err(e) => {
            capture_panic_details(e);
            Err(anyhow::anyhow!("service panicked"))
        }
    }
}

fn capture_panic_details(e: Box<dyn std::any::Any + Send>) {
    let backtrace = backtrace::Backtrace::new();
    if let Some(s) = e.downcast_ref::<&str>() {
        error!(panic_message = *s, backtrace = ?backtrace, "Panic occurred with message");
    } else if let Some(s) = e.downcast_ref::<String>() {
        error!(panic_message = s.as_str(), backtrace = ?backtrace, "Panic occurred with message");
    } else {
        error!(backtrace = ?backtrace, "Panic occurred but the payload is not a string");
    }
}
