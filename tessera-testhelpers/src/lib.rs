#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
//! Test setup shared by the tessera crates.
//!
//! Call [`setup`] at the top of a test. Panics get a trimmed, colored
//! backtrace and the pipeline's `tracing` events are printed through the
//! test writer, so they only show up for failing tests.
//!
//! `TESSERA_LOG` takes a `Targets` filter, e.g.
//! `TESSERA_LOG=tessera=trace,tessera_protobuf=debug`. Without it the
//! tessera crates log at `trace` and everything else at `warn`.

use core::fmt::Write as _;
use std::io::IsTerminal;
use std::sync::LazyLock;
use std::time::Instant;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CRATES: [&str; 4] = ["tessera", "tessera_core", "tessera_protobuf", "tessera_array"];

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

fn filter() -> Targets {
    if let Some(targets) = std::env::var("TESSERA_LOG")
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
    {
        return targets;
    }
    CRATES
        .into_iter()
        .fold(Targets::new().with_default(Level::WARN), |targets, name| {
            targets.with_target(name, Level::TRACE)
        })
}

/// Frames every test panic drags along.
fn is_harness_frame(name: &str) -> bool {
    const PREFIXES: [&str; 6] = [
        "test::run_test",
        "test::__rust_begin_short_backtrace",
        "std::panicking::",
        "std::panic::",
        "core::panicking::",
        "core::ops::function::FnOnce::call_once",
    ];
    PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;
    let color = std::io::stderr().is_terminal();

    color_backtrace::BacktracePrinter::new()
        .verbosity(color_backtrace::Verbosity::Full)
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| frame.name.as_deref().is_none_or(|n| !is_harness_frame(n)))
        }))
        .install(Box::new(termcolor::StandardStream::stderr(if color {
            termcolor::ColorChoice::AlwaysAnsi
        } else {
            termcolor::ColorChoice::Never
        })));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(color)
                .with_timer(Uptime)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .with_test_writer()
                .compact(),
        )
        .with(filter())
        .try_init()
        .ok();
});

/// Sets up backtraces and a tracing subscriber, once per process.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

/// Formats encoded bytes as space-separated hex pairs, for assertion
/// messages.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_pairs_are_space_separated() {
        setup();
        assert_eq!(hex(&[0x08, 0x96, 0x01]), "08 96 01");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn harness_frames_are_recognized() {
        assert!(is_harness_frame("std::panicking::begin_panic"));
        assert!(!is_harness_frame("tessera::serializer::Serializer::serialize"));
    }
}
