// ── Host console & message pump ───────────────────────────────────────────────
//
// The host owns the one output surface a plugin has: its message console.
// Plugins register a sink once at load time; everything this crate logs is
// forwarded there through the `log` facade.  Until a sink is registered,
// output falls back to stderr so nothing is silently lost.

use std::sync::RwLock;

use log::{LevelFilter, Metadata, Record};

// ── Console sink ──────────────────────────────────────────────────────────────

type Sink = Box<dyn Fn(&str) + Send + Sync>;

static SINK: RwLock<Option<Sink>> = RwLock::new(None);

/// Register the host's message-console callback.
///
/// The sink receives complete lines including the trailing newline.
/// Replaces any previously registered sink.
pub fn set_console_sink(sink: impl Fn(&str) + Send + Sync + 'static) {
    if let Ok(mut slot) = SINK.write() {
        *slot = Some(Box::new(sink));
    }
}

/// Write text to the host message console (or stderr if no sink is set).
pub fn message(text: &str) {
    match SINK.read() {
        Ok(slot) => match slot.as_ref() {
            Some(sink) => sink(text),
            None => eprint!("{text}"),
        },
        // A poisoned lock means a sink panicked; drop the output rather
        // than propagate.
        Err(_) => {}
    }
}

// ── log::Log adapter ──────────────────────────────────────────────────────────

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            message(&format!(
                "{}: {}\n",
                record.level().as_str().to_ascii_lowercase(),
                record.args()
            ));
        }
    }

    fn flush(&self) {}
}

/// Route `log` records from this crate (and any other crate in the plugin)
/// to the host console.
///
/// Safe to call more than once; only the first call installs the logger,
/// later calls just adjust the level filter.
pub fn install_logger(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

// ── Message pump ──────────────────────────────────────────────────────────────

/// Drain pending window messages for the calling thread.
///
/// The host's long-running operations never yield to their own message
/// loop; calling this between work items keeps the UI responsive.  The
/// wait box calls it internally after every visual refresh.
pub fn process_events() {
    #[cfg(windows)]
    crate::platform::win32::pump::process_events();
}
