//! Cooperative task plumbing — the scheduling contract of the firmware.
//!
//! Two long-lived tasks share one thread through an
//! `edge_executor::LocalExecutor`, with `async-io-mini` providing
//! reactor-driven timers (no busy-spinning):
//!
//! 1. **Scan loop** — one [`ScanTask::tick`] pass per `scan_interval_ms`.
//! 2. **HTTP serve loop** — accepts and answers control requests
//!    ([`http::server::serve`](crate::http::server::serve)).
//!
//! A third small task polls the network link every few seconds
//! ([`link_loop`]); it never touches the core.
//!
//! ```text
//!  ┌───────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on (drives reactor + futures)        │
//!  │  ┌─────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                       │  │
//!  │  │  ┌────────────┐            ┌───────────────────┐    │  │
//!  │  │  │ Scan loop  │            │ HTTP serve loop   │    │  │
//!  │  │  │ 50 ms ⏱   │            │ accept + respond  │    │  │
//!  │  │  └────────────┘            └───────────────────┘    │  │
//!  │  └─────────────────────────────────────────────────────┘  │
//!  └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomic sections
//!
//! The shared core lives in an `Rc<RefCell<..>>`. The contract that makes
//! this safe without locks: **no `.await` while a borrow of the core is
//! live**. Every borrow scope runs a complete mutation — state update plus
//! the I²C write that makes hardware match — and the bus transactions
//! themselves are short, bounded and non-yielding ([`ExpanderBus`] contract).
//! Suspension happens only at the timer/socket awaits between borrow
//! scopes, so an HTTP-triggered and a scan-triggered relay write can never
//! interleave; whichever borrow scope the executor runs first wins whole.
//!
//! Anyone replacing the bus driver with one that suspends mid-transaction
//! must reintroduce explicit mutual exclusion (a mutex around the core, or
//! a single hardware-owner task fed by a channel).
//!
//! [`ExpanderBus`]: crate::app::ports::ExpanderBus

use core::cell::RefCell;
use core::time::Duration;
use std::net::TcpListener;
use std::rc::Rc;

use log::info;

use crate::app::commands::RelayCommand;
use crate::app::ports::{EventSink, ExpanderBus};
use crate::app::service::ControlService;
use crate::config::BoardConfig;
use crate::drivers::watchdog::Watchdog;
use crate::error::Error;
use crate::http;
use crate::scan::ScanTask;
use crate::state::IoSnapshot;

// ───────────────────────────────────────────────────────────────
// Shared core
// ───────────────────────────────────────────────────────────────

/// Everything the two tasks share: the control service, the scan state and
/// the hardware ports. Borrowed mutably for the duration of exactly one
/// atomic section at a time.
pub struct Core<B: ExpanderBus, S: EventSink> {
    pub service: ControlService,
    pub scan: ScanTask,
    pub bus: B,
    pub sink: S,
}

impl<B: ExpanderBus, S: EventSink> Core<B, S> {
    pub fn new(service: ControlService, scan: ScanTask, bus: B, sink: S) -> Self {
        Self {
            service,
            scan,
            bus,
            sink,
        }
    }

    /// One scan pass (atomic section).
    pub fn scan_tick(&mut self) {
        self.scan.tick(&mut self.service, &mut self.bus, &mut self.sink);
    }

    /// One control command (atomic section).
    pub fn handle_command(&mut self, cmd: RelayCommand) -> Result<IoSnapshot, Error> {
        self.service.handle_command(cmd, &mut self.bus, &mut self.sink)
    }

    /// Read-only state copy for the JSON API.
    pub fn snapshot(&self) -> IoSnapshot {
        self.service.snapshot()
    }
}

/// Shared handle to the core; single-threaded, so `Rc` + `RefCell`.
pub type SharedCore<B, S> = Rc<RefCell<Core<B, S>>>;

// ───────────────────────────────────────────────────────────────
// Scan loop
// ───────────────────────────────────────────────────────────────

/// Fixed-interval scan loop. Runs for the process lifetime; bus errors
/// inside a tick are already absorbed by [`ScanTask`].
pub async fn scan_loop<B: ExpanderBus, S: EventSink>(
    core: SharedCore<B, S>,
    interval_ms: u32,
    watchdog: Watchdog,
) {
    info!("scan loop started ({} ms tick)", interval_ms);
    loop {
        core.borrow_mut().scan_tick();
        watchdog.feed();
        async_io_mini::Timer::after(Duration::from_millis(u64::from(interval_ms))).await;
    }
}

// ───────────────────────────────────────────────────────────────
// Link supervision
// ───────────────────────────────────────────────────────────────

/// Interval for the link supervision poll.
const LINK_POLL_SECS: u64 = 5;

/// Periodic housekeeping for the network link. The callback must not
/// block (the WiFi adapter's reconnect poll qualifies).
pub async fn link_loop(mut poll: impl FnMut()) {
    loop {
        poll();
        async_io_mini::Timer::after(Duration::from_secs(LINK_POLL_SECS)).await;
    }
}

// ───────────────────────────────────────────────────────────────
// Executor entry point
// ───────────────────────────────────────────────────────────────

/// Spawn the scan, HTTP and link tasks and drive them forever.
///
/// `listener` must already be bound and in nonblocking mode.
pub fn run<B: ExpanderBus + 'static, S: EventSink + 'static>(
    core: Core<B, S>,
    listener: TcpListener,
    config: &BoardConfig,
    watchdog: Watchdog,
    link_poll: impl FnMut() + 'static,
) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let core: SharedCore<B, S> = Rc::new(RefCell::new(core));

    executor
        .spawn(scan_loop(
            core.clone(),
            config.scan_interval_ms,
            watchdog,
        ))
        .detach();
    executor
        .spawn(http::server::serve(
            listener,
            core.clone(),
            config.http_read_timeout_ms,
        ))
        .detach();
    executor.spawn(link_loop(link_poll)).detach();

    info!("scheduler running (scan + http + link)");

    // block_on drives the async-io-mini reactor (timers, socket readiness)
    // while the executor drives the two spawned tasks.
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}
