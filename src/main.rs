//! Relayboard firmware — main entry point.
//!
//! KC868-A16: 16 relay outputs and 16 opto-isolated inputs behind four
//! PCF8574 expanders on one I²C bus, driven by a single-threaded
//! cooperative scheduler that serves HTTP control requests while
//! continuously scanning the inputs.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │                                                          │
//! │  I2cBank        LogEventSink   NvsAdapter   WifiStation  │
//! │  (ExpanderBus)  (EventSink)    (ConfigPort) (STA link)   │
//! │                                                          │
//! │  ───────────── Port Trait Boundary ─────────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  ControlService · ScanTask (pure logic)            │  │
//! │  │  IoState · DebounceFilter                          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │  tasks::run (scan loop + HTTP serve loop + link poll)    │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod pins;

pub mod app;
mod adapters;
mod drivers;
pub mod debounce;
pub mod http;
pub mod scan;
pub mod state;
pub mod tasks;

// ── Imports ───────────────────────────────────────────────────
use std::net::TcpListener;

use anyhow::{Context, Result};
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use adapters::bank::I2cBank;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsAdapter;
use adapters::wifi::WifiStation;
use app::events::AppEvent;
use app::ports::{ConfigError, ConfigPort, EventSink};
use app::service::ControlService;
use config::BoardConfig;
use debounce::DebounceFilter;
use drivers::watchdog::Watchdog;
use scan::ScanTask;
use state::IoState;
use tasks::Core;

// Factory-default credentials, used until NVS holds provisioned ones.
const DEFAULT_WIFI_SSID: &str = "workshop-iot";
const DEFAULT_WIFI_PASSWORD: &str = "change-me-please";

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Relayboard v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let mut config = match nvs.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => {
            info!("Config loaded from NVS");
            cfg
        }
        Some(Err(ConfigError::NotFound)) => {
            info!("No stored config, using defaults");
            BoardConfig::default()
        }
        Some(Err(e)) => {
            warn!("Config load failed ({}), using defaults", e);
            BoardConfig::default()
        }
        None => BoardConfig::default(),
    };
    if config.wifi_ssid.is_empty() {
        config.wifi_ssid =
            heapless::String::try_from(DEFAULT_WIFI_SSID).map_err(|()| {
                anyhow::anyhow!("default SSID too long")
            })?;
        config.wifi_password =
            heapless::String::try_from(DEFAULT_WIFI_PASSWORD).map_err(|()| {
                anyhow::anyhow!("default password too long")
            })?;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid config: {e}"))?;

    let watchdog = Watchdog::new();

    // ── 3. I²C bus + expander bank ────────────────────────────
    let peripherals = Peripherals::take().context("peripheral takeover")?;
    info!(
        "I2C on SDA gpio{} / SCL gpio{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_BAUDRATE_HZ
    );
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio4,
        peripherals.pins.gpio5,
        &i2c_cfg,
    )
    .context("i2c driver")?;
    let mut bank = I2cBank::new(i2c, Delay::new_default(), &config);

    // ── 4. WiFi station ───────────────────────────────────────
    let sysloop = EspSystemEventLoop::take().context("system event loop")?;
    let nvs_partition = EspDefaultNvsPartition::take().context("nvs partition")?;
    let mut wifi = WifiStation::connect(peripherals.modem, sysloop, nvs_partition, &config)?;

    // ── 5. Seed state and force a known output baseline ───────
    let initial_inputs = bank.read_initial_inputs();
    let mut service = ControlService::new(IoState::new(initial_inputs));
    let scan = ScanTask::new(
        DebounceFilter::new(config.debounce_ticks, initial_inputs),
        config.input_policy,
    );

    let mut sink = LogEventSink::new();
    // Relays default off in IoState; pushing the bytes makes hardware
    // match even after a soft reset that left some energized.
    service.resync_relays(&mut bank, &mut sink);
    sink.emit(&AppEvent::Started);

    // ── 6. HTTP listener ──────────────────────────────────────
    let listener = TcpListener::bind(("0.0.0.0", config.http_port))
        .with_context(|| format!("bind port {}", config.http_port))?;
    listener.set_nonblocking(true).context("nonblocking listener")?;
    info!("Listening on port {}", config.http_port);

    // ── 7. Cooperative scheduler (never returns) ──────────────
    let core = Core::new(service, scan, bank, sink);
    tasks::run(core, listener, &config, watchdog, move || {
        wifi.ensure_connected();
    });

    unreachable!("scheduler exited");
}
