//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stub for host-side tests.
//!
//! The board is useless without the network, so association blocks at
//! boot. After that [`WifiStation::ensure_connected`] is polled from a
//! supervision task; it never blocks, it only issues a reconnect attempt
//! when the backoff window (2 s doubling to 60 s) has elapsed.

use std::time::Instant;

use log::info;

use crate::config::BoardConfig;
use crate::error::Error;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

const BACKOFF_START_SECS: u32 = 2;
#[cfg(target_os = "espidf")]
const BACKOFF_MAX_SECS: u32 = 60;

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID must be 1-32 printable ASCII bytes.
pub fn validate_ssid(ssid: &str) -> Result<(), Error> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(Error::Config("ssid must be 1-32 printable ASCII bytes"));
    }
    Ok(())
}

/// WPA2 password must be 8-64 bytes; empty selects an open network.
pub fn validate_password(password: &str) -> Result<(), Error> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(Error::Config("password must be 8-64 bytes, or empty"));
    }
    Ok(())
}

pub struct WifiStation {
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    connected: bool,
    backoff_secs: u32,
    last_attempt: Instant,
}

impl WifiStation {
    /// Bring the station up and block until associated with an address.
    #[cfg(target_os = "espidf")]
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &BoardConfig,
    ) -> Result<Self, Error> {
        validate_ssid(&config.wifi_ssid)?;
        validate_password(&config.wifi_password)?;

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))
            .map_err(|_| Error::Init("wifi driver"))?;
        let mut wifi =
            BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| Error::Init("wifi event loop"))?;

        let auth_method = if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            auth_method,
            ..Default::default()
        }))
        .map_err(|_| Error::Init("wifi configuration"))?;

        wifi.start().map_err(|_| Error::Init("wifi start"))?;
        wifi.connect().map_err(|_| Error::Init("wifi connect"))?;
        wifi.wait_netif_up().map_err(|_| Error::Init("wifi dhcp"))?;

        if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: connected to '{}', ip {}", config.wifi_ssid, ip_info.ip);
        }

        Ok(Self {
            wifi,
            backoff_secs: BACKOFF_START_SECS,
            last_attempt: Instant::now(),
        })
    }

    /// Simulation constructor; always "associates" immediately.
    #[cfg(not(target_os = "espidf"))]
    pub fn connect_sim(config: &BoardConfig) -> Result<Self, Error> {
        validate_ssid(&config.wifi_ssid)?;
        validate_password(&config.wifi_password)?;
        info!("WiFi(sim): connected to '{}'", config.wifi_ssid);
        Ok(Self {
            connected: true,
            backoff_secs: BACKOFF_START_SECS,
            last_attempt: Instant::now(),
        })
    }

    pub fn is_connected(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.wifi.is_connected().unwrap_or(false)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.connected
        }
    }

    /// Issue a reconnect attempt if the link is down and the current
    /// backoff window has elapsed. Never blocks; the attempt itself is
    /// the driver's own non-blocking `connect`, and success shows up as
    /// `is_connected()` on a later poll.
    pub fn ensure_connected(&mut self) {
        if self.is_connected() {
            self.backoff_secs = BACKOFF_START_SECS;
            return;
        }
        if self.last_attempt.elapsed().as_secs() < u64::from(self.backoff_secs) {
            return;
        }
        self.last_attempt = Instant::now();

        #[cfg(target_os = "espidf")]
        {
            log::warn!(
                "WiFi: link down, reconnect attempt (next retry in {} s)",
                self.backoff_secs
            );
            if self.wifi.wifi_mut().connect().is_err() {
                log::warn!("WiFi: reconnect request failed");
            }
            self.backoff_secs = (self.backoff_secs * 2).min(BACKOFF_MAX_SECS);
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("WiFi(sim): reconnected");
            self.connected = true;
            self.backoff_secs = BACKOFF_START_SECS;
        }
    }
}
