use embassy_net::Stack;
use embassy_time::{Duration as EmbassyDuration, Timer, WithTimeout};
use esp_radio::wifi::WifiController;
use log::info;

use beacon_hal_esp32s3::network::{ConnectivityHandle, wifi_retry_backoff_secs};

const LINK_WATCH_INTERVAL_MS: u64 = 500;
const DHCP_TIMEOUT_SECS: u64 = 15;

/// Step of the join sequence that gave up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum JoinFailure {
    Start,
    Associate,
    DhcpTimeout,
}

struct WifiSupervisor<'c, 'd, 's> {
    controller: &'c mut WifiController<'d>,
    stack: Stack<'s>,
    connectivity: &'static ConnectivityHandle,
    failures: u32,
}

impl WifiSupervisor<'_, '_, '_> {
    async fn join(&mut self) -> Result<(), JoinFailure> {
        if !self.controller.is_started().unwrap_or(false) {
            self.controller.start_async().await.map_err(|err| {
                info!("wifi: start failed err={:?}", err);
                JoinFailure::Start
            })?;
        }
        self.controller.connect_async().await.map_err(|err| {
            info!("wifi: connect failed err={:?}", err);
            JoinFailure::Associate
        })?;

        self.stack
            .wait_config_up()
            .with_timeout(EmbassyDuration::from_secs(DHCP_TIMEOUT_SECS))
            .await
            .map_err(|_| JoinFailure::DhcpTimeout)
    }

    /// Publishes link state until association, link or lease goes away.
    async fn watch_link(&mut self) {
        loop {
            let link_up = self.stack.is_link_up();
            let has_ipv4 = self.stack.config_v4().is_some();
            let associated = self.controller.is_connected().unwrap_or(false);
            self.connectivity.update_link_ip(link_up, has_ipv4);

            if !(link_up && has_ipv4 && associated) {
                info!(
                    "wifi: link lost link_up={} has_ipv4={} associated={}",
                    link_up, has_ipv4, associated
                );
                return;
            }
            Timer::after_millis(LINK_WATCH_INTERVAL_MS).await;
        }
    }

    async fn back_off(&mut self) {
        self.connectivity.mark_disconnected();
        let _ = self.controller.disconnect_async().await;

        let delay_secs = wifi_retry_backoff_secs(self.failures);
        self.failures = self.failures.saturating_add(1);
        info!("wifi: retry in {}s failures={}", delay_secs, self.failures);
        Timer::after_secs(delay_secs).await;
    }
}

/// Keeps the station associated with a DHCP lease, publishing every change.
pub async fn wifi_connection_loop(
    controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    connectivity: &'static ConnectivityHandle,
) -> ! {
    let mut supervisor = WifiSupervisor {
        controller,
        stack,
        connectivity,
        failures: 0,
    };

    loop {
        connectivity.mark_connecting();

        match supervisor.join().await {
            Ok(()) => {
                info!("wifi: joined, dhcp ready");
                supervisor.failures = 0;
                supervisor.watch_link().await;
            }
            Err(failure) => {
                info!("wifi: join failed step={:?}", failure);
                if failure == JoinFailure::DhcpTimeout {
                    connectivity.update_link_ip(stack.is_link_up(), false);
                }
            }
        }

        supervisor.back_off().await;
    }
}
