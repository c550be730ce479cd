#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    spi::master::Spi,
    time::{Instant, Rate},
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info, warn};
use static_cell::StaticCell;

use beacon_core::{
    app::{BeaconApp, BeaconConfig},
    input::ButtonId,
    render::TickResult,
};
use beacon_hal_esp32s3::{
    audio::buzzer::Buzzer,
    input::buttons::{ButtonConfig, GpioButtons},
    network::{
        ConnectivityHandle, WifiConfig,
        http::{HttpTransport, InboxEndpoint},
    },
    platform::{display::SharpDisplay, frame::FrameBuffer},
    render::{FrameRenderer, marquee::MarqueeRenderer},
};

#[path = "main/wifi.rs"]
mod wifi;

const DISPLAY_SPI_HZ: u32 = 1_000_000;
const TITLE: &str = "Beacon";
const BUTTON_DEBOUNCE_POLLS: u8 = 4;
const VCOM_REFRESH_MS: u64 = 1_000;
const DEFAULT_INBOX_PORT: u16 = 80;
const DEFAULT_INBOX_PATH: &str = "/api/message";

const WIFI_SSID: &str = env!(
    "BEACON_WIFI_SSID",
    "Set BEACON_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "BEACON_WIFI_PASSWORD",
    "Set BEACON_WIFI_PASSWORD in your environment before building/flashing."
);
const INBOX_HOST: &str = env!(
    "BEACON_INBOX_HOST",
    "Set BEACON_INBOX_HOST (hostname or IPv4 of the message inbox) before building/flashing."
);
const INBOX_PORT: u16 = port_from_env(option_env!("BEACON_INBOX_PORT"));
const INBOX_PATH: &str = match option_env!("BEACON_INBOX_PATH") {
    Some(path) => path,
    None => DEFAULT_INBOX_PATH,
};
const WIFI_CONFIG: WifiConfig = WifiConfig::new(WIFI_SSID, WIFI_PASSWORD);
const INBOX_ENDPOINT: InboxEndpoint = InboxEndpoint::new(INBOX_HOST, INBOX_PORT, INBOX_PATH);

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

const fn port_from_env(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return DEFAULT_INBOX_PORT;
    };
    let bytes = raw.as_bytes();
    assert!(!bytes.is_empty(), "BEACON_INBOX_PORT is empty");

    let mut port = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit(), "BEACON_INBOX_PORT must be decimal");
        port = port * 10 + (bytes[i] - b'0') as u32;
        assert!(port <= u16::MAX as u32, "BEACON_INBOX_PORT out of range");
        i += 1;
    }
    port as u16
}

/// `BEACON_PROFILE=stick|core2` picks the button map; anything else is the
/// default three-gesture profile.
fn profile_config() -> BeaconConfig {
    let config = match option_env!("BEACON_PROFILE") {
        Some("stick") => BeaconConfig::stick(),
        Some("core2") => BeaconConfig::core2(),
        _ => BeaconConfig::default(),
    };
    config.with_title(TITLE)
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: beacon starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Display: CLK=GPIO13, DI=GPIO14, CS=GPIO15, DISP=GPIO2, EMD=GPIO9
    let disp = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let emd = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let cs = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());
    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        // LS027B7DH01 uses CPOL=0, CPHA=1.
        .with_mode(esp_hal::spi::Mode::_1);
    let spi = Spi::new(peripherals.SPI2, spi_config)
        .unwrap()
        .with_sck(peripherals.GPIO13)
        .with_mosi(peripherals.GPIO14);

    let mut delay = Delay::new();
    let mut display = SharpDisplay::new(spi, disp, emd, cs);
    let mut display_fault_logged = false;

    if let Err(err) = display.initialize(&mut delay) {
        warn!("display: initialize failed err={:?}", err);
        display_fault_logged = true;
    }
    if let Err(err) = display.clear_all(&mut delay) {
        warn!("display: clear failed err={:?}", err);
        display_fault_logged = true;
    }

    // Buttons: A=GPIO12, B=GPIO10, C=GPIO11, active low with pull-ups.
    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let buttons = GpioButtons::new(
        [
            Input::new(peripherals.GPIO12, input_cfg),
            Input::new(peripherals.GPIO10, input_cfg),
            Input::new(peripherals.GPIO11, input_cfg),
        ],
        [ButtonId::A, ButtonId::B, ButtonId::C],
        ButtonConfig::default().with_debounce_polls(BUTTON_DEBOUNCE_POLLS),
    )
    .unwrap();

    // Active buzzer on GPIO5.
    let mut buzzer = Buzzer::new(Output::new(
        peripherals.GPIO5,
        Level::Low,
        OutputConfig::default(),
    ));

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(WIFI_CONFIG.ssid.into())
        .with_password(WIFI_CONFIG.password.into());
    if let Err(err) = wifi_controller.set_config(&ModeConfig::Client(client_config)) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x5A17_2B34_D099_EE11,
    );

    let transport = HttpTransport::new(stack, &CONNECTIVITY, INBOX_ENDPOINT);
    let mut app = BeaconApp::new(buttons, transport, profile_config());
    let mut renderer = MarqueeRenderer::new();
    let mut frame = FrameBuffer::new();

    info!(
        "beacon: inbox http://{}:{}{} spi_hz={}",
        INBOX_ENDPOINT.host, INBOX_ENDPOINT.port, INBOX_ENDPOINT.path, DISPLAY_SPI_HZ
    );
    info!("beacon: buttons A=GPIO12 B=GPIO10 C=GPIO11 buzzer=GPIO5");

    CONNECTIVITY.mark_connecting();

    let net_future = net_runner.run();
    let wifi_future = wifi::wifi_connection_loop(&mut wifi_controller, stack, &CONNECTIVITY);

    let ui_future = async {
        let loop_start = Instant::now();
        let mut last_flush_ms = 0u64;

        loop {
            let now_ms = loop_start.elapsed().as_millis();

            if app.tick(now_ms).await == TickResult::RenderRequested {
                app.with_screen(|screen| renderer.render(screen, &mut frame));
                match display.flush_changed(&frame, &mut delay) {
                    Ok(0) => {}
                    Ok(_) => last_flush_ms = now_ms,
                    Err(err) => {
                        if !display_fault_logged {
                            warn!("display: flush failed err={:?}", err);
                            display_fault_logged = true;
                        }
                    }
                }
            }

            if now_ms.saturating_sub(last_flush_ms) >= VCOM_REFRESH_MS {
                let _ = display.refresh_vcom(&mut delay);
                last_flush_ms = now_ms;
            }

            if !buzzer.is_playing()
                && let Some(cue) = app.drain_cue()
            {
                let _ = buzzer.play(cue, now_ms);
            }
            let _ = buzzer.tick(now_ms);

            Timer::after_millis(1).await;
        }
    };

    let _ = embassy_futures::join::join3(net_future, wifi_future, ui_future).await;
    unreachable!()
}
