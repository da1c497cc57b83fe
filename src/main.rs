use core::time::Duration;
use std::thread;

use embedded_graphics::mono_font::{ascii::FONT_10X20, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::{prelude::*, text::Text};

use esp_idf_svc::hal::delay::{Delay, FreeRtos};
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::spi;
use esp_idf_svc::timer::{EspAsyncTimer, EspTaskTimerService};

use ili9341fb::ili9341::pins::Pins;
use ili9341fb::{attach, BlankMode, Config, DisplayInterface};

/// Debounce timer for the flush worker, backed by the esp timer service
struct TimerDelay(EspAsyncTimer);

impl embedded_hal_async::delay::DelayNs for TimerDelay {
    async fn delay_ns(&mut self, ns: u32) {
        if let Err(e) = self.0.after(Duration::from_nanos(ns.into())).await {
            log::warn!("Timer wait failed: {:?}", e);
        }
    }
}

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    log::info!(
        "Configuring SPI for the panel: SCK {}, MOSI {}, CS {}, DC {}, RST {}",
        Pins::SCK,
        Pins::MOSI,
        Pins::CS,
        Pins::DC,
        Pins::RST
    );
    let driver = spi::SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio36,                    // SCK - Pins::SCK
        pins.gpio35,                    // MOSI - Pins::MOSI
        Option::<gpio::AnyIOPin>::None, // panel is write-only
        Some(pins.gpio10),              // CS - Pins::CS
        &spi::SpiDriverConfig::new(),
        &spi::SpiConfig::new().baudrate(40.MHz().into()), // Mode0 is the default
    )?;

    let mut backlight = gpio::PinDriver::output(pins.gpio45)?; // Pins::BACKLIGHT
    backlight.set_high()?;

    let dc = gpio::PinDriver::output(pins.gpio16)?; // Pins::DC
    let rst = gpio::PinDriver::output(pins.gpio12)?; // Pins::RST
    let interface = DisplayInterface::new(driver, dc);

    let (mut fb, worker) = attach(Config::default(), interface, rst, Delay::default())?;
    log::info!("Framebuffer ready: {:?}", fb.var_info());

    let timer = EspTaskTimerService::new()?.timer_async()?;
    thread::Builder::new()
        .name("fb-flush".into())
        .stack_size(8 * 1024)
        .spawn(move || esp_idf_svc::hal::task::block_on(worker.run(TimerDelay(timer))))?;

    let background = PrimitiveStyle::with_fill(Rgb565::new(3, 6, 14));
    fb.bounding_box().into_styled(background).draw(&mut fb)?;

    let label = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
    Text::new("Uptime:", Point::new(20, 40), label).draw(&mut fb)?;

    let counter_area = Rectangle::new(Point::new(110, 22), Size::new(120, 24));
    let mut seconds: u32 = 0;
    loop {
        // only this strip changes, so only its scanlines go over the bus
        counter_area.into_styled(background).draw(&mut fb)?;
        Text::new(&format!("{} s", seconds), Point::new(110, 40), label).draw(&mut fb)?;

        if seconds % 60 == 30 {
            fb.blank(BlankMode::Normal);
        } else if seconds % 60 == 0 {
            fb.blank(BlankMode::Unblank);
        }

        FreeRtos::delay_ms(1000);
        seconds = seconds.wrapping_add(1);
    }
}
