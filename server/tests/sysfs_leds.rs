//! LEDs driven through a directory of attribute files.

use hwled::{BlinkWait, Color, FsStore, Indicator, Leds, ServerConfig, SharedIndicator, Store};
use std::{
    fs,
    path::Path,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

fn attrs(root: &Path, id: &str, caps: &str) {
    fs::write(root.join(format!("led_{id}_capability")), caps).unwrap();
    for channel in ["green", "red", "orange"] {
        if caps.split_whitespace().any(|token| token == channel) {
            fs::write(root.join(format!("led_{id}_{channel}")), "0\n").unwrap();
        }
    }
}

fn read(root: &Path, attr: &str) -> String {
    fs::read_to_string(root.join(attr)).unwrap()
}

#[test]
fn static_colors_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    attrs(dir.path(), "fan1", "green red");
    let led = Indicator::fan(Some(1), Arc::new(FsStore::new(dir.path())));

    for color in [Color::Red, Color::Green, Color::Off] {
        assert!(led.set_status(color));
        assert_eq!(led.get_status().unwrap(), color);
    }
}

#[test]
fn red_on_orange_only_led() {
    let dir = tempfile::tempdir().unwrap();
    attrs(dir.path(), "psu1", "green orange");
    let led = Indicator::psu(Some(1), Arc::new(FsStore::new(dir.path())));

    assert!(led.set_status(Color::Red));
    assert_eq!(read(dir.path(), "led_psu1_orange"), "255");
    assert!(!dir.path().join("led_psu1_red").exists());
}

#[test]
fn blink_once_driver_creates_delays() {
    let dir = tempfile::tempdir().unwrap();
    attrs(dir.path(), "status", "green red green_blink red_blink");
    let store = Arc::new(FsStore::new(dir.path()));
    let led = Indicator::system(store.clone());

    // driver creates delay attributes some time after trigger activation
    let root = dir.path().to_owned();
    let driver = thread::spawn(move || {
        let trigger = root.join("led_status_red_trigger");
        let started = Instant::now();
        while started.elapsed() < Duration::from_secs(2) {
            if fs::read_to_string(&trigger).map_or(false, |value| value == "timer") {
                thread::sleep(Duration::from_millis(30));
                for attr in ["led_status_red_delay_on", "led_status_red_delay_off"] {
                    let staging = root.join(format!(".{attr}"));
                    fs::write(&staging, "500").unwrap();
                    fs::rename(&staging, root.join(attr)).unwrap();
                }
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    });

    assert!(led.set_status(Color::RedBlink));
    assert!(driver.join().unwrap());

    assert_eq!(read(dir.path(), "led_status_red_delay_on"), "50");
    assert_eq!(read(dir.path(), "led_status_red_delay_off"), "50");
    assert_eq!(read(dir.path(), "led_status_green_trigger"), "none");
    assert_eq!(led.get_status().unwrap(), Color::RedBlink);
    assert!(store.exists("led_status_red_delay_on"));
}

#[test]
fn blink_gives_up_when_delays_never_appear() {
    let dir = tempfile::tempdir().unwrap();
    attrs(dir.path(), "fan", "green green_blink");
    let led = Indicator::fan(None, Arc::new(FsStore::new(dir.path()))).with_blink_wait(
        BlinkWait {
            initial: 10,
            budget: 150,
        },
    );

    let started = Instant::now();
    assert!(!led.set_status(Color::GreenBlink));
    assert!(started.elapsed() >= Duration::from_millis(150));

    assert_eq!(read(dir.path(), "led_fan_green_trigger"), "timer");
    assert!(!dir.path().join("led_fan_green_delay_on").exists());
    assert!(!dir.path().join("led_fan_green_delay_off").exists());
}

#[test]
fn shared_led_follows_worst_fault() {
    let dir = tempfile::tempdir().unwrap();
    attrs(dir.path(), "status", "green red");
    let shared = SharedIndicator::new(Indicator::system(Arc::new(FsStore::new(dir.path()))));
    let psu = shared.register();
    let fan = shared.register();

    assert!(shared.recompute_and_apply());
    assert_eq!(read(dir.path(), "led_status_green"), "255");

    assert!(fan.set_status(Color::Red));
    assert_eq!(read(dir.path(), "led_status_red"), "255");
    assert_eq!(fan.read_color(), Color::Red);
    assert_eq!(psu.read_color(), Color::Green);

    // attribute directory vanished: hardware cannot be updated
    fs::remove_dir_all(dir.path()).unwrap();
    assert!(!psu.set_status(Color::Red));
    assert_eq!(psu.read_color(), Color::Green);
    assert_eq!(fan.read_color(), Color::Red);
}

#[test]
fn configured_platform() {
    let dir = tempfile::tempdir().unwrap();
    attrs(dir.path(), "status", "green red");
    attrs(dir.path(), "fan2", "green orange");

    let config = ServerConfig::from_toml(&format!(
        r#"
        root = "{root}"

        [leds.system]
        kind = "system"
        faults = ["psu-fault", "fan-fault"]

        [leds.fan-tray]
        kind = "fan"
        index = 2
        "#,
        root = dir.path().display()
    ))
    .unwrap();

    let leds = Leds::new(
        &config.leds,
        Arc::new(FsStore::new(&config.root)),
        config.blink_wait,
    )
    .unwrap();

    assert!(leds.apply());
    assert!(leds.set_fault("psu-fault", Color::Red).unwrap());
    assert!(leds.set_status("fan-tray", Color::Red).unwrap());

    assert_eq!(read(dir.path(), "led_status_red"), "255");
    assert_eq!(read(dir.path(), "led_fan2_orange"), "255");
    assert_eq!(leds.get_status("fan-tray").unwrap(), Color::Red);
}
