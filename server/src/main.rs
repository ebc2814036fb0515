mod args;

use args::{Action, Args, FaultArgs, SetArgs, StatusArgs};
use hwled::{log, Error, Leds, Result, Server, ServerConfig};
use std::{collections::BTreeMap, path::Path};
use tokio::{
    select,
    signal::unix::{signal, SignalKind},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::new();

    if args.version {
        println!(
            "{name} {version}",
            name = env!("CARGO_PKG_NAME"),
            version = env!("CARGO_PKG_VERSION")
        );
        return Ok(());
    }

    #[cfg(feature = "tracing-subscriber")]
    if let Some(log) = args.log {
        use tracing_subscriber::prelude::*;

        let registry = tracing_subscriber::registry().with(log);

        #[cfg(all(feature = "stderr", feature = "journal"))]
        let registry = registry.with(if !args.journal {
            Some(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr))
        } else {
            None
        });

        #[cfg(all(feature = "stderr", not(feature = "journal")))]
        let registry =
            registry.with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr));

        #[cfg(feature = "journal")]
        let registry = registry.with(if args.journal {
            Some(tracing_journald::Layer::new()?)
        } else {
            None
        });

        registry.init();
    }

    match args.action {
        Action::Run(_) => run(&args.config).await,
        Action::Status(StatusArgs { led }) => {
            let server = open(&args.config).await?;
            server
                .blocking(move |leds| show_status(leds, led.as_deref()))
                .await?
        }
        Action::Set(SetArgs { led, color }) => {
            let server = open(&args.config).await?;
            let done = server
                .blocking(move |leds| leds.set_status(&led, color))
                .await??;
            check(done, "Unable to set LED color")
        }
        Action::Fault(FaultArgs { fault, color }) => {
            let server = open(&args.config).await?;
            let done = server
                .blocking(move |leds| leds.set_fault(&fault, color))
                .await??;
            check(done, "Unable to set fault signal")
        }
    }
}

async fn open(path: &Path) -> Result<Server> {
    let config = ServerConfig::from_file(path).await?;
    log::debug!("Config: {:#?}", config);
    Server::new(&config)
}

fn check(done: bool, message: &str) -> Result<()> {
    if done {
        Ok(())
    } else {
        Err(Error::from(message))
    }
}

fn show_status(leds: &Leds, only: Option<&str>) -> Result<()> {
    let names: Vec<&str> = match only {
        Some(name) => {
            leds.led(name)?;
            vec![name]
        }
        None => leds.list().collect(),
    };

    println!("LEDs:");
    for name in names {
        let led = leds.led(name)?.indicator();
        let color = match led.get_status() {
            Ok(color) => color.to_string(),
            Err(error) => format!("unknown ({error})"),
        };
        let caps = match led.capabilities() {
            Ok(caps) => caps.to_string(),
            Err(_) => "-".into(),
        };
        println!("  {name} ({id}): {color} [{caps}]", id = led.id());
    }

    let faults: Vec<_> = leds
        .faults()
        .filter(|(_, led, _)| only.map_or(true, |only| only == *led))
        .collect();

    if !faults.is_empty() {
        println!("Faults:");
        for (name, led, signal) in faults {
            println!("  {name} -> {led}: {}", signal.read_color());
        }
    }

    Ok(())
}

async fn run(path: &Path) -> Result<()> {
    let mut run = true;

    let mut intr = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut usr1 = signal(SignalKind::user_defined1())?;

    while run {
        let server = open(path).await?;

        log::info!("Starting");

        if !server.apply().await? {
            log::warn!("Some shared LEDs not updated");
        }

        let mut states = BTreeMap::new();
        let mut poll = tokio::time::interval(server.poll_interval());

        log::info!("Started");

        loop {
            select! {
                // stop service
                _ = intr.recv() => {
                    log::info!("Interrupt");
                    run = false;
                    break;
                }
                // stop service
                _ = term.recv() => {
                    log::info!("Terminate");
                    run = false;
                    break;
                }
                // reload service
                _ = usr1.recv() => {
                    log::info!("Reload");
                    break;
                }
                // read back LEDs
                _ = poll.tick() => {
                    for (name, color) in server.readback().await? {
                        if states.get(&name) != Some(&color) {
                            log::info!("{name}: {color}");
                            states.insert(name, color);
                        }
                    }
                }
            }
        }
    }

    log::info!("Bye");

    Ok(())
}
