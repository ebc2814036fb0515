use hwled::Color;
use std::path::PathBuf;
#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::EnvFilter;

/// Status LED control
#[derive(Debug, argp::FromArgs)]
pub struct Args {
    /// Show version and exit
    #[argp(switch, short = 'V')]
    pub version: bool,

    /// Config file path
    #[argp(option, short = 'c', default = "\"/etc/hwled.toml\".into()")]
    pub config: PathBuf,

    /// Logging filter
    #[cfg(feature = "tracing-subscriber")]
    #[argp(option, short = 'l', from_str_fn(Args::parse_env_filter))]
    pub log: Option<EnvFilter>,

    /// Log to systemd journal
    #[cfg(feature = "journal")]
    #[argp(switch, short = 'j')]
    pub journal: bool,

    /// Action to do
    #[argp(subcommand)]
    pub action: Action,
}

impl Args {
    /// Create args from command-line
    pub fn new() -> Self {
        argp::parse_args_or_exit(argp::DEFAULT)
    }

    #[cfg(feature = "tracing-subscriber")]
    fn parse_env_filter(val: &str) -> core::result::Result<EnvFilter, String> {
        Ok(EnvFilter::new(val))
    }
}

fn parse_color(val: &str) -> core::result::Result<Color, String> {
    val.parse()
        .map_err(|_| format!("Unknown color: {val}"))
}

#[derive(Debug, argp::FromArgs)]
#[argp(subcommand)]
pub enum Action {
    /// Show status
    Status(StatusArgs),

    /// Set LED color
    Set(SetArgs),

    /// Set fault signal color
    Fault(FaultArgs),

    /// Run service
    Run(RunArgs),
}

/// Show LEDs and fault signals
#[derive(Debug, argp::FromArgs)]
#[argp(subcommand, name = "status")]
pub struct StatusArgs {
    /// LED name
    #[argp(positional)]
    pub led: Option<String>,
}

/// Set color of directly controlled LED
#[derive(Debug, argp::FromArgs)]
#[argp(subcommand, name = "set")]
pub struct SetArgs {
    /// LED name
    #[argp(positional)]
    pub led: String,

    /// Color (green, red, off, green_blink, red_blink, orange_blink)
    #[argp(positional, from_str_fn(parse_color))]
    pub color: Color,
}

/// Set color of fault signal
#[derive(Debug, argp::FromArgs)]
#[argp(subcommand, name = "fault")]
pub struct FaultArgs {
    /// Fault signal name
    #[argp(positional)]
    pub fault: String,

    /// Color (green, red)
    #[argp(positional, from_str_fn(parse_color))]
    pub color: Color,
}

/// Run service which keeps shared LEDs up to date
#[derive(Debug, argp::FromArgs)]
#[argp(subcommand, name = "run")]
pub struct RunArgs {}
