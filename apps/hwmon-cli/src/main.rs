use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use tracing::info;

use w83781d::{self as hwmon, Channel, DeviceHandle, Driver, DriverConfig};

#[derive(Parser, Debug)]
#[command(
    name = "hwmon",
    version,
    about = "W83781D hardware monitor CLI",
    disable_help_subcommand = true
)]
struct Cli {
    /// Register backend
    #[arg(long, value_enum, default_value_t = Backend::Mock, global = true)]
    backend: Backend,

    /// ISA port base (hex, e.g. 0x290)
    #[arg(long, default_value = "0x290", global = true)]
    base: String,

    /// Reach the chip over SMBus at this 7-bit address instead of ISA (mock only)
    #[arg(long, global = true)]
    smbus_addr: Option<String>,

    /// Driver configuration YAML
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    Mock,
    Devport,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the values of one channel (e.g. in0, fan1, temp2, vid)
    Read {
        channel: String,
        /// Print a timestamped JSON record instead of plain values
        #[arg(long)]
        json: bool,
    },
    /// Write limit values of one channel, in field order
    Write {
        channel: String,
        #[arg(allow_negative_numbers = true, num_args = 1..)]
        values: Vec<i64>,
    },
    /// Print the decimal magnitude of a channel's values
    Describe { channel: String },
    /// Print every channel as JSON lines
    Dump {
        /// Also write the records to this file
        #[arg(long)]
        to: Option<String>,
    },
    /// Sample every channel once, then print driver counters
    Metrics,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => hwmon::load_config_file(path)?,
        None => DriverConfig::default(),
    };
    let driver = Driver::new(config)?;
    let handle = attach(&driver, &cli)?;

    match cli.command {
        Commands::Read { channel, json } => {
            let ch = parse_channel(&channel)?;
            if json {
                println!("{}", serde_json::to_string(&driver.record(handle, ch)?)?);
            } else {
                println!("{ch}\t{}", format_values(&driver.read(handle, ch)?));
            }
        }
        Commands::Write { channel, values } => {
            let ch = parse_channel(&channel)?;
            driver.write(handle, ch, &values)?;
            info!(channel = %ch, ?values, "written");
            println!("{ch}\t{}", format_values(&driver.read(handle, ch)?));
        }
        Commands::Describe { channel } => {
            let ch = parse_channel(&channel)?;
            println!("{ch}\t{}", driver.describe(handle, ch)?);
        }
        Commands::Dump { to } => dump(&driver, handle, to.as_deref())?,
        Commands::Metrics => {
            driver.dump(handle)?;
            print!("{}", driver.metrics_text());
        }
    }

    driver.detach(handle)?;
    Ok(())
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn attach(driver: &Driver, cli: &Cli) -> Result<DeviceHandle> {
    let base = parse_u16(&cli.base)?;
    let smbus = cli.smbus_addr.as_deref().map(parse_u8).transpose()?;
    match cli.backend {
        Backend::Mock => {
            let chip = hwmon::sim::simulated_chip().at_isa(base);
            let handle = match smbus {
                Some(addr) => driver.attach_smbus(Arc::new(chip.at_smbus(addr)), addr)?,
                None => driver.attach_isa(Arc::new(chip), base)?,
            };
            Ok(handle)
        }
        Backend::Devport => attach_devport(driver, base, smbus),
    }
}

#[cfg(all(feature = "devport", unix))]
fn attach_devport(driver: &Driver, base: u16, smbus: Option<u8>) -> Result<DeviceHandle> {
    if smbus.is_some() {
        anyhow::bail!("--smbus-addr is not supported by the devport backend");
    }
    let port = regbus::DevPort::open()
        .with_context(|| format!("opening {}", regbus::DevPort::DEFAULT_PATH))?;
    driver
        .attach_isa(Arc::new(port), base)
        .with_context(|| format!("attaching w83781d at isa:0x{base:04X}"))
}

#[cfg(not(all(feature = "devport", unix)))]
fn attach_devport(_driver: &Driver, _base: u16, _smbus: Option<u8>) -> Result<DeviceHandle> {
    anyhow::bail!("devport backend not built; enable the `devport` feature")
}

fn dump(driver: &Driver, handle: DeviceHandle, to: Option<&str>) -> Result<()> {
    let mut writer = match to {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {path}"))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };
    for rec in driver.dump(handle)? {
        let line = serde_json::to_string(&rec)?;
        println!("{line}");
        if let Some(w) = writer.as_mut() {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
        }
    }
    if let Some(mut w) = writer {
        w.flush()?;
    }
    Ok(())
}

fn parse_channel(s: &str) -> Result<Channel> {
    s.parse::<Channel>().map_err(anyhow::Error::from)
}

fn format_values(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_u16(s: &str) -> Result<u16> {
    let t = s.trim();
    let no_prefix = t.strip_prefix("0x").unwrap_or(t);
    u16::from_str_radix(no_prefix, 16).map_err(|e| anyhow::anyhow!("invalid port base '{t}': {e}"))
}

fn parse_u8(s: &str) -> Result<u8> {
    let t = s.trim();
    let no_prefix = t.strip_prefix("0x").unwrap_or(t);
    u8::from_str_radix(no_prefix, 16).map_err(|e| anyhow::anyhow!("invalid bus address '{t}': {e}"))
}
