//! hidlight CLI: drive peripheral lighting from a profile file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hidlight_core::color::Rgb;
use hidlight_core::device::{self, DeviceHandle, DeviceInfo};
use hidlight_core::error::Error as CoreError;
use hidlight_core::packet::{Report, REPORT_LEN};
use hidlight_core::profile::{self, Profile};
use hidlight_core::scheduler::{lock_device, SyncScheduler, TickOutcome};
use hidlight_core::transport::HidTransport;
use hidlight_core::{persist, safety, sync};
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Reply wait for read requests.
const READ_TIMEOUT_MS: i32 = 1000;

struct CliHidTransport {
    device: hidapi::HidDevice,
}

impl CliHidTransport {
    fn open(api: &hidapi::HidApi, info: &DeviceInfo) -> Result<Self> {
        let path = CString::new(info.path.as_str()).context("device path contains NUL")?;
        let device = api.open_path(&path).map_err(|e| {
            anyhow::anyhow!(
                "open HID device (VID=0x{:04X} PID=0x{:04X}): {e}",
                info.vid,
                info.pid
            )
        })?;
        Ok(Self { device })
    }
}

impl HidTransport for CliHidTransport {
    fn send_report(&self, report: &Report) -> hidlight_core::error::Result<()> {
        // hidapi wants the report ID first; these devices use unnumbered reports.
        let mut buf = [0u8; REPORT_LEN + 1];
        buf[1..].copy_from_slice(report.as_bytes());
        self.device
            .write(&buf)
            .map_err(|e| CoreError::Transport(format!("write: {e}")))?;
        Ok(())
    }

    fn exchange_report(&self, report: &Report) -> hidlight_core::error::Result<Report> {
        self.send_report(report)?;

        let mut response = [0u8; REPORT_LEN];
        let n = self
            .device
            .read_timeout(&mut response, READ_TIMEOUT_MS)
            .map_err(|e| CoreError::Transport(format!("read_timeout: {e}")))?;

        if n == 0 {
            return Err(CoreError::Timeout(format!(
                "hid_read timed out after {READ_TIMEOUT_MS}ms"
            )));
        }

        Report::from_bytes(&response[..n])
    }
}

#[derive(Parser)]
#[command(
    name = "hidlight",
    version,
    about = "Synchronize RGB peripheral lighting with a profile"
)]
struct Cli {
    /// Profile file (default: $HIDLIGHT_PROFILE or ~/.config/hidlight/profile.json).
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Only use the device with this USB product ID (hex, e.g. 1b12).
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pid: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the attached device and the profile's selected mode.
    Info,
    /// Push the selected mode's lighting to the device once.
    Sync {
        /// Resend everything and re-enable the lighting hardware.
        #[arg(long)]
        force: bool,
    },
    /// Keep the device in sync with the profile file.
    Watch {
        /// Milliseconds between sync attempts.
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
        /// Stop after this many ticks (runs forever if omitted).
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Write the selected mode's lighting into the device's storage.
    Save,
    /// Read the lighting stored on the device.
    Load {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
        /// Copy the stored colours into the selected mode and save the profile.
        #[arg(long)]
        store: bool,
    },
    /// Set one zone's colour in the profile (does not touch the device).
    SetZone {
        /// Zone number, starting at 1.
        zone: u8,
        /// Colour as RRGGBB or #RRGGBB.
        color: String,
        /// Mode to edit (default: the selected mode).
        #[arg(long)]
        mode: Option<usize>,
    },
    /// Select the profile's active mode.
    SelectMode {
        /// Mode index, starting at 0.
        index: usize,
    },
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16).map_err(|e| e.to_string())
}

fn resolve_profile_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.profile {
        Some(path) => Ok(path.clone()),
        None => Ok(profile::profile_path()?),
    }
}

fn open_device(pid: Option<u16>, profile: Profile) -> Result<DeviceHandle> {
    let api = hidapi::HidApi::new().map_err(|e| anyhow::anyhow!("hidapi init: {e}"))?;
    let info = device::find_device(&api, pid)?;
    let transport = CliHidTransport::open(&api, &info)?;
    Ok(DeviceHandle::new(info, Box::new(transport), profile))
}

fn watch(path: &Path, pid: Option<u16>, interval: Duration, ticks: Option<u64>) -> Result<()> {
    let mut scheduler = SyncScheduler::new();
    let device = scheduler.attach(open_device(pid, profile::load_profile(path)?)?);

    let mut tick = 0u64;
    loop {
        // Pick up edits to the profile file; the diff decides whether anything is sent.
        match profile::load_profile(path) {
            Ok(fresh) => {
                let name = fresh.name.clone();
                if lock_device(&device).replace_profile(fresh) {
                    info!(profile = %name, "Profile changed");
                }
            }
            Err(e) => warn!(error = %e, "Keeping previous profile"),
        }

        for report in scheduler.tick(false) {
            match report.outcome {
                TickOutcome::Failed { class, error } if !class.is_retryable() => {
                    return Err(error).context(format!("{} stopped", report.device));
                }
                TickOutcome::Inactive => {
                    anyhow::bail!("{} is no longer active", report.device);
                }
                _ => {}
            }
        }

        tick += 1;
        if ticks.is_some_and(|max| tick >= max) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn print_zones(name: &str, zones: &[Rgb], json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "device": name,
            "zones": zones.iter().map(Rgb::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{name}");
        for (i, color) in zones.iter().enumerate() {
            println!("  Zone {}: #{color}", i + 1);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let path = resolve_profile_path(&cli)?;

    match cli.command {
        Commands::Info => {
            let profile = profile::load_profile(&path)?;
            let dev = open_device(cli.pid, profile)?;
            let range = dev.protocol().zone_range();
            println!(
                "{} (VID: 0x{:04X}, PID: 0x{:04X}, path: {})",
                dev.info.model, dev.info.vid, dev.info.pid, dev.info.path
            );
            if let Some(serial) = &dev.info.serial {
                println!("  Serial: {serial}");
            }
            println!("  Class: {} ({} zones)", dev.class().name(), range.count);
            let mode = dev.profile.current_mode();
            println!(
                "  Profile: {} (mode {}: {})",
                dev.profile.name,
                dev.profile.current_index(),
                mode.name
            );
            for (i, color) in mode.lighting.range(range).iter().enumerate() {
                println!("    Zone {}: #{color}", i + 1);
            }
        }
        Commands::Sync { force } => {
            let profile = profile::load_profile(&path)?;
            let mut dev = open_device(cli.pid, profile)?;
            sync::synchronize(&mut dev, force)?;
            println!("Lighting synchronized on {}", dev.info.model);
        }
        Commands::Watch { interval_ms, ticks } => {
            watch(&path, cli.pid, Duration::from_millis(interval_ms), ticks)?;
        }
        Commands::Save => {
            let profile = profile::load_profile(&path)?;
            let dev = open_device(cli.pid, profile)?;
            persist::save_to_device(&dev, &dev.profile.current_mode().lighting)?;
            println!("Lighting saved to {}", dev.info.model);
        }
        Commands::Load { json, store } => {
            let profile = profile::load_profile(&path)?;
            let mut dev = open_device(cli.pid, profile)?;
            let range = dev.protocol().zone_range();
            let loaded = persist::load_from_device(&dev)?;
            print_zones(dev.info.model.name(), loaded.range(range), json)?;

            if store {
                let stored = loaded.range(range).to_vec();
                dev.profile
                    .current_mode_mut()
                    .lighting
                    .range_mut(range)
                    .copy_from_slice(&stored);
                profile::save_profile(&dev.profile, &path)?;
                println!("Stored into {}", path.display());
            }
        }
        Commands::SetZone { zone, color, mode } => {
            let color: Rgb = color.parse()?;
            let mut profile = profile::load_profile(&path)?;
            let range = hidlight_core::class::DeviceClass::Mouse
                .protocol()
                .zone_range();
            safety::validate_zone_in_range(zone, range)?;
            let index = mode.unwrap_or(profile.current_index());
            let absolute = range
                .absolute(zone)
                .context("zone outside the device class")?;
            profile
                .mode_mut(index)?
                .lighting
                .set_zone(absolute, color)?;
            profile::save_profile(&profile, &path)?;
            println!("Mode {index}, zone {zone} set to #{color}");
        }
        Commands::SelectMode { index } => {
            let mut profile = profile::load_profile(&path)?;
            profile.select_mode(index)?;
            profile::save_profile(&profile, &path)?;
            println!(
                "Selected mode {index}: {}",
                profile.current_mode().name
            );
        }
    }

    Ok(())
}
