use anyhow::Result;
use devinfo_probe::{BackendKind, DeviceInfoBackend, DeviceInfoProbe, ProbeConfig, SimulatedSoundInput};
use std::process::ExitCode;

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("SIPROBE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn open_backend(kind: BackendKind) -> Result<Box<dyn DeviceInfoBackend>> {
    match kind {
        BackendKind::Simulated => Ok(Box::new(SimulatedSoundInput::new())),
        #[cfg(windows)]
        BackendKind::System => Ok(Box::new(devinfo_probe::device::WasapiBackend::new()?)),
        #[cfg(not(windows))]
        BackendKind::System => {
            anyhow::bail!("the system backend is only available on Windows; set SIPROBE_BACKEND=simulated")
        }
    }
}

fn main() -> Result<ExitCode> {
    init_logging();

    let config = ProbeConfig::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let backend = open_backend(config.backend)?;
    let stdout = std::io::stdout();
    let mut probe = DeviceInfoProbe::new(backend, config, stdout.lock());
    let report = probe.run();
    drop(probe);

    match report.to_json() {
        Ok(json) => tracing::debug!("probe report:\n{json}"),
        Err(e) => tracing::warn!("failed to serialize probe report: {e}"),
    }

    println!("{}", report.completion_line());

    Ok(ExitCode::from(report.exit_code()))
}
