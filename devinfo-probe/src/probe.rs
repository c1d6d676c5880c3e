//! The device-info probe.
//!
//! Opens one device, queries every selector in a fixed order, then writes
//! continuous-mode and sample-rate twice each, re-reading the selector after
//! every write. Query and set failures are reported and the run continues;
//! only a failed open ends it early. The device is closed on every path.

use crate::config::ProbeConfig;
use crate::device::{
    DeviceInfoBackend, OpenDevice, Permission, ProbeError, PropertySelector, PropertyValue,
    SetConvention, StatusCode, UnsignedFixed,
};
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Kind of device-info call a step made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Query,
    Set,
}

/// Outcome of one get or set call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub operation: Operation,
    pub selector: PropertySelector,

    /// Value read, or value written
    pub value: Option<PropertyValue>,

    pub status: StatusCode,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.status.is_ok()
    }
}

/// Everything a probe run observed.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub device_name: String,
    pub convention: &'static str,
    pub opened: bool,

    /// Driver status of a failed open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_status: Option<StatusCode>,

    pub steps: Vec<StepOutcome>,
    pub status: i32,
}

impl ProbeReport {
    fn new(device_name: &str, convention: &'static str) -> Self {
        Self {
            device_name: device_name.to_string(),
            convention,
            opened: false,
            open_status: None,
            steps: Vec::new(),
            status: 0,
        }
    }

    /// 0 for a completed run, -1 if the device could not be opened.
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Process exit code for this run: 1 when the device could not be opened.
    pub fn exit_code(&self) -> u8 {
        if self.status < 0 {
            1
        } else {
            0
        }
    }

    /// Final line printed after the run.
    pub fn completion_line(&self) -> String {
        format!("Test complete. result = {}", self.status)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| !s.succeeded())
    }

    /// Values successfully read from `selector`, in order.
    pub fn reads_of(&self, selector: PropertySelector) -> Vec<PropertyValue> {
        self.steps
            .iter()
            .filter(|s| s.operation == Operation::Query && s.selector == selector)
            .filter_map(|s| s.value)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the probe sequence against a backend, writing a transcript to `out`.
pub struct DeviceInfoProbe<B: DeviceInfoBackend, W: Write> {
    backend: B,
    config: ProbeConfig,
    out: W,
}

impl<B: DeviceInfoBackend, W: Write> DeviceInfoProbe<B, W> {
    pub fn new(backend: B, config: ProbeConfig, out: W) -> Self {
        Self { backend, config, out }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_parts(self) -> (B, W) {
        (self.backend, self.out)
    }

    /// Run the full sequence once.
    pub fn run(&mut self) -> ProbeReport {
        let strategy = self.config.convention.strategy();
        let mut report = ProbeReport::new(&self.config.device_name, strategy.name());

        let device = match open_device(&mut self.backend, &self.config.device_name) {
            Ok(device) => device,
            Err(err) => {
                tracing::error!("{err}");
                say(&mut self.out, format_args!("Could not open device!"));
                report.open_status = err.status();
                report.status = -1;
                return report;
            }
        };
        report.opened = true;

        let mut session = Session {
            device,
            out: &mut self.out,
            strategy,
            report: &mut report,
        };

        for selector in PropertySelector::QUERY_ORDER {
            session.query(selector);
        }

        for value in self.config.continuous_writes {
            session.set_and_verify(PropertySelector::ContinuousMode, PropertyValue::Short(value));
        }

        for hz in self.config.sample_rate_writes {
            session.set_and_verify(
                PropertySelector::SampleRate,
                PropertyValue::Rate(UnsignedFixed::from_hz(hz)),
            );
        }

        // Closes the device.
        drop(session);

        tracing::info!(
            steps = report.steps.len(),
            failures = report.failures().count(),
            convention = report.convention,
            "probe finished"
        );
        report
    }
}

/// Open `device_name` for writing.
fn open_device<'b, B: DeviceInfoBackend>(backend: &'b mut B, device_name: &str) -> Result<OpenDevice<'b, B>, ProbeError> {
    OpenDevice::open(backend, device_name, Permission::Write).map_err(|status| ProbeError::OpenFailed {
        device: device_name.to_string(),
        status,
    })
}

/// State of a run while the device is open.
struct Session<'p, B: DeviceInfoBackend, W: Write> {
    device: OpenDevice<'p, B>,
    out: &'p mut W,
    strategy: &'static dyn SetConvention,
    report: &'p mut ProbeReport,
}

impl<B: DeviceInfoBackend, W: Write> Session<'_, B, W> {
    /// Query one selector and print the result.
    fn query(&mut self, selector: PropertySelector) -> Option<PropertyValue> {
        let result = self.device.get(selector);
        let (value, status) = match result {
            Ok(value) => {
                if value.width() != selector.width() {
                    tracing::warn!(%selector, expected = ?selector.width(), got = ?value.width(), "unexpected value width");
                }
                say(&mut *self.out, format_args!("query {} = {:#x}", selector, value.raw_bits()));
                tracing::debug!(%selector, code = selector.code(), %value, "query");
                (Some(value), StatusCode::OK)
            }
            Err(status) => {
                tracing::warn!(%selector, code = selector.code(), %status, "query failed");
                say(&mut *self.out, format_args!("query {selector} failed"));
                (None, status)
            }
        };

        self.report.steps.push(StepOutcome {
            operation: Operation::Query,
            selector,
            value,
            status,
        });
        value
    }

    /// Write `value` to `selector` with the configured convention, then read it back.
    fn set_and_verify(&mut self, selector: PropertySelector, value: PropertyValue) -> Option<PropertyValue> {
        let convention = self.strategy.name();
        say(
            &mut *self.out,
            format_args!("Attempt to set {selector} to {value} using {convention} method."),
        );

        let param = self.strategy.encode(&value);
        let status = match self.device.set(selector, param) {
            Ok(()) => StatusCode::OK,
            Err(status) => {
                tracing::warn!(%selector, code = selector.code(), convention, %status, "set failed");
                say(&mut *self.out, format_args!("setting {selector} using {convention} failed"));
                status
            }
        };

        self.report.steps.push(StepOutcome {
            operation: Operation::Set,
            selector,
            value: Some(value),
            status,
        });

        self.query(selector)
    }
}

/// Print one transcript line and flush.
fn say<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    let result = out
        .write_fmt(line)
        .and_then(|()| out.write_all(b"\n"))
        .and_then(|()| out.flush());
    if let Err(e) = result {
        tracing::warn!("failed to write probe output: {e}");
    }
}
