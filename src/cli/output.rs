//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{ChannelRpm, ControlDecision, TelemetrySample};
use crate::services::CycleReport;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    handle.flush()
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// Per-cycle status: one telemetry line plus one fan RPM line
#[derive(Debug, Clone, Serialize)]
pub struct StatusLine {
    pub timestamp: String,
    pub sample: TelemetrySample,
    pub decision: ControlDecision,
    pub fans: Vec<ChannelRpm>,
}

impl StatusLine {
    pub fn new(
        timestamp: String,
        sample: TelemetrySample,
        decision: ControlDecision,
        fans: Vec<ChannelRpm>,
    ) -> Self {
        Self {
            timestamp,
            sample,
            decision,
            fans,
        }
    }
}

impl From<&CycleReport> for StatusLine {
    fn from(report: &CycleReport) -> Self {
        Self::new(
            report.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            report.sample,
            report.decision,
            report.rpm.clone(),
        )
    }
}

/// Render the RPM line, e.g. `Fans: fan1 850 RPM, fan2 900 RPM`
pub fn format_fans(fans: &[ChannelRpm]) -> String {
    if fans.is_empty() {
        return "Fans: no response".to_string();
    }

    let list = fans
        .iter()
        .map(|f| format!("{} {} RPM", f.channel, f.rpm))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Fans: {}", list)
}

impl TableDisplay for StatusLine {
    fn to_table(&self) -> String {
        let s = &self.sample;
        let d = &self.decision;
        format!(
            "[{}] GPU {} | GPU fan {} | Power {} | VRAM {} | Chassis {}% (PWM {}) | {}\n{}",
            self.timestamp,
            s.temperature,
            s.fan_speed,
            s.power_draw,
            s.memory,
            d.target_percent,
            d.target_pwm,
            d.status,
            format_fans(&self.fans)
        )
    }

    fn to_compact(&self) -> String {
        format!(
            "{} {} {} pwm={} {}",
            self.timestamp,
            self.sample.temperature,
            self.sample.power_draw,
            self.decision.target_pwm,
            self.decision.status
        )
    }
}

/// Offline policy evaluation result
#[derive(Debug, Clone, Serialize)]
pub struct DecisionReport {
    pub policy: String,
    pub sample: TelemetrySample,
    pub decision: ControlDecision,
}

impl TableDisplay for DecisionReport {
    fn to_table(&self) -> String {
        let d = &self.decision;
        let mut output = format!(
            "Policy: {}\n  Input: {}, {}, GPU fan {}\n  Target: {}% (PWM {})\n  Status: {}",
            self.policy,
            self.sample.temperature,
            self.sample.power_draw,
            self.sample.fan_speed,
            d.target_percent,
            d.target_pwm,
            d.status
        );
        if d.override_active {
            output.push_str("\n  Emergency override active");
        }
        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{}% pwm={} {}",
            self.decision.target_percent, self.decision.target_pwm, self.decision.status
        )
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        self.message.clone()
    }
}
