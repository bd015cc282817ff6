//! Command-line telemetry backend
//!
//! Runs `nvidia-smi` (or any program printing the same CSV record) and
//! parses its output. The child is killed if it outlives the timeout.

use crate::domain::TelemetrySample;
use crate::error::SensorError;
use crate::sensor::traits::{parse_record, TelemetrySampler, FIELDS};

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Telemetry sampler backed by an external command
#[derive(Debug, Clone)]
pub struct CommandSampler {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSampler {
    /// Sampler running an arbitrary program
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Sampler querying one GPU through `nvidia-smi`
    pub fn nvidia_smi(program: impl Into<String>, gpu_index: u32, timeout: Duration) -> Self {
        let args = vec![
            format!("--query-gpu={}", FIELDS.join(",")),
            "--format=csv,noheader,nounits".to_string(),
            "-i".to_string(),
            gpu_index.to_string(),
        ];
        Self::new(program, args, timeout)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spawn(&self) -> Result<Child, SensorError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SensorError::Spawn {
                command: self.program.clone(),
                source,
            })
    }

    /// Run the command and return stdout, bounded by the timeout
    ///
    /// Both pipes are drained on reader threads while waiting so a chatty
    /// child never blocks on a full pipe.
    fn run(&self) -> Result<String, SensorError> {
        let mut child = self.spawn()?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                // Readers are left detached; a grandchild may still hold the pipes
                return Err(SensorError::Timeout(self.timeout));
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SensorError::Spawn {
                    command: self.program.clone(),
                    source,
                });
            }
        };

        let stdout = join(stdout);
        let stderr = join(stderr);

        if !status.success() {
            return Err(SensorError::CommandFailed {
                command: self.command_line(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf) {
                log::debug!("Failed to read sensor output: {}", e);
            }
            buf
        })
    })
}

fn join(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

impl TelemetrySampler for CommandSampler {
    fn sample(&mut self) -> Result<TelemetrySample, SensorError> {
        let stdout = self.run()?;
        log::debug!("Sensor output: {:?}", stdout.trim());
        parse_record(&stdout)
    }

    fn describe(&self) -> String {
        self.command_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn shell(script: &str, timeout: Duration) -> CommandSampler {
        CommandSampler::new("sh", vec!["-c".to_string(), script.to_string()], timeout)
    }

    #[test]
    fn test_nvidia_smi_arguments() {
        let sampler = CommandSampler::nvidia_smi("nvidia-smi", 1, Duration::from_secs(3));
        assert_eq!(
            sampler.args()[0],
            "--query-gpu=temperature.gpu,fan.speed,power.draw,memory.used,memory.total"
        );
        assert_eq!(sampler.args()[1], "--format=csv,noheader,nounits");
        assert_eq!(&sampler.args()[2..], ["-i", "1"]);
    }

    #[test]
    fn test_sample_from_command() {
        let mut sampler = shell("echo '58, 44, 233.10, 8000, 24576'", Duration::from_secs(5));
        let sample = sampler.sample().unwrap();
        assert_eq!(sample.temperature.as_celsius(), 58);
        assert_eq!(sample.power_draw.whole_watts(), 233);
    }

    #[test]
    fn test_empty_command_output() {
        let mut sampler = shell("true", Duration::from_secs(5));
        assert!(matches!(sampler.sample(), Err(SensorError::EmptyOutput)));
    }

    #[test]
    fn test_failing_command() {
        let mut sampler = shell("echo boom >&2; exit 3", Duration::from_secs(5));
        match sampler.sample() {
            Err(SensorError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program() {
        let mut sampler = CommandSampler::new(
            "/nonexistent/gpufan-sensor",
            vec![],
            Duration::from_secs(1),
        );
        assert!(matches!(sampler.sample(), Err(SensorError::Spawn { .. })));
    }

    #[test]
    fn test_output_larger_than_pipe_buffer() {
        let mut sampler = shell(
            "echo '45, 30, 120.0, 1, 2'; head -c 200000 /dev/zero | tr '\\0' x",
            Duration::from_secs(5),
        );
        let started = Instant::now();
        let sample = sampler.sample().unwrap();
        assert_eq!(sample.temperature.as_celsius(), 45);
        assert_eq!(sample.power_draw.whole_watts(), 120);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_large_stderr_does_not_block() {
        let mut sampler = shell(
            "head -c 200000 /dev/zero >&2; echo '50, 40, 200.0, 1, 2'",
            Duration::from_secs(5),
        );
        assert_eq!(sampler.sample().unwrap().fan_speed.as_percentage(), 40);
    }

    #[test]
    fn test_hanging_command_times_out() {
        let mut sampler = shell("sleep 5", Duration::from_millis(200));
        let started = Instant::now();
        assert!(matches!(sampler.sample(), Err(SensorError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
