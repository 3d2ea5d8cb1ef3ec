//! FFmpeg-backed converter.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, instrument, trace};

use super::{ConversionCallback, ConversionError, ConversionJob, Converter};

/// Arguments placed before the inputs: overwrite, quiet, machine-readable progress on stdout.
const FFMPEG_BASE_ARGS: &[&str] = &[
    "-y",
    "-hide_banner",
    "-nostats",
    "-loglevel",
    "error",
    "-progress",
    "pipe:1",
];

/// Runs the configured FFmpeg executable.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: PathBuf,
}

impl FfmpegConverter {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Converter for FfmpegConverter {
    fn build_job(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<Box<dyn ConversionJob>, ConversionError> {
        if inputs.is_empty() {
            return Err(ConversionError::NoInputs);
        }
        Ok(Box::new(FfmpegJob {
            program: self.program.clone(),
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            callback: None,
            child: None,
            executed: false,
        }))
    }
}

struct FfmpegJob {
    program: PathBuf,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    callback: Option<ConversionCallback>,
    child: Option<Child>,
    executed: bool,
}

impl FfmpegJob {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(FFMPEG_BASE_ARGS);
        for input in &self.inputs {
            command.arg("-i").arg(input);
        }
        command
            .arg(&self.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ConversionJob for FfmpegJob {
    fn on_progress(&mut self, callback: ConversionCallback) {
        self.callback = Some(callback);
    }

    #[instrument(skip(self), fields(output = %self.output.display()))]
    async fn execute(&mut self) -> Result<(), ConversionError> {
        if self.executed {
            return Err(ConversionError::AlreadyExecuted);
        }
        self.executed = true;

        let mut child = self
            .command()
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(inputs = self.inputs.len(), "converter started");

        let stdout = child.stdout.take();
        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(collect(stderr)));
        self.child = Some(child);

        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|source| ConversionError::Io {
                    output: self.output.clone(),
                    source,
                })?
            {
                if let Some(seconds) = parse_progress_line(&line) {
                    trace!(seconds, "conversion progress");
                    if let Some(callback) = &self.callback {
                        callback(seconds);
                    }
                }
            }
        }

        let Some(child) = self.child.as_mut() else {
            return Err(ConversionError::AlreadyExecuted);
        };
        let status = child.wait().await.map_err(|source| ConversionError::Io {
            output: self.output.clone(),
            source,
        })?;
        self.child = None;

        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        if status.success() {
            debug!("converter finished");
            Ok(())
        } else {
            Err(ConversionError::Failed {
                code: status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    async fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(output = %self.output.display(), "terminating converter");
            let _ = child.kill().await;
        }
    }
}

async fn collect(mut reader: impl AsyncRead + Unpin) -> String {
    let mut buffer = String::new();
    let _ = reader.read_to_string(&mut buffer).await;
    buffer
}

/// Extracts the output position, in seconds, from one `-progress` line.
///
/// Both `out_time_us` and `out_time_ms` carry microseconds; `out_time` is
/// `HH:MM:SS.micro`. Anything else, including `N/A`, yields `None`.
#[must_use]
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => {
            let micros: i64 = value.trim().parse().ok()?;
            #[allow(clippy::cast_precision_loss)]
            let seconds = micros.max(0) as f64 / 1_000_000.0;
            Some(seconds)
        }
        "out_time" => parse_timestamp(value.trim()),
        _ => None,
    }
}

fn parse_timestamp(value: &str) -> Option<f64> {
    let mut parts = value.splitn(3, ':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    (total >= 0.0).then_some(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_parse_progress_line_reads_microseconds() {
        assert_eq!(parse_progress_line("out_time_us=1500000"), Some(1.5));
        assert_eq!(parse_progress_line("out_time_ms=2000000"), Some(2.0));
    }

    #[test]
    fn test_parse_progress_line_reads_timestamp() {
        assert_eq!(parse_progress_line("out_time=00:01:02.500000"), Some(62.5));
    }

    #[test]
    fn test_parse_progress_line_ignores_other_keys_and_na() {
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("out_time_us=N/A"), None);
        assert_eq!(parse_progress_line("frame=120"), None);
        assert_eq!(parse_progress_line("garbage"), None);
    }

    #[test]
    fn test_parse_progress_line_clamps_negative_offsets() {
        assert_eq!(parse_progress_line("out_time_us=-23220"), Some(0.0));
    }

    #[test]
    fn test_build_job_requires_inputs() {
        let converter = FfmpegConverter::new("ffmpeg");
        assert!(matches!(
            converter.build_job(&[], Path::new("out.mp4")),
            Err(ConversionError::NoInputs)
        ));
    }

    #[test]
    fn test_command_places_inputs_before_output() {
        let job = FfmpegJob {
            program: PathBuf::from("ffmpeg"),
            inputs: vec![PathBuf::from("v.webm"), PathBuf::from("a.webm")],
            output: PathBuf::from("out.mp4"),
            callback: None,
            child: None,
            executed: false,
        };
        let command = job.command();
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-y",
                "-hide_banner",
                "-nostats",
                "-loglevel",
                "error",
                "-progress",
                "pipe:1",
                "-i",
                "v.webm",
                "-i",
                "a.webm",
                "out.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_missing_program_is_spawn_error() {
        let converter = FfmpegConverter::new("/definitely/not/a/real/ffmpeg");
        let mut job = converter
            .build_job(&[PathBuf::from("in.webm")], Path::new("out.mp4"))
            .unwrap();
        let err = job.execute().await.unwrap_err();
        assert!(matches!(err, ConversionError::Spawn { .. }), "{err:?}");
        job.terminate().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_reports_nonzero_exit_with_stderr() {
        // `sh` rejects the ffmpeg flags and exits non-zero with a message.
        let converter = FfmpegConverter::new("sh");
        let mut job = converter
            .build_job(&[PathBuf::from("in.webm")], Path::new("out.mp4"))
            .unwrap();
        let err = job.execute().await.unwrap_err();
        match err {
            ConversionError::Failed { code, .. } => assert_ne!(code, Some(0)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_succeeds_and_rejects_second_run() {
        let converter = FfmpegConverter::new("true");
        let mut job = converter
            .build_job(&[PathBuf::from("in.webm")], Path::new("out.mp4"))
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        job.on_progress(Arc::new(move |seconds| sink.lock().unwrap().push(seconds)));

        job.execute().await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
        assert!(matches!(
            job.execute().await,
            Err(ConversionError::AlreadyExecuted)
        ));
    }
}
