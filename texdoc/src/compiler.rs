//! Compiler service: turns markup text into a PDF with an external engine

use crate::config::{Engine, InteractionMode, Settings};
use encoding_rs::Encoding;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Characters of engine output kept in a failure report
const LOG_TAIL_CHARS: usize = 2000;

/// Compilation errors
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("'{engine}' was not found on PATH; install TeX Live or MiKTeX and add it to PATH")]
    EngineNotFound { engine: String },

    #[error("compilation produced no PDF:\n{log}")]
    Failed { log: String },

    #[error("engine pass timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-invocation compiler options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub engine: Engine,
    /// Number of engine runs; at least 1
    pub passes: u32,
    pub interaction_mode: InteractionMode,
    /// Base name of the `.tex` and `.pdf` files
    pub job_name: String,
    pub extra_args: Vec<String>,
    /// Seconds a single pass may run
    pub timeout_secs: u64,
    /// Encoding labels tried when decoding engine output
    pub fallback_encodings: Vec<String>,
}

impl CompileOptions {
    /// Options taken from the compilation settings
    pub fn from_settings(settings: &Settings, job_name: impl Into<String>) -> Self {
        Self {
            engine: settings.compilation.engine,
            passes: settings.compilation.compile_times,
            interaction_mode: settings.compilation.interaction_mode,
            job_name: job_name.into(),
            extra_args: settings.compilation.extra_options.clone(),
            timeout_secs: settings.compilation.timeout_secs,
            fallback_encodings: settings.encoding.fallback_encodings.clone(),
        }
    }
}

/// Compiles markup text in a working directory
pub trait Compiler {
    /// Compile `markup`, returning the path of the produced PDF
    fn compile(
        &self,
        markup: &str,
        workdir: &Path,
        options: &CompileOptions,
    ) -> Result<PathBuf, CompileError>;
}

/// Runs `pdflatex`/`xelatex`/`lualatex` as a child process
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexCompiler;

impl LatexCompiler {
    pub fn new() -> Self {
        Self
    }
}

/// Locate an executable on `PATH`
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}

/// Keep the last `max_chars` characters of engine output
fn log_tail(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let start = text
        .char_indices()
        .nth(count - max_chars)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[start..]
}

/// Look up an encoding label; `cp932` is the Windows name of Shift_JIS
fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
        .or_else(|| label.eq_ignore_ascii_case("cp932").then_some(encoding_rs::SHIFT_JIS))
}

/// Decode engine output with the first encoding that accepts it
///
/// Falls back to lossy UTF-8 when no listed encoding decodes the bytes cleanly.
pub fn decode_output(bytes: &[u8], encodings: &[String]) -> String {
    for label in encodings {
        let Some(encoding) = encoding_for_label(label) else {
            log::debug!("Unknown output encoding '{}'", label);
            continue;
        };
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
    }
    let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
    text.into_owned()
}

/// Output of one finished engine pass
#[derive(Debug)]
struct PassOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

fn drain<R: Read + Send + 'static>(source: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            if let Err(e) = source.read_to_end(&mut buf) {
                log::debug!("Failed to read engine output: {}", e);
            }
        }
        buf
    })
}

/// Run `cmd`, killing it once `timeout` elapses
fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<PassOutput, CompileError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    // Pipes are drained concurrently so a chatty engine cannot block on a full pipe
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();

    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() > timeout {
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill timed-out engine: {}", e);
                    }
                    let _ = child.wait();
                    return Err(CompileError::Timeout {
                        seconds: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(100));
            }
        }
    };

    Ok(PassOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

impl Compiler for LatexCompiler {
    fn compile(
        &self,
        markup: &str,
        workdir: &Path,
        options: &CompileOptions,
    ) -> Result<PathBuf, CompileError> {
        let engine = options.engine.command();
        if find_executable(engine).is_none() {
            return Err(CompileError::EngineNotFound {
                engine: engine.to_string(),
            });
        }

        fs::create_dir_all(workdir)?;
        let tex_name = format!("{}.tex", options.job_name);
        fs::write(workdir.join(&tex_name), markup)?;

        let mut errors = Vec::new();
        for pass in 1..=options.passes.max(1) {
            log::info!("Running {} (pass {}/{})", engine, pass, options.passes);
            let mut cmd = Command::new(engine);
            cmd.arg(format!("-interaction={}", options.interaction_mode.as_str()))
                .args(&options.extra_args)
                .arg(&tex_name)
                .current_dir(workdir);
            let output = run_with_timeout(&mut cmd, Duration::from_secs(options.timeout_secs))?;

            if !output.status.success() {
                let stdout = decode_output(&output.stdout, &options.fallback_encodings);
                let stderr = decode_output(&output.stderr, &options.fallback_encodings);
                log::warn!("{} pass {} exited with {}", engine, pass, output.status);
                let mut report = format!("pass {} exited with {}\n", pass, output.status);
                if !stderr.is_empty() {
                    report.push_str(&format!("stderr: {}\n", stderr.trim_end()));
                }
                if !stdout.is_empty() {
                    report.push_str(&format!(
                        "stdout: {}\n",
                        log_tail(&stdout, LOG_TAIL_CHARS)
                    ));
                }
                errors.push(report);
            }
        }

        // A PDF with errors in the log still counts as success
        let pdf = workdir.join(format!("{}.pdf", options.job_name));
        if !pdf.is_file() {
            let log = if errors.is_empty() {
                "unknown error".to_string()
            } else {
                errors.join("\n")
            };
            return Err(CompileError::Failed { log });
        }
        if !errors.is_empty() {
            log::warn!("PDF produced despite engine errors:\n{}", errors.join("\n"));
        }
        Ok(pdf)
    }
}

/// Remove `<workdir>/<job_name><ext>` for each extension; failures are logged
pub fn cleanup(workdir: &Path, job_name: &str, extensions: &[String]) {
    for ext in extensions {
        let path = workdir.join(format!("{}{}", job_name, ext));
        if !path.exists() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("Removed {}", path.display()),
            Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}
