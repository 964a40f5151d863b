// ── Configuration push ──
//
// Delivers generated set-command files to a management host. Each file is
// sent as one configuration-mode session: `configure`, the file's commands,
// `exit`. Nothing is committed; committing stays a manual step on the host.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, Stdio};
use std::thread;

use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{debug, info, warn};

use wanmesh_config::{PushPolicy, PushSettings};

#[derive(Debug, Error)]
pub enum PushError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session to {host} failed ({status}): {stderr}")]
    Session {
        host: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can run a batch of CLI commands on the management host.
pub trait Transport {
    /// Run `commands` in order and return the session output.
    fn send(&mut self, commands: &[String]) -> Result<String, PushError>;
}

// ── SSH transport ───────────────────────────────────────────────────

/// Runs commands through the system `ssh` client, one session per batch.
///
/// Authentication is whatever `ssh` would do on its own: agent, keys, or an
/// interactive password prompt on the terminal.
#[derive(Debug, Clone)]
pub struct SshTransport {
    program: String,
    host: String,
    username: String,
    args: Vec<String>,
    session_log: Option<PathBuf>,
}

impl SshTransport {
    pub fn new(host: &str, settings: &PushSettings) -> Self {
        Self {
            program: "ssh".into(),
            host: host.to_owned(),
            username: settings.username.clone(),
            args: settings.ssh_args.clone(),
            session_log: settings.session_log.clone(),
        }
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    fn log_session(&self, commands: &[String], output: &str) -> Result<(), PushError> {
        let Some(ref path) = self.session_log else {
            return Ok(());
        };
        let mut log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(log, "### {} ###", self.destination())?;
        for command in commands {
            writeln!(log, "> {command}")?;
        }
        writeln!(log, "{output}")?;
        Ok(())
    }
}

impl Transport for SshTransport {
    fn send(&mut self, commands: &[String]) -> Result<String, PushError> {
        debug!(destination = %self.destination(), commands = commands.len(), "opening ssh session");

        let mut child = Command::new(&self.program)
            .arg("-T")
            .args(&self.args)
            .arg(self.destination())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PushError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from its own thread while this one drains stdout and
        // stderr. The remote CLI echoes every command, so writing the whole
        // batch first would fill the pipes and stall both sides.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || write_commands(stdin, commands));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, output)
        });

        let output = output?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        self.log_session(commands, &stdout)?;

        // A session that died early also breaks the stdin pipe; its exit
        // status is the more useful error.
        if !output.status.success() {
            return Err(PushError::Session {
                host: self.host.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        written?;
        Ok(stdout)
    }
}

/// Write `commands` one per line, then close the pipe so the session ends.
fn write_commands(stdin: Option<ChildStdin>, commands: &[String]) -> io::Result<()> {
    let Some(stdin) = stdin else {
        return Ok(());
    };
    let mut writer = BufWriter::new(stdin);
    for command in commands {
        writeln!(writer, "{command}")?;
    }
    writer.flush()
}

// ── File push ───────────────────────────────────────────────────────

/// Turn a generated file into a configuration-mode command batch.
///
/// Blank lines and `#` comment lines (device delimiters) are dropped.
pub fn config_session(contents: &str) -> Vec<String> {
    let mut commands = vec!["configure".to_owned()];
    commands.extend(
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_owned),
    );
    commands.push("exit".to_owned());
    commands
}

/// Generated `.txt` files in `dir`, sorted by name.
pub fn generated_files(dir: &Path) -> Result<Vec<PathBuf>, PushError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug)]
pub struct PushFailure {
    pub file: PathBuf,
    pub error: PushError,
}

#[derive(Debug, Default)]
pub struct PushReport {
    pub pushed: Vec<PathBuf>,
    pub failures: Vec<PushFailure>,
    /// Files never attempted because an earlier failure aborted the run.
    pub skipped: Vec<PathBuf>,
}

impl PushReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.pushed.len() + self.failures.len() + self.skipped.len()
    }
}

/// Push `files` in sorted order, applying `policy` on failure.
pub fn push_files<T: Transport>(
    transport: &mut T,
    files: &[PathBuf],
    policy: PushPolicy,
    progress: &ProgressBar,
) -> PushReport {
    let mut ordered = files.to_vec();
    ordered.sort();

    let mut report = PushReport::default();
    let mut remaining = ordered.into_iter();

    while let Some(file) = remaining.next() {
        progress.set_message(file_label(&file));

        let result = std::fs::read_to_string(&file)
            .map_err(PushError::from)
            .and_then(|contents| transport.send(&config_session(&contents)));
        progress.inc(1);

        match result {
            Ok(_) => {
                info!(file = %file.display(), "pushed configuration");
                report.pushed.push(file);
            }
            Err(error) => {
                warn!(file = %file.display(), %error, "push failed");
                report.failures.push(PushFailure { file, error });
                if policy == PushPolicy::Abort {
                    report.skipped.extend(remaining);
                    break;
                }
            }
        }
    }
    report
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
