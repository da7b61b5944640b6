//! Compile orchestration.
//!
//! Handles the per-job workspace, building the pandoc argument list,
//! racing the typesetter against the wall-clock budget, and turning the
//! result into either a PDF stream or a classified failure.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, Command};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::diagnostics::DiagnosticParser;
use super::models::SanitizedRequest;
use super::naming::build_filename;
use super::stream::PdfStream;
use super::CompileError;
use crate::config::CompilerSettings;
use crate::layout::{derive_geometry, derive_typographic_scale, latex_preamble, Geometry};
use crate::templates::TemplateRegistry;

const WORKSPACE_PREFIX: &str = "pp-";
const INPUT_FILE: &str = "input.md";
const OUTPUT_FILE: &str = "output.pdf";
const PREAMBLE_FILE: &str = "grid.tex";
/// Diagnostic output kept in memory; older bytes are discarded first.
const MAX_STDERR_BYTES: usize = 1024 * 1024;

/// A successful compile, ready to be streamed.
pub struct CompiledDocument {
    pub stream: PdfStream,
    pub size: u64,
    pub filename: String,
    pub duration: Duration,
}

/// One request's scratch area. Dropping it removes the directory.
pub struct CompileJob {
    pub id: Uuid,
    workspace: TempDir,
}

impl CompileJob {
    pub fn create(parent: &Path) -> Result<Self, CompileError> {
        let workspace = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(CompileError::Workspace)?;
        Ok(Self {
            id: Uuid::new_v4(),
            workspace,
        })
    }

    pub fn path(&self) -> &Path {
        self.workspace.path()
    }

    pub fn input_path(&self) -> PathBuf {
        self.path().join(INPUT_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.path().join(OUTPUT_FILE)
    }

    pub fn preamble_path(&self) -> PathBuf {
        self.path().join(PREAMBLE_FILE)
    }

    async fn write(&self, path: PathBuf, contents: &str) -> Result<(), CompileError> {
        tokio::fs::write(path, contents)
            .await
            .map_err(CompileError::WriteInput)
    }

    fn into_workspace(self) -> TempDir {
        self.workspace
    }
}

/// How the typesetter process ended.
#[derive(Debug)]
pub enum ProcessOutcome {
    Exited { status: ExitStatus, stderr: String },
    TimedOut,
}

/// Everything the typesetter needs beyond the job paths.
#[derive(Debug, Clone)]
pub struct TypesetInputs<'a> {
    pub title: &'a str,
    pub template_path: PathBuf,
    pub main_font: &'a str,
    pub geometry: Geometry,
}

/// Build the full pandoc argument list for a job.
pub fn build_arguments(
    settings: &CompilerSettings,
    job: &CompileJob,
    inputs: &TypesetInputs<'_>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = settings.leading_args.iter().map(OsString::from).collect();

    args.push(job.input_path().into_os_string());
    args.push("--from=markdown".into());
    args.push(format!("--pdf-engine={}", settings.pdf_engine).into());

    let mut template = OsString::from("--template=");
    template.push(&inputs.template_path);
    args.push(template);

    args.push("-M".into());
    args.push(format!("title={}", inputs.title).into());
    args.push("-V".into());
    args.push(format!("mainfont={}", inputs.main_font).into());
    args.push("-V".into());
    args.push(format!("geometry:{}", inputs.geometry.directive()).into());

    let mut header = OsString::from("--include-in-header=");
    header.push(job.preamble_path());
    args.push(header);

    if let Some(bibliography) = &settings.bibliography {
        args.push("--citeproc".into());
        let mut bib = OsString::from("--bibliography=");
        bib.push(bibliography);
        args.push(bib);
    }

    args.push("-o".into());
    args.push(job.output_path().into_os_string());
    args
}

/// Runs compile jobs. Cheap to clone; each clone shares the same tables.
#[derive(Clone)]
pub struct CompileService {
    settings: Arc<CompilerSettings>,
    templates: Arc<TemplateRegistry>,
    diagnostics: Arc<DiagnosticParser>,
}

impl CompileService {
    pub fn new(
        settings: Arc<CompilerSettings>,
        templates: Arc<TemplateRegistry>,
        diagnostics: Arc<DiagnosticParser>,
    ) -> Self {
        Self {
            settings,
            templates,
            diagnostics,
        }
    }

    /// Run the job on its own task so that a dropped request does not cut the
    /// typesetter short; the job still ends at completion or timeout and its
    /// workspace is still removed.
    pub async fn compile_detached(
        &self,
        request: SanitizedRequest,
    ) -> Result<CompiledDocument, CompileError> {
        let service = self.clone();
        let handle: JoinHandle<_> = tokio::spawn(async move { service.compile(&request).await });
        handle
            .await
            .map_err(|e| CompileError::Aborted(e.to_string()))?
    }

    pub async fn compile(&self, request: &SanitizedRequest) -> Result<CompiledDocument, CompileError> {
        let started = Instant::now();
        let job = CompileJob::create(&self.settings.work_dir)?;
        let template = self.templates.get(request.template);

        log::info!(
            "Compile job {} started: template={} size={} margins={} bytes={}",
            job.id,
            template.key.as_str(),
            request.page_size.as_str(),
            request.margin_preset.as_str(),
            request.manuscript_text.len()
        );

        job.write(job.input_path(), &request.manuscript_text).await?;

        let scale = derive_typographic_scale(template.grid_type);
        job.write(job.preamble_path(), &latex_preamble(&scale)).await?;

        let inputs = TypesetInputs {
            title: &request.title,
            template_path: self.templates.template_path(template.key),
            main_font: template.main_font,
            geometry: derive_geometry(request.page_size, request.margin_preset, template.grid_type),
        };
        let args = build_arguments(&self.settings, &job, &inputs);

        match self.run_typesetter(&job, args).await? {
            ProcessOutcome::TimedOut => {
                log::warn!(
                    "Compile job {} timed out after {:?}",
                    job.id,
                    self.settings.timeout
                );
                Err(CompileError::Timeout(self.settings.timeout))
            }
            ProcessOutcome::Exited { status, stderr } => {
                log::debug!("Compile job {} typesetter exited with {}", job.id, status);
                let output = job.output_path();
                let produced = tokio::fs::try_exists(&output).await.unwrap_or(false);

                if !status.success() || !produced {
                    log::warn!(
                        "Compile job {} failed: status={} output_present={}",
                        job.id,
                        status,
                        produced
                    );
                    return Err(CompileError::CompileFailed(self.diagnostics.report(&stderr)));
                }

                let id = job.id;
                let (stream, size) = PdfStream::open(&output, job.into_workspace())
                    .await
                    .map_err(CompileError::ReadPdf)?;
                let duration = started.elapsed();
                log::info!("Compile job {} produced {} bytes in {:?}", id, size, duration);

                Ok(CompiledDocument {
                    stream,
                    size,
                    filename: build_filename(&request.title, request.template, request.page_size),
                    duration,
                })
            }
        }
    }

    /// Spawn the typesetter in the job directory and race it against the timeout.
    async fn run_typesetter(
        &self,
        job: &CompileJob,
        args: Vec<OsString>,
    ) -> Result<ProcessOutcome, CompileError> {
        let mut command = Command::new(&self.settings.program);
        command
            .args(&args)
            .current_dir(job.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The engine pandoc launches joins this group, so one signal stops both.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| CompileError::Spawn {
            program: self.settings.program.display().to_string(),
            source,
        })?;
        let pid = child.id();
        let stderr = child.stderr.take();

        // Exit and stderr EOF share one budget: a descendant holding the pipe
        // open must not keep the job alive.
        let finished = async {
            let capture = async {
                match stderr {
                    Some(pipe) => collect_stderr(pipe).await,
                    None => String::new(),
                }
            };
            let (status, stderr) = tokio::join!(child.wait(), capture);
            status.map(|status| (status, stderr))
        };

        let result = tokio::time::timeout(self.settings.timeout, finished).await;
        match result {
            Ok(Ok((status, stderr))) => Ok(ProcessOutcome::Exited { status, stderr }),
            Ok(Err(e)) => Err(CompileError::Wait(e)),
            Err(_) => {
                if let Some(pid) = pid {
                    if let Err(e) = kill_process_group(pid) {
                        log::error!("Failed to kill typesetter group for job {}: {}", job.id, e);
                    }
                }
                // Reaps the direct child; fails harmlessly if it already exited.
                if let Err(e) = child.kill().await {
                    log::debug!("Typesetter for job {} already gone: {}", job.id, e);
                }
                Ok(ProcessOutcome::TimedOut)
            }
        }
    }
}

/// Read stderr to EOF, keeping only the newest [`MAX_STDERR_BYTES`].
async fn collect_stderr(mut pipe: ChildStderr) -> String {
    let mut captured = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                captured.extend_from_slice(&chunk[..n]);
                if captured.len() > MAX_STDERR_BYTES {
                    let excess = captured.len() - MAX_STDERR_BYTES;
                    captured.drain(..excess);
                }
            }
            Err(e) => {
                log::debug!("Stopped reading typesetter stderr: {}", e);
                break;
            }
        }
    }
    String::from_utf8_lossy(&captured).into_owned()
}

/// SIGKILL every process in the group led by `pid`. A group that has
/// already emptied is not an error.
#[cfg(unix)]
fn kill_process_group(pid: u32) -> std::io::Result<()> {
    let pgid = libc::pid_t::try_from(pid)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: killpg only sends a signal and touches no memory.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let e = std::io::Error::last_os_error();
    if e.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(e)
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) -> std::io::Result<()> {
    Ok(())
}
