//! Dump session orchestration.
//!
//! build -> validate -> run tool -> extract -> resolve -> assemble -> write.
//! Catalog problems are warnings; a missing artifact aborts the session.

use std::path::{Path, PathBuf};

use redump_catalog::{CatalogService, CatalogSession};
use tokio::sync::oneshot;
use tracing::Instrument;

use crate::config::Options;
use crate::domain::{DiscForgeError, KnownSystem, MediaType, Result};
use crate::extraction::{ExtractedFields, ExtractionEngine, ExtractionOutcome};
use crate::grammar::{build, tokenizer, DumpRequest};
use crate::matching::{MatchResolver, MatchResult};
use crate::obs;
use crate::progress::{Progress, ProgressEvent};
use crate::submission::{write_submission, SubmissionAssembler, SubmissionFiles, SubmissionRecord, UserMetadata};
use crate::tool::{execute_cancellable, ToolOutput};

/// Where a dump's output lives and what it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub dir: PathBuf,
    pub base: String,
    pub system: KnownSystem,
    pub media: MediaType,
}

impl OutputLocation {
    /// Split the tool's output path into directory and base name.
    pub fn from_output_path(path: &Path, system: KnownSystem, media: MediaType) -> Result<Self> {
        let base = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DiscForgeError::InvalidPath(path.display().to_string()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            dir,
            base: base.to_string(),
            system,
            media,
        })
    }
}

/// Everything produced by processing one dump's output.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub fields: ExtractedFields,
    pub matched: Option<MatchResult>,
    pub record: SubmissionRecord,
    pub files: SubmissionFiles,
    pub warnings: Vec<String>,
}

async fn open_catalog_session(
    catalog: &dyn CatalogService,
    credentials: Option<(&str, &str)>,
) -> redump_catalog::Result<CatalogSession> {
    match credentials {
        Some((user, pass)) => catalog.authenticate(user, pass).await,
        None => Ok(CatalogSession::anonymous()),
    }
}

/// Extract, resolve, assemble and write the submission for existing output.
pub async fn process_output(
    location: &OutputLocation,
    user: &UserMetadata,
    options: &Options,
    catalog: Option<&dyn CatalogService>,
    progress: &Progress,
) -> Result<SubmissionReport> {
    progress.report(ProgressEvent::ExtractionStarted);

    let engine = ExtractionEngine::new(&location.dir, &location.base, location.media)
        .with_system(location.system);
    let outcome = tokio::task::spawn_blocking(move || engine.extract())
        .await
        .map_err(|e| DiscForgeError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    let fields = match outcome {
        ExtractionOutcome::Complete(fields) => fields,
        ExtractionOutcome::Incomplete { missing } => {
            obs::emit_extraction_incomplete(&location.base, &missing);
            progress.report(ProgressEvent::ExtractionIncomplete {
                missing: missing.clone(),
            });
            return Err(DiscForgeError::IncompleteDump(missing));
        }
    };
    obs::emit_extraction_completed(&location.base, fields.len(), fields.fingerprints.len());
    progress.report(ProgressEvent::ExtractionCompleted {
        fields: fields.len(),
    });

    let mut warnings = Vec::new();
    let mut matched = None;
    if let Some(catalog) = catalog.filter(|_| !options.catalog.disabled) {
        progress.report(ProgressEvent::MatchStarted {
            tracks: fields.fingerprints.len(),
        });

        let resolved = match open_catalog_session(catalog, options.credentials()).await {
            Ok(session) => MatchResolver::new(catalog, &session)
                .resolve(&fields.fingerprints)
                .await,
            Err(e) => Err(e.into()),
        };

        match resolved {
            Ok(result) => {
                obs::emit_match_resolved(
                    result.tracks_queried,
                    result.candidates.len(),
                    result.unique_id(),
                );
                progress.report(ProgressEvent::MatchResolved {
                    candidates: result.candidates.len(),
                });
                for w in &result.warnings {
                    progress.report(ProgressEvent::Warning(w.clone()));
                }
                warnings.extend(result.warnings.iter().cloned());
                matched = Some(result);
            }
            Err(e) => {
                obs::emit_match_warning(&e);
                let msg = format!("catalog lookup failed, using local data only: {e}");
                progress.report(ProgressEvent::Warning(msg.clone()));
                warnings.push(msg);
            }
        }
    }

    let record = SubmissionAssembler::new(location.system, location.media).assemble(
        &fields,
        user,
        matched.as_ref(),
    );
    let files = write_submission(&record, &location.dir, options.output.compress_json)?;
    obs::emit_submission_written(&files.text);
    progress.report(ProgressEvent::SubmissionWritten {
        path: files.text.clone(),
    });

    Ok(SubmissionReport {
        fields,
        matched,
        record,
        files,
        warnings,
    })
}

/// Result of a full dump session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: String,
    pub command: String,
    pub tool: ToolOutput,
    pub report: SubmissionReport,
}

/// One dump, from selection to written submission.
#[derive(Debug, Clone)]
pub struct DumpSession {
    id: String,
    request: DumpRequest,
    user: UserMetadata,
    options: Options,
    progress: Progress,
}

impl DumpSession {
    pub fn new(request: DumpRequest, options: Options) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            user: UserMetadata::default(),
            options,
            progress: Progress::none(),
        }
    }

    pub fn with_user_metadata(mut self, user: UserMetadata) -> Self {
        self.user = user;
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The command line this session will run.
    pub fn command(&self) -> Result<String> {
        build(&self.request)
    }

    pub async fn run(
        &self,
        catalog: Option<&dyn CatalogService>,
        cancel: oneshot::Receiver<()>,
    ) -> Result<SessionOutcome> {
        self.run_inner(catalog, cancel)
            .instrument(obs::SessionSpan::span(&self.id))
            .await
    }

    async fn run_inner(
        &self,
        catalog: Option<&dyn CatalogService>,
        cancel: oneshot::Receiver<()>,
    ) -> Result<SessionOutcome> {
        obs::emit_session_started(
            &self.id,
            self.request.system.short_name(),
            self.request.media.short_name(),
        );

        let command = self.command()?;
        let location = OutputLocation::from_output_path(
            Path::new(&self.request.path),
            self.request.system,
            self.request.media,
        )?;
        if !location.dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&location.dir)?;
        }

        self.progress.report(ProgressEvent::ToolStarted {
            command: command.clone(),
        });
        let args: Vec<String> = tokenizer::tokenize(&command)
            .iter()
            .map(|t| tokenizer::unquote(t).to_string())
            .collect();
        let tool = execute_cancellable(&self.options.tool_path, &args, cancel).await?;
        obs::emit_tool_finished(tool.exit_code, tool.duration_ms);
        self.progress.report(ProgressEvent::ToolFinished {
            exit_code: tool.exit_code,
        });
        if !tool.success() {
            self.progress.report(ProgressEvent::Warning(format!(
                "dumping tool exited with {}",
                tool.exit_code
            )));
        }

        let report =
            process_output(&location, &self.user, &self.options, catalog, &self.progress).await?;

        Ok(SessionOutcome {
            session_id: self.id.clone(),
            command,
            tool,
            report,
        })
    }
}
