//! Athenaeum CLI: command-line client for the resource portal.
//!
//! Set ATHENAEUM_API_TOKEN (or JWT_TOKEN) and ATHENAEUM_API_URL. Uploads go to
//! ATHENAEUM_STORAGE_URL. Uses Bearer auth.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use athenaeum_api_client::ApiClient;
use athenaeum_catalog::{
    AnalyticsTracker, BatchReport, HttpResourceCatalog, ResourceCatalog, ResourceLifecycle,
};
use athenaeum_cli::{init_tracing, print_json, render_resource_table};
use athenaeum_core::models::{
    AcademicLevel, Category, Department, ListQuery, PendingFile, ResourceDraft, ResourceId,
    ResourcePatch, Visibility,
};
use athenaeum_core::{ClientConfig, ErrorMetadata};
use athenaeum_storage::HttpStorageUploader;
use athenaeum_upload::{OrchestratorOptions, PipelineError, UploadOrchestrator};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "athenaeum", about = "Athenaeum resource portal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files as a single resource
    Upload {
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// lecture-notes, past-questions, assignment, textbook, research-paper, lab-manual, other
        #[arg(long)]
        category: Option<Category>,
        /// e.g. computer-science, mathematics, general
        #[arg(long)]
        department: Option<Department>,
        /// all or admin
        #[arg(long, default_value = "all")]
        visibility: Visibility,
        /// undergraduate, postgraduate or all
        #[arg(long, default_value = "all")]
        academic_level: AcademicLevel,
        /// Resubmit attempts after an upload or create failure
        #[arg(long, default_value = "2")]
        retries: u32,
    },
    /// List resources with optional filters and pagination
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<Department>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        visibility: Option<Visibility>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Include trashed resources
        #[arg(long, alias = "include-deleted")]
        trashed: bool,
        /// Output format: json or table
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Get a single resource by ID
    Get { id: String },
    /// Update resource metadata
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        department: Option<Department>,
        #[arg(long)]
        visibility: Option<Visibility>,
        #[arg(long)]
        academic_level: Option<AcademicLevel>,
    },
    /// Move resources to the trash
    Trash {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Restore trashed resources
    Restore {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Permanently delete trashed resources
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Record a view of a resource
    TrackView { id: String },
    /// Record a download of a resource
    TrackDownload { id: String },
}

fn resource_ids(ids: Vec<String>) -> Vec<ResourceId> {
    ids.into_iter().map(ResourceId::from).collect()
}

/// Print the per-id report; fail when any id failed.
fn finish_batch<T>(report: &BatchReport<T>) -> anyhow::Result<()> {
    print_json(&report.summary())?;
    if !report.is_success() {
        anyhow::bail!(
            "{} of {} operations failed",
            report.failure_count(),
            report.outcomes.len()
        );
    }
    Ok(())
}

async fn upload(
    config: &ClientConfig,
    catalog: Arc<dyn ResourceCatalog>,
    files: Vec<PathBuf>,
    draft: ResourceDraft,
    retries: u32,
) -> anyhow::Result<()> {
    let mut pending = Vec::with_capacity(files.len());
    for path in &files {
        pending.push(PendingFile::from_path(path).await?);
    }

    let storage = ApiClient::storage_from_config(config)
        .context("Failed to create storage client. Check ATHENAEUM_STORAGE_URL")?;
    let orchestrator = UploadOrchestrator::new(
        Arc::new(HttpStorageUploader::new(storage)),
        catalog,
        OrchestratorOptions::from_config(config),
    );

    let admission = orchestrator.select_files(pending).await?;
    for rejected in &admission.rejected {
        tracing::warn!(error = %rejected, "File skipped");
    }
    if admission.dropped > 0 {
        tracing::warn!(
            dropped = admission.dropped,
            limit = config.max_files_per_resource,
            "Too many files selected, extra files skipped"
        );
    }

    let mut progress = orchestrator.subscribe();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let snapshot = progress.borrow_and_update().clone();
            tracing::info!(
                phase = %snapshot.phase,
                file = snapshot.current_file_name.as_deref().unwrap_or("-"),
                uploaded = snapshot.uploaded_count,
                total = snapshot.total_files,
                percentage = snapshot.percentage,
                "Upload progress"
            );
        }
    });

    let mut attempt = 0;
    let result = loop {
        match orchestrator.submit(&draft).await {
            Ok(resource) => break Ok(resource),
            Err(e @ (PipelineError::Upload { .. } | PipelineError::Create(_)))
                if attempt < retries =>
            {
                attempt += 1;
                tracing::warn!(attempt, retries, error = %e, "Resubmitting to resume upload");
                tokio::time::sleep(Duration::from_secs(2 * attempt as u64)).await;
            }
            Err(e) => break Err(e),
        }
    };
    reporter.abort();

    match result {
        Ok(resource) => print_json(&resource),
        Err(e) => {
            if let Some(action) = e.suggested_action() {
                tracing::error!(code = e.error_code(), suggestion = action, "{}", e.client_message());
            }
            Err(anyhow::Error::new(e).context("Upload failed"))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    let api = ApiClient::catalog_from_config(&config).context(
        "Failed to create API client. Set ATHENAEUM_API_TOKEN and ATHENAEUM_API_URL (or API_URL)",
    )?;
    let catalog: Arc<dyn ResourceCatalog> = Arc::new(HttpResourceCatalog::new(api.clone()));
    let lifecycle = ResourceLifecycle::new(catalog.clone(), config.batch_concurrency);

    match cli.command {
        Commands::Upload {
            files,
            title,
            description,
            category,
            department,
            visibility,
            academic_level,
            retries,
        } => {
            let draft = ResourceDraft {
                title,
                description,
                category,
                department,
                visibility,
                academic_level,
            };
            upload(&config, catalog, files, draft, retries).await?;
        }
        Commands::List {
            search,
            department,
            category,
            visibility,
            page,
            limit,
            trashed,
            format,
        } => {
            let query = ListQuery {
                page,
                limit,
                search,
                department,
                category,
                visibility,
                include_deleted: trashed,
            };
            let results = catalog.list(&query).await?;
            match format.as_str() {
                "table" => print!("{}", render_resource_table(&results)),
                _ => print_json(&results)?,
            }
        }
        Commands::Get { id } => {
            let resource = catalog.get(&ResourceId::from(id)).await?;
            print_json(&resource)?;
        }
        Commands::Update {
            id,
            title,
            description,
            category,
            department,
            visibility,
            academic_level,
        } => {
            let patch = ResourcePatch {
                title,
                description,
                category,
                department,
                visibility,
                academic_level,
            };
            let resource = catalog.update(&ResourceId::from(id), &patch).await?;
            print_json(&resource)?;
        }
        Commands::Trash { ids } => {
            finish_batch(&lifecycle.trash_many(&resource_ids(ids)).await)?;
        }
        Commands::Restore { ids } => {
            finish_batch(&lifecycle.restore_many(&resource_ids(ids)).await)?;
        }
        Commands::Delete { ids } => {
            finish_batch(&lifecycle.delete_many(&resource_ids(ids)).await)?;
        }
        Commands::TrackView { id } => {
            let tracker = AnalyticsTracker::new(Arc::new(api));
            let id = ResourceId::from(id);
            if let Some(handle) = tracker.track_view(&id) {
                handle.await?;
            }
            print_json(&serde_json::json!({ "tracked": "view", "id": id }))?;
        }
        Commands::TrackDownload { id } => {
            let tracker = AnalyticsTracker::new(Arc::new(api));
            let id = ResourceId::from(id);
            if let Some(handle) = tracker.track_download(&id) {
                handle.await?;
            }
            print_json(&serde_json::json!({ "tracked": "download", "id": id }))?;
        }
    }

    Ok(())
}
