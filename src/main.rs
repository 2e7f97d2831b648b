use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use squeeze_workflow::cli::{Args, Commands};
use squeeze_workflow::constants::{
    COMPRESSED_SIZE_PREFIX, INFO_PREFIX, ORIGINAL_SIZE_PREFIX, PROGRESS_SPINNER_TEMPLATE,
    REDUCTION_PREFIX, SUCCESS_PREFIX,
};
use squeeze_workflow::logger::{init_logging, is_quiet, is_verbose};
use squeeze_workflow::{
    report, CompressOutcome, ImageWorkflow, NativeCodecSource, Preview, WorkflowConfig,
    WorkflowError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<WorkflowError>() {
                Some(workflow_err) => eprintln!("❌ {}", workflow_err.user_message()),
                None => eprintln!("❌ {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    };

    match args.command {
        Commands::Compress {
            input,
            output,
            quality,
            max_dimension,
            target_size,
            no_worker,
        } => {
            if let Some(target) = target_size {
                config.set_target_size_mb(target)?;
            }
            if no_worker {
                config.prefer_off_thread = false;
            }
            let params = config.parameters(quality, max_dimension).map_err(WorkflowError::from)?;
            let workflow = ImageWorkflow::new(Arc::new(NativeCodecSource), &config);

            let preview = workflow.submit_path(&input).await?;
            show_preview(&preview);

            let spinner = create_spinner("Processing...");
            let outcome = workflow.compress(params).await;
            spinner.finish_and_clear();

            if let CompressOutcome::Completed(summary) = outcome? {
                report!("{} {}", ORIGINAL_SIZE_PREFIX, summary.original_size);
                report!("{} {}", COMPRESSED_SIZE_PREFIX, summary.compressed_size);
                report!("{} {}", REDUCTION_PREFIX, summary.reduction);

                let (reference, bytes) = workflow
                    .download()
                    .context("compressed result is no longer available")?;
                if is_verbose() {
                    report!(
                        "{} Download {} ({})",
                        INFO_PREFIX, reference.url, reference.mime_type
                    );
                }
                let destination = output.unwrap_or_else(|| default_output(&input, &reference.file_name));
                tokio::fs::write(&destination, &bytes[..])
                    .await
                    .with_context(|| format!("failed to write {:?}", destination))?;
                report!("{} Saved {:?}", SUCCESS_PREFIX, destination);
            }

            workflow.reset();
        }
        Commands::Check { input } => {
            let workflow = ImageWorkflow::new(Arc::new(NativeCodecSource), &config);
            let preview = workflow.submit_path(&input).await?;
            show_preview(&preview);
            report!("{} {} is ready for compression", SUCCESS_PREFIX, preview.name);
        }
    }

    Ok(())
}

fn show_preview(preview: &Preview) {
    report!("{} {} ({})", INFO_PREFIX, preview.name, preview.mime_type);
    report!("{} {}", ORIGINAL_SIZE_PREFIX, preview.original_size);
    if let Some((width, height)) = preview.dimensions {
        report!("📏 Dimensions: {}x{} pixels", width, height);
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn default_output(input: &Path, file_name: &str) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
