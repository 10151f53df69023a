mod adapters;
mod config;
mod core;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::{DocumentFetcher, PrDiffFetcher, RepoFileFetcher, ReviewContext, ReviewGenerator};

#[derive(Parser)]
#[command(name = "specscope")]
#[command(about = "Reviews pull requests for misformalization against their specification", long_about = None)]
#[command(version)]
struct Cli {
    /// Pull request number to review.
    #[arg(long)]
    pr_number: String,

    /// Comma-separated URLs of external specification documents.
    #[arg(long, default_value = "")]
    external_refs: String,

    /// Comma-separated repository files or directories to include as context.
    #[arg(long, default_value = "")]
    arklib_refs: String,

    /// Free-text guidance passed through to the reviewer model.
    #[arg(long, default_value = "")]
    additional_comments: String,

    /// Gemini model identifier.
    #[arg(long)]
    gemini_model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::Config::load().unwrap_or_default();
    config.merge_with_cli(cli.gemini_model.clone());

    let diff = PrDiffFetcher::fetch(&cli.pr_number);
    let document_fetcher = DocumentFetcher::new()?;
    let external = document_fetcher.fetch(&cli.external_refs).await;
    let repo = RepoFileFetcher::fetch(&cli.arklib_refs);

    // The diff is the one indispensable input: without it there is nothing
    // to review, so a failed fetch aborts before any model call.
    if diff_fetch_is_fatal(&diff.content, &diff.errors) {
        let message = format!(
            "Aborting review: Could not fetch PR diff. Errors:\n{}",
            diff.errors.join("\n")
        );
        error!("{}", message);
        println!("{}", message);
        return Ok(());
    }

    // Non-critical errors ride along inside the context so the model knows
    // which parts are missing instead of silently reviewing partial input.
    let mut repo_context = repo.content;
    let all_errors: Vec<String> = [diff.errors, external.errors, repo.errors].concat();
    if !all_errors.is_empty() {
        merge_errors_into_context(&mut repo_context, &all_errors);
        warn!(
            "Encountered non-critical errors during context fetching. \
             The review will proceed with partial context."
        );
    }

    info!("Generating AI review...");
    let context = ReviewContext {
        diff: diff.content,
        external_context: external.content,
        repo_context,
        additional_comments: cli.additional_comments,
        model: config.model.clone(),
    };

    let review = ReviewGenerator::generate(&context, &config).await;
    println!("{}", review);

    Ok(())
}

/// The abort gate is deliberately two-part: the fetcher records an
/// empty-diff warning without judging it, and only the combination of a
/// recorded error with an empty diff stops the run.
fn diff_fetch_is_fatal(diff: &str, errors: &[String]) -> bool {
    !errors.is_empty() && diff.is_empty()
}

fn merge_errors_into_context(repo_context: &mut String, errors: &[String]) {
    repo_context.push_str("\n--- Errors Encountered During Context Fetching ---\n");
    repo_context.push_str(&errors.join("\n"));
}
