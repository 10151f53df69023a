use std::process::Command;

use tracing::{error, info, warn};

use crate::core::FetchOutcome;

pub struct PrDiffFetcher;

impl PrDiffFetcher {
    /// Fetches the unified diff for a pull request via the `gh` CLI.
    ///
    /// A failed or missing `gh` invocation yields an empty diff plus an
    /// error entry; an empty diff from a successful invocation yields a
    /// warning entry. The caller decides which of these is fatal.
    pub fn fetch(pr_number: &str) -> FetchOutcome {
        Self::fetch_with("gh", pr_number)
    }

    fn fetch_with(program: &str, pr_number: &str) -> FetchOutcome {
        info!("Fetching PR diff for PR #{}...", pr_number);

        let output = match Command::new(program)
            .args(["pr", "diff", pr_number])
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                let message = format!("Failed to fetch PR diff for PR #{}: {}", pr_number, err);
                error!("{}", message);
                let mut outcome = FetchOutcome::default();
                outcome.push_error(message);
                return outcome;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = format!(
                "Failed to fetch PR diff for PR #{}: {}",
                pr_number,
                stderr.trim()
            );
            error!("{}", message);
            let mut outcome = FetchOutcome::default();
            outcome.push_error(message);
            return outcome;
        }

        let diff = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let mut outcome = FetchOutcome::new(diff);
        if outcome.content.is_empty() {
            warn!("PR diff is empty.");
            outcome.push_error("Could not retrieve PR diff or diff is empty.");
        } else {
            info!("Successfully fetched PR diff.");
        }
        outcome
    }
}
