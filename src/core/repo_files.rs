use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{error, info, warn};

use crate::core::FetchOutcome;

pub struct RepoFileFetcher;

impl RepoFileFetcher {
    /// Reads content from a comma-separated string of file and directory
    /// paths. Directories are walked in full; the resolved file set is
    /// deduplicated and sorted so repeated runs over unchanged inputs
    /// produce identical context.
    pub fn fetch(paths_str: &str) -> FetchOutcome {
        if paths_str.is_empty() {
            info!("No ArkLib references were provided.");
            return FetchOutcome::new("No ArkLib references were provided.");
        }

        let paths: Vec<&str> = paths_str.split(',').map(str::trim).collect();
        info!("Fetching content from {} repository paths...", paths.len());

        let mut outcome = FetchOutcome::default();
        let mut files = BTreeSet::new();
        for path in paths {
            if path.is_empty() {
                continue;
            }
            let path = Path::new(path);
            if path.is_dir() {
                collect_files(path, &mut files, &mut outcome);
            } else if path.is_file() {
                files.insert(path.to_path_buf());
            } else {
                let message = format!("Could not find file or directory: {}", path.display());
                warn!("{}", message);
                outcome.push_error(message);
            }
        }

        info!("Found {} unique files to read.", files.len());

        for file_path in &files {
            info!("Reading file: {}", file_path.display());
            match fs::read_to_string(file_path) {
                Ok(content) => {
                    outcome.content.push_str(&format!(
                        "--- Start of content from {} ---\n{}\n--- End of content from {} ---\n\n",
                        file_path.display(),
                        content,
                        file_path.display()
                    ));
                }
                Err(err) => {
                    let message = format!("Error reading file {}: {}", file_path.display(), err);
                    error!("{}", message);
                    outcome.push_error(message);
                }
            }
        }

        outcome
    }
}

fn collect_files(dir: &Path, files: &mut BTreeSet<PathBuf>, outcome: &mut FetchOutcome) {
    // Reference material may live under ignored or hidden directories, so
    // every standard filter is disabled: this is a full traversal.
    let walker = WalkBuilder::new(dir).standard_filters(false).build();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().map_or(false, |ty| ty.is_file()) {
                    files.insert(entry.into_path());
                }
            }
            Err(err) => {
                let message = format!("Error walking directory {}: {}", dir.display(), err);
                warn!("{}", message);
                outcome.push_error(message);
            }
        }
    }
}
