use crate::error::StampbakError;
use crate::logger::{Logger, TracingLogger};
use crate::naming::{resolve_unique_dir, source_name};
use crate::utils::{display_relative, format_size};
use crate::validate::{is_valid_path, validate_source};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Outcome of copying one source directory
#[derive(Debug)]
pub struct SourceReport {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub directories_created: usize,
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub duration: Duration,
}

impl SourceReport {
    pub fn new(source_path: PathBuf, destination_path: PathBuf) -> Self {
        Self {
            source_path,
            destination_path,
            directories_created: 0,
            files_copied: 0,
            bytes_copied: 0,
            duration: Duration::from_secs(0),
        }
    }

    pub fn summary(&self) -> String {
        let files = if self.files_copied == 1 {
            "1 file".to_string()
        } else {
            format!("{} files", self.files_copied)
        };
        format!(
            "Copied {} -> {} ({}, {})",
            self.source_path.display(),
            self.destination_path.display(),
            files,
            format_size(self.bytes_copied)
        )
    }
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct BackupSummary {
    pub backup_path: PathBuf,
    pub sources: Vec<SourceReport>,
    pub duration: Duration,
}

impl BackupSummary {
    pub fn files_copied(&self) -> usize {
        self.sources.iter().map(|s| s.files_copied).sum()
    }

    pub fn bytes_copied(&self) -> u64 {
        self.sources.iter().map(|s| s.bytes_copied).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Created backup: {} ({} sources, {} files, {})",
            self.backup_path.display(),
            self.sources.len(),
            self.files_copied(),
            format_size(self.bytes_copied())
        )
    }
}

/// A single backup run of several source directories into `<target>/<timestamp>`.
///
/// Inputs are validated once, at construction. Malformed or missing sources
/// are logged and skipped; an invalid target or an empty source set fails
/// construction. Nothing is written to disk until [`BackupJob::run`], which
/// consumes the job.
#[derive(Debug)]
pub struct BackupJob<L: Logger = TracingLogger> {
    target_path: PathBuf,
    sources: Vec<PathBuf>,
    timestamp: String,
    logger: L,
}

impl BackupJob<TracingLogger> {
    pub fn new<S: AsRef<str>>(
        target_path: &str,
        source_paths: &[S],
        timestamp: &str,
    ) -> Result<Self> {
        Self::with_logger(target_path, source_paths, timestamp, TracingLogger)
    }
}

impl<L: Logger> BackupJob<L> {
    pub fn with_logger<S: AsRef<str>>(
        target_path: &str,
        source_paths: &[S],
        timestamp: &str,
        logger: L,
    ) -> Result<Self> {
        if !is_valid_path(target_path) {
            let error = StampbakError::InvalidTargetPath {
                path: target_path.to_string(),
            };
            logger.error(&error.to_string());
            return Err(error);
        }

        logger.info(&format!("Source directories: {}", source_paths.len()));

        let mut sources = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            match validate_source(source_path.as_ref()) {
                Ok(source) => sources.push(source),
                Err(e) if e.is_recoverable() => logger.error(&e.to_string()),
                Err(e) => return Err(e),
            }
        }

        if sources.is_empty() {
            let error = StampbakError::NoValidSources;
            logger.error(&error.to_string());
            return Err(error);
        }

        Ok(Self {
            target_path: PathBuf::from(target_path),
            sources,
            timestamp: timestamp.to_string(),
            logger,
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Sources that passed validation, in the order they were given
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Directory this run writes into: `<target>/<timestamp>`
    pub fn backup_path(&self) -> PathBuf {
        self.target_path.join(&self.timestamp)
    }

    /// Copy every source into its own uniquely named directory under the backup path.
    ///
    /// Sources are processed strictly in order. The first filesystem failure
    /// aborts the run and is returned as is.
    pub fn run(self) -> Result<BackupSummary> {
        let start_time = Instant::now();
        let logger = &self.logger;

        logger.info(&format!("Backup {} started", self.timestamp));

        let backup_path = self.backup_path();
        fs::create_dir_all(&backup_path).map_err(|e| StampbakError::io_at(&backup_path, e))?;

        let mut reports = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            logger.info("---");
            logger.info(&format!("Source directory: {}", source.display()));

            let name = source_name(source)?;
            let destination = resolve_unique_dir(&backup_path, &name)?;
            fs::create_dir_all(&destination)
                .map_err(|e| StampbakError::io_at(&destination, e))?;
            logger.info(&format!("Destination directory: {}", destination.display()));

            let report = copy_tree_excluding(
                source,
                &destination,
                &[self.target_path.as_path()],
                logger,
            )?;
            logger.info(&report.summary());
            reports.push(report);
        }

        logger.info("---");
        logger.info(&format!("Backup {} finished", self.timestamp));

        Ok(BackupSummary {
            backup_path,
            sources: reports,
            duration: start_time.elapsed(),
        })
    }
}

/// Replicate the contents of `source` under `destination`.
///
/// The source tree is listed in full before anything is written, then every
/// subdirectory is created before the first file is copied. Files already
/// present at the destination are overwritten. Entries that are neither
/// directories nor regular files (after following symlinks) are skipped, as
/// is `destination` itself when it lives inside `source`.
pub fn copy_tree<L: Logger>(
    source: &Path,
    destination: &Path,
    logger: &L,
) -> Result<SourceReport> {
    copy_tree_excluding(source, destination, &[], logger)
}

/// Like [`copy_tree`], also leaving out the subtrees rooted at `excluded`
pub fn copy_tree_excluding<L: Logger>(
    source: &Path,
    destination: &Path,
    excluded: &[&Path],
    logger: &L,
) -> Result<SourceReport> {
    let start_time = Instant::now();
    let mut report = SourceReport::new(source.to_path_buf(), destination.to_path_buf());

    let skip = ExcludedDirs::new(excluded.iter().copied().chain([destination]));
    let mut directories = Vec::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(source)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && skip.contains(entry.path()) {
                logger.debug(&format!(
                    "Skipping {}: inside the backup target",
                    entry.path().display()
                ));
                return false;
            }
            true
        });
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let relative = entry.path().strip_prefix(source).map_err(|_| {
            StampbakError::validation(format!(
                "{} is not below {}",
                entry.path().display(),
                source.display()
            ))
        })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            directories.push((entry.into_path(), target));
        } else {
            files.push((entry.into_path(), target));
        }
    }

    for (directory, target) in directories {
        logger.debug(&format!(
            "Creating directory {} -> {}",
            directory.display(),
            target.display()
        ));
        fs::create_dir_all(&target).map_err(|e| StampbakError::io_at(&target, e))?;
        report.directories_created += 1;
    }

    for (file, target) in files {
        if !file.is_file() {
            logger.debug(&format!(
                "Skipping {}: not a regular file",
                display_relative(&file, source)
            ));
            continue;
        }

        logger.debug(&format!(
            "Copying file {} -> {}",
            file.display(),
            target.display()
        ));
        let bytes = fs::copy(&file, &target).map_err(|e| StampbakError::io_at(&target, e))?;
        report.files_copied += 1;
        report.bytes_copied += bytes;
    }

    report.duration = start_time.elapsed();
    Ok(report)
}

/// Directories left out of a walk, matched literally or after resolving symlinks
struct ExcludedDirs {
    paths: Vec<PathBuf>,
}

impl ExcludedDirs {
    fn new<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut all = Vec::new();
        for path in paths {
            all.push(path.to_path_buf());
            if let Ok(canonical) = path.canonicalize() {
                all.push(canonical);
            }
        }
        Self { paths: all }
    }

    fn contains(&self, dir: &Path) -> bool {
        if self.paths.iter().any(|p| p == dir) {
            return true;
        }
        match dir.canonicalize() {
            Ok(canonical) => self.paths.contains(&canonical),
            Err(_) => false,
        }
    }
}

fn walk_error(source: &Path, error: walkdir::Error) -> StampbakError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source.to_path_buf());
    StampbakError::io_at(path, error.into())
}
