use clap::{Arg, ArgAction, Command};
use stampbak::{
    create_sample_settings, default_settings_path, dump_settings, init_file_logging,
    load_settings, timestamp, BackupJob, Settings, StampbakError,
};
use std::path::PathBuf;
use std::process;

fn main() {
    let result = run();
    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {error}");

            // Show suggestions if available
            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nSuggestions:");
                for suggestion in suggestions {
                    eprintln!("  - {suggestion}");
                }
            }

            process::exit(error.exit_code());
        }
    }
}

fn run() -> Result<(), StampbakError> {
    let matches = Command::new("stampbak")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Copies source directories into a timestamped backup directory")
        .long_about(
            "stampbak reads SourcePaths and TargetPath from appsettings.json and copies\n\
             every source directory into <TargetPath>/<yyyy-MM-dd_HH.mm.ss>/<name>.\n\
             The run log is written to <yyyy-MM-dd_HH.mm.ss>.log in the current directory.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Settings file to read (default: ./appsettings.json)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print the run summary")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump-config")
                .long("dump-config")
                .help("Display the settings that would be used and exit")
                .action(ArgAction::SetTrue)
                .conflicts_with("sample-config"),
        )
        .arg(
            Arg::new("sample-config")
                .long("sample-config")
                .help("Print a sample appsettings.json and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("sample-config") {
        print!("{}", create_sample_settings());
        return Ok(());
    }

    let settings_path = match matches.get_one::<PathBuf>("config") {
        Some(path) => path.clone(),
        None => default_settings_path()?,
    };
    let settings = load_settings(&settings_path)?;

    if matches.get_flag("dump-config") {
        dump_settings(&settings, &settings_path);
        return Ok(());
    }

    let timestamp = timestamp();
    let log_path = PathBuf::from(format!("{timestamp}.log"));
    init_file_logging(settings.log_event_level.level_filter(), &log_path)?;

    run_backup(&settings, &timestamp, matches.get_flag("quiet"))
}

fn run_backup(settings: &Settings, timestamp: &str, quiet: bool) -> Result<(), StampbakError> {
    let job = BackupJob::new(
        &settings.target_path,
        settings.source_paths.as_slice(),
        timestamp,
    )?;
    let summary = job.run()?;

    if !quiet {
        println!("{}", summary.summary());
        for source in &summary.sources {
            println!("  {}", source.summary());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampbak::LogLevel;
    use std::fs;
    use tempfile::tempdir;

    fn settings(target: &std::path::Path, sources: &[&std::path::Path]) -> Settings {
        Settings {
            source_paths: sources
                .iter()
                .map(|p| p.to_str().unwrap().to_string())
                .collect(),
            target_path: target.to_str().unwrap().to_string(),
            log_event_level: LogLevel::Debug,
        }
    }

    #[test]
    fn test_run_backup() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("docs");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("report.txt"), "quarterly").unwrap();
        let target = dir.path().join("backups");

        let result = run_backup(&settings(&target, &[&source]), "2024-05-06_07.08.09", true);
        assert!(result.is_ok());

        let copied = target
            .join("2024-05-06_07.08.09")
            .join("docs")
            .join("report.txt");
        assert_eq!(fs::read_to_string(copied).unwrap(), "quarterly");
    }

    #[test]
    fn test_run_backup_without_sources() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("backups");

        let err = run_backup(&settings(&target, &[]), "2024-05-06_07.08.09", true).unwrap_err();
        assert!(matches!(err, StampbakError::NoValidSources));
        assert_eq!(err.exit_code(), 2);
        assert!(!target.exists());
    }

    #[test]
    fn test_run_backup_invalid_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("docs");
        fs::create_dir_all(&source).unwrap();

        let mut settings = settings(dir.path(), &[&source]);
        settings.target_path = "backups".to_string();

        let err = run_backup(&settings, "2024-05-06_07.08.09", false).unwrap_err();
        assert!(matches!(err, StampbakError::InvalidTargetPath { .. }));
    }
}
