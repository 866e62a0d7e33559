use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use hookenv_platform::AppPaths;

/// Drop the oldest lines once the file outgrows `max_log_size`, keeping at
/// most half of that budget so trimming does not run on every start.
fn trim_log_file_if_oversized(log_path: &Path, max_log_size: u64) {
    let Ok(contents) = std::fs::read(log_path) else {
        return;
    };
    let Ok(budget) = usize::try_from(max_log_size) else {
        return;
    };
    if contents.len() <= budget {
        return;
    }

    let cut = contents.len() - budget / 2;
    let keep_from = match contents[cut - 1] {
        b'\n' => cut,
        _ => contents[cut..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(contents.len(), |pos| cut + pos + 1),
    };
    let _ = std::fs::write(log_path, &contents[keep_from..]);
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

const fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Warnings always reach stderr; the log file only receives records when
/// debug logging is on.
pub fn init_logging(verbose: bool, max_log_size: u64) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("hookenv")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level_for(verbose),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let mut log_path = None;
    if verbose && let Ok(paths) = AppPaths::new() {
        let _ = paths.ensure_dirs();
        let path = paths.log_file();
        trim_log_file_if_oversized(&path, max_log_size);
        if let Ok(file) = open_log_file(&path) {
            loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
            log_path = Some(path);
        }
    }

    let _ = CombinedLogger::init(loggers);
    log::set_max_level(level_for(verbose));

    if let Some(path) = log_path {
        log::info!("Debug logging initialized, log file: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use simplelog::LevelFilter;

    use super::{level_for, open_log_file, trim_log_file_if_oversized};

    #[test]
    fn log_file_is_appended_across_opens() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let log_path = temp_dir.path().join("hookenv.log");

        for line in ["first run\n", "second run\n"] {
            let mut file = open_log_file(&log_path).expect("log file should open");
            file.write_all(line.as_bytes()).expect("write should succeed");
        }

        assert_eq!(
            std::fs::read_to_string(&log_path).expect("log file should be readable"),
            "first run\nsecond run\n"
        );
    }

    #[test]
    fn oversized_log_keeps_newest_whole_lines() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let log_path = temp_dir.path().join("hookenv.log");
        std::fs::write(&log_path, "install-1\ninstall-2\ninstall-3\ninstall-4\n")
            .expect("test log file should be written");

        trim_log_file_if_oversized(&log_path, 24);

        assert_eq!(
            std::fs::read_to_string(&log_path).expect("trimmed log file should be readable"),
            "install-4\n"
        );
    }

    #[test]
    fn small_log_file_is_left_alone() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let log_path = temp_dir.path().join("hookenv.log");
        std::fs::write(&log_path, "one\ntwo\n").expect("test log file should be written");

        trim_log_file_if_oversized(&log_path, 1024);

        assert_eq!(
            std::fs::read_to_string(&log_path).expect("log file should be readable"),
            "one\ntwo\n"
        );
    }

    #[test]
    fn missing_log_file_is_ignored() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let log_path = temp_dir.path().join("hookenv.log");

        trim_log_file_if_oversized(&log_path, 1);

        assert!(!log_path.exists());
    }

    #[test]
    fn verbose_selects_debug_level() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Warn);
    }
}
