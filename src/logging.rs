use std::fs;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::ColorChoice;
use simplelog::CombinedLogger;
use simplelog::Config;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::communication::Rank;

/// Rank 0 logs to the terminal and to its log file; every other rank only
/// to its file.
pub fn setup_logging(rank: Rank, verbosity: u8) {
    let output_file = format!("logs/rank_{}.log", rank);
    let output_file = Path::new(&output_file);
    let parent_folder = output_file.parent().unwrap();
    fs::create_dir_all(parent_folder)
        .unwrap_or_else(|_| panic!("Failed to create log directory at {:?}", parent_folder));
    let level = get_log_level(verbosity);
    if rank == 0 {
        CombinedLogger::init(vec![
            TermLogger::new(
                level,
                Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            ),
            WriteLogger::new(level, Config::default(), File::create(output_file).unwrap()),
        ])
        .unwrap();
    } else {
        WriteLogger::init(level, Config::default(), File::create(output_file).unwrap()).unwrap();
    }
}

fn get_log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
