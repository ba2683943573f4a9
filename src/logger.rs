/// Logger initialisation for the command-line binary.

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .expect("logger already initialised");
}
