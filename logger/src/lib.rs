use colored::Colorize;
use middleware::logger::LoggerMiddleware;

pub mod middleware {
    pub mod logger;
}

const WORKSPACE_CRATES: [&str; 8] = [
    "server", "api_chat", "api_subs", "api_usage", "common", "db", "limiter", "logger",
];

/// Installs the global logger: colored levels on stdout, mirrored into `log_file`.
pub fn setup(log_file: &str) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let color = match record.level() {
                log::Level::Info => "green",
                log::Level::Warn => "yellow",
                log::Level::Error => "red",
                log::Level::Debug => "magenta",
                log::Level::Trace => "bright black",
            };
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level().to_string().color(color),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .level_for("hyper", log::LevelFilter::Off)
        .level_for("h2", log::LevelFilter::Off);

    for krate in WORKSPACE_CRATES {
        dispatch = dispatch.level_for(krate, log::LevelFilter::Debug);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file)?)
        .apply()?;
    Ok(())
}

/// Access log middleware, silent when `enabled` is false.
pub fn middleware(enabled: bool) -> LoggerMiddleware {
    LoggerMiddleware::new(enabled)
}
