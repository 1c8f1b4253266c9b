use demo::DemoArgs;
use structopt::StructOpt;

pub fn logging_init() {
    #[cfg(not(debug_assertions))]
    let log_level = log::LevelFilter::Info;
    #[cfg(debug_assertions)]
    let log_level = log::LevelFilter::Debug;

    // Setup logging
    env_logger::Builder::from_default_env()
        .default_format_timestamp_nanos(true)
        .filter_module("rafx_resource_cache", log::LevelFilter::Debug)
        .filter_module("demo", log::LevelFilter::Debug)
        .filter_level(log_level)
        .init();
}

fn main() {
    logging_init();

    let args = DemoArgs::from_args();
    if let Err(e) = demo::run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
