use clap::Parser;
use dumpdb_cli::{dump, Args, DumpError, DumpOptions};
use dumpdb_kv_store::lmdb::EnvironmentConfig;
use log::LevelFilter;
use std::io;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let exit_code = match run(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("dumpdb: {}", err);
            err.exit_code()
        }
    };
    std::process::exit(exit_code);
}

fn run(args: &Args) -> Result<(), DumpError> {
    let config = EnvironmentConfig::read_only(&args.path, args.max_dbs, args.env_flags());
    let options = DumpOptions {
        db_name: &args.db,
        prefix: args.prefix_bytes(),
        format: args.format,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    dump(&config, &options, &mut out)?;
    Ok(())
}

/// Logs go to stderr. `-v` raises the default level; `RUST_LOG` overrides it.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}
