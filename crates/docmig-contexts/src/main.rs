use std::io::{self, Write};
use std::process;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool, quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_target(false).with_writer(io::stderr)))
        .init();
}

fn main() {
    let matches = docmig_contexts::command().get_matches();
    init_tracing(matches.get_flag("log-json"), matches.get_flag("quiet"));

    let mut stdout = io::stdout().lock();
    let code = match docmig_contexts::run(&matches, &mut stdout) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    let _ = stdout.flush();
    process::exit(code);
}
