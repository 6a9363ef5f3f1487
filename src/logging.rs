use std::fs::File;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Initializes the global logger.
///
/// `RUST_LOG` wins over `default_filter`. The terminal is owned by the
/// renderer while the game runs, so records go to `log_file` when one can
/// be created and to stderr otherwise.
pub fn init(default_filter: &str, log_file: Option<&Path>) {
    let env = Env::default().default_filter_or(default_filter);
    let mut builder = Builder::from_env(env);

    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
        }
    }

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();
}
