use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = roadmap_cli::command().get_matches();

    let (verbose, json) = match matches.subcommand() {
        Some((_, args)) => (args.get_flag("verbose"), args.get_flag("log-json")),
        None => (matches.get_flag("verbose"), matches.get_flag("log-json")),
    };
    roadmap_cli::init_tracing(verbose, json);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match roadmap_cli::run(&matches, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
