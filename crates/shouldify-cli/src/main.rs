use std::process::ExitCode;

use shouldify_cli::{command, run, Options};

fn main() -> anyhow::Result<ExitCode> {
    let matches = command().get_matches();
    let options = Options::from_matches(&matches)?;

    if options.debug {
        shouldify_core::init_tracing_with("shouldify_core=debug,shouldify_cli=debug");
    } else {
        shouldify_core::init_tracing();
    }

    let stdout = std::io::stdout();
    let code = run(&options, &mut stdout.lock())?;
    Ok(ExitCode::from(code))
}
