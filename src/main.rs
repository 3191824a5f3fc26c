use aqua_license::commands::Cli;
use aqua_license::output;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("aqua_license={log_level},aqua_license_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = cli.store();
    tracing::debug!("Using profile store: {}", store.path().display());

    cli.command.run(&cli, &store).map_err(|e| {
        if !cli.verbose {
            println!("{}", output::error_json(&e));
        }
        miette::Report::new(e)
    })
}
