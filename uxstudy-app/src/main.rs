mod app;
mod console;
mod session;
mod sink;
mod telemetry;

use clap::Parser;

use app::{App, Cli};

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing()?;
    let app = App::new(Cli::parse())?;
    app.run()?;

    Ok(())
}
