use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    let cli = pharmaguard::cli::Cli::parse();
    match pharmaguard::cli::run(cli).await {
        Ok(output) => {
            println!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            if let Some(pg_err) = err.downcast_ref::<pharmaguard::error::PharmaGuardError>() {
                eprintln!("Error [{}]: {pg_err}", pg_err.code());
            } else {
                eprintln!("Error [PARSE_ERROR]: {err}");
            }
            std::process::ExitCode::from(1)
        }
    }
}
