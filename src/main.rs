// src/main.rs

use pipeline_dag::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("pipeline-dag error: {err:?}");
            std::process::exit(2);
        }
    }
}

/// Returns `false` if any node failed.
async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let summary = run(args).await?;
    Ok(!summary.has_failures())
}
