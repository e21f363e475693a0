use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    protosync::commands::run_default().await
}
