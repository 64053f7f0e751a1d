use deployer::arguments::Arguments;
use deployer::DeployConfig;
use std::io;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Arguments::parse_or_exit(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code,
    };
    deployer::tracing::initialize(&args.log_filter);
    tracing::info!("running deployer with validated arguments:\n{}", args);

    let config = DeployConfig::from(args);
    deployer::runner::run(&config, &mut io::stdout(), &mut io::stderr()).await
}
