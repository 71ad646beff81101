use anyhow::Context;
use clap::Parser;
use env_injector::cli::Cli;
use env_injector::config::InjectorConfig;
use env_injector::environment::Environment;
use env_injector::inject::InjectionReport;
use env_injector::logging;
use env_injector::orchestrator::Orchestrator;
use env_injector::store::ServiceAccessor;
use serde::Serialize;
use tracing::{debug, error};

#[derive(Serialize)]
struct DryRunReport<'a> {
    config: &'a InjectorConfig,
    #[serde(flatten)]
    report: &'a InjectionReport,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Settings, including verbosity, are read after the env file is merged
    // so the file can carry them too.
    let mut env = Environment::capture();
    let loaded = cli
        .env_file
        .as_deref()
        .map(|path| env.load_env_file(path))
        .transpose();
    let config = InjectorConfig::from_environment(&env);
    logging::init(cli.verbose || config.verbose);

    let result = match loaded {
        Ok(_) => run(cli, config, env).await,
        Err(err) => Err(err.into()),
    };
    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: InjectorConfig, mut env: Environment) -> anyhow::Result<()> {
    if config.is_enabled() {
        debug!("path={:?} prefix={:?}", config.path, config.prefix);
    } else {
        debug!("neither a parameter path nor a prefix is configured, nothing to inject");
    }

    let accessor = ServiceAccessor::new(config.assume_role_arn.clone());
    let orchestrator = Orchestrator::new(&accessor, &config);

    if cli.dry_run {
        let report = orchestrator
            .inject(&mut env)
            .await
            .context("injection failed")?;
        let output = DryRunReport {
            config: &config,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match orchestrator.run(&cli.command, &mut env).await? {}
}
