use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serving_cli::render::{render_job, render_jobs, render_models};
use serving_cli::{
    load_inputs, parse_resource_id, App, Cli, ClientConfig, Commands, ConfigOverrides, RunOutcome,
};
use serving_engine::{ReqwestApi, ServingApi};
use serving_logging::serving_info;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    serving_logging::initialize(cli.log_destination(), cli.log_level());

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    let mut overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        ..ConfigOverrides::default()
    };
    if let Commands::Run {
        model,
        poll_interval_ms,
        ..
    } = &cli.command
    {
        overrides.model_name = model.clone();
        overrides.poll_interval_ms = *poll_interval_ms;
    }
    config.apply(overrides);

    if let Commands::Config = cli.command {
        println!("{}", config.to_ron()?);
        return Ok(ExitCode::SUCCESS);
    }

    let api = ReqwestApi::new(config.settings())
        .with_context(|| format!("invalid base url {:?}", config.base_url))?;
    serving_info!("Using backend at {}", config.base_url);

    match cli.command {
        Commands::Run { inputs, .. } => {
            let inputs = load_inputs(&inputs).await?;
            let mut app = App::new(Arc::new(api), &config.model_name, config.poll_interval());
            let interrupt = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            let outcome = app.run(inputs, interrupt).await;
            report(&outcome);
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Commands::Models => {
            let models = api.list_models().await.context("failed to list models")?;
            print_lines(render_models(&models));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Model { id } => {
            let model = api
                .get_model(&parse_resource_id(&id))
                .await
                .with_context(|| format!("failed to fetch model {id}"))?;
            print_lines(render_models(std::slice::from_ref(&model)));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Jobs { skip, limit } => {
            let jobs = api
                .list_jobs(skip, limit)
                .await
                .context("failed to list jobs")?;
            print_lines(render_jobs(&jobs));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Job { id } => {
            let job = api
                .get_job(&parse_resource_id(&id))
                .await
                .with_context(|| format!("failed to fetch job {id}"))?;
            print_lines(render_job(&job));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Result { path } => {
            let text = api
                .get_result(&path)
                .await
                .with_context(|| format!("failed to fetch result {path}"))?;
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => Ok(ExitCode::SUCCESS),
    }
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed { result: Some(text), .. } => println!("{text}"),
        RunOutcome::Completed { job, result: None } => {
            eprintln!("job {} completed without a result", job.id)
        }
        RunOutcome::JobFailed(job) => {
            eprintln!("job {} failed", job.id);
            if let Some(log) = &job.failed_log {
                eprintln!("{log}");
            }
        }
        RunOutcome::Aborted(err) => eprintln!("error: {err}"),
        RunOutcome::NothingStaged => eprintln!("error: no non-empty inputs to upload"),
        RunOutcome::Interrupted => eprintln!("interrupted"),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
