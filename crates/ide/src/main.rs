use anyhow::{Context as _, Result, anyhow};
use buffers::{BufferSet, default_project, from_project_json, to_project_json};
use compositor::compose_buffers;
use env_logger::{Builder, Env};
use ide::IdeConfig;
use log::{error, info};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::fs;
use tokio::runtime::Runtime;

const USAGE: &str = "usage: ide new <project.json> | compose <project.json> [out.html] | buffers <project.json>";

enum Command {
    New(PathBuf),
    Compose(PathBuf, PathBuf),
    Buffers(PathBuf),
}

fn parse_args(config: &IdeConfig) -> Result<Command> {
    let mut args = env::args().skip(1);
    let command = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let project = args
        .next()
        .map_or_else(|| config.project_file.clone(), PathBuf::from);
    match command.as_str() {
        "new" => Ok(Command::New(project)),
        "compose" => {
            let out = args
                .next()
                .map_or_else(|| config.export_file.clone(), PathBuf::from);
            Ok(Command::Compose(project, out))
        }
        "buffers" => Ok(Command::Buffers(project)),
        other => Err(anyhow!("Unknown command {other}\n{USAGE}")),
    }
}

async fn read_project(path: &Path) -> Result<BufferSet> {
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read project {}", path.display()))?;
    from_project_json(&text)
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::New(path) => {
            fs::write(&path, to_project_json(&default_project())?)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote starter project to {}", path.display());
        }
        Command::Compose(project, out) => {
            let document = compose_buffers(&read_project(&project).await?);
            fs::write(&out, document.as_str())
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Composed {} into {}", project.display(), out.display());
        }
        Command::Buffers(project) => {
            for buffer in &read_project(&project).await? {
                info!("{} ({})", buffer.name(), buffer.syntax_mode());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().filter_or("RUST_LOG", "info")).init();

    let config = IdeConfig::from_env();
    let outcome = parse_args(&config).and_then(|command| Runtime::new()?.block_on(run(command)));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
