// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use pharmflow::model::Model;
use pharmflow::observability::init_tracing;
use pharmflow::results::read_results;
use pharmflow::tools::{fit, register_estimation_tool, retrieve_models, CommandEstimationTool, ModelSource, ToolCall};

const COMMAND_TOOL: &str = "command";

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} fit <estimator> <model.json> [model.json ...]");
    eprintln!("       {program} models <run_dir>");
    eprintln!("       {program} results <run_dir|results.json>");
    eprintln!("Example: {program} fit ./run_nonmem.sh run1.json run2.json");
    eprintln!("Set PHARMFLOW_CONFIG to a YAML file to choose the dispatcher and run directory.");
    std::process::exit(1);
}

fn read_model(path: &Path) -> anyhow::Result<Model> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing model {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pharmflow");
    let Some(command) = args.get(1) else { usage(program) };

    match command.as_str() {
        "fit" if args.len() >= 4 => {
            register_estimation_tool(Arc::new(CommandEstimationTool::new(COMMAND_TOOL, &args[2])));
            let models = args[3..]
                .iter()
                .map(|p| read_model(Path::new(p)))
                .collect::<anyhow::Result<Vec<_>>>()?;

            for model in fit(models, Some(COMMAND_TOOL), ToolCall::new()).await? {
                match model.modelfit_results().and_then(|r| r.ofv) {
                    Some(ofv) => println!("{:<24} OFV {ofv:.4}", model.name()),
                    None => println!("{:<24} no OFV", model.name()),
                }
            }
        }
        "models" if args.len() == 3 => {
            for model in retrieve_models(ModelSource::Path(Path::new(&args[2])), None)? {
                let fitted = if model.modelfit_results().is_some() { "fitted" } else { "" };
                println!("{:<24} {fitted}", model.name());
            }
        }
        "results" if args.len() == 3 => {
            let results = read_results(&args[2])?;
            println!("{}", results.to_json()?);
        }
        _ => usage(program),
    }
    Ok(())
}
