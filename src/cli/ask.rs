use std::time::Instant;

use anyhow::Result;
use clap::Args;
use supplychain_assistant::metrics;
use supplychain_core_types::{QueryRequest, ResponseEnvelope};

use super::context::CliContext;
use super::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct AskArgs {
    /// Question text
    pub question: String,

    /// Caller role (finance, planning, operations manager)
    #[arg(long)]
    pub role: String,

    /// Caller region, compared exactly against geo restrictions
    #[arg(long)]
    pub region: String,
}

pub async fn cmd_ask(args: AskArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let app_context = ctx.app_context().await?;
    let request = QueryRequest::new(args.question, &args.role, args.region);
    let started = Instant::now();
    let report = app_context.dispatcher().dispatch(&request).await;
    metrics::observe_dispatch(
        report.envelope.kind(),
        report.intent.route().as_str(),
        started.elapsed(),
    );

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.envelope)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report.envelope)?),
        OutputFormat::Human => {
            println!("Dispatch: {}", report.dispatch_id);
            println!("Intent:   {}", report.intent);
            println!("Outcome:  {}", report.envelope.kind());
            println!();
            print_envelope(&report.envelope)?;
        }
    }
    Ok(())
}

fn print_envelope(envelope: &ResponseEnvelope) -> Result<()> {
    match envelope {
        ResponseEnvelope::Data { data } => {
            println!("{} row(s)", data.len());
            for row in data {
                println!("{}", serde_json::to_string(row)?);
            }
        }
        ResponseEnvelope::Doc { answer } => println!("{answer}"),
        ResponseEnvelope::Hybrid { definition, data } => {
            println!("Definition:\n{definition}\n");
            println!("{} row(s)", data.len());
            for row in data {
                println!("{}", serde_json::to_string(row)?);
            }
        }
        ResponseEnvelope::Error { message } => println!("Error: {message}"),
    }
    Ok(())
}
