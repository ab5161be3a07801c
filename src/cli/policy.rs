use std::sync::Arc;

use access_gate::AccessGate;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use intent_router::{MovementClass, RouterConfig, SqlTemplateBuilder};
use serde_json::{json, Value};
use supplychain_assistant::app_context::{load_policies, load_router};
use supplychain_core_types::{CandidateQuery, Intent, IntentRoute, Role};

use super::context::CliContext;
use super::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PolicyCommand {
    /// Print the active access tables
    Show,
    /// Run a query or question through the access chain without executing it
    Check(PolicyCheckArgs),
}

#[derive(Args, Clone, Debug)]
pub struct PolicyCheckArgs {
    #[arg(long)]
    pub role: String,

    #[arg(long)]
    pub region: String,

    /// Raw SQL to check
    #[arg(long, conflicts_with = "question", required_unless_present = "question")]
    pub sql: Option<String>,

    /// Question to classify and template before checking
    #[arg(long)]
    pub question: Option<String>,
}

pub async fn cmd_policy(args: PolicyArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let policies = Arc::new(load_policies(ctx.config())?);
    match args.command {
        PolicyCommand::Show => {
            let snapshot = policies.snapshot();
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*snapshot)?),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&*snapshot)?),
                OutputFormat::Human => {
                    println!("Policy rev {} ({:?})", snapshot.rev, snapshot.source);
                    println!("Roles:");
                    for (role, keywords) in snapshot.access.roles() {
                        let keywords: Vec<&str> = keywords.iter().map(String::as_str).collect();
                        println!("  {:<20} {}", role.as_str(), keywords.join(", "));
                    }
                    println!("Geo restrictions:");
                    for (phrase, region) in snapshot.geo.restrictions() {
                        println!("  {phrase:<20} -> {region}");
                    }
                }
            }
        }
        PolicyCommand::Check(check) => {
            let gate = AccessGate::new(policies);
            let router = load_router(ctx.config())?;
            let verdicts = verdicts(&gate, &check, candidates(&router, &check)?);
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verdicts)?),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&verdicts)?),
                OutputFormat::Human => {
                    for verdict in &verdicts {
                        let status = if verdict["allowed"] == json!(true) {
                            "ALLOW".to_string()
                        } else {
                            format!("DENY ({})", verdict["reason"].as_str().unwrap_or_default())
                        };
                        println!("[{}] {status}", verdict["label"].as_str().unwrap_or_default());
                        println!("  {}", verdict["sql"].as_str().unwrap_or_default());
                    }
                }
            }
        }
    }
    Ok(())
}

fn verdicts(
    gate: &AccessGate,
    check: &PolicyCheckArgs,
    candidates: Vec<(String, CandidateQuery)>,
) -> Vec<Value> {
    let role = Role::parse(&check.role);
    candidates
        .into_iter()
        .map(|(label, candidate)| {
            let sql = candidate.sql().to_string();
            match gate.enforce(candidate, role, &check.region) {
                Ok(_) => json!({ "label": label, "sql": sql, "allowed": true }),
                Err(denied) => json!({
                    "label": label,
                    "sql": sql,
                    "allowed": false,
                    "reason": denied.to_string(),
                }),
            }
        })
        .collect()
}

/// Labeled candidate queries for a check. Movement questions expand to both
/// thresholds since the definition lookup is skipped here.
fn candidates(
    router: &RouterConfig,
    check: &PolicyCheckArgs,
) -> Result<Vec<(String, CandidateQuery)>> {
    if let Some(sql) = &check.sql {
        return Ok(vec![("sql".into(), CandidateQuery::new(sql.clone(), Intent::Unclassified))]);
    }
    let Some(question) = &check.question else {
        bail!("either --sql or --question is required");
    };
    let builder = SqlTemplateBuilder::new();
    let intent = router.classifier.classify(question);
    match intent.route() {
        IntentRoute::Structured => match builder.build(intent, question) {
            Some(candidate) => Ok(vec![(intent.to_string(), candidate)]),
            None => bail!("intent {intent} produced no query template"),
        },
        IntentRoute::Hybrid => Ok([MovementClass::NoMover, MovementClass::SlowMoving]
            .into_iter()
            .map(|class| (class.as_str().to_string(), builder.movement(class)))
            .collect()),
        IntentRoute::Document => {
            bail!("question classified as {intent}; it is answered from documents, not SQL")
        }
    }
}
