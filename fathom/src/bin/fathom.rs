//! Ambient CLI front-end over `Engine::orchestrate`. Not part of the public
//! programmatic surface; every consumer that wants the engine embedded
//! should depend on the `fathom` library directly.

use clap::{Parser, Subcommand};
use fathom::{EngineBuilder, ModuleId};

#[derive(Parser)]
#[command(name = "fathom", about = "Run the intelligence-enrichment engine against a domain")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich a single domain.
    Run {
        domain: String,
        /// Comma-separated module slugs (e.g. m01_company_context,m02_technology_stack).
        /// Defaults to all fifteen.
        #[arg(long)]
        modules: Option<String>,
        #[arg(long)]
        force_refresh: bool,
    },
    /// Enrich many domains concurrently.
    Batch {
        domains: Vec<String>,
        #[arg(long, default_value_t = 5)]
        max_concurrent: usize,
    },
}

fn parse_modules(raw: &str) -> Vec<ModuleId> {
    raw.split(',')
        .filter_map(|slug| ModuleId::from_slug(slug.trim()))
        .collect()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let engine = match EngineBuilder::new().build() {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("failed to build engine: {err}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Run {
            domain,
            modules,
            force_refresh,
        } => {
            let modules = modules.map(|m| parse_modules(&m));
            let result = engine.orchestrate(domain, modules, force_refresh, None).await;
            print_result(&result);
        }
        Command::Batch {
            domains,
            max_concurrent,
        } => {
            let options = fathom::BatchOptions {
                max_concurrent_domains: Some(max_concurrent),
                ..Default::default()
            };
            let results = engine.enrich_batch(domains, options, None).await;
            for (domain, result) in &results {
                println!("== {domain} ==");
                print_result(result);
            }
        }
    }
}

fn print_result(result: &fathom::EnrichmentResult) {
    println!(
        "job {} for {}: {:?} ({} completed, {} failed, {} skipped)",
        result.job_id,
        result.domain,
        result.status,
        result.completed_modules.len(),
        result.failed_modules.len(),
        result.skipped_modules.len(),
    );
    for error in &result.errors {
        println!("  error: {error}");
    }
}
