//! Statement Tamper-Risk Scorer - CLI Interface
//! Author: kartik4091
//! Created: 2025-06-06
//!
//! Scores one document's forensic diagnostic folder and prints the final
//! report as JSON.

use std::{path::PathBuf, process, sync::Arc, time::Instant};

use clap::{builder::PossibleValuesParser, value_parser, Arg, ArgGroup, ArgMatches, Command};
use docforensics::{
    classifier::{Classifier, LogisticClassifier},
    config::ScoringConfig,
    error::Result,
    pipeline::{AnalysisRequest, Pipeline, ScoringOutcome},
    types::DocumentId,
    utils::{init_logging, LogLevel},
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches
        .get_one::<String>("verbose")
        .and_then(|v| LogLevel::parse(v))
        .unwrap_or_default();
    if let Err(e) = init_logging(log_level) {
        eprintln!("{}", e);
    }

    info!("🚀 Statement Tamper-Risk Scorer v{} - Starting...", env!("CARGO_PKG_VERSION"));

    let start_time = Instant::now();
    match run(&matches).await {
        Ok(outcome) => match outcome.report.to_json() {
            Ok(json) => {
                println!("{}", json);
                display_completion_summary(&outcome, start_time.elapsed());
            }
            Err(e) => {
                error!("❌ Failed to render report: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("❌ Scoring failed: {}", e);
            process::exit(1);
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<ScoringOutcome> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };

    let classifier: Arc<dyn Classifier> = match matches.get_one::<PathBuf>("model") {
        Some(path) => Arc::new(LogisticClassifier::load(path)?),
        None => Arc::new(LogisticClassifier::default()),
    };

    let request = build_request(matches)?;
    let forensics_root = matches
        .get_one::<PathBuf>("forensics-root")
        .cloned()
        .unwrap_or_default();
    let reports_dir = matches
        .get_one::<PathBuf>("reports")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("reports"));

    info!("📋 Record {} / document {}", request.record_id, request.document_id);
    Pipeline::new(config, forensics_root, classifier)
        .with_report_dir(reports_dir)
        .execute(&request)
        .await
}

fn build_request(matches: &ArgMatches) -> Result<AnalysisRequest> {
    let record_id = matches.get_one::<u64>("record-id").copied().unwrap_or_default();
    let pdf = matches.get_one::<PathBuf>("pdf").cloned();

    match (matches.get_one::<String>("document"), pdf) {
        (Some(document), Some(pdf)) => {
            Ok(AnalysisRequest::new(record_id, DocumentId::new(document.as_str())).with_pdf(pdf))
        }
        (Some(document), None) => Ok(AnalysisRequest::new(record_id, DocumentId::new(document.as_str()))),
        (None, Some(pdf)) => AnalysisRequest::for_pdf(record_id, pdf),
        (None, None) => Err(docforensics::Error::InvalidConfiguration(
            "either --document or --pdf is required".into(),
        )),
    }
}

fn build_cli() -> Command {
    Command::new("docforensics")
        .version(env!("CARGO_PKG_VERSION"))
        .author("kartik4091")
        .about("Tamper-risk scoring for bank statements from forensic diagnostic images")
        .long_about("Reads the ELA, compression, noise and font-alignment diagnostic images of one \
                    document, scores every page, fuses the signals with PDF metadata and an \
                    optional classifier, and writes a JSON risk report.")

        // Inputs
        .arg(Arg::new("forensics-root")
            .short('f')
            .long("forensics-root")
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .help("Directory holding one diagnostic folder per document")
            .required(true))

        .arg(Arg::new("record-id")
            .short('r')
            .long("record-id")
            .value_name("N")
            .value_parser(value_parser!(u64))
            .help("Record id used to name the report")
            .required(true))

        .arg(Arg::new("document")
            .short('d')
            .long("document")
            .value_name("ID")
            .help("Document id (diagnostic folder name)"))

        .arg(Arg::new("pdf")
            .short('p')
            .long("pdf")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Source PDF, used for metadata scoring and the default document id"))

        .group(ArgGroup::new("source")
            .args(["document", "pdf"])
            .multiple(true)
            .required(true))

        // Outputs and configuration
        .arg(Arg::new("reports")
            .short('o')
            .long("reports")
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .help("Report output directory [default: reports]"))

        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Scoring configuration file (JSON/YAML)"))

        .arg(Arg::new("model")
            .short('m')
            .long("model")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Logistic classifier model (JSON weights and bias)"))

        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_name("LEVEL")
            .value_parser(PossibleValuesParser::new(["error", "warn", "info", "debug", "trace"]))
            .default_value("info")
            .help("Log verbosity"))
}

fn display_completion_summary(outcome: &ScoringOutcome, duration: std::time::Duration) {
    info!("📊 Scoring Summary:");
    info!("   Total Time: {:.2?}", duration);
    for run in &outcome.signals {
        info!(
            "   {:<12} {:.3} ({} pages)",
            run.summary.signal.to_string(),
            run.summary.score,
            run.pages.len()
        );
    }
    info!("   Metadata     {:.3} ({:?})", outcome.metadata.score, outcome.metadata.class);
    info!("   Forensic risk {:.3}", outcome.forensic_risk);
    info!(
        "   Final: {} ({:.2})",
        outcome.report.final_result.risk_category, outcome.report.final_result.final_score
    );
    if let Some(path) = &outcome.report_path {
        info!("   Report: {}", path.display());
    }
}
