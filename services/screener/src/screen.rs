use std::path::PathBuf;

use clap::Args;
use cv_screening::config::AppConfig;
use cv_screening::error::AppError;
use cv_screening::workflows::screening::{
    AnalysisEngine, AnalysisResult, DocumentFormat, JobRequirements, TextExtractor,
};
use serde::Serialize;
use tracing::info;

use crate::infra::{load_requirements, parse_format};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// JSON file holding the job requirements
    #[arg(long)]
    pub(crate) job: PathBuf,
    /// Override the format otherwise resolved from the file extension
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<DocumentFormat>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
    /// CV document (pdf, docx or plain text)
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// JSON file holding the job requirements
    #[arg(long)]
    pub(crate) job: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
    /// CV documents, analyzed in parallel and reported in this order
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentReport {
    pub(crate) file: String,
    pub(crate) format: DocumentFormat,
    pub(crate) extracted_chars: usize,
    pub(crate) analysis: AnalysisResult,
}

pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> Result<(), AppError> {
    let job = load_requirements(&args.job)?;
    let mut reports = screen_files(config, &job, vec![args.file], args.format).await;
    let report = reports.pop();
    print_json(&report, args.pretty)
}

pub(crate) async fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<(), AppError> {
    let job = load_requirements(&args.job)?;
    let reports = screen_files(config, &job, args.files, None).await;
    print_json(&reports, args.pretty)
}

pub(crate) async fn screen_files(
    config: &AppConfig,
    job: &JobRequirements,
    files: Vec<PathBuf>,
    format: Option<DocumentFormat>,
) -> Vec<DocumentReport> {
    let extractor = TextExtractor::new(config.extraction.limits());

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        documents.push(
            extractor
                .extract_path_with_deadline(path.clone(), format)
                .await,
        );
    }

    let texts: Vec<&str> = documents.iter().map(|doc| doc.text.as_str()).collect();
    let analyses = AnalysisEngine::default().analyze_batch(&texts, job);
    info!(documents = analyses.len(), "documents screened");

    files
        .iter()
        .zip(&documents)
        .zip(analyses)
        .map(|((path, document), analysis)| DocumentReport {
            file: path.display().to_string(),
            format: document.format,
            extracted_chars: document.text.chars().count(),
            analysis,
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
