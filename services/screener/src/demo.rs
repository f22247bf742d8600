use std::sync::Arc;

use clap::Args;
use cv_screening::config::AppConfig;
use cv_screening::error::AppError;
use cv_screening::workflows::screening::{
    ApplicationRecord, CandidateProfile, DocumentUpload, JobId, JobPosting, JobRequirements,
    JobStatus, ScreeningService,
};

use crate::infra::{InMemoryApplicationRepository, InMemoryJobCatalog};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the public submission and status page portion of the demo.
    #[arg(long)]
    pub(crate) skip_candidate: bool,
}

const DEMO_CVS: [(&str, &str); 3] = [
    (
        "jeanne-martin.txt",
        "Jeanne Martin, data engineer. 6 ans d'expérience en Python, SQL et Spark. Master en informatique. Basée à Paris.",
    ),
    (
        "karim-benali.txt",
        "Karim Benali. Développeur Python, 2 years of experience. Licence. Lyon.",
    ),
    ("scan-illisible.pdf", "%PDF-1.4 not really a pdf"),
];

pub(crate) async fn run_demo(config: &AppConfig, args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let jobs = Arc::new(InMemoryJobCatalog::default());
    let job = demo_posting();
    jobs.publish(job.clone());

    let service = ScreeningService::new(repository, jobs.clone())
        .with_extraction_limits(config.extraction.limits())
        .with_token_issuer(config.tokens.issuer());

    println!("CV screening demo");
    println!(
        "Job {} - {} (skills: {}, min {} ans)",
        job.id.0,
        job.title,
        job.requirements.skills.join(", "),
        job.requirements.min_experience_years
    );

    println!("\nRecruiter bulk upload");
    let uploads = DEMO_CVS
        .iter()
        .map(|(name, body)| DocumentUpload::new(*name, body.as_bytes().to_vec()))
        .collect::<Vec<_>>();
    let records = service.upload_batch_with_deadline(&job.id, uploads).await?;
    for record in &records {
        render_record(record);
    }

    if let Some(weakest) = records.iter().min_by_key(|record| record.analysis.score) {
        let rejected = service.reject(&weakest.id, None)?;
        println!(
            "- Rejected {} ({}): {}",
            rejected.id.0, rejected.cv_file, rejected.feedback_suggestions
        );
    }

    if args.skip_candidate {
        return Ok(());
    }

    println!("\nPublic submission");
    let candidate = CandidateProfile {
        name: "Camille Dupont".to_string(),
        email: "camille.dupont@example.org".to_string(),
        location: "Paris".to_string(),
        ..CandidateProfile::default()
    };
    let upload = DocumentUpload::new(
        "camille-dupont.txt",
        "Camille Dupont. 4 years with SQL and dbt. Master. Paris."
            .as_bytes()
            .to_vec(),
    );
    let record = service
        .submit_candidate_with_deadline(&job.id, candidate, upload)
        .await?;
    render_record(&record);
    println!("  Candidate message:");
    for line in record.feedback_suggestions.lines() {
        println!("    {line}");
    }

    let Some(token) = record.status_token.as_ref() else {
        println!("  No status token issued");
        return Ok(());
    };
    let shortlisted = service.toggle_shortlist(&record.id)?;
    println!("- Shortlist toggled -> {}", shortlisted.status.label());

    let view = service.status_by_token(token.as_str())?;
    println!("  Public status payload:\n{}", serde_json::to_string_pretty(&view)?);

    println!("\nRequirements updated: Python dropped from the skill list");
    let mut updated = job.clone();
    updated.requirements.skills.retain(|skill| skill != "Python");
    jobs.publish(updated);
    let analysis = service.reanalyze(&record.id)?;
    println!(
        "- Reanalyzed {}: score {} -> {} ({})",
        record.id.0,
        record.analysis.score,
        analysis.score,
        analysis.category.label()
    );

    Ok(())
}

fn demo_posting() -> JobPosting {
    JobPosting {
        id: JobId("job-data-engineer".to_string()),
        title: "Data Engineer".to_string(),
        description: "Construire et maintenir les pipelines de données.".to_string(),
        requirements: JobRequirements {
            skills: vec!["Python".to_string(), "SQL".to_string(), "Spark".to_string()],
            min_experience_years: 3,
            education_levels: vec!["master".to_string(), "ingénieur".to_string()],
            location: "Paris".to_string(),
        },
        status: JobStatus::Open,
    }
}

fn render_record(record: &ApplicationRecord) {
    let analysis = &record.analysis;
    println!(
        "- {} {} -> {} ({}) score {} | {} ans",
        record.id.0,
        record.cv_file,
        record.status.label(),
        analysis.category.label(),
        analysis.score,
        analysis.exp_years
    );
    for strength in &analysis.strengths {
        println!("    + {strength}");
    }
    for gap in &analysis.gaps {
        println!("    - {gap}");
    }
}
