use clap::Args;
use risk_profiler::error::AppError;
use risk_profiler::workflows::assessment::{
    question_catalogue, AnswerSet, AssessmentResult, RiskAssessmentEngine, SchemaVersion,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding the answers, either bare or under an `answers` key
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Questionnaire edition (v1-12q or v2-25q)
    #[arg(long, default_value_t = SchemaVersion::V1)]
    pub(crate) schema: SchemaVersion,
    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct QuestionsArgs {
    /// Questionnaire edition (v1-12q or v2-25q)
    #[arg(long, default_value_t = SchemaVersion::V1)]
    pub(crate) schema: SchemaVersion,
}

/// Accepts either a saved request body or the answer map on its own.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerFile {
    Request { answers: AnswerSet },
    Bare(AnswerSet),
}

pub(crate) fn load_answers(path: &Path) -> Result<AnswerSet, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_answers(&raw)
}

fn parse_answers(raw: &str) -> Result<AnswerSet, AppError> {
    let file: AnswerFile = serde_json::from_str(raw)?;
    Ok(match file {
        AnswerFile::Request { answers } => answers,
        AnswerFile::Bare(answers) => answers,
    })
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let answers = load_answers(&args.answers)?;
    let result = RiskAssessmentEngine::new(args.schema).calculate(&answers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_summary(&result));
    }
    Ok(())
}

fn render_summary(result: &AssessmentResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Risk assessment ({})\n", result.schema));
    out.push_str(&format!("  Risk capacity:  {:.2}\n", result.risk_capacity));
    out.push_str(&format!("  Risk behaviour: {:.2}\n", result.risk_behaviour));
    if let Some(score) = result.financial_info_score {
        out.push_str(&format!("  Financial info: {score:.2}\n"));
    }
    if let Some(score) = result.investment_experience_score {
        out.push_str(&format!("  Experience:     {score:.2}\n"));
    }
    out.push_str(&format!("  Final score:    {:.2}\n", result.final_score));
    out.push_str(&format!("  Risk bucket:    {}\n", result.risk_bucket));
    out.push_str(&format!(
        "  Allocation:     equity {} / debt {} / alternatives {}\n",
        result.allocation.equity, result.allocation.debt, result.allocation.alternatives
    ));

    if result.overrides.is_empty() {
        out.push_str("  Overrides:      none\n");
    } else {
        out.push_str("  Overrides:\n");
        for message in &result.overrides {
            out.push_str(&format!("    - {message}\n"));
        }
    }

    if !result.unscored_questions.is_empty() {
        let keys: Vec<&str> = result
            .unscored_questions
            .iter()
            .map(|question| question.key())
            .collect();
        out.push_str(&format!("  Scored as 0:    {}\n", keys.join(", ")));
    }
    out
}

pub(crate) fn run_questions(args: QuestionsArgs) -> Result<(), AppError> {
    println!("Questionnaire {}", args.schema);
    for (index, question) in question_catalogue(args.schema).iter().enumerate() {
        let marker = if question.multi_select { " (multi-select)" } else { "" };
        println!(
            "\n{:>2}. [{}] {}{}",
            index + 1,
            question.section.label(),
            question.prompt,
            marker
        );
        println!("    key: {}", question.key);
        for option in &question.options {
            println!("      {:<22} {}", option.key, option.score);
        }
    }
    Ok(())
}
