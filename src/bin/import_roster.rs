// Small dev utility: create a training program from a roster file (CSV / XLSX).
//
// Usage:
//   cargo run --bin import_roster -- <roster_file> <training_name> <coordinator> [start_year] [db_path]
//
// The program gets default metadata; edit it later through the API.

use anyhow::{anyhow, Context};
use chrono::Datelike;
use std::path::PathBuf;
use training_ledger::app::{get_default_db_path, AppState};
use training_ledger::domain::types::{DeliveryMode, ProgramStatus};
use training_ledger::domain::NewTrainingProgram;
use training_ledger::importer::RosterImporter;
use training_ledger::logging;

const USAGE: &str = "usage: import_roster <roster_file> <training_name> <coordinator> [start_year] [db_path]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let roster_file = PathBuf::from(args.next().context(USAGE)?);
    let training_name = args.next().context(USAGE)?;
    let coordinator = args.next().context(USAGE)?;
    let start_year = match args.next() {
        Some(y) => y
            .trim()
            .parse::<i32>()
            .with_context(|| format!("start_year 不是合法年份: {}", y))?,
        None => chrono::Local::now().year(),
    };
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    let roster = RosterImporter::new()
        .import_file(&roster_file)
        .with_context(|| format!("花名册导入失败: {}", roster_file.display()))?;
    let state = AppState::new(db_path).await.map_err(|e| anyhow!(e))?;
    let request = NewTrainingProgram {
        training_name,
        start_year,
        end_year: None,
        student_year: 1,
        semester: 1,
        total_students: i32::try_from(roster.len())?,
        venue: String::new(),
        no_of_hours: None,
        duration: None,
        mode: DeliveryMode::Offline,
        status: ProgramStatus::Ongoing,
        trainer_name: String::new(),
        designation: String::new(),
        company: String::new(),
        coordinators: vec![coordinator],
    };

    let program = state
        .training_api
        .create_training(request, roster)
        .await?;

    println!("training_id={}", program.training_id);
    println!("students={}", program.students.len());
    Ok(())
}
