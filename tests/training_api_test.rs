// ==========================================
// TrainingApi 集成测试
// ==========================================
// 测试范围: 项目生命周期、审计查询/导出、招生统计
// ==========================================

mod helpers;

use helpers::test_data_builder::{roster, ProgramBuilder};
use std::io::Write;
use tempfile::NamedTempFile;
use training_ledger::api::ApiError;
use training_ledger::app::AppState;
use training_ledger::domain::types::ProgramStatus;
use training_ledger::domain::TrainingUpdate;
use training_ledger::engine::{EnrollmentQuery, SortState, TrainingField, TrainingFilter};

use crate::test_helpers::create_test_db;

async fn setup_state() -> (NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).await.unwrap();
    (temp_file, state)
}

#[tokio::test]
async fn test_create_training_defaults_and_validation() {
    let (_tmp, state) = setup_state().await;
    let api = &state.training_api;

    let program = api
        .create_training(ProgramBuilder::new("  DSA Bootcamp ").build(), roster(&["R1", "R2"]))
        .await
        .unwrap();
    assert_eq!(program.training_name, "DSA Bootcamp");
    assert_eq!(program.end_year, program.start_year + 1);
    assert!(program.students.iter().all(|s| s.attendance_history().is_empty()));

    let err = api
        .create_training(ProgramBuilder::new("DSA Bootcamp").build(), roster(&["R1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::DuplicateName(_)));

    let err = api
        .create_training(ProgramBuilder::new("   ").build(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api
        .create_training(ProgramBuilder::new("No Coordinator").coordinators(&[" "]).build(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_update_training_touches_only_given_fields() {
    let (_tmp, state) = setup_state().await;
    let api = &state.training_api;
    let program = api
        .create_training(ProgramBuilder::new("Rust 101").build(), roster(&["A", "B"]))
        .await
        .unwrap();

    let update = TrainingUpdate {
        venue: Some("Lab 2".to_string()),
        status: Some(ProgramStatus::Completed),
        ..TrainingUpdate::default()
    };
    let updated = api.update_training(&program.training_id, update).await.unwrap();

    assert_eq!(updated.venue, "Lab 2");
    assert_eq!(updated.status, ProgramStatus::Completed);
    assert_eq!(updated.trainer_name, program.trainer_name);
    assert_eq!(updated.students, program.students);
    assert_eq!(updated.coordinators, program.coordinators);

    let err = api
        .update_training(&program.training_id, TrainingUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api
        .update_training(
            &program.training_id,
            TrainingUpdate {
                end_year: Some(program.start_year - 1),
                ..TrainingUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_delete_training_and_not_found() {
    let (_tmp, state) = setup_state().await;
    let api = &state.training_api;
    let program = api
        .create_training(ProgramBuilder::new("Temp").build(), roster(&["A"]))
        .await
        .unwrap();

    api.delete_training(&program.training_id).await.unwrap();
    assert!(matches!(
        api.get_training(&program.training_id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.delete_training(&program.training_id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_listing_by_coordinator_end_year_and_status() {
    let (_tmp, state) = setup_state().await;
    let api = &state.training_api;

    let p1 = api
        .create_training(ProgramBuilder::new("P1").coordinators(&["A", "B"]).build(), roster(&["x"]))
        .await
        .unwrap();
    let p2 = api
        .create_training(
            ProgramBuilder::new("P2")
                .coordinators(&["C"])
                .start_year(2022)
                .status(ProgramStatus::Completed)
                .build(),
            roster(&["y"]),
        )
        .await
        .unwrap();
    api.create_training(ProgramBuilder::new("P3").coordinators(&["B"]).build(), roster(&["z"]))
        .await
        .unwrap();

    let by_b: Vec<String> = api
        .list_by_coordinator("B")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.training_name)
        .collect();
    assert_eq!(by_b, vec!["P1", "P3"]);

    let by_year = api.list_by_end_year(2023).await.unwrap();
    assert_eq!(by_year.len(), 1);
    assert_eq!(by_year[0].training_id, p2.training_id);

    assert_eq!(api.list_ongoing().await.unwrap().len(), 2);

    let batch = api
        .get_trainings(&[p2.training_id.clone(), p1.training_id.clone()])
        .await
        .unwrap();
    assert_eq!(batch[0].training_name, "P2");
    assert_eq!(batch[1].training_name, "P1");

    assert!(matches!(
        api.get_trainings(&[p1.training_id.clone(), "missing".to_string()]).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_audit_query_coordinator_or_and_export() {
    let (_tmp, state) = setup_state().await;
    let api = &state.training_api;
    for (name, coordinators, total) in [("P1", vec!["A", "B"], 30), ("P2", vec!["C"], 10), ("P3", vec!["B"], 20)] {
        api.create_training(
            ProgramBuilder::new(name)
                .coordinators(&coordinators)
                .total_students(total)
                .build(),
            roster(&["r"]),
        )
        .await
        .unwrap();
    }

    let filter = TrainingFilter::new().with_coordinators("A,C");
    let sort = SortState::ascending(TrainingField::TotalStudents);
    let names: Vec<String> = api
        .audit_query(&filter, &sort)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.training_name)
        .collect();
    assert_eq!(names, vec!["P2", "P1"]);

    let artifact = api.export_audit(&filter, &sort).await.unwrap();
    assert_eq!(artifact.file_name, "trainings.csv");
    let text = String::from_utf8(artifact.content).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Training Name,Start Year,End Year"));
    assert!(lines.next().unwrap().starts_with("P2,2024,2025"));

    let document = api.export_audit_document(&TrainingFilter::new(), &SortState::none()).await.unwrap();
    let text = String::from_utf8(document.content).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert_eq!(document.sheet_name, "Trainings");
}

#[tokio::test]
async fn test_enrollment_chart() {
    let (_tmp, state) = setup_state().await;
    let api = &state.training_api;
    for (name, year, total) in [("DSA", 2022, 40), ("DSA-2", 2023, 35), ("Web", 2022, 20)] {
        api.create_training(
            ProgramBuilder::new(name).start_year(year).total_students(total).build(),
            roster(&["r"]),
        )
        .await
        .unwrap();
    }

    let chart = api.enrollment_chart(&EnrollmentQuery::default()).await.unwrap();
    assert_eq!(chart.years, vec![2022, 2023]);
    assert_eq!(chart.series[0].training_name, "DSA");
    assert_eq!(chart.series[0].totals, vec![40, 0]);
    assert_eq!(chart.series[2].totals, vec![20, 0]);

    let bad = EnrollmentQuery {
        from_year: Some(2024),
        to_year: Some(2022),
        training_name: None,
    };
    assert!(matches!(api.enrollment_chart(&bad).await, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_create_training_from_roster_file() {
    let (_tmp, state) = setup_state().await;

    let mut roster_file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(roster_file, "Roll No,Student Name,Parent Mobile No,Attendance,Section").unwrap();
    writeln!(roster_file, "R1,Alice,9001,75,A").unwrap();
    writeln!(roster_file, "R2,Bob,9002,20,B").unwrap();
    roster_file.flush().unwrap();

    let program = state
        .training_api
        .create_training_from_file(ProgramBuilder::new("Imported").build(), roster_file.path())
        .await
        .unwrap();

    assert_eq!(program.students.len(), 2);
    assert_eq!(program.students[0].parent_mobile_no, "9001");
    assert_eq!(program.students[1].attendance_percentage(), 0.0);
    assert_eq!(
        program.students[1].extra_fields.get("Section").map(String::as_str),
        Some("B")
    );

    let mut bad_file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(bad_file, "Roll No,Student Name").unwrap();
    writeln!(bad_file, "R1,Alice").unwrap();
    writeln!(bad_file, "R1,Alice Again").unwrap();
    bad_file.flush().unwrap();

    let err = state
        .training_api
        .create_training_from_file(ProgramBuilder::new("Broken").build(), bad_file.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
    assert_eq!(state.training_api.list_trainings().await.unwrap().len(), 1);
}
