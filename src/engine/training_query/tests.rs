use super::*;
use crate::domain::types::DeliveryMode;
use chrono::Utc;

fn program(id: &str, name: &str, start_year: i32, coordinators: &[&str]) -> TrainingProgram {
    TrainingProgram {
        training_id: id.to_string(),
        training_name: name.to_string(),
        start_year,
        end_year: start_year + 1,
        student_year: 2,
        semester: 1,
        total_students: 60,
        venue: "Main Hall".to_string(),
        no_of_hours: None,
        duration: None,
        mode: DeliveryMode::Offline,
        status: ProgramStatus::Ongoing,
        trainer_name: "Trainer".to_string(),
        designation: "Lead".to_string(),
        company: "Acme".to_string(),
        coordinators: coordinators.iter().map(|c| c.to_string()).collect(),
        students: Vec::new(),
        revision: 0,
        created_at: Utc::now().naive_utc(),
    }
}

fn ids(programs: &[TrainingProgram]) -> Vec<&str> {
    programs.iter().map(|p| p.training_id.as_str()).collect()
}

/// 10 条记录，start_year 两两相同（测试稳定性）
fn fixture() -> Vec<TrainingProgram> {
    let years = [2022, 2021, 2023, 2021, 2022, 2020, 2023, 2020, 2024, 2024];
    years
        .iter()
        .enumerate()
        .map(|(i, y)| program(&format!("p{}", i), &format!("Program {}", i), *y, &["F1"]))
        .collect()
}

#[test]
fn test_sort_cycle() {
    let s = SortState::none().select(TrainingField::Venue);
    assert_eq!(s.active(), Some((TrainingField::Venue, SortDirection::Ascending)));

    let s = s.select(TrainingField::Venue);
    assert_eq!(s.active(), Some((TrainingField::Venue, SortDirection::Descending)));

    let s = s.select(TrainingField::Venue);
    assert_eq!(s.active(), None);

    let s = s.select(TrainingField::Venue);
    assert_eq!(s.active(), Some((TrainingField::Venue, SortDirection::Ascending)));

    // 换列重置为升序
    let s = SortState::descending(TrainingField::Venue).select(TrainingField::Company);
    assert_eq!(s.active(), Some((TrainingField::Company, SortDirection::Ascending)));
}

#[test]
fn test_ascending_sort_is_stable() {
    let engine = TrainingQueryEngine::new();
    let sorted = engine.query(
        &fixture(),
        &TrainingFilter::new(),
        &SortState::ascending(TrainingField::StartYear),
    );
    assert_eq!(
        ids(&sorted),
        vec!["p5", "p7", "p1", "p3", "p0", "p4", "p2", "p6", "p8", "p9"]
    );
}

#[test]
fn test_descending_keeps_ties_in_input_order() {
    let engine = TrainingQueryEngine::new();
    let sorted = engine.query(
        &fixture(),
        &TrainingFilter::new(),
        &SortState::descending(TrainingField::StartYear),
    );
    assert_eq!(
        ids(&sorted),
        vec!["p8", "p9", "p2", "p6", "p0", "p4", "p1", "p3", "p5", "p7"]
    );
}

#[test]
fn test_descending_is_exact_reverse_for_distinct_keys() {
    let engine = TrainingQueryEngine::new();
    let programs: Vec<TrainingProgram> = (0..10)
        .map(|i| program(&format!("p{}", i), &format!("N{}", (i * 7) % 10), 2020, &["F1"]))
        .collect();

    let asc = engine.query(&programs, &TrainingFilter::new(), &SortState::ascending(TrainingField::TrainingName));
    let mut desc = engine.query(&programs, &TrainingFilter::new(), &SortState::descending(TrainingField::TrainingName));
    desc.reverse();
    assert_eq!(ids(&asc), ids(&desc));

    // 无排序时保持输入顺序
    let none = engine.query(&programs, &TrainingFilter::new(), &SortState::none());
    assert_eq!(ids(&none), ids(&programs));
}

#[test]
fn test_sort_is_idempotent() {
    let engine = TrainingQueryEngine::new();
    let sort = SortState::ascending(TrainingField::StartYear);
    let once = engine.query(&fixture(), &TrainingFilter::new(), &sort);
    let twice = engine.query(&once, &TrainingFilter::new(), &sort);
    assert_eq!(ids(&once), ids(&twice));
}

#[test]
fn test_missing_values_sort_first() {
    let engine = TrainingQueryEngine::new();
    let mut a = program("a", "A", 2020, &["F1"]);
    a.no_of_hours = Some(10);
    let b = program("b", "B", 2020, &["F1"]);
    let mut c = program("c", "C", 2020, &["F1"]);
    c.no_of_hours = Some(5);

    let sorted = engine.query(&[a, b, c], &TrainingFilter::new(), &SortState::ascending(TrainingField::NoOfHours));
    assert_eq!(ids(&sorted), vec!["b", "c", "a"]);
}

#[test]
fn test_field_filters_are_case_insensitive_and_anded() {
    let engine = TrainingQueryEngine::new();
    let mut p1 = program("p1", "Python Basics", 2023, &["F1"]);
    p1.venue = "Lab 3".to_string();
    let mut p2 = program("p2", "Advanced PYTHON", 2024, &["F1"]);
    p2.venue = "Main Hall".to_string();
    let p3 = program("p3", "Java", 2023, &["F1"]);
    let programs = vec![p1, p2, p3];

    let filter = TrainingFilter::new().with_field(TrainingField::TrainingName, "python");
    assert_eq!(ids(&engine.query(&programs, &filter, &SortState::none())), vec!["p1", "p2"]);

    let filter = filter.with_field(TrainingField::StartYear, "2023");
    assert_eq!(ids(&engine.query(&programs, &filter, &SortState::none())), vec!["p1"]);

    // 空条件不生效
    let filter = TrainingFilter::new().with_field(TrainingField::Venue, "");
    assert_eq!(engine.query(&programs, &filter, &SortState::none()).len(), 3);
}

#[test]
fn test_filter_on_missing_field_excludes_program() {
    let engine = TrainingQueryEngine::new();
    let mut with_hours = program("p1", "A", 2023, &["F1"]);
    with_hours.no_of_hours = Some(40);
    let without = program("p2", "B", 2023, &["F1"]);

    let filter = TrainingFilter::new().with_field(TrainingField::NoOfHours, "4");
    assert_eq!(
        ids(&engine.query(&[with_hours, without], &filter, &SortState::none())),
        vec!["p1"]
    );
}

#[test]
fn test_coordinator_filter_is_or_within_set() {
    let engine = TrainingQueryEngine::new();
    let programs = vec![
        program("P1", "One", 2023, &["A", "B"]),
        program("P2", "Two", 2023, &["C"]),
        program("P3", "Three", 2023, &["B"]),
    ];

    let filter = TrainingFilter::new().with_coordinators("A,C");
    assert_eq!(ids(&engine.query(&programs, &filter, &SortState::none())), vec!["P1", "P2"]);

    let filter = TrainingFilter::new().with_coordinators(" B , ,");
    assert_eq!(ids(&engine.query(&programs, &filter, &SortState::none())), vec!["P1", "P3"]);

    // 与字段过滤 AND
    let filter = TrainingFilter::new()
        .with_coordinators("A,C")
        .with_field(TrainingField::TrainingName, "two");
    assert_eq!(ids(&engine.query(&programs, &filter, &SortState::none())), vec!["P2"]);
}

#[test]
fn test_ongoing_only_and_audit_rows() {
    let engine = TrainingQueryEngine::new();
    let mut done = program("p1", "Done", 2022, &["F1"]);
    done.status = ProgramStatus::Completed;
    let live = program("p2", "Live", 2023, &["F1"]);

    let rows = engine.audit_rows(&[done, live], &TrainingFilter::new().ongoing_only(), &SortState::none());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].training_name, "Live");
    assert_eq!(rows[0].status, "Ongoing");
}

#[test]
fn test_field_parse_accepts_common_spellings() {
    assert_eq!(TrainingField::parse("trainingName"), Some(TrainingField::TrainingName));
    assert_eq!(TrainingField::parse("no_of_hours"), Some(TrainingField::NoOfHours));
    assert_eq!(TrainingField::parse("Total No of Students"), Some(TrainingField::TotalStudents));
    assert_eq!(TrainingField::parse("salary"), None);
}
