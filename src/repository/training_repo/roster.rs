use super::core::{bump_revision, current_revision, TrainingRepository};
use crate::domain::student::{AttendanceEntry, StudentRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::roster_store::SessionCommit;
use crate::domain::types::SessionDate;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, TransactionBehavior};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

impl TrainingRepository {
    // ==========================================
    // 课次提交
    // ==========================================

    /// 原子提交课次
    ///
    /// 同一事务内:
    /// 1. 校验 revision
    /// 2. 校验该日期尚未记录
    /// 3. 写入每名学员的新条目与出勤率
    /// 4. revision + 1
    pub fn commit_session(&self, commit: &SessionCommit) -> RepositoryResult<i32> {
        let mut conn = self.get_conn()?;
        // IMMEDIATE: 开始即持有写锁，多连接并发时由 busy_timeout 排队
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let actual = current_revision(&tx, &commit.training_id)?
            .ok_or_else(|| RepositoryError::not_found("TrainingProgram", &commit.training_id))?;
        if actual != commit.expected_revision {
            return Err(RepositoryError::OptimisticLockFailure {
                training_id: commit.training_id.clone(),
                expected: commit.expected_revision,
                actual,
            });
        }

        if session_recorded(&tx, &commit.training_id, &commit.session_date)? {
            return Err(RepositoryError::DuplicateSession {
                training_id: commit.training_id.clone(),
                date: commit.session_date,
            });
        }

        for student in &commit.students {
            let history = student.attendance_history();
            let seq = history
                .iter()
                .rposition(|e| e.session_date == commit.session_date)
                .ok_or_else(|| {
                    RepositoryError::ValidationError(format!(
                        "学员 {} 缺少课次 {} 的条目",
                        student.roll_no, commit.session_date
                    ))
                })?;
            let entry = &history[seq];

            let updated = tx.execute(
                "UPDATE student_record SET attendance_percentage = ? WHERE training_id = ? AND roll_no = ?",
                params![student.attendance_percentage(), &commit.training_id, &student.roll_no],
            )?;
            if updated == 0 {
                return Err(RepositoryError::ValidationError(format!(
                    "学号不在花名册中: {}",
                    student.roll_no
                )));
            }

            insert_entry(&tx, &commit.training_id, &student.roll_no, seq, entry)?;
        }

        bump_revision(&tx, &commit.training_id, commit.expected_revision)?;
        tx.commit()?;

        info!(
            training_id = %commit.training_id,
            session_date = %commit.session_date,
            students = commit.students.len(),
            "课次考勤已提交"
        );
        Ok(commit.expected_revision + 1)
    }

    /// 该课次是否已记录
    pub fn is_session_recorded(
        &self,
        training_id: &str,
        date: &SessionDate,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        session_recorded(&conn, training_id, date)
    }
}

fn session_recorded(conn: &Connection, training_id: &str, date: &SessionDate) -> RepositoryResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM attendance_entry WHERE training_id = ? AND session_date = ?)",
        params![training_id, date.to_db_str()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn insert_entry(
    conn: &Connection,
    training_id: &str,
    roll_no: &str,
    seq: usize,
    entry: &AttendanceEntry,
) -> RepositoryResult<()> {
    conn.execute(
        r#"INSERT INTO attendance_entry (training_id, roll_no, seq, session_date, is_present, remark)
           VALUES (?, ?, ?, ?, ?, ?)"#,
        params![
            training_id,
            roll_no,
            seq as i64,
            entry.session_date.to_db_str(),
            entry.is_present,
            &entry.remark,
        ],
    )?;
    Ok(())
}

// ==========================================
// 协调人 / 花名册读写
// ==========================================

pub(super) fn write_coordinators(
    conn: &Connection,
    training_id: &str,
    coordinators: &[String],
) -> RepositoryResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO program_coordinator (training_id, position, coordinator_id) VALUES (?, ?, ?)",
    )?;
    for (pos, coordinator) in coordinators.iter().enumerate() {
        stmt.execute(params![training_id, pos as i64, coordinator])?;
    }
    Ok(())
}

pub(super) fn load_coordinators(conn: &Connection, training_id: &str) -> RepositoryResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT coordinator_id FROM program_coordinator WHERE training_id = ? ORDER BY position",
    )?;
    let ids = stmt
        .query_map(params![training_id], |row| row.get::<_, String>(0))?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(ids)
}

/// 写入花名册及其全部历史
pub(super) fn write_students(
    conn: &Connection,
    training_id: &str,
    students: &[StudentRecord],
) -> RepositoryResult<()> {
    for (pos, student) in students.iter().enumerate() {
        let extra_json = serde_json::to_string(&student.extra_fields)?;
        conn.execute(
            r#"INSERT INTO student_record (
                training_id, roll_no, position, student_name, student_mobile_no,
                parent_mobile_no, parent_name, branch, blood_group,
                residential_address, email, extra_fields_json, attendance_percentage
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                training_id,
                &student.roll_no,
                pos as i64,
                &student.student_name,
                &student.student_mobile_no,
                &student.parent_mobile_no,
                &student.parent_name,
                &student.branch,
                &student.blood_group,
                &student.residential_address,
                &student.email,
                extra_json,
                student.attendance_percentage(),
            ],
        )?;

        for (seq, entry) in student.attendance_history().iter().enumerate() {
            insert_entry(conn, training_id, &student.roll_no, seq, entry)?;
        }
    }
    Ok(())
}

/// 读取花名册（保序）及每名学员的考勤历史
pub(super) fn load_students(conn: &Connection, training_id: &str) -> RepositoryResult<Vec<StudentRecord>> {
    let mut histories = load_histories(conn, training_id)?;

    let mut stmt = conn.prepare(
        r#"SELECT roll_no, student_name, student_mobile_no, parent_mobile_no, parent_name,
                  branch, blood_group, residential_address, email, extra_fields_json
           FROM student_record
           WHERE training_id = ?
           ORDER BY position"#,
    )?;
    let rows = stmt
        .query_map(params![training_id], |row| {
            let mut student = StudentRecord::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?);
            student.student_mobile_no = row.get(2)?;
            student.parent_mobile_no = row.get(3)?;
            student.parent_name = row.get(4)?;
            student.branch = row.get(5)?;
            student.blood_group = row.get(6)?;
            student.residential_address = row.get(7)?;
            student.email = row.get(8)?;
            Ok((student, row.get::<_, String>(9)?))
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    let mut students = Vec::with_capacity(rows.len());
    for (mut student, extra_json) in rows {
        student.extra_fields = serde_json::from_str::<BTreeMap<String, String>>(&extra_json)?;
        let history = histories.remove(&student.roll_no).unwrap_or_default();
        students.push(student.restore(history));
    }

    debug!(training_id = %training_id, count = students.len(), "花名册已加载");
    Ok(students)
}

fn load_histories(
    conn: &Connection,
    training_id: &str,
) -> RepositoryResult<HashMap<String, Vec<AttendanceEntry>>> {
    let mut stmt = conn.prepare(
        r#"SELECT roll_no, session_date, is_present, remark
           FROM attendance_entry
           WHERE training_id = ?
           ORDER BY roll_no, seq"#,
    )?;
    let rows = stmt
        .query_map(params![training_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                AttendanceEntry::new(
                    SessionDate::new(row.get::<_, NaiveDate>(1)?),
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                ),
            ))
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    let mut histories: HashMap<String, Vec<AttendanceEntry>> = HashMap::new();
    for (roll_no, entry) in rows {
        histories.entry(roll_no).or_default().push(entry);
    }
    Ok(histories)
}
