use super::roster::{load_coordinators, load_students, write_coordinators, write_students};
use crate::domain::training::{TrainingProgram, TrainingUpdate};
use crate::domain::types::{DeliveryMode, ProgramStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub(super) const PROGRAM_COLUMNS: &str = r#"
    training_id, training_name, start_year, end_year, student_year, semester,
    total_students, venue, no_of_hours, duration, mode, status,
    trainer_name, designation, company, revision, created_at
"#;

// ==========================================
// TrainingRepository - 培训项目仓储
// ==========================================
pub struct TrainingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TrainingRepository {
    /// 创建新的TrainingRepository实例
    ///
    /// 连接需已通过 `db::configure_sqlite_connection` 开启外键
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新建项目（含协调人与花名册）
    ///
    /// # 返回
    /// - Ok(String): 项目ID
    /// - Err(DuplicateName): 同名项目已存在
    pub fn insert(&self, program: &TrainingProgram) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let name_taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM training_program WHERE training_name = ?)",
            params![&program.training_name],
            |row| row.get(0),
        )?;
        if name_taken {
            return Err(RepositoryError::DuplicateName(program.training_name.clone()));
        }

        tx.execute(
            r#"INSERT INTO training_program (
                training_id, training_name, start_year, end_year, student_year, semester,
                total_students, venue, no_of_hours, duration, mode, status,
                trainer_name, designation, company, revision, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &program.training_id,
                &program.training_name,
                program.start_year,
                program.end_year,
                program.student_year,
                program.semester,
                program.total_students,
                &program.venue,
                program.no_of_hours,
                program.duration,
                program.mode.to_db_str(),
                program.status.to_db_str(),
                &program.trainer_name,
                &program.designation,
                &program.company,
                program.revision,
                program.created_at,
            ],
        )?;

        write_coordinators(&tx, &program.training_id, &program.coordinators)?;
        write_students(&tx, &program.training_id, &program.students)?;

        tx.commit()?;

        info!(
            training_id = %program.training_id,
            training_name = %program.training_name,
            students = program.students.len(),
            "培训项目已创建"
        );
        Ok(program.training_id.clone())
    }

    /// 整体覆盖保存（乐观锁）
    ///
    /// # 返回
    /// - Ok(i32): 新 revision
    pub fn save(&self, program: &TrainingProgram) -> RepositoryResult<i32> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        bump_revision(&tx, &program.training_id, program.revision)?;
        update_program_row(&tx, program)?;

        tx.execute(
            "DELETE FROM program_coordinator WHERE training_id = ?",
            params![&program.training_id],
        )?;
        // attendance_entry 随 student_record 级联删除
        tx.execute(
            "DELETE FROM student_record WHERE training_id = ?",
            params![&program.training_id],
        )?;
        write_coordinators(&tx, &program.training_id, &program.coordinators)?;
        write_students(&tx, &program.training_id, &program.students)?;

        tx.commit()?;
        Ok(program.revision + 1)
    }

    /// 部分更新（不触碰花名册，不做名称唯一性校验）
    pub fn update_fields(
        &self,
        training_id: &str,
        update: &TrainingUpdate,
    ) -> RepositoryResult<TrainingProgram> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut program = find_program_row(&tx, training_id)?
            .ok_or_else(|| RepositoryError::not_found("TrainingProgram", training_id))?;
        update.apply_to(&mut program);

        bump_revision(&tx, training_id, program.revision)?;
        update_program_row(&tx, &program)?;
        if update.coordinators.is_some() {
            tx.execute(
                "DELETE FROM program_coordinator WHERE training_id = ?",
                params![training_id],
            )?;
            write_coordinators(&tx, training_id, &program.coordinators)?;
        }

        program.coordinators = load_coordinators(&tx, training_id)?;
        program.students = load_students(&tx, training_id)?;
        program.revision += 1;

        tx.commit()?;

        debug!(training_id = %training_id, revision = program.revision, "培训项目字段已更新");
        Ok(program)
    }

    /// 删除项目
    pub fn delete(&self, training_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM training_program WHERE training_id = ?",
            params![training_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("TrainingProgram", training_id));
        }

        info!(training_id = %training_id, "培训项目已删除");
        Ok(())
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 按ID加载完整项目
    pub fn find_by_id(&self, training_id: &str) -> RepositoryResult<Option<TrainingProgram>> {
        let conn = self.get_conn()?;
        load_program(&conn, training_id)
    }
}

// ==========================================
// 共享 SQL 辅助函数（Connection 与 Transaction 通用）
// ==========================================

/// 加载完整项目（主表 + 协调人 + 花名册 + 考勤）
pub(super) fn load_program(
    conn: &Connection,
    training_id: &str,
) -> RepositoryResult<Option<TrainingProgram>> {
    let Some(mut program) = find_program_row(conn, training_id)? else {
        return Ok(None);
    };
    program.coordinators = load_coordinators(conn, training_id)?;
    program.students = load_students(conn, training_id)?;
    Ok(Some(program))
}

/// 只读主表行（协调人与花名册为空）
pub(super) fn find_program_row(
    conn: &Connection,
    training_id: &str,
) -> RepositoryResult<Option<TrainingProgram>> {
    let sql = format!(
        "SELECT {} FROM training_program WHERE training_id = ?",
        PROGRAM_COLUMNS
    );
    match conn.query_row(&sql, params![training_id], map_program_row) {
        Ok(program) => Ok(Some(program)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 乐观锁：revision 匹配时 +1，否则返回 NotFound / OptimisticLockFailure
pub(super) fn bump_revision(
    conn: &Connection,
    training_id: &str,
    expected: i32,
) -> RepositoryResult<()> {
    let affected = conn.execute(
        "UPDATE training_program SET revision = revision + 1 WHERE training_id = ? AND revision = ?",
        params![training_id, expected],
    )?;
    if affected == 1 {
        return Ok(());
    }

    match current_revision(conn, training_id)? {
        None => Err(RepositoryError::not_found("TrainingProgram", training_id)),
        Some(actual) => Err(RepositoryError::OptimisticLockFailure {
            training_id: training_id.to_string(),
            expected,
            actual,
        }),
    }
}

pub(super) fn current_revision(conn: &Connection, training_id: &str) -> RepositoryResult<Option<i32>> {
    match conn.query_row(
        "SELECT revision FROM training_program WHERE training_id = ?",
        params![training_id],
        |row| row.get::<_, i32>(0),
    ) {
        Ok(rev) => Ok(Some(rev)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn update_program_row(conn: &Connection, program: &TrainingProgram) -> RepositoryResult<()> {
    conn.execute(
        r#"UPDATE training_program SET
            training_name = ?, start_year = ?, end_year = ?, student_year = ?, semester = ?,
            total_students = ?, venue = ?, no_of_hours = ?, duration = ?, mode = ?, status = ?,
            trainer_name = ?, designation = ?, company = ?
        WHERE training_id = ?"#,
        params![
            &program.training_name,
            program.start_year,
            program.end_year,
            program.student_year,
            program.semester,
            program.total_students,
            &program.venue,
            program.no_of_hours,
            program.duration,
            program.mode.to_db_str(),
            program.status.to_db_str(),
            &program.trainer_name,
            &program.designation,
            &program.company,
            &program.training_id,
        ],
    )?;
    Ok(())
}

/// 映射主表行（列顺序见 PROGRAM_COLUMNS）
pub(super) fn map_program_row(row: &Row) -> rusqlite::Result<TrainingProgram> {
    let mode_raw: String = row.get(10)?;
    let status_raw: String = row.get(11)?;

    let mode = DeliveryMode::parse(&mode_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            Type::Text,
            format!("未知授课方式: {}", mode_raw).into(),
        )
    })?;
    let status = ProgramStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            11,
            Type::Text,
            format!("未知培训状态: {}", status_raw).into(),
        )
    })?;

    Ok(TrainingProgram {
        training_id: row.get(0)?,
        training_name: row.get(1)?,
        start_year: row.get(2)?,
        end_year: row.get(3)?,
        student_year: row.get(4)?,
        semester: row.get(5)?,
        total_students: row.get(6)?,
        venue: row.get(7)?,
        no_of_hours: row.get(8)?,
        duration: row.get(9)?,
        mode,
        status,
        trainer_name: row.get(12)?,
        designation: row.get(13)?,
        company: row.get(14)?,
        coordinators: Vec::new(),
        students: Vec::new(),
        revision: row.get(15)?,
        created_at: row.get(16)?,
    })
}
