use super::core::{load_program, map_program_row, TrainingRepository, PROGRAM_COLUMNS};
use super::roster::{load_coordinators, load_students};
use crate::domain::training::TrainingProgram;
use crate::domain::types::ProgramStatus;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, Result as SqliteResult, ToSql};

impl TrainingRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询全部项目（按创建时间升序）
    pub fn find_all(&self) -> RepositoryResult<Vec<TrainingProgram>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM training_program ORDER BY created_at, rowid",
            PROGRAM_COLUMNS
        );
        query_programs(&conn, &sql, &[])
    }

    /// 查询某协调人负责的项目
    pub fn find_by_coordinator(&self, coordinator_id: &str) -> RepositoryResult<Vec<TrainingProgram>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {} FROM training_program
               WHERE training_id IN (
                   SELECT training_id FROM program_coordinator WHERE coordinator_id = ?
               )
               ORDER BY created_at, rowid"#,
            PROGRAM_COLUMNS
        );
        query_programs(&conn, &sql, params![coordinator_id])
    }

    /// 按结束学年查询
    pub fn find_by_end_year(&self, end_year: i32) -> RepositoryResult<Vec<TrainingProgram>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM training_program WHERE end_year = ? ORDER BY created_at, rowid",
            PROGRAM_COLUMNS
        );
        query_programs(&conn, &sql, params![end_year])
    }

    /// 按状态查询
    pub fn find_by_status(&self, status: ProgramStatus) -> RepositoryResult<Vec<TrainingProgram>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM training_program WHERE status = ? ORDER BY created_at, rowid",
            PROGRAM_COLUMNS
        );
        query_programs(&conn, &sql, params![status.to_db_str()])
    }

    /// 名称是否已被占用
    pub fn exists_by_name(&self, training_name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM training_program WHERE training_name = ?)",
            params![training_name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// 统计项目数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM training_program", [], |row| row.get(0))?;
        Ok(n)
    }

    /// 按ID加载（NotFound 以错误返回）
    pub fn get(&self, training_id: &str) -> RepositoryResult<TrainingProgram> {
        let conn = self.get_conn()?;
        load_program(&conn, training_id)?.ok_or_else(|| {
            crate::repository::error::RepositoryError::not_found("TrainingProgram", training_id)
        })
    }
}

/// 执行主表查询并补齐协调人与花名册
fn query_programs(
    conn: &Connection,
    sql: &str,
    args: &[&dyn ToSql],
) -> RepositoryResult<Vec<TrainingProgram>> {
    let mut stmt = conn.prepare(sql)?;
    let mut programs = stmt
        .query_map(args, map_program_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    for program in programs.iter_mut() {
        program.coordinators = load_coordinators(conn, &program.training_id)?;
        program.students = load_students(conn, &program.training_id)?;
    }
    Ok(programs)
}
