// ==========================================
// 培训考勤系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键级联依赖 foreign_keys=ON）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 幂等建表
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 表结构:
/// - training_program: 项目主表（revision 为乐观锁）
/// - program_coordinator: 协调人（保序）
/// - student_record: 花名册（保序）
/// - attendance_entry: 考勤历史，(training_id, roll_no, session_date) 唯一
/// - config_kv: 全局配置
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS training_program (
            training_id TEXT PRIMARY KEY,
            training_name TEXT NOT NULL,
            start_year INTEGER NOT NULL,
            end_year INTEGER NOT NULL,
            student_year INTEGER NOT NULL,
            semester INTEGER NOT NULL,
            total_students INTEGER NOT NULL,
            venue TEXT NOT NULL,
            no_of_hours INTEGER,
            duration INTEGER,
            mode TEXT NOT NULL,
            status TEXT NOT NULL,
            trainer_name TEXT NOT NULL,
            designation TEXT NOT NULL,
            company TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS program_coordinator (
            training_id TEXT NOT NULL REFERENCES training_program(training_id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            coordinator_id TEXT NOT NULL,
            PRIMARY KEY (training_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_program_coordinator_id
            ON program_coordinator(coordinator_id);

        CREATE TABLE IF NOT EXISTS student_record (
            training_id TEXT NOT NULL REFERENCES training_program(training_id) ON DELETE CASCADE,
            roll_no TEXT NOT NULL,
            position INTEGER NOT NULL,
            student_name TEXT NOT NULL,
            student_mobile_no TEXT NOT NULL DEFAULT '',
            parent_mobile_no TEXT NOT NULL DEFAULT '',
            parent_name TEXT NOT NULL DEFAULT '',
            branch TEXT NOT NULL DEFAULT '',
            blood_group TEXT NOT NULL DEFAULT '',
            residential_address TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            extra_fields_json TEXT NOT NULL DEFAULT '{}',
            attendance_percentage REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (training_id, roll_no)
        );

        CREATE TABLE IF NOT EXISTS attendance_entry (
            training_id TEXT NOT NULL,
            roll_no TEXT NOT NULL,
            seq INTEGER NOT NULL,
            session_date TEXT NOT NULL,
            is_present INTEGER NOT NULL,
            remark TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (training_id, roll_no, seq),
            UNIQUE (training_id, roll_no, session_date),
            FOREIGN KEY (training_id, roll_no)
                REFERENCES student_record(training_id, roll_no) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_entry_date
            ON attendance_entry(training_id, session_date);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
