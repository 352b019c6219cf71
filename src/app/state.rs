// ==========================================
// 培训考勤系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AttendanceApi, ConfigApi, TrainingApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::attendance_ledger::AttendanceLedger;
use crate::export::{CsvExporter, ExportAdapter};
use crate::repository::roster_store::RosterStore;
use crate::repository::training_repo::TrainingRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "TRAINING_LEDGER_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 培训项目API
    pub training_api: Arc<TrainingApi>,

    /// 考勤API
    pub attendance_api: Arc<AttendanceApi<ConfigManager>>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 花名册存储（SQLite）
    pub training_repo: Arc<TrainingRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 亦可）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并建表（幂等）
    /// 2. 从 config_kv 读取台账参数（校验）
    /// 3. 创建所有API实例
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository / 配置
        // ==========================================
        let training_repo = Arc::new(TrainingRepository::new(conn.clone()));
        let store: Arc<dyn RosterStore> = training_repo.clone();

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // Engine / API
        // ==========================================
        let ledger = Arc::new(AttendanceLedger::new(store.clone(), config_manager.clone()));
        // 启动时读取一次，用于校验配置与记录日志；运行期每次提交重新读取
        let settings = ledger
            .settings()
            .await
            .map_err(|e| format!("台账配置读取失败: {}", e))?;
        tracing::info!(
            missing_roll_policy = %settings.missing_roll_policy.to_db_str(),
            max_conflict_retries = settings.max_conflict_retries,
            "台账配置已加载"
        );
        let exporter: Arc<dyn ExportAdapter> = Arc::new(CsvExporter::new());

        let training_api = Arc::new(TrainingApi::new(store.clone(), exporter.clone()));
        let attendance_api = Arc::new(AttendanceApi::new(
            ledger,
            store,
            config_manager.clone(),
            exporter,
        ));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            training_api,
            attendance_api,
            config_api,
            training_repo,
        })
    }
}

/// 默认数据库路径
///
/// 优先读取 TRAINING_LEDGER_DB_PATH；否则使用用户数据目录，回退到当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./training_ledger.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("training-ledger");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("training_ledger.db");
        }
    }

    path.to_string_lossy().to_string()
}
