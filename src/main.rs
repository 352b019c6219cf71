// ==========================================
// 培训考勤系统 - 命令行主入口
// ==========================================
// 用法: training-ledger [db_path]
// 输出: 当前库中全部培训项目的概览
// ==========================================

use anyhow::anyhow;
use training_ledger::app::{get_default_db_path, AppState};
use training_ledger::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", training_ledger::APP_NAME);
    tracing::info!("系统版本: {}", training_ledger::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args()
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).await.map_err(|e| anyhow!(e))?;
    let programs = app_state.training_api.list_trainings().await?;

    println!("{} v{}", training_ledger::APP_NAME, training_ledger::VERSION);
    println!("培训项目: {}", programs.len());
    for program in &programs {
        println!(
            "- {} [{}] {}-{} 学员 {} 名, 已记录课次 {} 次, 状态 {}",
            program.training_name,
            program.training_id,
            program.start_year,
            program.end_year,
            program.students.len(),
            program.session_dates().len(),
            program.status,
        );
    }

    Ok(())
}
