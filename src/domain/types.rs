// ==========================================
// 培训考勤系统 - 领域类型定义
// ==========================================
// 职责: 授课方式、培训状态、课次日期等值类型
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 授课方式 (Delivery Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    Offline, // 线下
    Online,  // 线上
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Offline => write!(f, "Offline"),
            DeliveryMode::Online => write!(f, "Online"),
        }
    }
}

impl DeliveryMode {
    /// 从字符串解析授课方式（大小写不敏感，未知值返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OFFLINE" => Some(DeliveryMode::Offline),
            "ONLINE" => Some(DeliveryMode::Online),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DeliveryMode::Offline => "OFFLINE",
            DeliveryMode::Online => "ONLINE",
        }
    }
}

// ==========================================
// 培训状态 (Program Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramStatus {
    Ongoing,   // 进行中
    Completed, // 已结束
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramStatus::Ongoing => write!(f, "Ongoing"),
            ProgramStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl ProgramStatus {
    /// 从字符串解析培训状态（大小写不敏感，未知值返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ONGOING" => Some(ProgramStatus::Ongoing),
            "COMPLETED" => Some(ProgramStatus::Completed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProgramStatus::Ongoing => "ONGOING",
            ProgramStatus::Completed => "COMPLETED",
        }
    }
}

// ==========================================
// 缺席学号处理策略 (Missing Roll Policy)
// ==========================================
// 提交课次时，花名册中有而提交中缺失的学号如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingRollPolicy {
    #[default]
    Reject,     // 拒绝整次提交
    MarkAbsent, // 记为缺勤，备注为空
}

impl fmt::Display for MissingRollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MissingRollPolicy {
    /// 从字符串解析策略（未知值回落到 Reject）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "MARK_ABSENT" => MissingRollPolicy::MarkAbsent,
            _ => MissingRollPolicy::Reject,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MissingRollPolicy::Reject => "REJECT",
            MissingRollPolicy::MarkAbsent => "MARK_ABSENT",
        }
    }
}

// ==========================================
// 课次日期 (Session Date)
// ==========================================
// 课次的唯一键。所有比较都基于日历日期，
// 不同的书写形式（1/5/2024、01/05/2024、2024-01-05）视为同一天。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionDate(NaiveDate);

/// 可接受的输入格式（按顺序尝试）
const ACCEPTED_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

impl SessionDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// 解析用户输入的日期
    ///
    /// # 参数
    /// - raw: `YYYY-MM-DD`、`M/D/YYYY` 或 `MM/DD/YYYY`
    ///
    /// # 返回
    /// - Some(SessionDate): 合法日期
    /// - None: 无法解析，或年份不是四位数字（`1/10/24` 不会被当作公元 24 年）
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let date = ACCEPTED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())?;
        let year = date.year().to_string();
        let four_digit_year = year.len() == 4 && raw.split(['-', '/']).any(|part| part == year);
        four_digit_year.then_some(SessionDate(date))
    }

    /// 转换为数据库存储的字符串 (YYYY-MM-DD)
    pub fn to_db_str(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// 文件名中使用的形式（M-D-YYYY，斜杠替换为连字符）
    pub fn to_file_token(&self) -> String {
        self.to_string().replace('/', "-")
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for SessionDate {
    fn from(date: NaiveDate) -> Self {
        SessionDate(date)
    }
}

// 展示格式: M/D/YYYY
impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%-m/%-d/%Y"))
    }
}
