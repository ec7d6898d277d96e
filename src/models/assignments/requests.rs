use super::entities::AssignmentProgress;
use serde::Deserialize;
use ts_rs::TS;

/// 作业列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListParams {
    pub search: Option<String>,
    /// 仅对学生生效
    pub status: Option<AssignmentProgress>,
}

/// 创建作业请求
///
/// `deadline` 必须带时区偏移（RFC 3339），服务端统一换算为 UTC。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: String,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub max_grade: Option<i64>,
    pub materials_reference: Option<String>,
}

/// 更新作业请求（整体替换）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: String,
    pub description: String,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub max_grade: Option<i64>,
    pub materials_reference: Option<String>,
}
