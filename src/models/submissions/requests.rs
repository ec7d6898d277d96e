use serde::Deserialize;
use ts_rs::TS;

// 学生提交作业请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmitAssignmentRequest {
    /// 已上传文件的引用（文件存储不在本服务范围内）
    pub file_reference: String,
}

// 评分请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeSubmissionRequest {
    /// 以有符号整数接收，越界值由服务端校验并返回 InvalidGrade
    pub grade: i64,
    pub comment: Option<String>,
}

// 提交查询条件（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
    pub assignment_id: Option<i64>,
    pub student_id: Option<i64>,
}
