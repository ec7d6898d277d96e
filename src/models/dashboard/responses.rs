use serde::Serialize;
use ts_rs::TS;

use crate::models::assignments::entities::Assignment;

/// 按角色区分的仪表盘统计
#[derive(Debug, Serialize, TS)]
#[serde(tag = "role", rename_all = "snake_case")]
#[ts(export, export_to = "dashboard.ts")]
pub enum DashboardStats {
    Admin {
        total_users: u32,
        total_assignments: u32,
        total_groups: u32,
        active_submissions: u32,
    },
    Teacher {
        total_assignments: u32,
        total_students: u32,
        pending_grades: u32,
        completed_submissions: u32,
    },
    Student {
        total_assignments: u32,
        completed_assignments: u32,
        pending_assignments: u32,
        upcoming_deadlines: u32,
        completion_rate: u32,
    },
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    /// 即将截止的作业（按截止时间升序）
    pub upcoming: Vec<Assignment>,
}
