use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct ReportParams {
    /// 按小组名称过滤
    pub group: Option<String>,
}
