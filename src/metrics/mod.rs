//! 统计计算
//!
//! 仪表盘、报表和学生详情共用的纯函数：完成率、平均分、等级、截止天数、
//! 成绩分布与小组汇总。这里不做任何 I/O，`now` 一律由调用方传入。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{LabDeskError, Result};
use crate::models::actors::entities::Actor;
use crate::models::assignments::entities::{Assignment, AssignmentProgress};
use crate::models::students::entities::StudentProgress;
use crate::models::submissions::entities::Submission;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// 截止前多少天内视为“即将截止”
pub const DEADLINE_SOON_DAYS: i64 = 3;

/// 字母等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "metrics.ts")]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

/// 各等级的提交数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "metrics.ts")]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "D")]
    pub d: u32,
    #[serde(rename = "F")]
    pub f: u32,
}

impl GradeDistribution {
    pub fn record(&mut self, letter: LetterGrade) {
        match letter {
            LetterGrade::A => self.a += 1,
            LetterGrade::B => self.b += 1,
            LetterGrade::C => self.c += 1,
            LetterGrade::D => self.d += 1,
            LetterGrade::F => self.f += 1,
        }
    }

    pub fn count(&self, letter: LetterGrade) -> u32 {
        match letter {
            LetterGrade::A => self.a,
            LetterGrade::B => self.b,
            LetterGrade::C => self.c,
            LetterGrade::D => self.d,
            LetterGrade::F => self.f,
        }
    }

    pub fn total(&self) -> u32 {
        self.a + self.b + self.c + self.d + self.f
    }
}

/// 小组汇总（均为四舍五入后的百分制整数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "metrics.ts")]
pub struct GroupStats {
    pub average_grade: u32,
    pub average_completion: u32,
}

/// 四舍五入（.5 向上）
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// 完成率，total 为 0 时报 DivisionUndefined
pub fn checked_completion_rate(completed: u32, total: u32) -> Result<u32> {
    if total == 0 {
        return Err(LabDeskError::division_undefined(
            "completion rate of an empty assignment set",
        ));
    }
    // 整数运算下的 round(100 * c / t)
    let completed = u64::from(completed);
    let total = u64::from(total);
    let rate = (200 * completed + total) / (2 * total);
    Ok(rate.min(u64::from(u32::MAX)) as u32)
}

/// 完成率，total 为 0 时按约定返回 0
pub fn completion_rate(completed: u32, total: u32) -> u32 {
    checked_completion_rate(completed, total).unwrap_or(0)
}

/// 未取整的完成百分比，供小组汇总求均值
fn completion_percentage(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * f64::from(completed) / f64::from(total)
    }
}

/// 算术平均，空序列返回 0
pub fn average_grade(grades: &[f64]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    grades.iter().sum::<f64>() / grades.len() as f64
}

/// 百分制成绩，max 非正时返回 0
pub fn percentage(score: f64, max: f64) -> f64 {
    if max <= 0.0 { 0.0 } else { 100.0 * score / max }
}

/// 按百分比换算字母等级：>=90 A，>=80 B，>=70 C，>=60 D，其余 F
pub fn letter_grade(score: f64, max: f64) -> LetterGrade {
    if max <= 0.0 {
        return LetterGrade::F;
    }
    let pct = percentage(score, max);
    if pct >= 90.0 {
        LetterGrade::A
    } else if pct >= 80.0 {
        LetterGrade::B
    } else if pct >= 70.0 {
        LetterGrade::C
    } else if pct >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

/// 距截止的天数（向上取整）
///
/// 负数表示已逾期 |n| 天，0 表示当天截止。
pub fn days_until_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff = deadline.signed_duration_since(now).num_milliseconds();
    let days = diff.div_euclid(MILLIS_PER_DAY);
    if diff.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

pub fn is_deadline_soon(days_left: i64) -> bool {
    days_left > 0 && days_left <= DEADLINE_SOON_DAYS
}

/// 学生视角的作业状态
pub fn assignment_progress(
    deadline: DateTime<Utc>,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> AssignmentProgress {
    match submission {
        Some(s) if s.is_graded() => AssignmentProgress::Graded,
        Some(_) => AssignmentProgress::Submitted,
        None if deadline < now => AssignmentProgress::Overdue,
        None => AssignmentProgress::NotStarted,
    }
}

/// 统计已评分提交的等级分布
///
/// 未评分的提交以及找不到所属作业的提交不计入。
pub fn grade_distribution(submissions: &[Submission], assignments: &[Assignment]) -> GradeDistribution {
    let max_grades: HashMap<i64, u32> = assignments.iter().map(|a| (a.id, a.max_grade)).collect();

    let mut distribution = GradeDistribution::default();
    for submission in submissions {
        let (Some(grade), Some(max)) = (
            submission.grade.filter(|_| submission.is_graded()),
            max_grades.get(&submission.assignment_id),
        ) else {
            continue;
        };
        distribution.record(letter_grade(f64::from(grade), f64::from(*max)));
    }
    distribution
}

/// 由原始集合推导单个学生的进度
pub fn student_progress(
    student: &Actor,
    assignments: &[Assignment],
    submissions: &[Submission],
) -> StudentProgress {
    let max_grades: HashMap<i64, u32> = assignments.iter().map(|a| (a.id, a.max_grade)).collect();

    let own: Vec<&Submission> = submissions
        .iter()
        .filter(|s| s.student_id == student.id && max_grades.contains_key(&s.assignment_id))
        .collect();

    let graded: Vec<f64> = own
        .iter()
        .filter_map(|s| {
            let grade = s.grade.filter(|_| s.is_graded())?;
            let max = max_grades.get(&s.assignment_id)?;
            Some(percentage(f64::from(grade), f64::from(*max)))
        })
        .collect();

    StudentProgress {
        id: student.id,
        name: student.name.clone(),
        email: student.email.clone(),
        group: student.group.clone(),
        status: student.status,
        total_assignments: assignments.len() as u32,
        completed_assignments: own.len() as u32,
        average_grade: average_grade(&graded),
    }
}

/// 小组汇总：学生平均分与完成百分比的均值，各自四舍五入
pub fn aggregate_group_stats(students: &[StudentProgress]) -> GroupStats {
    if students.is_empty() {
        return GroupStats::default();
    }

    let grades: Vec<f64> = students.iter().map(|s| s.average_grade).collect();
    let completions: Vec<f64> = students
        .iter()
        .map(|s| completion_percentage(s.completed_assignments, s.total_assignments))
        .collect();

    GroupStats {
        average_grade: round_half_up(average_grade(&grades)) as u32,
        average_completion: round_half_up(average_grade(&completions)) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actors::entities::{ActorStatus, Role};
    use chrono::Duration;

    fn assignment(id: i64, max_grade: u32) -> Assignment {
        let now = Utc::now();
        Assignment {
            id,
            title: format!("Lab {id}"),
            description: String::new(),
            deadline: now + Duration::days(7),
            max_grade,
            materials_reference: None,
            created_by: 2,
            created_at: now,
            updated_at: now,
        }
    }

    fn graded(id: i64, assignment_id: i64, student_id: i64, grade: u32) -> Submission {
        let now = Utc::now();
        let mut s = Submission::new_submitted(id, assignment_id, student_id, "lab.zip".into(), now);
        s.apply_grade(grade, None, 2, now);
        s
    }

    fn progress(average_grade: f64, completed: u32, total: u32) -> StudentProgress {
        StudentProgress {
            id: 1,
            name: "Student".into(),
            email: "s@example.edu".into(),
            group: None,
            status: ActorStatus::Active,
            total_assignments: total,
            completed_assignments: completed,
            average_grade,
        }
    }

    #[test]
    fn test_completion_rate_bounds() {
        for total in 1..=40u32 {
            for completed in 0..=total {
                let rate = completion_rate(completed, total);
                assert!(rate <= 100, "{completed}/{total} -> {rate}");
            }
        }
        assert_eq!(completion_rate(0, 5), 0);
        assert_eq!(completion_rate(5, 5), 100);
    }

    #[test]
    fn test_completion_rate_rounds_half_up() {
        assert_eq!(completion_rate(1, 8), 13); // 12.5
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
    }

    #[test]
    fn test_completion_rate_empty_total() {
        assert_eq!(completion_rate(0, 0), 0);
        assert!(matches!(
            checked_completion_rate(0, 0),
            Err(LabDeskError::DivisionUndefined(_))
        ));
    }

    #[test]
    fn test_average_grade() {
        assert_eq!(average_grade(&[]), 0.0);
        assert_eq!(average_grade(&[80.0, 90.0, 100.0]), 90.0);
    }

    #[test]
    fn test_letter_grade_boundaries() {
        let cases = [
            (100.0, LetterGrade::A),
            (90.0, LetterGrade::A),
            (89.0, LetterGrade::B),
            (80.0, LetterGrade::B),
            (79.0, LetterGrade::C),
            (70.0, LetterGrade::C),
            (69.0, LetterGrade::D),
            (60.0, LetterGrade::D),
            (59.0, LetterGrade::F),
            (0.0, LetterGrade::F),
        ];
        for (score, expected) in cases {
            assert_eq!(letter_grade(score, 100.0), expected, "score {score}");
        }
        assert_eq!(letter_grade(10.0, 0.0), LetterGrade::F);
    }

    #[test]
    fn test_letter_grade_monotonic() {
        let mut previous = LetterGrade::A;
        for score in (0..=100).rev() {
            let letter = letter_grade(f64::from(score), 100.0);
            // 分数下降时等级不会变好
            assert!(letter >= previous, "score {score}");
            previous = letter;
        }
    }

    #[test]
    fn test_days_until_deadline_sign() {
        let now = Utc::now();
        assert_eq!(days_until_deadline(now + Duration::days(3), now), 3);
        assert_eq!(days_until_deadline(now, now), 0);
        assert_eq!(days_until_deadline(now - Duration::days(2), now), -2);
        // 不足一天按一天计
        assert_eq!(days_until_deadline(now + Duration::hours(30), now), 2);
        assert_eq!(days_until_deadline(now + Duration::minutes(1), now), 1);
        assert_eq!(days_until_deadline(now - Duration::hours(36), now), -1);
    }

    #[test]
    fn test_deadline_soon() {
        assert!(!is_deadline_soon(0));
        assert!(is_deadline_soon(1));
        assert!(is_deadline_soon(3));
        assert!(!is_deadline_soon(4));
        assert!(!is_deadline_soon(-1));
    }

    #[test]
    fn test_assignment_progress() {
        let now = Utc::now();
        let past = now - Duration::days(1);
        let future = now + Duration::days(1);
        let pending = Submission::new_submitted(1, 1, 3, "lab.zip".into(), now);

        assert_eq!(assignment_progress(future, None, now), AssignmentProgress::NotStarted);
        assert_eq!(assignment_progress(past, None, now), AssignmentProgress::Overdue);
        assert_eq!(
            assignment_progress(past, Some(&pending), now),
            AssignmentProgress::Submitted
        );
        assert_eq!(
            assignment_progress(future, Some(&graded(2, 1, 3, 70)), now),
            AssignmentProgress::Graded
        );
    }

    #[test]
    fn test_grade_distribution_empty() {
        let distribution = grade_distribution(&[], &[assignment(1, 100)]);
        assert_eq!(distribution, GradeDistribution::default());
        for letter in [LetterGrade::A, LetterGrade::B, LetterGrade::C, LetterGrade::D, LetterGrade::F] {
            assert_eq!(distribution.count(letter), 0);
        }
    }

    #[test]
    fn test_grade_distribution_three_graded() {
        let assignments = [assignment(1, 100)];
        let submissions = [graded(1, 1, 3, 95), graded(2, 1, 4, 82), graded(3, 1, 5, 65)];

        let distribution = grade_distribution(&submissions, &assignments);
        assert_eq!(
            distribution,
            GradeDistribution {
                a: 1,
                b: 1,
                c: 0,
                d: 1,
                f: 0
            }
        );
    }

    #[test]
    fn test_grade_distribution_skips_ungraded_and_unknown() {
        let now = Utc::now();
        let assignments = [assignment(1, 50)];
        let submissions = [
            Submission::new_submitted(1, 1, 3, "a.zip".into(), now),
            graded(2, 99, 3, 100),
            // 45/50 = 90%
            graded(3, 1, 4, 45),
        ];

        let distribution = grade_distribution(&submissions, &assignments);
        assert_eq!(distribution.total(), 1);
        assert_eq!(distribution.a, 1);
    }

    #[test]
    fn test_student_progress() {
        let student = Actor {
            id: 3,
            name: "Student".into(),
            email: "s@example.edu".into(),
            role: Role::Student,
            group: Some("bis-1-23".into()),
            status: ActorStatus::Active,
            created_at: Utc::now(),
            last_activity: None,
        };
        let assignments = [assignment(1, 100), assignment(2, 50), assignment(3, 100)];
        let submissions = [
            graded(1, 1, 3, 80),
            graded(2, 2, 3, 50),
            Submission::new_submitted(3, 3, 4, "other.zip".into(), Utc::now()),
        ];

        let progress = student_progress(&student, &assignments, &submissions);
        assert_eq!(progress.total_assignments, 3);
        assert_eq!(progress.completed_assignments, 2);
        assert_eq!(progress.average_grade, 90.0);
        assert_eq!(progress.group.as_deref(), Some("bis-1-23"));
    }

    #[test]
    fn test_aggregate_group_stats() {
        assert_eq!(aggregate_group_stats(&[]), GroupStats::default());

        let students = [progress(85.0, 3, 4), progress(90.0, 2, 4), progress(0.0, 0, 0)];
        let stats = aggregate_group_stats(&students);
        // (85 + 90 + 0) / 3 = 58.33
        assert_eq!(stats.average_grade, 58);
        // (75 + 50 + 0) / 3 = 41.67
        assert_eq!(stats.average_completion, 42);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(0.0), 0.0);
    }
}
