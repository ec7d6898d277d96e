use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "actor.ts")]
pub enum Role {
    Admin,   // 管理员
    Teacher, // 教师
    Student, // 学生
}

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";

    pub fn admin_roles() -> &'static [Role] {
        &[Role::Admin]
    }
    pub fn staff_roles() -> &'static [Role] {
        &[Role::Teacher, Role::Admin]
    }
    pub fn student_roles() -> &'static [Role] {
        &[Role::Student]
    }
    /// 空集合表示任意已登录用户
    pub fn any_authenticated() -> &'static [Role] {
        &[]
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "invalid role: '{s}'. supported roles: admin, teacher, student"
            ))
        })
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "{}", Role::ADMIN),
            Role::Teacher => write!(f, "{}", Role::TEACHER),
            Role::Student => write!(f, "{}", Role::STUDENT),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Role::ADMIN => Ok(Role::Admin),
            Role::TEACHER => Ok(Role::Teacher),
            Role::STUDENT => Ok(Role::Student),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

// 账号状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "actor.ts")]
pub enum ActorStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for ActorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorStatus::Active => write!(f, "active"),
            ActorStatus::Inactive => write!(f, "inactive"),
        }
    }
}

// 用户实体（管理员、教师或学生）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "actor.ts")]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// 学生所属小组名称
    pub group: Option<String>,
    #[serde(default)]
    pub status: ActorStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
}

impl Actor {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Admin, Role::Teacher, Role::Student] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let role: Role = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, Role::Teacher);

        let err = serde_json::from_str::<Role>("\"root\"").unwrap_err();
        assert!(err.to_string().contains("supported roles"));
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Teacher.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Student.is_staff());
        assert!(Role::any_authenticated().is_empty());
    }
}
