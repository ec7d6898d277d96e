/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 请求错误
    BadRequest = 1000,
    ValidationFailed = 1001,

    // 认证与授权
    Unauthorized = 2000,
    AuthFailed = 2001,
    Forbidden = 2003,
    RateLimitExceeded = 2029,

    // 资源
    NotFound = 3000,
    ActorNotFound = 3001,
    AssignmentNotFound = 3002,
    SubmissionNotFound = 3003,
    GroupNotFound = 3004,

    // 冲突
    Conflict = 4000,
    EmailAlreadyExists = 4001,
    GroupAlreadyExists = 4002,
    SubmissionAlreadyExists = 4003,
    OperationPending = 4009,

    // 业务规则
    DeadlinePassed = 4100,
    CannotDeleteSelf = 4101,
    MaxGradeBelowAwarded = 4102,
    InvalidGrade = 4200,

    // 服务端
    InternalServerError = 5000,
    OperationCancelled = 5003,
}
