pub mod requests;
pub mod responses;

pub use requests::{LoginRequest, UpdateProfileRequest};
pub use responses::{LoginResponse, SessionResponse};
