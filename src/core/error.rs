use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("key import error: {0}")]
    KeyImport(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("token error: {} {detail}", status_label(.status))]
    TokenExchange { status: Option<u16>, detail: String },

    #[error("{operation} {status}")]
    CalendarApi {
        operation: &'static str,
        status: u16,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("command {0} received parameters of another command")]
    ParamMismatch(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl DispatchError {
    /// User-visible reply for a failed request.
    ///
    /// Key problems collapse into one generic line so nothing about the key
    /// material reaches the caller.
    pub fn reply(&self) -> String {
        match self {
            DispatchError::KeyImport(_) | DispatchError::Signing(_) => {
                "오류: 서비스 계정 키를 사용할 수 없습니다.".to_string()
            }
            other => format!("오류: {}", other),
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unreachable".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
