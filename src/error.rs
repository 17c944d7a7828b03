use thiserror::Error;
use wasm_bindgen::JsValue;

/// Host plumbing failures. The countdown and particle maths cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("2d canvas context unavailable")]
    NoContext,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid site config: {0}")]
    InvalidConfig(String),
    #[error("scheduler is already running")]
    AlreadyRunning,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
