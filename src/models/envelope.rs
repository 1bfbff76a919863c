use serde::{Deserialize, Serialize};

/// `{success, data}` wrapper used by every destination endpoint; list
/// responses add `count`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Envelope {
            success: true,
            count: None,
            data,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        Envelope {
            success: true,
            count: Some(data.len()),
            data,
        }
    }
}

/// Serializes as `{}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}
