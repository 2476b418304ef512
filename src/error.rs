use chrono::Duration;
use thiserror::Error;

/// Outcome taxonomy for every state-machine operation. Domain-rule variants
/// are expected results rendered back to the caller; `Actuator` and `Storage`
/// are the only variants that count as system failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("this command is for admins only")]
    PermissionDenied,

    #[error("you are missing the role required to buy this item")]
    MissingRequiredRole,

    #[error("cooldown active, try again in {}", human_duration(.0))]
    CooldownActive(Duration),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("you cannot pay yourself")]
    SelfTransfer,

    #[error("no open ticket is attached to this channel")]
    NotATicketChannel,

    #[error("platform call failed: {0}")]
    Actuator(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl CoreError {
    /// Domain-rule rejections are user-facing outcomes, not system errors.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Actuator(_) | Self::Storage(_))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

fn human_duration(d: &Duration) -> String {
    let secs = d.num_seconds().max(0);
    if secs >= 86_400 {
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3600)
    } else if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
