use crate::error::CoreError;

#[derive(Default)]
pub enum ResponseType {
    Error,
    Invalid,
    Warning,
    #[default]
    Normal,
}

impl ResponseType {
    fn emoji(&self) -> &'static str {
        match self {
            ResponseType::Error => "❌",
            ResponseType::Invalid => "🚫",
            ResponseType::Warning => "⏳",
            ResponseType::Normal => "",
        }
    }

    fn for_error(err: &CoreError) -> Self {
        match err {
            CoreError::Validation(_) => Self::Invalid,
            CoreError::CooldownActive(_) => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// One short user-facing line per rejected operation. Storage problems are
/// deliberately generic, no internals leak into chat.
pub fn error_line(err: &CoreError) -> String {
    let kind = ResponseType::for_error(err);
    match err {
        CoreError::Storage(_) => format!("{} Could not save your change, try again.", kind.emoji()),
        _ => format!("{} {}", kind.emoji(), err),
    }
}
