pub mod response;

use regex::Regex;
use serenity::model::prelude::interaction::application_command::{
    CommandDataOption, CommandDataOptionValue,
};
use serenity::model::prelude::{PartialChannel, Role};
use serenity::model::user::User;

use crate::error::CoreError;

fn resolved<'a>(
    options: &'a [CommandDataOption],
    name: &str,
) -> Option<&'a CommandDataOptionValue> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.resolved.as_ref())
}

pub fn req_user<'a>(options: &'a [CommandDataOption], name: &str) -> Result<&'a User, CoreError> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::User(user, _member)) => Ok(user),
        _ => Err(CoreError::Validation(format!("no {name} provided"))),
    }
}

pub fn req_string<'a>(options: &'a [CommandDataOption], name: &str) -> Result<&'a str, CoreError> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::String(value)) => Ok(value),
        _ => Err(CoreError::Validation(format!("no {name} provided"))),
    }
}

pub fn opt_string<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a str> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::String(value)) => Some(value.as_str()),
        _ => None,
    }
}

pub fn req_integer(options: &[CommandDataOption], name: &str) -> Result<i64, CoreError> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::Integer(value)) => Ok(*value),
        _ => Err(CoreError::Validation(format!("no {name} provided"))),
    }
}

pub fn opt_bool(options: &[CommandDataOption], name: &str) -> Option<bool> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::Boolean(value)) => Some(*value),
        _ => None,
    }
}

pub fn opt_role<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a Role> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::Role(role)) => Some(role),
        _ => None,
    }
}

pub fn opt_channel<'a>(
    options: &'a [CommandDataOption],
    name: &str,
) -> Option<&'a PartialChannel> {
    match resolved(options, name) {
        Some(CommandDataOptionValue::Channel(channel)) => Some(channel),
        _ => None,
    }
}

/// Amounts must be strictly positive before they reach the ledger, so
/// balances can never be driven below zero.
pub fn positive_amount(amount: i64, what: &str) -> Result<i64, CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!("{what} must be positive")));
    }
    Ok(amount)
}

pub fn non_negative_price(price: i64) -> Result<i64, CoreError> {
    if price < 0 {
        return Err(CoreError::Validation("price cannot be negative".to_owned()));
    }
    Ok(price)
}

/// Mute durations are free-form strings like `10m` or `2h`; only the shape is
/// validated, the record stores them verbatim.
pub fn validate_duration(raw: &str) -> Result<(), CoreError> {
    let Ok(pattern) = Regex::new(r"^\d+[smhd]$") else {
        return Err(CoreError::Validation("bad duration pattern".to_owned()));
    };
    if !pattern.is_match(raw) {
        return Err(CoreError::Validation(format!(
            "invalid duration `{raw}`, use forms like 30s, 10m, 2h, 1d"
        )));
    }
    Ok(())
}

/// 1-based position as typed by a user → 0-based index used by the catalog.
pub fn position_to_index(position: i64) -> Result<usize, CoreError> {
    if position < 1 {
        return Err(CoreError::Validation(
            "item number must be 1 or higher".to_owned(),
        ));
    }
    Ok((position - 1) as usize)
}
