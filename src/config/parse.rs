use nom::{
    IResult,
    Parser,
    bytes::complete::take_while1,
    character::complete::char,
    multi::separated_list1,
    sequence::separated_pair,
};

use crate::config::{AbortSeverity, ConfigError, Response, TamperConfig};
use crate::noise::NoiseRange;
use crate::row::RelationId;

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_value_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn key(input: &str) -> IResult<&str, &str> {
    take_while1(is_key_char).parse(input)
}

fn value(input: &str) -> IResult<&str, &str> {
    take_while1(is_value_char).parse(input)
}

fn pair(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(key, char('='), value).parse(input)
}

fn target_expr(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    separated_list1(char('&'), pair).parse(input)
}

fn bad_value(key: &str, value: &str) -> ConfigError {
    ConfigError::Value {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn assemble(pairs: Vec<(&str, &str)>) -> Result<TamperConfig, ConfigError> {
    let mut cfg = TamperConfig::new();

    for (key, value) in pairs {
        cfg = match key {
            "relation" => {
                let id: u32 = value.parse().map_err(|_| bad_value(key, value))?;
                cfg.relation(RelationId(id))
            }
            "column" => {
                let position: u32 = value.parse().map_err(|_| bad_value(key, value))?;
                cfg.column(position)
            }
            "mode" => {
                let response = match value {
                    "corrupt" => Response::Corrupt,
                    "abort" => Response::Abort(AbortSeverity::Statement),
                    "abort-session" => Response::Abort(AbortSeverity::Session),
                    _ => return Err(bad_value(key, value)),
                };
                cfg.response(response)
            }
            "noise" => {
                let magnitude: u32 = value.parse().map_err(|_| bad_value(key, value))?;
                cfg.noise(NoiseRange::symmetric(magnitude))
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
    }

    Ok(cfg)
}

pub fn parse(spec: &str) -> Result<TamperConfig, ConfigError> {
    let trimmed = spec.trim();
    match target_expr(trimmed) {
        Ok(("", pairs)) => assemble(pairs),
        Ok((rest, _)) => Err(ConfigError::Parse(format!("unexpected trailing: {rest}"))),
        Err(e) => Err(ConfigError::Parse(format!("parse error: {e}"))),
    }
}
