//! Deserializers accepting the loosely typed values found in old records.
//!
//! Numbers may be stored as JSON numbers or as strings (`"7"`, `"82.5"`), flags as booleans or
//! as `"yes"`/`"no"`. An empty string or `null` reads as absent.

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Number(f64),
    Text(String),
}

fn number<'de, D: Deserializer<'de>>(loose: Option<Loose>) -> Result<Option<f64>, D::Error> {
    match loose {
        None => Ok(None),
        Some(Loose::Number(n)) => Ok(Some(n)),
        Some(Loose::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.replace(',', ".")
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid number \"{text}\"")))
            }
        }
        Some(Loose::Bool(b)) => Err(D::Error::custom(format!(
            "expected number, found boolean {b}"
        ))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integer<'de, D: Deserializer<'de>>(value: f64, max: f64) -> Result<u64, D::Error> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded > max {
        return Err(D::Error::custom(format!("integer out of range: {value}")));
    }
    Ok(rounded as u64)
}

pub fn option_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    number::<D>(Option::<Loose>::deserialize(deserializer)?)?
        .map(|n| integer::<D>(n, f64::from(u8::MAX)).map(|n| u8::try_from(n).unwrap_or(u8::MAX)))
        .transpose()
}

pub fn option_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    number::<D>(Option::<Loose>::deserialize(deserializer)?)?
        .map(|n| {
            integer::<D>(n, f64::from(u32::MAX)).map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        })
        .transpose()
}

pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(option_u32(deserializer)?.unwrap_or_default())
}

#[allow(clippy::cast_possible_truncation)]
pub fn option_f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    number::<D>(Option::<Loose>::deserialize(deserializer)?).map(|n| n.map(|n| n as f32))
}

pub fn f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(option_f32(deserializer)?.unwrap_or_default())
}

pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Loose::Bool(b)) => Ok(b),
        Some(Loose::Number(n)) => Ok(n != 0.0),
        Some(Loose::Text(text)) => match text.trim().to_lowercase().as_str() {
            "yes" | "true" | "y" | "1" => Ok(true),
            "no" | "false" | "n" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid flag \"{other}\""))),
        },
    }
}

pub fn option_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => None,
        Some(Loose::Text(text)) if text.is_empty() => None,
        Some(Loose::Text(text)) => Some(text),
        Some(Loose::Number(n)) => Some(n.to_string()),
        Some(Loose::Bool(b)) => Some(b.to_string()),
    })
}

pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    option_text(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Sample {
        #[serde(default, deserialize_with = "option_u8")]
        level: Option<u8>,
        #[serde(default, deserialize_with = "option_f32")]
        weight: Option<f32>,
        #[serde(default, deserialize_with = "flag")]
        sick: bool,
        #[serde(default, deserialize_with = "option_text")]
        time: Option<String>,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Named {
        #[serde(default, deserialize_with = "text")]
        name: String,
    }

    #[rstest]
    #[case::typed(
        json!({"level": 7, "weight": 82.5, "sick": true, "time": "07:30"}),
        Sample { level: Some(7), weight: Some(82.5), sick: true, time: Some("07:30".to_string()) }
    )]
    #[case::strings(
        json!({"level": "7", "weight": "82.5", "sick": "yes", "time": "07:30"}),
        Sample { level: Some(7), weight: Some(82.5), sick: true, time: Some("07:30".to_string()) }
    )]
    #[case::decimal_comma(
        json!({"weight": "82,5", "sick": "no"}),
        Sample { level: None, weight: Some(82.5), sick: false, time: None }
    )]
    #[case::empty_strings(
        json!({"level": "", "weight": "", "sick": "", "time": ""}),
        Sample { level: None, weight: None, sick: false, time: None }
    )]
    #[case::nulls(
        json!({"level": null, "weight": null, "sick": null, "time": null}),
        Sample { level: None, weight: None, sick: false, time: None }
    )]
    #[case::missing(json!({}), Sample { level: None, weight: None, sick: false, time: None })]
    fn test_lenient_values(#[case] value: serde_json::Value, #[case] expected: Sample) {
        assert_eq!(serde_json::from_value::<Sample>(value).unwrap(), expected);
    }

    #[rstest]
    #[case::negative(json!({"level": -1}))]
    #[case::too_large(json!({"level": 256}))]
    #[case::not_a_number(json!({"level": "high"}))]
    #[case::invalid_flag(json!({"sick": "maybe"}))]
    #[case::boolean_number(json!({"weight": true}))]
    fn test_lenient_values_invalid(#[case] value: serde_json::Value) {
        assert!(serde_json::from_value::<Sample>(value).is_err());
    }

    #[rstest]
    #[case::text(json!({"name": "Kim"}), "Kim")]
    #[case::null(json!({"name": null}), "")]
    #[case::number(json!({"name": 42}), "42")]
    #[case::missing(json!({}), "")]
    fn test_lenient_text(#[case] value: serde_json::Value, #[case] expected: &str) {
        assert_eq!(
            serde_json::from_value::<Named>(value).unwrap(),
            Named {
                name: expected.to_string()
            }
        );
    }
}
