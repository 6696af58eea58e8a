

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap();
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileList {
    pub profiles: Vec<String>,
}


#[derive(Error, Debug)]
pub enum ProfileParseError {
    #[error("no JSON object found in model output")]
    NoObject,

    #[error("output does not match {{\"profiles\": [string]}}: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("model returned an empty profile list")]
    Empty,
}


/// Strict parse of `{"profiles": [...]}`. Markdown fences and prose around the
/// object are tolerated; anything else about the shape is not.
pub fn parse_profiles(output: &str) -> Result<Vec<String>, ProfileParseError> {
    let body = CODE_FENCE
        .captures(output)
        .and_then(|c| c.get(1))
        .map_or(output, |m| m.as_str());

    let start = body.find('{').ok_or(ProfileParseError::NoObject)?;
    let end = body.rfind('}').ok_or(ProfileParseError::NoObject)?;
    if end < start {
        return Err(ProfileParseError::NoObject);
    }

    let parsed: ProfileList = serde_json::from_str(&body[start..=end])?;

    let profiles: Vec<String> = parsed
        .profiles
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if profiles.is_empty() {
        return Err(ProfileParseError::Empty);
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let out = r#"{"profiles": ["Cardiologist", "Health Data Scientist"]}"#;
        assert_eq!(
            parse_profiles(out).unwrap(),
            vec!["Cardiologist", "Health Data Scientist"]
        );
    }

    #[test]
    fn test_fenced_object_with_prose() {
        let out = "Sure! Here you go:\n```json\n{\"profiles\": [\" Medical physicist \", \"\"]}\n```\nGood luck.";
        assert_eq!(parse_profiles(out).unwrap(), vec!["Medical physicist"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let out = r#"{"profiles": ["Data Scientist", "Data Scientist"]}"#;
        assert_eq!(parse_profiles(out).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_comma_list() {
        let out = "Cardiologist, Data Scientist, Data security expert";
        assert!(matches!(parse_profiles(out), Err(ProfileParseError::NoObject)));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(matches!(
            parse_profiles(r#"{"experts": ["a"]}"#),
            Err(ProfileParseError::Schema(_))
        ));
        assert!(matches!(
            parse_profiles(r#"{"profiles": "a, b"}"#),
            Err(ProfileParseError::Schema(_))
        ));
        assert!(matches!(
            parse_profiles(r#"{"profiles": []}"#),
            Err(ProfileParseError::Empty)
        ));
    }
}
