use serde::{Deserialize, Serialize};

use crate::{EncoderError, EncoderResult};

/// Label encoder fitted at training time: code = position in `classes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn contains(&self, label: &str) -> bool {
        self.classes.iter().any(|c| c == label)
    }

    pub fn transform(&self, label: &str) -> EncoderResult<i64> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|idx| idx as i64)
            .ok_or_else(|| EncoderError::UnknownLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let enc = LabelEncoder::new(["Cold", "Cool", "Hot", "Warm"]);
        assert_eq!(enc.transform("Cold").unwrap(), 0);
        assert_eq!(enc.transform("Hot").unwrap(), 2);
        assert_eq!(enc.transform("Warm").unwrap(), 3);
        assert!(enc.contains("Cool"));
        assert!(matches!(
            enc.transform("Mild"),
            Err(EncoderError::UnknownLabel(l)) if l == "Mild"
        ));
    }

    #[test]
    fn test_artifact_format() {
        let enc: LabelEncoder = serde_json::from_str(r#"{"classes":["1","2","3","4"]}"#).unwrap();
        assert_eq!(enc.transform("3").unwrap(), 2);
    }
}
