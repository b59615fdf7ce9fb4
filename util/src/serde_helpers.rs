use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serializer};

/// Reads a JSON document, reporting the path of the field that failed to parse.
pub fn load_json_from_file<T, P>(path: P) -> Result<T>
where
    for<'de> T: Deserialize<'de>,
    P: AsRef<Path>,
{
    let data = std::fs::read_to_string(path)?;
    load_json_from_str(&data)
}

pub fn load_json_from_str<T>(data: &str) -> Result<T>
where
    for<'de> T: Deserialize<'de>,
{
    let de = &mut serde_json::Deserializer::from_str(data);
    serde_path_to_error::deserialize(de).map_err(Into::into)
}

/// `Option<Duration>` in humantime notation (`"1h 30m"`).
pub mod humantime_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.collect_str(&humantime::format_duration(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) => humantime::parse_duration(&value)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        name: String,
        #[serde(default, with = "humantime_opt")]
        every: Option<Duration>,
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "name": "a", "every": "1m 30s" }"#).unwrap();

        let settings = load_json_from_file::<Settings, _>(&path).unwrap();
        assert_eq!(settings, Settings {
            name: "a".to_owned(),
            every: Some(Duration::from_secs(90)),
        });

        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"name":"a","every":"1m 30s"}"#);
    }

    #[test]
    fn reports_field_path() {
        let err = load_json_from_str::<Settings>(r#"{ "name": "a", "every": "soon" }"#)
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("every"), "{err}");

        let settings = load_json_from_str::<Settings>(r#"{ "name": "b" }"#).unwrap();
        assert_eq!(settings.every, None);
    }
}
