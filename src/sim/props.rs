/// Key/value access to the level table.
///
/// Keys are dotted paths into a TOML document (`level1.platforms`).
/// Lookups never fail: a missing or mistyped key logs a warning and yields
/// the default (empty string, zero, empty list).

use std::path::Path;

use toml::{Table, Value};

use crate::error::LevelError;

pub struct Props {
    root: Table,
}

impl Props {
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        Ok(Props { root: text.parse::<Table>()? })
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut value = self.root.get(parts.next()?)?;
        for part in parts {
            value = value.get(part)?;
        }
        Some(value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> String {
        match self.lookup(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                log::warn!("`{key}` should be a string, found {}; using \"\"", other.type_str());
                String::new()
            }
            None => {
                log::warn!("missing key `{key}`; using \"\"");
                String::new()
            }
        }
    }

    /// Numbers may be written as integers, floats or numeric strings.
    pub fn get_f64(&self, key: &str) -> f64 {
        let parsed = match self.lookup(key) {
            Some(Value::Integer(i)) => Some(*i as f64),
            Some(Value::Float(f)) => Some(*f),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
            None => {
                log::warn!("missing key `{key}`; using 0");
                return 0.0;
            }
        };
        parsed.unwrap_or_else(|| {
            log::warn!("`{key}` is not a number; using 0");
            0.0
        })
    }

    /// A list of entries: either a TOML array of strings, or one string
    /// with entries separated by `;`.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.lookup(key) {
            Some(Value::String(s)) => s.split(';')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::Array(items)) => self.strings_of(key, items),
            Some(other) => {
                log::warn!("`{key}` should be a list, found {}; using []", other.type_str());
                vec![]
            }
            None => {
                log::warn!("missing key `{key}`; using []");
                vec![]
            }
        }
    }

    /// Whole-record entries (records may contain `;` themselves): a TOML
    /// array of strings, or a single string holding one record.
    pub fn get_records(&self, key: &str) -> Vec<String> {
        match self.lookup(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => self.strings_of(key, items),
            Some(other) => {
                log::warn!("`{key}` should be an array of records, found {}; using []", other.type_str());
                vec![]
            }
            None => {
                log::warn!("missing key `{key}`; using []");
                vec![]
            }
        }
    }

    fn strings_of(&self, key: &str, items: &[Value]) -> Vec<String> {
        items.iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => {
                    log::warn!("skipping non-string entry in `{key}`: {other}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [level1]
        name = "Girders"
        player = "100,728"
        count = 3
        scale = "2.5"
        platforms = "50,758; 150,758 ;"
        monkeys = ["500,630;right;100,100", "300,530;left;60,60"]
        weird = 12
    "#;

    #[test]
    fn dotted_lookups() {
        let props = Props::parse(SAMPLE).unwrap();
        assert!(props.has("level1"));
        assert!(props.has("level1.player"));
        assert!(!props.has("level2"));
        assert_eq!(props.get_str("level1.name"), "Girders");
    }

    #[test]
    fn missing_and_mistyped_fall_back() {
        let props = Props::parse(SAMPLE).unwrap();
        assert_eq!(props.get_str("level1.nothing"), "");
        assert_eq!(props.get_str("level1.weird"), "");
        assert_eq!(props.get_f64("level1.name"), 0.0);
        assert_eq!(props.get_f64("level9.speed"), 0.0);
        assert!(props.get_list("level1.weird").is_empty());
    }

    #[test]
    fn numbers_in_any_form() {
        let props = Props::parse(SAMPLE).unwrap();
        assert_eq!(props.get_f64("level1.count"), 3.0);
        assert_eq!(props.get_f64("level1.scale"), 2.5);
    }

    #[test]
    fn lists_and_records() {
        let props = Props::parse(SAMPLE).unwrap();
        assert_eq!(props.get_list("level1.platforms"), vec!["50,758", "150,758"]);
        let records = props.get_records("level1.monkeys");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], "500,630;right;100,100");
        assert_eq!(props.get_records("level1.player"), vec!["100,728"]);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(Props::parse("[level1"), Err(LevelError::Parse(_))));
    }
}
