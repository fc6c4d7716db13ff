//! YAML transcoding: convert a parsed MOT file to YAML text.
//!
//! A property list becomes a sequence (property types may repeat). Each
//! property becomes a mapping:
//!   - `type`       -> the property type word
//!   - `name`       -> the name, when present
//!   - `value`      -> line, quoted or block text, when present
//!   - `properties` -> the nested property list, when present

use libmot::nodes::{PropertyListNode, PropertyNode};
use libmot::{FileNode, MotString};

/// Encode a parsed MOT file as a YAML string.
pub fn encode(file: &FileNode) -> Result<String, String> {
    let yaml_value = property_list_to_yaml(file.property_list())?;
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn property_list_to_yaml(list: &PropertyListNode) -> Result<serde_yaml::Value, String> {
    let items: Result<Vec<serde_yaml::Value>, String> =
        list.properties().iter().map(property_to_yaml).collect();
    Ok(serde_yaml::Value::Sequence(items?))
}

fn property_to_yaml(property: &PropertyNode) -> Result<serde_yaml::Value, String> {
    let declaration = property.declaration();
    let mut map = serde_yaml::Mapping::new();

    if let Some(property_type) = declaration.type_value() {
        map.insert(key("type"), string_to_yaml(property_type)?);
    }
    if let Some(name) = declaration.name_value() {
        map.insert(key("name"), string_to_yaml(name)?);
    }
    if let Some(value) = property.value().and_then(|v| v.value()) {
        map.insert(key("value"), string_to_yaml(value)?);
    }
    if let Some(block) = property.block() {
        map.insert(key("properties"), property_list_to_yaml(block.property_list())?);
    }

    Ok(serde_yaml::Value::Mapping(map))
}

fn key(name: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(name.to_string())
}

fn string_to_yaml(s: &MotString) -> Result<serde_yaml::Value, String> {
    match s.as_str() {
        Some(text) => Ok(serde_yaml::Value::String(text.to_string())),
        None => Err(format!("{:?} is not valid UTF-8", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libmot::{parse_file, FileContent};

    fn to_yaml(text: &str) -> serde_yaml::Value {
        let content = FileContent::new("test.mot", text.as_bytes().to_vec());
        let file = parse_file(&content).unwrap();
        let yaml = encode(&file).unwrap();
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_properties_become_a_sequence() {
        let yaml = to_yaml("PREFIX tools\n    env dev: x\n    env prod: \"y\"\nREPO main\n");
        let items = yaml.as_sequence().unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0]["type"], "PREFIX");
        assert_eq!(items[0]["name"], "tools");
        let nested = items[0]["properties"].as_sequence().unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0]["name"], "dev");
        assert_eq!(nested[0]["value"], "x");
        assert_eq!(nested[1]["value"], "y");

        assert_eq!(items[1]["type"], "REPO");
        assert!(items[1].get("value").is_none());
        assert!(items[1].get("properties").is_none());
    }

    #[test]
    fn test_block_text_value() {
        let yaml = to_yaml("notes>\n    one\n    two\n");
        assert_eq!(yaml[0]["value"], "one\ntwo");
        assert!(yaml[0].get("name").is_none());
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let content = FileContent::new("test.mot", b"ALIAS x: \xff\n".to_vec());
        let file = parse_file(&content).unwrap();
        assert!(encode(&file).is_err());
    }
}
