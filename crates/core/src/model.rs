use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl Default for NodeId {
    fn default() -> Self {
        NodeId(0)
    }
}

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A sales figure as it appears in the source document. The published dataset
/// encodes numbers as strings, so both forms are accepted here and validated
/// later by the hierarchy builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// One node of the fetched document: the root dataset, a platform group or a
/// single game record. A childless node carrying a value or a category is a
/// record; one carrying neither is a group with no entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DatasetNode>,
}

pub type Dataset = DatasetNode;

impl DatasetNode {
    pub fn group(name: impl Into<String>, children: Vec<DatasetNode>) -> Self {
        Self {
            name: name.into(),
            category: None,
            value: None,
            children,
        }
    }

    pub fn record(name: impl Into<String>, category: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            category: Some(category.into()),
            value: Some(RawValue::Number(value)),
            children: Vec::new(),
        }
    }

    pub fn is_record(&self) -> bool {
        self.children.is_empty() && (self.value.is_some() || self.category.is_some())
    }
}

/// Validated leaf view handed to the renderer and the tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub name: String,
    pub category: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_and_number_values() {
        let doc = r#"{
            "name": "Video Game Sales Data Top 100",
            "children": [
                { "name": "Wii", "children": [
                    { "name": "Wii Sports", "category": "Wii", "value": "82.53" },
                    { "name": "Mario Kart Wii", "category": "Wii", "value": 35.52 }
                ]}
            ]
        }"#;
        let data: Dataset = serde_json::from_str(doc).unwrap();
        let wii = &data.children[0];
        assert!(!wii.is_record());
        assert!(wii.children[0].is_record());
        assert_eq!(wii.children[0].value.as_ref().and_then(RawValue::parse), Some(82.53));
        assert_eq!(wii.children[1].value.as_ref().and_then(RawValue::parse), Some(35.52));
    }

    #[test]
    fn empty_children_array_is_a_group() {
        let atari: DatasetNode = serde_json::from_str(r#"{ "name": "Atari", "children": [] }"#).unwrap();
        assert!(!atari.is_record());
        let orphan: DatasetNode = serde_json::from_str(r#"{ "name": "Pong", "category": "Sports" }"#).unwrap();
        assert!(orphan.is_record());
    }

    #[test]
    fn non_numeric_text_does_not_parse() {
        assert_eq!(RawValue::Text("lots".into()).parse(), None);
    }
}
