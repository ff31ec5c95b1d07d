use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attrs {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Principal {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), attrs: Attrs::default() }
    }
}
