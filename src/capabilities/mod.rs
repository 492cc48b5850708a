//! Capability sets passed to the server as `--default-capabilities`
//!
//! A capability set is an ordered map of names to arbitrary JSON values. It can
//! be rendered either as standard JSON or, for Windows hosts whose argument
//! parser mangles plain double quotes, as a hand-quoted JSON-like string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::capability::{
    APPIUM_PREFIX, BROWSER_NAME, PATH_CAPABILITIES, PLATFORM_NAME,
};
use crate::platform::Platform;

#[cfg(test)]
mod tests;

/// Ordered mapping of capability names to values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a capability, returning the updated set
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_capability(name, value);
        self
    }

    pub fn set_capability(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get_capability(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn platform_name(&self) -> Option<&Value> {
        self.get_capability(PLATFORM_NAME)
            .filter(|value| !value.is_null())
    }

    /// Browser name, or an empty string when none is set
    pub fn browser_name(&self) -> &str {
        self.get_capability(BROWSER_NAME)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Combine two sets; capabilities in `other` win on conflict
    pub fn merge(&self, other: &Capabilities) -> Capabilities {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.0.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Standard JSON, null values included
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// JSON-like rendering with every key and string value wrapped in `\"`.
    ///
    /// Null values are skipped. Path capabilities get forward slashes.
    /// The result is meant for a launcher that passes it to the Windows
    /// command line as-is; a launcher that escapes arguments itself would
    /// double the quoting.
    pub fn to_quoted_cmdline_arg(&self) -> String {
        let entries: Vec<String> = self
            .0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) if is_path_capability(name) => {
                        format!("\\\"{}\\\"", s.replace('\\', "/"))
                    }
                    Value::String(s) => format!("\\\"{}\\\"", s),
                    other => other.to_string(),
                };
                format!("\\\"{}\\\": {}", name, rendered)
            })
            .collect();

        format!("{{{}}}", entries.join(", "))
    }
}

impl FromIterator<(String, Value)> for Capabilities {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Map<String, Value>> for Capabilities {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_path_capability(name: &str) -> bool {
    let bare = name.strip_prefix(APPIUM_PREFIX).unwrap_or(name);
    PATH_CAPABILITIES.contains(&bare)
}

/// Render capabilities as a single command-line token.
///
/// The quoted form is used only when it was requested and the host is Windows.
pub fn capabilities_to_cmdline_arg(
    capabilities: &Capabilities,
    quote_on_windows: bool,
    platform: Platform,
) -> String {
    if quote_on_windows && platform.is_windows() {
        capabilities.to_quoted_cmdline_arg()
    } else {
        capabilities.to_json()
    }
}

/// How strongly a local Appium server supports the given capabilities.
///
/// Zero or less means no particular affinity.
pub fn score(capabilities: &Capabilities) -> i32 {
    let mut score = 0;

    if capabilities.platform_name().is_some() {
        score += 1;
    }

    let browser_name = capabilities.browser_name();
    if ["chrome", "android", "safari"]
        .iter()
        .any(|known| browser_name.eq_ignore_ascii_case(known))
    {
        score += 1;
    }

    score
}
