//! Change notifications.
//!
//! The accessor fires one [`ConfigChanged`] per successful set or unset.
//! Delivery beyond that (event buses, UI refresh, plugin callbacks) is the
//! listener's business.

use serde::{Deserialize, Serialize};

/// A configuration entry changed. Values are the stored string forms;
/// `None` means no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChanged {
    pub group: String,
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

pub trait ChangeListener: Send + Sync {
    fn on_config_changed(&self, event: &ConfigChanged);
}

impl<F> ChangeListener for F
where
    F: Fn(&ConfigChanged) + Send + Sync,
{
    fn on_config_changed(&self, event: &ConfigChanged) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_listeners() {
        let seen = Mutex::new(Vec::new());
        let listener = |event: &ConfigChanged| seen.lock().unwrap().push(event.key.clone());
        listener.on_config_changed(&ConfigChanged {
            group: "boosts".into(),
            key: "maxItems".into(),
            old_value: None,
            new_value: Some("7".into()),
        });
        assert_eq!(*seen.lock().unwrap(), vec!["maxItems".to_string()]);
    }

    #[test]
    fn event_serializes_without_absent_values() {
        let event = ConfigChanged {
            group: "boosts".into(),
            key: "maxItems".into(),
            old_value: None,
            new_value: Some("7".into()),
        };
        let text = toml::to_string(&event).unwrap();
        assert!(text.contains("new_value = \"7\""));
        assert!(!text.contains("old_value"));

        let back: ConfigChanged = toml::from_str(&text).unwrap();
        assert_eq!(back, event);
    }
}
