use serde::{Deserialize, Serialize};

use crate::settings::SettingsPatch;

/// Runtime messages exchanged between the popup, background and content
/// scripts, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Message {
    SkipEffect,
    GetSettings,
    UpdateSettings {
        #[serde(default)]
        payload: SettingsPatch,
    },
}

/// Keyboard commands declared in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleExtension,
    SkipEffect,
}

impl Command {
    pub fn parse(name: &str) -> Option<Command> {
        match name {
            "toggle-extension" => Some(Command::ToggleExtension),
            "skip-effect" => Some(Command::SkipEffect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::settings::Speed;

    #[test]
    fn decodes_tagged_messages() {
        let skip: Message = serde_json::from_value(json!({ "type": "skip-effect" })).unwrap();
        assert_eq!(skip, Message::SkipEffect);

        let update: Message = serde_json::from_value(json!({
            "type": "update-settings",
            "payload": { "speed": "fast" },
        }))
        .unwrap();
        assert_eq!(
            update,
            Message::UpdateSettings {
                payload: SettingsPatch {
                    speed: Some(Speed::Fast),
                    ..SettingsPatch::default()
                },
            }
        );
    }

    #[test]
    fn skip_message_encodes_like_the_extension_expects() {
        assert_eq!(
            serde_json::to_value(Message::SkipEffect).unwrap(),
            json!({ "type": "skip-effect" })
        );
    }

    #[test]
    fn unknown_messages_and_commands_are_rejected() {
        assert!(serde_json::from_value::<Message>(json!({ "type": "reload" })).is_err());
        assert_eq!(Command::parse("skip-effect"), Some(Command::SkipEffect));
        assert_eq!(Command::parse("_execute_action"), None);
    }
}
