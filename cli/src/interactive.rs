//! Prompt loop over a live session.
//!
//! Every edit goes through the same [`QrSession`] as one-shot mode, so clamping, protocol
//! stripping and copy feedback behave identically.

use std::fmt;

use anyhow::Result;
use inquire::{CustomType, InquireError, Select, Text};
use qrbolt_business::{ErrorLevel, MARGIN_RANGE, QrSession, SIZE_RANGE, SettingChange, Settings};
use tracing::{debug, instrument};

use crate::output::Output;
use crate::preview;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Text,
    Size,
    Margin,
    Level,
    Invert,
    Preview,
    Download,
    Copy,
    Quit,
}

impl Action {
    const ALL: [Self; 9] = [
        Self::Text,
        Self::Size,
        Self::Margin,
        Self::Level,
        Self::Invert,
        Self::Preview,
        Self::Download,
        Self::Copy,
        Self::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "Edit text",
            Self::Size => "Change size",
            Self::Margin => "Change margin",
            Self::Level => "Change error correction",
            Self::Invert => "Toggle inverted colors",
            Self::Preview => "Show preview",
            Self::Download => "Download PNG",
            Self::Copy => "Copy data URL",
            Self::Quit => "Quit",
        })
    }
}

/// Runs until the user quits or cancels the action menu.
#[instrument(skip_all, name = "interactive")]
pub async fn run(session: &mut QrSession, out: &Output) -> Result<()> {
    session.settle().await;
    loop {
        session.sync();
        out.session_status(session);

        let Some(action) = optional(Select::new("Action:", Action::ALL.to_vec()).prompt())? else {
            break;
        };
        debug!(%action, "interactive action");

        match action {
            Action::Quit => break,
            Action::Preview => match preview::render(&session.settings()) {
                Ok(rows) if session.render_result().is_ready() => out.print(rows),
                Ok(_) => out.info("Nothing to preview yet."),
                Err(e) => out.error(format!("Preview unavailable: {e}")),
            },
            Action::Download => {
                out.download(&session.request_download().await);
            }
            Action::Copy => out.copy(session.request_copy().await),
            Action::Text | Action::Size | Action::Margin | Action::Level | Action::Invert => {
                if let Some(change) = prompt_change(action, &session.settings())? {
                    session.update_setting(change);
                    session.settle().await;
                }
            }
        }
    }
    Ok(())
}

/// Asks for a new value of the field behind `action`. `None` when the prompt is skipped.
fn prompt_change(action: Action, settings: &Settings) -> Result<Option<SettingChange>> {
    let change = match action {
        Action::Text => optional(
            Text::new("Text or URL:")
                .with_initial_value(&settings.text)
                .prompt(),
        )?
        .map(SettingChange::Text),
        Action::Size => {
            let help = format!("{}-{} px", SIZE_RANGE.start(), SIZE_RANGE.end());
            optional(
                CustomType::<i64>::new("Size:")
                    .with_default(i64::from(settings.size))
                    .with_help_message(&help)
                    .prompt(),
            )?
            .map(SettingChange::Size)
        }
        Action::Margin => {
            let help = format!("{}-{} modules", MARGIN_RANGE.start(), MARGIN_RANGE.end());
            optional(
                CustomType::<i64>::new("Margin:")
                    .with_default(i64::from(settings.margin))
                    .with_help_message(&help)
                    .prompt(),
            )?
            .map(SettingChange::Margin)
        }
        Action::Level => {
            let labels: Vec<String> = ErrorLevel::ALL
                .iter()
                .map(|level| format!("{level}  {}", level.helper()))
                .collect();
            let cursor = ErrorLevel::ALL
                .iter()
                .position(|level| *level == settings.level)
                .unwrap_or_default();
            optional(
                Select::new("Error correction:", labels)
                    .with_starting_cursor(cursor)
                    .raw_prompt(),
            )?
            .and_then(|choice| ErrorLevel::ALL.get(choice.index).copied())
            .map(SettingChange::Level)
        }
        Action::Invert => Some(SettingChange::Inverted(!settings.inverted)),
        Action::Preview | Action::Download | Action::Copy | Action::Quit => None,
    };
    Ok(change)
}

/// Treats Esc and Ctrl-C as "no answer".
fn optional<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_every_action_once() {
        let labels: Vec<String> = Action::ALL.iter().map(ToString::to_string).collect();
        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();

        assert_eq!(unique.len(), labels.len());
        assert_eq!(Action::ALL.last(), Some(&Action::Quit));
    }

    #[test]
    fn test_invert_toggles_without_prompt() {
        let settings = Settings::default();
        let change = prompt_change(Action::Invert, &settings).expect("no prompt needed");
        assert_eq!(change, Some(SettingChange::Inverted(true)));
    }

    #[test]
    fn test_non_field_actions_produce_no_change() {
        let settings = Settings::default();
        for action in [Action::Preview, Action::Download, Action::Copy, Action::Quit] {
            assert_eq!(prompt_change(action, &settings).expect("no prompt"), None);
        }
    }

    #[test]
    fn test_cancel_is_not_an_error() {
        let answer: Result<i64, InquireError> = Err(InquireError::OperationCanceled);
        assert!(matches!(optional(answer), Ok(None)));

        let answer: Result<i64, InquireError> = Err(InquireError::NotTTY);
        assert!(optional(answer).is_err());
    }
}
