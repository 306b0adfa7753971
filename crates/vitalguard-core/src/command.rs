//! Wearer command parsing with optional PIN gating.
//!
//! Commands arrive as free-form text lines: a case-insensitive verb and an
//! optional whitespace-separated PIN token. When a PIN is configured it is
//! validated before the verb is even considered, so a gated line with a
//! bad PIN can never confirm safety or end the session.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Recognized command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `YES` - safety confirmation.
    Yes,
    /// `REMOVE` - request to end the session.
    Remove,
    /// Anything else.
    Other,
}

/// Result of checking the PIN token on a parsed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCheck {
    /// No PIN configured for this session.
    NotRequired,
    /// Provided token matches the configured PIN.
    Valid,
    /// PIN configured but no token provided.
    Missing,
    /// Provided token does not match.
    Mismatch,
}

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The command verb.
    pub kind: CommandKind,
    /// PIN gate result for this line.
    pub pin: PinCheck,
}

impl ParsedCommand {
    /// Whether the PIN gate passed (or was not required).
    pub fn pin_accepted(&self) -> bool {
        matches!(self.pin, PinCheck::NotRequired | PinCheck::Valid)
    }
}

/// Why a prompt response resolved to unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectReason {
    /// Empty or whitespace-only input.
    Empty,
    /// PIN required but not provided.
    MissingPin,
    /// Provided PIN does not match.
    WrongPin,
    /// Verb was not YES (or the wearer answered something else).
    Unrecognized,
}

/// How a confirmation-prompt line resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReply {
    /// Valid safety confirmation.
    Confirmed,
    /// Conservative fallback: the line does not establish safety.
    Unsafe(RejectReason),
    /// Valid removal request; the session must run the final safety check
    /// and end.
    Terminate,
}

/// Split a line into verb and PIN gate result.
///
/// Returns `None` for empty input.
pub fn parse_command(line: &str, required_pin: Option<&str>) -> Option<ParsedCommand> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;

    let kind = if verb.eq_ignore_ascii_case("yes") {
        CommandKind::Yes
    } else if verb.eq_ignore_ascii_case("remove") {
        CommandKind::Remove
    } else {
        CommandKind::Other
    };

    let pin = match required_pin {
        None => PinCheck::NotRequired,
        Some(expected) => match parts.next() {
            None => PinCheck::Missing,
            Some(token) if token == expected => PinCheck::Valid,
            Some(_) => PinCheck::Mismatch,
        },
    };

    Some(ParsedCommand { kind, pin })
}

/// Resolve a confirmation-prompt line. PIN first, verb second.
pub fn classify_prompt_reply(line: &str, required_pin: Option<&str>) -> PromptReply {
    let Some(command) = parse_command(line, required_pin) else {
        return PromptReply::Unsafe(RejectReason::Empty);
    };
    match command.pin {
        PinCheck::Missing => return PromptReply::Unsafe(RejectReason::MissingPin),
        PinCheck::Mismatch => return PromptReply::Unsafe(RejectReason::WrongPin),
        PinCheck::NotRequired | PinCheck::Valid => {}
    }
    match command.kind {
        CommandKind::Remove => PromptReply::Terminate,
        CommandKind::Yes => PromptReply::Confirmed,
        CommandKind::Other => PromptReply::Unsafe(RejectReason::Unrecognized),
    }
}

/// Whether a final-safety-check line is an affirmative answer. The final
/// check is not PIN gated; a trailing token is ignored.
pub fn is_affirmative(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .map_or(false, |verb| verb.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_are_case_insensitive() {
        let cmd = parse_command("yes", None).unwrap();
        assert_eq!(cmd.kind, CommandKind::Yes);
        let cmd = parse_command("ReMoVe", None).unwrap();
        assert_eq!(cmd.kind, CommandKind::Remove);
        let cmd = parse_command("maybe", None).unwrap();
        assert_eq!(cmd.kind, CommandKind::Other);
    }

    #[test]
    fn empty_input_does_not_parse() {
        assert!(parse_command("", None).is_none());
        assert!(parse_command("   ", Some("1234")).is_none());
    }

    #[test]
    fn pin_gate_states() {
        assert_eq!(parse_command("YES", None).unwrap().pin, PinCheck::NotRequired);
        assert_eq!(
            parse_command("YES 1234", Some("1234")).unwrap().pin,
            PinCheck::Valid
        );
        assert_eq!(
            parse_command("YES", Some("1234")).unwrap().pin,
            PinCheck::Missing
        );
        assert_eq!(
            parse_command("YES 9999", Some("1234")).unwrap().pin,
            PinCheck::Mismatch
        );
    }

    #[test]
    fn gated_yes_never_confirms_without_valid_pin() {
        assert_eq!(
            classify_prompt_reply("YES", Some("1234")),
            PromptReply::Unsafe(RejectReason::MissingPin)
        );
        assert_eq!(
            classify_prompt_reply("YES 0000", Some("1234")),
            PromptReply::Unsafe(RejectReason::WrongPin)
        );
        assert_eq!(
            classify_prompt_reply("YES 1234", Some("1234")),
            PromptReply::Confirmed
        );
    }

    #[test]
    fn pin_checked_before_verb() {
        // A gibberish verb with a bad PIN reports the PIN failure, matching
        // the gate-first resolution order.
        assert_eq!(
            classify_prompt_reply("what 0000", Some("1234")),
            PromptReply::Unsafe(RejectReason::WrongPin)
        );
    }

    #[test]
    fn remove_terminates_when_gate_passes() {
        assert_eq!(classify_prompt_reply("REMOVE", None), PromptReply::Terminate);
        assert_eq!(
            classify_prompt_reply("remove 1234", Some("1234")),
            PromptReply::Terminate
        );
        assert_eq!(
            classify_prompt_reply("REMOVE 9999", Some("1234")),
            PromptReply::Unsafe(RejectReason::WrongPin)
        );
    }

    #[test]
    fn garbled_input_is_unsafe() {
        assert_eq!(
            classify_prompt_reply("", None),
            PromptReply::Unsafe(RejectReason::Empty)
        );
        assert_eq!(
            classify_prompt_reply("help me", None),
            PromptReply::Unsafe(RejectReason::Unrecognized)
        );
    }

    #[test]
    fn affirmative_ignores_pin_token() {
        assert!(is_affirmative("YES"));
        assert!(is_affirmative("yes 1234"));
        assert!(is_affirmative("  Yes  "));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative(""));
    }
}
