use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Placeholder shown for any button index or contract code we can't map.
pub const UNKNOWN_LABEL: &str = "...";

/// A player's hand. Discriminants match the `Choice` enum of the BetGame
/// contract, so `code_of` is what ends up on chain.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    Rock = 0,
    Paper = 1,
    Scissors = 2,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn code_of(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Choice> {
        match code {
            0 => Some(Choice::Rock),
            1 => Some(Choice::Paper),
            2 => Some(Choice::Scissors),
            _ => None,
        }
    }

    /// Frame buttons are 1-indexed, in the same order as the contract enum.
    pub fn label_of(button_index: u8) -> ChoiceLabel {
        match button_index.checked_sub(1).and_then(Choice::from_code) {
            Some(choice) => ChoiceLabel::Known(choice),
            None => ChoiceLabel::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Choice::Rock => "Rock",
            Choice::Paper => "Paper",
            Choice::Scissors => "Scissors",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChoiceError(pub String);

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized choice {:?}", self.0)
    }
}

impl std::error::Error for ParseChoiceError {}

impl FromStr for Choice {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Choice::ALL
            .into_iter()
            .find(|choice| choice.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseChoiceError(s.to_owned()))
    }
}

/// Result of decoding a button index or contract code for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceLabel {
    Known(Choice),
    Unknown,
}

impl ChoiceLabel {
    pub fn from_code(code: u8) -> Self {
        Choice::from_code(code).map_or(ChoiceLabel::Unknown, ChoiceLabel::Known)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceLabel::Known(choice) => choice.name(),
            ChoiceLabel::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
