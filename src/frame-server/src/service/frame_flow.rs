use common::model::{
    choice::{Choice, ChoiceLabel},
    frame::{FrameStatus, InboundRequest, Intent, RenderDescriptor, StepId, Tone, View},
};

use crate::{model::internal::GameResult, service::game_result::GameResultResolver};

pub const WELCOME: &str = "Welcome to Rock, Paper, Scissors!";
pub const CHECK_RESULT: &str = "Check Result";
pub const PLAY_AGAIN: &str = "Play Again";
pub const ADDRESS_PLACEHOLDER: &str = "Enter your wallet address (0x...)";

// Button 4 on the start frame, after the three wagers
const CHECK_RESULT_BUTTON: u8 = 4;

/// The frame state machine. Every decision is made from the request alone;
/// nothing survives between calls.
#[derive(Clone)]
pub struct FrameFlowController {
    resolver: GameResultResolver,
}

impl FrameFlowController {
    pub fn new(resolver: GameResultResolver) -> Self {
        FrameFlowController { resolver }
    }

    pub async fn handle(&self, request: &InboundRequest) -> RenderDescriptor {
        match request.step {
            StepId::Start => Self::start(request),
            StepId::CollectAddress => Self::collect_address(),
            StepId::ShowResult => {
                // The address only ever arrives as this request's text input
                let address = request.input_text.as_deref().unwrap_or_default();
                let result = self.resolver.resolve(address).await;
                Self::show_result(address.trim(), &result)
            }
        }
    }

    /// "Play again": a fresh start frame, nothing carried over.
    pub fn reset() -> RenderDescriptor {
        Self::start(&InboundRequest::initial(StepId::Start))
    }

    fn start(request: &InboundRequest) -> RenderDescriptor {
        match (request.status, request.button_index) {
            (FrameStatus::Initial, _) => RenderDescriptor {
                view: View {
                    headline: WELCOME.to_owned(),
                    details: vec![],
                    tone: Tone::Neutral,
                },
                next_action: StepId::Start,
                valid_inputs: Self::wager_intents(),
            },
            (FrameStatus::Response, Some(CHECK_RESULT_BUTTON)) => Self::collect_address(),
            (FrameStatus::Response, button_index) => {
                // A missing or odd index is normal (e.g. a bare callback)
                let label = button_index.map_or(ChoiceLabel::Unknown, Choice::label_of);
                RenderDescriptor {
                    view: View {
                        headline: format!("You chose {}. Please wait for an opponent...", label),
                        details: vec![],
                        tone: Tone::Highlight,
                    },
                    next_action: StepId::CollectAddress,
                    valid_inputs: Self::wager_intents(),
                }
            }
        }
    }

    fn collect_address() -> RenderDescriptor {
        RenderDescriptor {
            view: View {
                headline: "Check your result".to_owned(),
                details: vec!["Enter the wallet address you placed your bet with.".to_owned()],
                tone: Tone::Neutral,
            },
            next_action: StepId::ShowResult,
            valid_inputs: vec![
                Intent::TextInput {
                    placeholder: ADDRESS_PLACEHOLDER.to_owned(),
                },
                Intent::Action {
                    label: CHECK_RESULT.to_owned(),
                    target: StepId::ShowResult,
                },
            ],
        }
    }

    fn show_result(address: &str, result: &GameResult) -> RenderDescriptor {
        let play_again = Intent::Reset {
            label: PLAY_AGAIN.to_owned(),
        };
        if let Some(error) = &result.error {
            return RenderDescriptor {
                view: View {
                    headline: "Result unavailable".to_owned(),
                    details: vec![error.clone()],
                    tone: Tone::Warning,
                },
                next_action: StepId::Start,
                valid_inputs: vec![
                    Intent::Action {
                        label: "Try Again".to_owned(),
                        target: StepId::CollectAddress,
                    },
                    play_again,
                ],
            };
        }
        if result.is_pending() {
            return RenderDescriptor {
                view: View {
                    headline: "Waiting for results...".to_owned(),
                    details: vec![format!("No finished game for {} yet.", address)],
                    tone: Tone::Neutral,
                },
                next_action: StepId::Start,
                valid_inputs: vec![play_again],
            };
        }
        RenderDescriptor {
            view: View {
                headline: "Game Result".to_owned(),
                details: vec![
                    format!("Player 1 chose {} ({})", result.player1_choice, result.player1),
                    format!("Player 2 chose {} ({})", result.player2_choice, result.player2),
                    format!("Winner: {}", result.winner),
                    format!("Reward: {} ETH", result.reward),
                ],
                tone: Tone::Highlight,
            },
            next_action: StepId::Start,
            valid_inputs: vec![play_again],
        }
    }

    fn wager_intents() -> Vec<Intent> {
        Choice::ALL
            .into_iter()
            .map(|choice| Intent::Transaction {
                label: choice.name().to_owned(),
                choice,
            })
            .chain([Intent::Action {
                label: CHECK_RESULT.to_owned(),
                target: StepId::CollectAddress,
            }])
            .collect()
    }
}
