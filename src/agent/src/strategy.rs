use common::model::choice::Choice;
use rand::seq::SliceRandom;

/// One wager the agent placed, and what the frame told it afterwards.
#[derive(Debug, Clone)]
pub struct Round {
    pub my_choice: Choice,
    pub headline: String,
}

pub trait Strategy {
    fn make_move(&self, history: &[Round]) -> Choice;
}

// Trivial strategies
pub struct OnlyRock {}
impl Strategy for OnlyRock {
    fn make_move(&self, _: &[Round]) -> Choice {
        Choice::Rock
    }
}
pub struct OnlyPaper {}
impl Strategy for OnlyPaper {
    fn make_move(&self, _: &[Round]) -> Choice {
        Choice::Paper
    }
}
pub struct OnlyScissors {}
impl Strategy for OnlyScissors {
    fn make_move(&self, _: &[Round]) -> Choice {
        Choice::Scissors
    }
}

// Random
pub struct RandomMove {}
impl Strategy for RandomMove {
    fn make_move(&self, _: &[Round]) -> Choice {
        Choice::ALL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(Choice::Rock)
    }
}

/// Rock, then Paper, then Scissors, then around again.
pub struct Cycle {}
impl Strategy for Cycle {
    fn make_move(&self, history: &[Round]) -> Choice {
        match history.last() {
            None => Choice::Rock,
            Some(round) => Choice::from_code((round.my_choice.code_of() + 1) % 3)
                .unwrap_or(Choice::Rock),
        }
    }
}

pub fn by_name(name: &str) -> Option<Box<dyn Strategy>> {
    match name.to_lowercase().as_str() {
        "rock" => Some(Box::new(OnlyRock {})),
        "paper" => Some(Box::new(OnlyPaper {})),
        "scissors" => Some(Box::new(OnlyScissors {})),
        "random" => Some(Box::new(RandomMove {})),
        "cycle" => Some(Box::new(Cycle {})),
        _ => None,
    }
}
