use rand::rngs::ThreadRng;
use rand::thread_rng;

use crate::game::{Game, Move};

/// A player in the game: given the observer's view, decide on the next move.
pub trait Agent {
    fn choose_move(&mut self, game: &Game) -> Move;
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Plays a uniformly random valid card and never declares anything.
pub struct RandomAgent {
    pub rng: ThreadRng,
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomAgent {
    pub fn new() -> Self {
        Self { rng: thread_rng() }
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, game: &Game) -> Move {
        let mut hand = game.hand();
        if let Some(played) = game.card_played() {
            if game.is_closed() || game.trump_card().is_none() {
                hand = hand.valid_responses(played, game.trump());
            }
        }

        Move::new(hand.random_card(&mut self.rng))
    }

    fn name(&self) -> String {
        "RandomAgent".to_string()
    }
}
