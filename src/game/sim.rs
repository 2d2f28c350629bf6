use std::fmt::Display;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards::{stronger_card, Card, CardSet, Rank, Suit};

/// Number of face-down stack cards at the start of a game
/// (24 cards minus two hands of six minus the face-up trump card).
pub const FULL_STACK: usize = 11;

/// One choice available to the player on turn: place a card on the table and
/// optionally close the game first.
///
/// Exchanging the nine of trump for the face-up trump card is encoded as
/// playing the face-up card itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Action {
    pub card: Card,
    pub close_game: bool,
}

impl Action {
    pub fn play(card: Card) -> Self {
        Self {
            card,
            close_game: false,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.close_game {
            write!(f, "{}+close", self.card)
        } else {
            write!(f, "{}", self.card)
        }
    }
}

/// A fully observable two player game used inside the search.
///
/// Unlike the observer's view both hands and the order of the face-down
/// stack are concrete. Scores and flags are kept from the observer's
/// perspective: `hand` and `score` belong to the observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimGame {
    pub score: u16,
    pub opponent_score: u16,
    pub trump: Suit,
    pub hand: CardSet,
    pub opponent_hand: CardSet,
    /// Face-down stack, top of the stack last.
    pub stack: Vec<Card>,
    pub trump_card: Option<Card>,
    pub card_played: Option<Card>,
    pub is_opponent_move: bool,
    pub is_closed: bool,
}

impl SimGame {
    /// The hand of the player currently on turn.
    pub fn hand_to_move(&self) -> CardSet {
        if self.is_opponent_move {
            self.opponent_hand
        } else {
            self.hand
        }
    }

    fn nine_of_trump(&self) -> Card {
        Card::new(Rank::Nine, self.trump)
    }

    /// The window in which closing and switching are allowed: at least one
    /// trick has been collected and the stack is not down to its last card.
    fn stack_in_window(&self) -> bool {
        self.stack.len() > 1 && self.stack.len() < FULL_STACK
    }

    /// The player on turn may close the game: they lead, the game is open
    /// and the stack window is open.
    pub fn can_close(&self) -> bool {
        self.card_played.is_none() && !self.is_closed && self.stack_in_window()
    }

    /// The player on turn may exchange the nine of trump for the face-up
    /// trump card.
    pub fn can_switch(&self) -> bool {
        self.card_played.is_none()
            && !self.is_closed
            && self.stack_in_window()
            && self.trump_card.is_some()
            && self.hand_to_move().contains(self.nine_of_trump())
    }

    /// Whether `card` is a legal play for the player on turn.
    ///
    /// Follow rules apply only when responding in a closed game or after the
    /// stack is exhausted; in every other position any card in hand goes.
    pub fn is_card_legal(&self, card: Card) -> bool {
        let led = match self.card_played {
            Some(led) => led,
            None => return true,
        };

        if self.trump_card.is_some() && !self.is_closed {
            return true;
        }

        if card.suit == led.suit && card.rank > led.rank {
            return true;
        }

        let hand = self.hand_to_move();
        if card.suit == led.suit {
            // holding a stronger card of the led suit forces it
            return !hand
                .into_iter()
                .any(|c| c.suit == led.suit && c.rank > led.rank);
        }

        if hand.into_iter().any(|c| c.suit == led.suit) {
            return false;
        }

        if led.suit != self.trump && card.suit == self.trump {
            return true;
        }

        if led.suit != self.trump && hand.into_iter().any(|c| c.suit == self.trump) {
            return false;
        }

        true
    }

    /// Collects every action available to the player on turn under the
    /// current determinization.
    pub fn legal_actions(&self, actions: &mut Vec<Action>) {
        actions.clear();

        let can_close = self.can_close();
        for card in self.hand_to_move() {
            if !self.is_card_legal(card) {
                continue;
            }
            actions.push(Action::play(card));
            if can_close {
                actions.push(Action {
                    card,
                    close_game: true,
                });
            }
        }

        // switching is encoded as playing the face-up trump card itself
        if self.can_switch() {
            let trump_card = self.trump_card.expect("switch window requires a trump card");
            actions.push(Action::play(trump_card));
            if can_close {
                actions.push(Action {
                    card: trump_card,
                    close_game: true,
                });
            }
        }
    }

    /// Applies one action for the player on turn.
    ///
    /// Leading: the trump switch happens automatically whenever its window is
    /// open, the mover holds the nine of trump and does not lead it (the move
    /// decoder reports the switch under exactly the same conditions, so the
    /// simulated world has to take it). Announcement points are scored when
    /// the marriage partner is in hand and at least one trick has been
    /// collected. Responding: the trick is resolved, both cards leave play
    /// and both players draw while the game is open and the stack holds out.
    pub fn apply_action(&mut self, a: Action) {
        if self.card_played.is_none() {
            self.apply_lead(a);
        } else {
            self.apply_response(a);
        }
    }

    fn apply_lead(&mut self, a: Action) {
        let nine_trump = self.nine_of_trump();

        if let Some(trump_card) = self.trump_card {
            if !self.is_closed
                && trump_card.rank != Rank::Nine
                && self.stack_in_window()
                && a.card != nine_trump
                && self.hand_to_move().contains(nine_trump)
            {
                let hand = self.hand_to_move_mut();
                hand.remove(nine_trump);
                hand.add(trump_card);
                self.trump_card = Some(nine_trump);
            }
        }

        if a.close_game {
            self.is_closed = true;
        }

        if matches!(a.card.rank, Rank::Queen | Rank::King) && self.stack.len() < FULL_STACK {
            let partner = a.card.marriage_partner().expect("queen or king");
            if self.hand_to_move().contains(partner) {
                let points = if a.card.suit == self.trump { 40 } else { 20 };
                if self.is_opponent_move {
                    self.opponent_score += points;
                } else {
                    self.score += points;
                }
            }
        }

        self.hand_to_move_mut().remove(a.card);
        self.card_played = Some(a.card);
        self.is_opponent_move = !self.is_opponent_move;
    }

    fn apply_response(&mut self, a: Action) {
        let led = self.card_played.take().expect("responding to a led card");
        let points = led.points() + a.card.points();
        let responder_is_opponent = self.is_opponent_move;

        if stronger_card(led, a.card, self.trump) == led {
            // the leader takes the trick and leads again
            if responder_is_opponent {
                self.score += points;
            } else {
                self.opponent_score += points;
            }
            self.is_opponent_move = !self.is_opponent_move;
        } else {
            if responder_is_opponent {
                self.opponent_score += points;
            } else {
                self.score += points;
            }
        }

        if responder_is_opponent {
            self.opponent_hand.remove(a.card);
        } else {
            self.hand.remove(a.card);
        }

        if !self.is_closed {
            // winner draws first
            if self.stack.len() > 1 {
                let first = self.stack.pop().expect("stack has cards");
                let second = self.stack.pop().expect("stack has cards");
                if self.is_opponent_move {
                    self.opponent_hand.add(first);
                    self.hand.add(second);
                } else {
                    self.hand.add(first);
                    self.opponent_hand.add(second);
                }
            } else if self.stack.len() == 1 {
                // the loser takes the face-up trump card
                let last = self.stack.pop().expect("stack has a card");
                let trump_card = self.trump_card.take().expect("trump card still on table");
                if self.is_opponent_move {
                    self.opponent_hand.add(last);
                    self.hand.add(trump_card);
                } else {
                    self.hand.add(last);
                    self.opponent_hand.add(trump_card);
                }
            }
        }
    }

    fn hand_to_move_mut(&mut self) -> &mut CardSet {
        if self.is_opponent_move {
            &mut self.opponent_hand
        } else {
            &mut self.hand
        }
    }

    /// The game ends when either player reaches 66 points or both hands are
    /// out of cards.
    pub fn is_terminal(&self) -> bool {
        self.score >= 66
            || self.opponent_score >= 66
            || (self.hand.is_empty() && self.opponent_hand.is_empty())
    }

    /// Terminal outcome from the observer's perspective, in
    /// {-3, -2, -1, 1, 2, 3}.
    ///
    /// A win against a scoreless opponent is worth 3, under 33 points 2,
    /// otherwise 1. When nobody reached 66 the single point goes to the
    /// winner of the last trick, who is the player on turn.
    pub fn reward(&self) -> i32 {
        debug_assert!(self.is_terminal(), "reward of a non-terminal state");

        if self.score >= 66 && self.opponent_score >= 66 {
            return match self.score.cmp(&self.opponent_score) {
                std::cmp::Ordering::Greater => 1,
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => {
                    if self.is_opponent_move {
                        -1
                    } else {
                        1
                    }
                }
            };
        }

        if self.score >= 66 {
            return if self.opponent_score == 0 {
                3
            } else if self.opponent_score < 33 {
                2
            } else {
                1
            };
        }

        if self.opponent_score >= 66 {
            return if self.score == 0 {
                -3
            } else if self.score < 33 {
                -2
            } else {
                -1
            };
        }

        if self.is_opponent_move {
            -1
        } else {
            1
        }
    }

    /// Plays the game to the end with the randomized default policy and
    /// returns the terminal reward.
    ///
    /// Leads pick a uniformly random card from hand; a lead of the nine of
    /// trump inside the switch window always takes the exchange and leads
    /// the acquired card instead (the no-switch line is deliberately never
    /// sampled). With probability 1/7 an eligible lead also closes the game.
    /// Responses under strict follow rules pick uniformly from the valid
    /// responses.
    pub fn rollout<R: Rng>(&mut self, rng: &mut R) -> i32 {
        while !self.is_terminal() {
            let hand = self.hand_to_move();

            let a = if self.card_played.is_none() {
                let mut card = hand.random_card(rng);
                if card == self.nine_of_trump() && !self.is_closed && self.stack_in_window() {
                    card = self.trump_card.expect("open window has a trump card");
                }

                Action {
                    card,
                    close_game: self.can_close() && rng.gen_range(0..7) == 0,
                }
            } else if self.trump_card.is_some() && !self.is_closed {
                Action::play(hand.random_card(rng))
            } else {
                let led = self.card_played.expect("responding to a led card");
                Action::play(hand.valid_responses(led, self.trump).random_card(rng))
            };

            self.apply_action(a);
        }

        self.reward()
    }
}

impl Display for SimGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} trump {} hand {} opponent {} stack {} table {}",
            self.score,
            self.opponent_score,
            self.trump,
            self.hand,
            self.opponent_hand,
            self.stack.len(),
            match self.card_played {
                Some(c) => c.to_string(),
                None => "-".to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use super::*;
    use crate::actions;
    use crate::game::cards::NUM_CARDS;

    use Rank::*;
    use Suit::*;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Fresh game: observer holds the first six clubs/diamonds cards,
    /// opponent the next six, trump card ten of spades.
    fn fresh_game(observer_leads: bool) -> SimGame {
        let deck = CardSet::full().cards();
        let hand: CardSet = deck[0..6].iter().copied().collect();
        let opponent_hand: CardSet = deck[6..12].iter().copied().collect();
        let trump_card = card(Ten, Spades);
        let stack: Vec<Card> = deck[12..]
            .iter()
            .copied()
            .filter(|&c| c != trump_card)
            .collect();
        assert_eq!(stack.len(), FULL_STACK);

        SimGame {
            score: 0,
            opponent_score: 0,
            trump: Spades,
            hand,
            opponent_hand,
            stack,
            trump_card: Some(trump_card),
            card_played: None,
            is_opponent_move: !observer_leads,
            is_closed: false,
        }
    }

    #[test]
    fn test_any_card_legal_when_leading() {
        let g = fresh_game(true);
        for c in g.hand {
            assert!(g.is_card_legal(c));
        }
    }

    #[test]
    fn test_any_card_legal_responding_open_game() {
        let mut g = fresh_game(false);
        g.apply_action(Action::play(g.opponent_hand.cards()[0]));
        assert!(!g.is_opponent_move);
        for c in g.hand {
            assert!(g.is_card_legal(c));
        }
    }

    #[test]
    fn test_follow_rules_when_closed() {
        let mut g = fresh_game(true);
        g.is_closed = true;
        g.card_played = Some(card(King, Clubs));
        g.is_opponent_move = false;
        g.hand = [
            card(Nine, Clubs),
            card(Ace, Clubs),
            card(Nine, Spades),
            card(Ace, Hearts),
        ]
        .into_iter()
        .collect();

        // must beat the led king with the ace of clubs
        assert!(g.is_card_legal(card(Ace, Clubs)));
        assert!(!g.is_card_legal(card(Nine, Clubs)));
        assert!(!g.is_card_legal(card(Nine, Spades)));
        assert!(!g.is_card_legal(card(Ace, Hearts)));

        // without the ace, the lower club must still follow
        g.hand.remove(card(Ace, Clubs));
        assert!(g.is_card_legal(card(Nine, Clubs)));
        assert!(!g.is_card_legal(card(Nine, Spades)));

        // out of clubs, trump is forced
        g.hand.remove(card(Nine, Clubs));
        assert!(g.is_card_legal(card(Nine, Spades)));
        assert!(!g.is_card_legal(card(Ace, Hearts)));

        // out of clubs and trumps, anything goes
        g.hand.remove(card(Nine, Spades));
        assert!(g.is_card_legal(card(Ace, Hearts)));
    }

    #[test]
    fn test_legality_total_over_reachable_states() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(3);
        for _ in 0..200 {
            let mut g = fresh_game(true);
            while !g.is_terminal() {
                let hand = g.hand_to_move();
                for c in CardSet::full() {
                    // is_card_legal is total: it has a verdict for any card
                    let _ = g.is_card_legal(c);
                }
                let legal: Vec<Card> = hand.into_iter().filter(|&c| g.is_card_legal(c)).collect();
                assert!(!legal.is_empty(), "player on turn has no legal card: {}", g);
                g.apply_action(Action::play(*legal.choose(&mut rng).unwrap()));
            }
        }
    }

    #[test]
    fn test_trick_resolution_and_draw() {
        let mut g = fresh_game(true);
        let lead = card(Ace, Clubs);
        let response = card(Nine, Diamonds);
        g.hand = [lead].into_iter().collect();
        g.opponent_hand = [response].into_iter().collect();

        g.apply_action(Action::play(lead));
        assert_eq!(g.card_played, Some(lead));
        assert!(g.is_opponent_move);

        let stack_before = g.stack.len();
        g.apply_action(Action::play(response));

        // observer's ace took the trick: 11 + 0 points, observer draws first
        assert_eq!(g.card_played, None);
        assert_eq!(g.score, 11);
        assert_eq!(g.opponent_score, 0);
        assert!(!g.is_opponent_move);
        assert_eq!(g.stack.len(), stack_before - 2);
        assert_eq!(g.hand.len(), 1);
        assert_eq!(g.opponent_hand.len(), 1);
    }

    #[test]
    fn test_trump_wins_trick() {
        let mut g = fresh_game(true);
        let lead = card(Ace, Clubs);
        let response = card(Nine, Spades); // trump
        g.hand = [lead].into_iter().collect();
        g.opponent_hand = [response].into_iter().collect();

        g.apply_action(Action::play(lead));
        g.apply_action(Action::play(response));

        assert_eq!(g.opponent_score, 11);
        assert!(g.is_opponent_move);
    }

    #[test]
    fn test_last_draw_takes_trump_card() {
        let mut g = fresh_game(true);
        let trump_card = g.trump_card.unwrap();
        g.stack.truncate(1);
        let last_stack_card = g.stack[0];
        let lead = card(Ace, Clubs);
        let response = card(Nine, Diamonds);
        g.hand = [lead].into_iter().collect();
        g.opponent_hand = [response].into_iter().collect();

        g.apply_action(Action::play(lead));
        g.apply_action(Action::play(response));

        // observer won: takes the face-down card, opponent the trump card
        assert!(g.stack.is_empty());
        assert_eq!(g.trump_card, None);
        assert!(g.hand.contains(last_stack_card));
        assert!(g.opponent_hand.contains(trump_card));
    }

    #[test]
    fn test_no_draw_when_closed() {
        let mut g = fresh_game(true);
        g.is_closed = true;
        let lead = card(Ace, Clubs);
        let response = card(Nine, Diamonds);
        g.hand = [lead].into_iter().collect();
        g.opponent_hand = [response].into_iter().collect();
        let stack_before = g.stack.len();

        g.apply_action(Action::play(lead));
        g.apply_action(Action::play(response));

        assert_eq!(g.stack.len(), stack_before);
        assert!(g.hand.is_empty());
        assert!(g.opponent_hand.is_empty());
    }

    #[test]
    fn test_announcement_points() {
        let mut g = fresh_game(true);
        g.stack.truncate(9); // one trick has been collected
        g.hand = [card(Queen, Hearts), card(King, Hearts), card(Nine, Clubs)]
            .into_iter()
            .collect();

        g.apply_action(Action::play(card(Queen, Hearts)));
        assert_eq!(g.score, 20);
    }

    #[test]
    fn test_trump_announcement_points() {
        let mut g = fresh_game(true);
        g.stack.truncate(9);
        g.hand = [card(Queen, Spades), card(King, Spades), card(Nine, Clubs)]
            .into_iter()
            .collect();
        // drop the nine of trump so no automatic switch interferes
        assert!(!g.hand.contains(card(Nine, Spades)));

        g.apply_action(Action::play(card(King, Spades)));
        assert_eq!(g.score, 40);
    }

    #[test]
    fn test_no_announcement_on_first_lead() {
        for announce_rank in [Queen, King] {
            let mut g = fresh_game(true);
            assert_eq!(g.stack.len(), FULL_STACK);
            g.hand = [card(Queen, Hearts), card(King, Hearts)].into_iter().collect();

            g.apply_action(Action::play(card(announce_rank, Hearts)));
            assert_eq!(g.score, 0);
        }
    }

    #[test]
    fn test_auto_switch_on_lead() {
        let mut g = fresh_game(true);
        g.stack.truncate(9);
        let trump_card = g.trump_card.unwrap();
        let nine_trump = card(Nine, Spades);
        g.hand = [nine_trump, card(Ace, Clubs)].into_iter().collect();

        g.apply_action(Action::play(card(Ace, Clubs)));

        // the nine went to the table, the old trump card into the hand
        assert_eq!(g.trump_card, Some(nine_trump));
        assert!(g.hand.contains(trump_card));
        assert!(!g.hand.contains(nine_trump));
    }

    #[test]
    fn test_switch_action_plays_acquired_card() {
        let mut g = fresh_game(true);
        g.stack.truncate(9);
        let trump_card = g.trump_card.unwrap();
        let nine_trump = card(Nine, Spades);
        g.hand = [nine_trump, card(Ace, Clubs)].into_iter().collect();

        g.apply_action(Action::play(trump_card));

        assert_eq!(g.card_played, Some(trump_card));
        assert_eq!(g.trump_card, Some(nine_trump));
        assert!(!g.hand.contains(nine_trump));
        assert!(g.hand.contains(card(Ace, Clubs)));
    }

    #[test]
    fn test_no_switch_when_leading_the_nine() {
        let mut g = fresh_game(true);
        g.stack.truncate(9);
        let trump_card = g.trump_card.unwrap();
        let nine_trump = card(Nine, Spades);
        g.hand = [nine_trump, card(Ace, Clubs)].into_iter().collect();

        g.apply_action(Action::play(nine_trump));

        assert_eq!(g.trump_card, Some(trump_card));
        assert_eq!(g.card_played, Some(nine_trump));
    }

    #[test]
    fn test_no_switch_when_closed_or_window_shut() {
        let nine_trump = card(Nine, Spades);

        let mut g = fresh_game(true);
        g.stack.truncate(9);
        g.is_closed = true;
        g.hand = [nine_trump, card(Ace, Clubs)].into_iter().collect();
        g.apply_action(Action::play(card(Ace, Clubs)));
        assert!(g.hand.contains(nine_trump));

        // full stack: first lead of the game
        let mut g = fresh_game(true);
        g.hand = [nine_trump, card(Ace, Clubs)].into_iter().collect();
        g.apply_action(Action::play(card(Ace, Clubs)));
        assert!(g.hand.contains(nine_trump));
    }

    #[test]
    fn test_close_action() {
        let mut g = fresh_game(true);
        g.stack.truncate(9);
        let lead = g.hand.cards()[0];

        g.apply_action(Action {
            card: lead,
            close_game: true,
        });
        assert!(g.is_closed);

        // responses now obey strict follow rules and tricks stop drawing
        assert!(!g.can_close());
    }

    #[test]
    fn test_legal_actions_include_close_and_switch() {
        let mut g = fresh_game(true);
        g.stack.truncate(9);
        let trump_card = g.trump_card.unwrap();
        let nine_trump = card(Nine, Spades);
        g.hand = [nine_trump, card(Ace, Clubs)].into_iter().collect();

        let actions = actions!(g);

        // two hand cards and the switch pseudo-card, each with a close variant
        assert_eq!(actions.len(), 6);
        assert!(actions.contains(&Action::play(trump_card)));
        assert!(actions.contains(&Action {
            card: trump_card,
            close_game: true
        }));
        assert!(actions.contains(&Action::play(nine_trump)));
    }

    #[test]
    fn test_legal_actions_first_lead_has_no_extras() {
        let g = fresh_game(true);
        let actions = actions!(g);
        assert_eq!(actions.len(), 6);
        assert!(actions.iter().all(|a| !a.close_game));
    }

    #[test]
    fn test_reward_values() {
        let mut g = fresh_game(true);
        g.hand = CardSet::default();
        g.opponent_hand = CardSet::default();

        g.score = 70;
        g.opponent_score = 0;
        assert_eq!(g.reward(), 3);
        g.opponent_score = 20;
        assert_eq!(g.reward(), 2);
        g.opponent_score = 40;
        assert_eq!(g.reward(), 1);

        g.score = 0;
        g.opponent_score = 66;
        assert_eq!(g.reward(), -3);
        g.score = 30;
        assert_eq!(g.reward(), -2);
        g.score = 50;
        assert_eq!(g.reward(), -1);

        // nobody reached 66: the last trick winner is on turn
        g.score = 40;
        g.opponent_score = 40;
        g.is_opponent_move = false;
        assert_eq!(g.reward(), 1);
        g.is_opponent_move = true;
        assert_eq!(g.reward(), -1);
    }

    #[test]
    fn test_rollout_terminates_and_rewards_in_range() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(42);
        for _ in 0..500 {
            let mut g = fresh_game(true);
            let reward = g.rollout(&mut rng);
            assert!(g.is_terminal());
            assert!(matches!(reward, -3 | -2 | -1 | 1 | 2 | 3));
        }
    }

    #[test]
    fn test_scores_monotonic_and_bounded() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut g = fresh_game(false);
            let (mut last_score, mut last_opponent) = (g.score, g.opponent_score);
            let mut actions = Vec::new();
            while !g.is_terminal() {
                g.legal_actions(&mut actions);
                assert!(!actions.is_empty());
                assert!(actions.len() <= 2 * 6 + 2);
                let a = *actions.choose(&mut rng).unwrap();
                g.apply_action(a);

                assert!(g.score >= last_score);
                assert!(g.opponent_score >= last_opponent);
                last_score = g.score;
                last_opponent = g.opponent_score;
            }
            // both scores stay below 66 until the final action, which adds
            // at most a trump announcement on top
            assert!(g.score + g.opponent_score <= 130 + 40);
        }
    }

    #[test]
    fn test_cards_conserved_through_play() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(5);
        for _ in 0..100 {
            let mut g = fresh_game(true);
            let mut actions = Vec::new();
            let mut seen = CardSet::default();
            loop {
                let in_play = g.hand.len()
                    + g.opponent_hand.len()
                    + g.stack.len()
                    + g.trump_card.map_or(0, |_| 1)
                    + g.card_played.map_or(0, |_| 1);
                assert_eq!(in_play + seen.len(), NUM_CARDS);

                if g.is_terminal() {
                    break;
                }
                g.legal_actions(&mut actions);
                let a = *actions.choose(&mut rng).unwrap();
                let resolves = g.card_played.is_some();
                let led = g.card_played;
                g.apply_action(a);
                if resolves {
                    seen.add(a.card);
                    seen.add(led.unwrap());
                }
            }
        }
    }
}
