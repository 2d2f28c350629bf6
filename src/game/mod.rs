use std::fmt::Display;

use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod cards;
pub mod sim;

use self::cards::{stronger_card, Card, CardSet, Rank, Suit};
use self::sim::SimGame;

/// A move as exchanged with the outside world: the card placed on the table
/// plus the announcement, trump switch and close declarations that go with
/// it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Move {
    pub card: Card,
    pub is_announcement: bool,
    pub switch_trump_card: bool,
    pub close_game: bool,
}

impl Move {
    /// A plain move: play a card, declare nothing.
    pub fn new(card: Card) -> Self {
        Self {
            card,
            is_announcement: false,
            switch_trump_card: false,
            close_game: false,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.card)?;
        if self.switch_trump_card {
            write!(f, " (switch)")?;
        }
        if self.is_announcement {
            write!(f, " (announce)")?;
        }
        if self.close_game {
            write!(f, " (close)")?;
        }
        Ok(())
    }
}

/// A mid-game snapshot of everything the observer can see, as supplied by an
/// external view provider. `Game::from_view` validates it and derives the
/// unseen pile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObserverView {
    pub trump: Suit,
    pub score: u16,
    pub opponent_score: u16,
    pub hand: CardSet,
    pub known_opponent_cards: CardSet,
    pub seen_cards: CardSet,
    pub trump_card: Option<Card>,
    pub card_played: Option<Card>,
    pub is_opponent_move: bool,
    pub is_closed: bool,
}

impl Default for ObserverView {
    fn default() -> Self {
        Self {
            trump: Suit::Clubs,
            score: 0,
            opponent_score: 0,
            hand: CardSet::default(),
            known_opponent_cards: CardSet::default(),
            seen_cards: CardSet::default(),
            trump_card: None,
            card_played: None,
            is_opponent_move: false,
            is_closed: false,
        }
    }
}

/// The observer side of a running match. Tracks only what one player can see
/// and deduce: their own hand, cards surrendered to tricks, deduced opponent
/// cards and the pile of cards whose location is still uncertain.
///
/// The search consumes this type read-only; `play_move`,
/// `update_opponent_move` and `update_drawn_card` keep it in sync with the
/// authoritative game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    trump: Suit,
    score: u16,
    opponent_score: u16,
    hand: CardSet,
    known_opponent_cards: CardSet,
    seen_cards: CardSet,
    unseen_cards: CardSet,
    trump_card: Option<Card>,
    card_played: Option<Card>,
    is_opponent_move: bool,
    is_closed: bool,
}

impl Game {
    /// Starts a new game from the observer's dealt hand and the face-up
    /// trump card.
    pub fn new(hand: CardSet, trump_card: Card, is_opponent_move: bool) -> Result<Self> {
        if hand.len() != 6 {
            bail!("the hand must have six cards, got {}", hand.len());
        }
        if hand.contains(trump_card) {
            bail!("the trump card cannot be in the hand");
        }

        let mut unseen_cards = CardSet::full();
        for card in hand {
            unseen_cards.remove(card);
        }
        unseen_cards.remove(trump_card);

        Ok(Self {
            trump: trump_card.suit,
            score: 0,
            opponent_score: 0,
            hand,
            known_opponent_cards: CardSet::default(),
            seen_cards: CardSet::default(),
            unseen_cards,
            trump_card: Some(trump_card),
            card_played: None,
            is_opponent_move,
            is_closed: false,
        })
    }

    /// Reconstructs the observer state from a mid-game snapshot.
    pub fn from_view(view: ObserverView) -> Result<Self> {
        if view.hand.len() > 6 {
            bail!("hand holds more than six cards");
        }
        if view.known_opponent_cards.len() > 6 {
            bail!("opponent cannot hold more than six cards");
        }

        let mut unseen_cards = CardSet::full();
        let mut claimed = 0;
        for set in [view.hand, view.known_opponent_cards, view.seen_cards] {
            claimed += set.len();
            for card in set {
                unseen_cards.remove(card);
            }
        }
        for card in view.trump_card.into_iter().chain(view.card_played) {
            claimed += 1;
            unseen_cards.remove(card);
        }
        if unseen_cards.len() + claimed != cards::NUM_CARDS {
            bail!("hand, opponent cards, seen pile, trump card and table card overlap");
        }

        if let Some(trump_card) = view.trump_card {
            if trump_card.suit != view.trump {
                bail!("the face-up trump card must be of the trump suit");
            }
        } else if !unseen_cards.is_empty() {
            bail!("every hidden card must be deduced once the stack is exhausted");
        }

        let table_adjustment = usize::from(view.card_played.is_some() && !view.is_opponent_move);
        if view.known_opponent_cards.len() + table_adjustment > view.hand.len() {
            bail!("more known opponent cards than the opponent can hold");
        }

        Ok(Self {
            trump: view.trump,
            score: view.score,
            opponent_score: view.opponent_score,
            hand: view.hand,
            known_opponent_cards: view.known_opponent_cards,
            seen_cards: view.seen_cards,
            unseen_cards,
            trump_card: view.trump_card,
            card_played: view.card_played,
            is_opponent_move: view.is_opponent_move,
            is_closed: view.is_closed,
        })
    }

    pub fn trump(&self) -> Suit {
        self.trump
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    pub fn opponent_score(&self) -> u16 {
        self.opponent_score
    }

    pub fn hand(&self) -> CardSet {
        self.hand
    }

    pub fn known_opponent_cards(&self) -> CardSet {
        self.known_opponent_cards
    }

    /// Cards surrendered to tricks; no longer playable.
    pub fn seen_cards(&self) -> CardSet {
        self.seen_cards
    }

    /// Cards that may be either in the opponent's hand or in the face-down
    /// stack.
    pub fn unseen_cards(&self) -> CardSet {
        self.unseen_cards
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.trump_card
    }

    pub fn card_played(&self) -> Option<Card> {
        self.card_played
    }

    pub fn is_opponent_move(&self) -> bool {
        self.is_opponent_move
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    fn nine_of_trump(&self) -> Card {
        Card::new(Rank::Nine, self.trump)
    }

    /// Samples a fully observable game uniformly from the states consistent
    /// with this view: the hidden cards are shuffled, the opponent's open
    /// slots are filled from the front and the rest becomes the face-down
    /// stack.
    pub fn determinize<R: Rng>(&self, rng: &mut R) -> SimGame {
        let mut hidden = self.unseen_cards.cards();
        hidden.shuffle(rng);

        let mut open_slots = self.hand.len() - self.known_opponent_cards.len();
        if !self.is_opponent_move && self.card_played.is_some() {
            // the opponent led the trick, so they hold one card fewer
            open_slots -= 1;
        }
        let split = open_slots.min(hidden.len());

        let mut opponent_hand = self.known_opponent_cards;
        for &card in &hidden[..split] {
            opponent_hand.add(card);
        }

        let stack = if self.trump_card.is_some() {
            hidden[split..].to_vec()
        } else {
            Vec::new()
        };

        SimGame {
            score: self.score,
            opponent_score: self.opponent_score,
            trump: self.trump,
            hand: self.hand,
            opponent_hand,
            stack,
            trump_card: self.trump_card,
            card_played: self.card_played,
            is_opponent_move: self.is_opponent_move,
            is_closed: self.is_closed,
        }
    }

    /// Applies a move chosen by the observer. The move must already be valid;
    /// an error here means the agent produced an illegal move.
    pub fn play_move(&mut self, m: Move) -> Result<()> {
        if self.is_opponent_move {
            bail!("not the observer's turn");
        }

        if !self.is_closed
            && self.card_played.is_none()
            && self.seen_cards.len() <= 12
            && self.hand.len() != 6
        {
            bail!("should not play before drawing cards");
        }

        if m.switch_trump_card {
            self.check_switch_allowed()?;
            let nine_trump = self.nine_of_trump();
            if !self.hand.contains(nine_trump) {
                bail!("cannot switch trump card without the nine of trump in hand");
            }

            let trump_card = self.trump_card.expect("switch checked the trump card");
            self.hand.remove(nine_trump);
            self.hand.add(trump_card);
            self.trump_card = Some(nine_trump);
        }

        if m.close_game {
            self.check_close_allowed()?;
            self.is_closed = true;
        }

        if m.is_announcement {
            let partner = self.check_announcement_allowed(m.card)?;
            if !self.hand.contains(partner) {
                bail!("both announcement cards must be in hand");
            }

            if m.card.suit == self.trump {
                self.score += 40;
            } else {
                self.score += 20;
            }
        }

        if !self.hand.contains(m.card) {
            bail!("played card is not in hand");
        }

        if self.card_played.is_some() && (self.is_closed || self.trump_card.is_none()) {
            let led = self.card_played.expect("responding to a led card");
            if !self
                .hand
                .valid_responses(led, self.trump)
                .contains(m.card)
            {
                bail!("invalid response card: {}", m.card);
            }
        }

        self.hand.remove(m.card);

        match self.card_played {
            None => {
                self.card_played = Some(m.card);
                self.is_opponent_move = true;
            }
            Some(led) => {
                let points = led.points() + m.card.points();
                if stronger_card(led, m.card, self.trump) == led {
                    self.opponent_score += points;
                    self.is_opponent_move = true;
                } else {
                    self.score += points;
                    self.is_opponent_move = false;
                }
                self.seen_cards.add(led);
                self.seen_cards.add(m.card);
                self.card_played = None;
            }
        }

        Ok(())
    }

    /// Applies a move played by the opponent and updates what is known about
    /// their hand.
    pub fn update_opponent_move(&mut self, m: Move) -> Result<()> {
        if !self.is_opponent_move {
            bail!("not the opponent's turn");
        }
        if self.seen_cards.contains(m.card) {
            bail!("card has already been played");
        }
        if self.hand.contains(m.card) {
            bail!("card is in the observer's hand");
        }
        if self.card_played == Some(m.card) {
            bail!("card is the same as the one on the table");
        }
        if !self.is_closed
            && self.card_played.is_none()
            && self.seen_cards.len() <= 12
            && self.hand.len() != 6
        {
            bail!("should not play before drawing cards");
        }

        if m.switch_trump_card {
            self.check_switch_allowed()?;
            let trump_card = self.trump_card.expect("switch checked the trump card");
            if trump_card.rank == Rank::Nine {
                bail!("cannot switch a trump card that is already the nine");
            }

            // the opponent revealed the nine and acquired the old trump card
            let nine_trump = self.nine_of_trump();
            self.known_opponent_cards.add(trump_card);
            self.known_opponent_cards.remove(nine_trump);
            self.unseen_cards.remove(nine_trump);
            self.trump_card = Some(nine_trump);
        }

        if m.close_game {
            self.check_close_allowed()?;
            self.is_closed = true;
        }

        if self.trump_card == Some(m.card) {
            bail!("played card is the face-up trump card");
        }

        self.known_opponent_cards.remove(m.card);

        if m.is_announcement {
            let partner = self.check_announcement_allowed(m.card)?;
            if self.seen_cards.contains(partner) {
                bail!("announcement partner has already been played");
            }
            if self.hand.contains(partner) {
                bail!("announcement partner is in the observer's hand");
            }
            if self.trump_card == Some(partner) {
                bail!("announcement partner is the face-up trump card");
            }

            if m.card.suit == self.trump {
                self.opponent_score += 40;
            } else {
                self.opponent_score += 20;
            }

            self.known_opponent_cards.add(partner);
            self.unseen_cards.remove(partner);
        }

        self.unseen_cards.remove(m.card);

        match self.card_played {
            None => {
                self.card_played = Some(m.card);
                self.is_opponent_move = false;
            }
            Some(led) => {
                let points = led.points() + m.card.points();
                if stronger_card(led, m.card, self.trump) == led {
                    self.score += points;
                    self.is_opponent_move = false;
                } else {
                    self.opponent_score += points;
                    self.is_opponent_move = true;
                }
                self.seen_cards.add(led);
                self.seen_cards.add(m.card);
                self.card_played = None;
            }
        }

        Ok(())
    }

    /// Records the card the observer drew from the stack after a trick. Once
    /// the stack runs out every remaining unseen card is deduced to be in
    /// the opponent's hand.
    pub fn update_drawn_card(&mut self, card: Card) -> Result<()> {
        if self.card_played.is_some() {
            bail!("cannot draw cards in the middle of a trick");
        }
        if self.is_closed {
            bail!("should not draw cards when the game is closed");
        }
        if self.hand.len() == 6 {
            if self.seen_cards.is_empty() {
                bail!("should not draw cards before the first play");
            }
            bail!("should not draw cards twice before playing");
        }
        if self.seen_cards.contains(card) {
            bail!("drawn card has been played before");
        }
        if self.known_opponent_cards.contains(card) {
            bail!("cannot draw a card that is in the opponent's hand");
        }
        if self.hand.contains(card) {
            bail!("cannot draw a card that is in the hand already");
        }
        let trump_card = match self.trump_card {
            Some(trump_card) => trump_card,
            None => bail!("all cards have been drawn already"),
        };
        if trump_card == card && self.seen_cards.len() < 10 {
            bail!("cannot draw the trump card yet");
        }

        self.hand.add(card);
        self.unseen_cards.remove(card);

        if self.seen_cards.len() == 12 {
            // stack exhausted: every hidden card is in the opponent's hand
            for unseen in self.unseen_cards {
                self.known_opponent_cards.add(unseen);
            }
            if card != trump_card {
                self.known_opponent_cards.add(trump_card);
            }
            self.unseen_cards = CardSet::default();
            self.trump_card = None;
        }

        Ok(())
    }

    fn check_switch_allowed(&self) -> Result<()> {
        if self.card_played.is_some() {
            bail!("cannot switch trump card when second to play");
        }
        if self.seen_cards.is_empty() {
            bail!("cannot switch trump card on the first move");
        }
        if self.seen_cards.len() == 10 {
            bail!("cannot switch trump card with only two cards left in the stack");
        }
        if self.trump_card.is_none() {
            bail!("cannot switch trump card after it has been taken");
        }
        if self.is_closed {
            bail!("cannot switch trump card after the game has been closed");
        }
        Ok(())
    }

    fn check_close_allowed(&self) -> Result<()> {
        if self.card_played.is_some() {
            bail!("cannot close the game when second to play");
        }
        if self.seen_cards.is_empty() {
            bail!("cannot close the game on the first move");
        }
        if self.seen_cards.len() == 10 {
            bail!("cannot close the game with only two cards left in the stack");
        }
        if self.seen_cards.len() >= 12 {
            bail!("cannot close the game after all cards have been drawn");
        }
        if self.is_closed {
            bail!("cannot close the game because it is already closed");
        }
        Ok(())
    }

    fn check_announcement_allowed(&self, card: Card) -> Result<Card> {
        if self.card_played.is_some() {
            bail!("cannot announce when second to play");
        }
        if self.seen_cards.is_empty() {
            bail!("cannot announce on the first move");
        }
        match card.marriage_partner() {
            Some(partner) => Ok(partner),
            None => bail!("invalid announcement card: {}", card),
        }
    }
}
