use std::fmt::{Debug, Display};

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const NUM_CARDS: usize = 24;
const CARDS_PER_SUIT: u8 = 6;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    fn from_index(index: u8) -> Suit {
        match index {
            0 => Suit::Clubs,
            1 => Suit::Diamonds,
            2 => Suit::Hearts,
            3 => Suit::Spades,
            _ => panic!("invalid suit index: {}", index),
        }
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        };
        f.write_str(symbol)
    }
}

/// Declaration order is the strength order within a suit: 9 < J < Q < K < 10 < A.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Rank {
    Nine,
    Jack,
    Queen,
    King,
    Ten,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Nine,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ten,
        Rank::Ace,
    ];

    /// Card points collected by the winner of a trick.
    pub fn points(self) -> u16 {
        match self {
            Rank::Nine => 0,
            Rank::Jack => 2,
            Rank::Queen => 3,
            Rank::King => 4,
            Rank::Ten => 10,
            Rank::Ace => 11,
        }
    }

    fn from_index(index: u8) -> Rank {
        match index {
            0 => Rank::Nine,
            1 => Rank::Jack,
            2 => Rank::Queen,
            3 => Rank::King,
            4 => Rank::Ten,
            5 => Rank::Ace,
            _ => panic!("invalid rank index: {}", index),
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rank::Nine => "9",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ten => "10",
            Rank::Ace => "A",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn points(self) -> u16 {
        self.rank.points()
    }

    /// The other half of a king-queen announcement pair, if this card can be
    /// part of one.
    pub fn marriage_partner(self) -> Option<Card> {
        match self.rank {
            Rank::Queen => Some(Card::new(Rank::King, self.suit)),
            Rank::King => Some(Card::new(Rank::Queen, self.suit)),
            _ => None,
        }
    }

    fn index(self) -> u8 {
        self.suit as u8 * CARDS_PER_SUIT + self.rank as u8
    }

    fn from_index(index: u8) -> Card {
        Card::new(
            Rank::from_index(index % CARDS_PER_SUIT),
            Suit::from_index(index / CARDS_PER_SUIT),
        )
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Returns the stronger of two cards under the given trump, first wins ties
/// of unrelated suits (it was played first).
pub fn stronger_card(first: Card, second: Card, trump: Suit) -> Card {
    if first.suit == second.suit {
        if first.rank > second.rank {
            return first;
        }
        return second;
    }

    if first.suit == trump {
        return first;
    }

    if second.suit == trump {
        return second;
    }

    first
}

/// Collection of cards represented as a bit mask.
///
/// Covers both hands and piles; membership is unique and iteration order is
/// the fixed deck order.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSet {
    mask: u32,
}

impl CardSet {
    /// The full 24 card deck.
    pub fn full() -> Self {
        Self {
            mask: (1 << NUM_CARDS) - 1,
        }
    }

    pub fn add(&mut self, card: Card) {
        self.mask |= 1 << card.index();
    }

    pub fn remove(&mut self, card: Card) {
        self.mask &= !(1 << card.index());
    }

    pub fn contains(self, card: Card) -> bool {
        self.mask & (1 << card.index()) != 0
    }

    pub fn len(self) -> usize {
        self.mask.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.mask == 0
    }

    pub fn cards(self) -> Vec<Card> {
        self.into_iter().collect()
    }

    /// The cards that are a legal response to `played` under the strict
    /// follow rules (closed game or exhausted stack):
    ///
    /// 1. stronger cards of the led suit
    /// 2. otherwise any card of the led suit
    /// 3. otherwise trumps, when the led suit is not trump
    /// 4. otherwise everything
    pub fn valid_responses(self, played: Card, trump: Suit) -> CardSet {
        let mut allowed = CardSet::default();

        for card in self {
            if card.suit == played.suit && card.rank > played.rank {
                allowed.add(card);
            }
        }
        if !allowed.is_empty() {
            return allowed;
        }

        for card in self {
            if card.suit == played.suit {
                allowed.add(card);
            }
        }
        if !allowed.is_empty() {
            return allowed;
        }

        if played.suit != trump {
            for card in self {
                if card.suit == trump {
                    allowed.add(card);
                }
            }
            if !allowed.is_empty() {
                return allowed;
            }
        }

        self
    }

    /// A card chosen uniformly at random from the set.
    pub fn random_card<R: Rng>(self, rng: &mut R) -> Card {
        assert!(!self.is_empty(), "random_card on an empty set");

        let mut n = rng.gen_range(0..self.len());
        let mut mask = self.mask;
        loop {
            let index = mask.trailing_zeros();
            if n == 0 {
                return Card::from_index(index as u8);
            }
            mask &= mask - 1;
            n -= 1;
        }
    }
}

impl IntoIterator for CardSet {
    type Item = Card;

    type IntoIter = CardSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        CardSetIterator { mask: self.mask }
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        let mut set = CardSet::default();
        for card in iter {
            set.add(card);
        }
        set
    }
}

impl Display for CardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ ")?;
        for card in self
            .into_iter()
            .sorted_by_key(|c| (c.suit, c.rank))
        {
            write!(f, "{} ", card)?;
        }
        write!(f, "}}")
    }
}

impl Debug for CardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.cards())
    }
}

pub struct CardSetIterator {
    mask: u32,
}

impl Iterator for CardSetIterator {
    type Item = Card;

    fn next(&mut self) -> Option<Self::Item> {
        if self.mask == 0 {
            return None;
        }

        let index = self.mask.trailing_zeros();
        self.mask &= self.mask - 1;
        Some(Card::from_index(index as u8))
    }
}
