//! Playing cards and the recycled 52-card deck.

use std::fmt;

use crate::engine::random::RandomSource;

/// Cards left in the deck below which it is rebuilt and reshuffled whole.
pub const RESHUFFLE_BELOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Ace-low ordinal, 1 through 13.
    pub fn ordinal(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Blackjack value: face value, J/Q/K = 10, Ace = 11 (hand totals soften it to 1).
    pub fn blackjack_value(&self) -> u8 {
        match self.rank {
            Rank::Ace => 11,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            rank => rank.ordinal(),
        }
    }

    /// Hi-Lo value: Ace = 1 up to King = 13.
    pub fn hilo_value(&self) -> u8 {
        self.rank.ordinal()
    }

    /// Independent uniformly random card, as if drawn from a fresh deck.
    pub fn random(rng: &mut impl RandomSource) -> Self {
        let rank = Rank::ALL[rng.randint(0, 12) as usize];
        let suit = Suit::ALL[rng.randint(0, 3) as usize];
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// Single 52-card deck dealt from the tail.
///
/// Not a multi-deck shoe: whenever fewer than [`RESHUFFLE_BELOW`] cards remain before a
/// draw, all 52 cards are gathered and reshuffled.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    fn ordered() -> Vec<Card> {
        Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
            .collect()
    }

    /// Fresh deck shuffled with Fisher-Yates.
    pub fn shuffled(rng: &mut impl RandomSource) -> Self {
        let mut deck = Self {
            cards: Self::ordered(),
        };
        deck.shuffle(rng);
        deck
    }

    fn shuffle(&mut self, rng: &mut impl RandomSource) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.randint(0, i as i64) as usize;
            self.cards.swap(i, j);
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Draws the tail card, reshuffling the whole deck first if it is running low.
    pub fn draw(&mut self, rng: &mut impl RandomSource) -> Card {
        if self.cards.len() < RESHUFFLE_BELOW {
            self.cards = Self::ordered();
            self.shuffle(rng);
        }

        match self.cards.pop() {
            Some(card) => card,
            None => {
                self.cards = Self::ordered();
                self.shuffle(rng);
                self.draw(rng)
            }
        }
    }

    /// Deck whose next draws are exactly `draws`, in order.
    ///
    /// The remaining cards sit beneath in factory order, so up to `52 - RESHUFFLE_BELOW`
    /// draws happen without a reshuffle.
    #[cfg(test)]
    pub fn stacked(draws: &[Card]) -> Self {
        let mut cards: Vec<Card> = Self::ordered()
            .into_iter()
            .filter(|card| !draws.contains(card))
            .collect();
        cards.extend(draws.iter().rev().copied());
        Self { cards }
    }
}
