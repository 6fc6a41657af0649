//! Blackjack engine.
//!
//! House rules:
//! - Single 52-card deck, reshuffled whole when fewer than ten cards remain
//! - Dealer hits soft 17
//! - One split per round; any two ten-valued cards may be split
//! - Double down on any two-card hand, including split hands
//! - Natural blackjack pays 3:2 (2.5× return) and is settled on the deal
//!
//! Stages: `PlayerTurn` (or `SplitPlay { hand }` after a split) → dealer draws →
//! `Settled`. Dealing and the dealer's turn run to completion inside a single call, so
//! they never appear as a resting phase.

use std::fmt;

use crate::{
    engine::{
        cards::{Card, Deck},
        random::RandomSource,
        scale_tenths, Wager,
    },
    error::game::GameError,
};

const BLACKJACK: u8 = 21;
const DEALER_STANDS_ON: u8 = 17;

/// Total and softness of a set of cards.
///
/// Aces count 11 and are dropped to 1, one at a time, while the total exceeds 21.
/// A hand is soft when an ace is still counted as 11.
pub fn hand_total(cards: &[Card]) -> (u8, bool) {
    let mut total: u8 = cards.iter().map(Card::blackjack_value).sum();
    let mut soft_aces = cards.iter().filter(|c| c.blackjack_value() == 11).count();

    while total > BLACKJACK && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }

    (total, soft_aces > 0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    doubled: bool,
    from_split: bool,
    done: bool,
}

impl Hand {
    fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            doubled: false,
            from_split: false,
            done: false,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn value(&self) -> u8 {
        hand_total(&self.cards).0
    }

    pub fn is_soft(&self) -> bool {
        hand_total(&self.cards).1
    }

    pub fn is_bust(&self) -> bool {
        self.value() > BLACKJACK
    }

    /// Two-card 21 on an unsplit hand.
    pub fn is_natural(&self) -> bool {
        !self.from_split && self.cards.len() == 2 && self.value() == BLACKJACK
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    fn stake(&self, bet: i64) -> i64 {
        if self.doubled {
            bet * 2
        } else {
            bet
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards: Vec<String> = self.cards.iter().map(Card::to_string).collect();
        let soft = if self.is_soft() && !self.is_bust() {
            "soft "
        } else {
            ""
        };
        write!(f, "{} ({}{})", cards.join(" "), soft, self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOutcome {
    Blackjack,
    Win,
    DealerBust,
    Push,
    Lose,
    Bust,
}

impl HandOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            HandOutcome::Blackjack => "blackjack",
            HandOutcome::Win => "win",
            HandOutcome::DealerBust => "dealer_bust",
            HandOutcome::Push => "push",
            HandOutcome::Lose => "lose",
            HandOutcome::Bust => "bust",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSettlement {
    pub outcome: HandOutcome,
    pub value: u8,
    pub stake: i64,
    pub payout: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackjackSettlement {
    pub hands: Vec<HandSettlement>,
    pub dealer_value: u8,
    pub total_stake: i64,
    pub total_payout: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlackjackPhase {
    PlayerTurn,
    SplitPlay { hand: usize },
    Settled(BlackjackSettlement),
}

#[derive(Debug, Clone)]
pub struct BlackjackGame {
    bet: i64,
    deck: Deck,
    hands: Vec<Hand>,
    dealer: Vec<Card>,
    phase: BlackjackPhase,
}

impl BlackjackGame {
    /// Deals two cards each, alternating player and dealer.
    ///
    /// A player natural settles immediately against the dealer's two cards.
    pub fn deal(bet: i64, mut deck: Deck, rng: &mut impl RandomSource) -> Self {
        let p1 = deck.draw(rng);
        let d1 = deck.draw(rng);
        let p2 = deck.draw(rng);
        let d2 = deck.draw(rng);

        let mut game = Self {
            bet,
            deck,
            hands: vec![Hand::new(vec![p1, p2])],
            dealer: vec![d1, d2],
            phase: BlackjackPhase::PlayerTurn,
        };

        if game.hands[0].is_natural() {
            game.hands[0].done = true;
            game.settle();
        }

        game
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn phase(&self) -> &BlackjackPhase {
        &self.phase
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn dealer_cards(&self) -> &[Card] {
        &self.dealer
    }

    /// The dealer's face-up card while the player is still acting.
    pub fn dealer_upcard(&self) -> Card {
        self.dealer[0]
    }

    pub fn dealer_value(&self) -> u8 {
        hand_total(&self.dealer).0
    }

    pub fn is_split(&self) -> bool {
        self.hands.len() > 1
    }

    pub fn settlement(&self) -> Option<&BlackjackSettlement> {
        match &self.phase {
            BlackjackPhase::Settled(settlement) => Some(settlement),
            _ => None,
        }
    }

    /// Coins the player has put on the table, counting doubles and splits.
    pub fn total_stake(&self) -> i64 {
        self.hands.iter().map(|hand| hand.stake(self.bet)).sum()
    }

    /// Index of the hand currently being played.
    pub fn active_hand(&self) -> Option<usize> {
        match self.phase {
            BlackjackPhase::PlayerTurn => Some(0),
            BlackjackPhase::SplitPlay { hand } => Some(hand),
            BlackjackPhase::Settled(_) => None,
        }
    }

    fn require_active(&self) -> Result<usize, GameError> {
        self.active_hand()
            .ok_or_else(|| GameError::invalid("This round is already over."))
    }

    pub fn hit(&mut self, rng: &mut impl RandomSource) -> Result<&BlackjackPhase, GameError> {
        let index = self.require_active()?;
        let card = self.deck.draw(rng);
        let hand = &mut self.hands[index];
        hand.cards.push(card);

        if hand.is_bust() {
            hand.done = true;
            self.advance(rng);
        }

        Ok(&self.phase)
    }

    pub fn stand(&mut self, rng: &mut impl RandomSource) -> Result<&BlackjackPhase, GameError> {
        let index = self.require_active()?;
        self.hands[index].done = true;
        self.advance(rng);

        Ok(&self.phase)
    }

    /// Checks a double down is legal without touching the game.
    ///
    /// Services call this before debiting the extra stake.
    pub fn check_double_down(&self) -> Result<(), GameError> {
        let index = self.require_active()?;
        let hand = &self.hands[index];

        if hand.cards.len() != 2 {
            return Err(GameError::invalid(
                "You can only double down on your first two cards.",
            ));
        }
        if hand.doubled {
            return Err(GameError::invalid("This hand is already doubled."));
        }

        Ok(())
    }

    /// Doubles the active hand's stake, draws exactly one card and stands.
    pub fn double_down(
        &mut self,
        rng: &mut impl RandomSource,
    ) -> Result<&BlackjackPhase, GameError> {
        self.check_double_down()?;
        let index = self.require_active()?;

        let card = self.deck.draw(rng);
        let hand = &mut self.hands[index];
        hand.doubled = true;
        hand.cards.push(card);
        hand.done = true;
        self.advance(rng);

        Ok(&self.phase)
    }

    /// Checks a split is legal without touching the game.
    pub fn check_split(&self) -> Result<(), GameError> {
        if !matches!(self.phase, BlackjackPhase::PlayerTurn) {
            return Err(GameError::invalid("You can only split once, before hitting."));
        }

        let hand = &self.hands[0];
        if hand.cards.len() != 2 || hand.doubled {
            return Err(GameError::invalid("You can only split your opening two cards."));
        }

        let (a, b) = (hand.cards[0], hand.cards[1]);
        let ten_valued = a.blackjack_value() == 10 && b.blackjack_value() == 10;
        if a.rank != b.rank && !ten_valued {
            return Err(GameError::invalid("You can only split a matching pair."));
        }

        Ok(())
    }

    /// Splits the opening pair into two hands, dealing one new card to each.
    ///
    /// Play continues on the first hand. The caller is responsible for collecting the
    /// second stake.
    pub fn split(&mut self, rng: &mut impl RandomSource) -> Result<&BlackjackPhase, GameError> {
        self.check_split()?;

        let second_card = self.hands[0].cards.pop();
        let mut second = Hand::new(second_card.into_iter().collect());
        second.from_split = true;
        self.hands[0].from_split = true;

        let first_draw = self.deck.draw(rng);
        self.hands[0].cards.push(first_draw);
        let second_draw = self.deck.draw(rng);
        second.cards.push(second_draw);

        self.hands.push(second);
        self.phase = BlackjackPhase::SplitPlay { hand: 0 };

        Ok(&self.phase)
    }

    /// Moves to the next unfinished hand, or plays the dealer and settles.
    fn advance(&mut self, rng: &mut impl RandomSource) {
        if let Some(next) = self.hands.iter().position(|hand| !hand.done) {
            self.phase = BlackjackPhase::SplitPlay { hand: next };
            return;
        }

        if self.hands.iter().any(|hand| !hand.is_bust()) {
            self.play_dealer(rng);
        }
        self.settle();
    }

    fn play_dealer(&mut self, rng: &mut impl RandomSource) {
        loop {
            let (total, soft) = hand_total(&self.dealer);
            if total > DEALER_STANDS_ON || (total == DEALER_STANDS_ON && !soft) {
                break;
            }
            let card = self.deck.draw(rng);
            self.dealer.push(card);
        }
    }

    fn settle(&mut self) {
        let dealer_value = self.dealer_value();
        let hands: Vec<HandSettlement> = self
            .hands
            .iter()
            .map(|hand| settle_hand(hand, self.bet, dealer_value))
            .collect();

        let total_stake = hands.iter().map(|h| h.stake).sum();
        let total_payout = hands.iter().map(|h| h.payout).sum();

        self.phase = BlackjackPhase::Settled(BlackjackSettlement {
            hands,
            dealer_value,
            total_stake,
            total_payout,
        });
    }
}

fn settle_hand(hand: &Hand, bet: i64, dealer_value: u8) -> HandSettlement {
    let stake = hand.stake(bet);
    let value = hand.value();

    let (outcome, payout) = if hand.is_natural() {
        if dealer_value == BLACKJACK {
            (HandOutcome::Push, stake)
        } else {
            (HandOutcome::Blackjack, scale_tenths(bet, 25))
        }
    } else if hand.is_bust() {
        (HandOutcome::Bust, 0)
    } else if dealer_value > BLACKJACK {
        (HandOutcome::DealerBust, stake * 2)
    } else if value > dealer_value {
        (HandOutcome::Win, stake * 2)
    } else if value == dealer_value {
        (HandOutcome::Push, stake)
    } else {
        (HandOutcome::Lose, 0)
    };

    HandSettlement {
        outcome,
        value,
        stake,
        payout,
    }
}

impl Wager for BlackjackGame {
    fn stake_at_risk(&self) -> i64 {
        match self.phase {
            BlackjackPhase::Settled(_) => 0,
            _ => self.total_stake(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        cards::{Rank, Suit},
        random::SystemRandom,
    };

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Deals from a deck stacked as player1, dealer1, player2, dealer2, then `rest`.
    fn deal(bet: i64, player: [Card; 2], dealer: [Card; 2], rest: &[Card]) -> BlackjackGame {
        let mut order = vec![player[0], dealer[0], player[1], dealer[1]];
        order.extend_from_slice(rest);
        BlackjackGame::deal(bet, Deck::stacked(&order), &mut SystemRandom)
    }

    #[test]
    fn soft_totals() {
        let cards = [c(Rank::Ace, Suit::Spades), c(Rank::Six, Suit::Hearts)];
        assert_eq!(hand_total(&cards), (17, true));

        let cards = [
            c(Rank::Ace, Suit::Spades),
            c(Rank::Six, Suit::Hearts),
            c(Rank::Nine, Suit::Clubs),
        ];
        assert_eq!(hand_total(&cards), (16, false));

        let cards = [c(Rank::Ace, Suit::Spades), c(Rank::Ace, Suit::Hearts)];
        assert_eq!(hand_total(&cards), (12, true));
    }

    /// Player natural against a dealer 17 settles on the deal at 2.5×.
    #[test]
    fn natural_blackjack_settles_immediately() {
        let game = deal(
            100,
            [c(Rank::Ace, Suit::Spades), c(Rank::King, Suit::Hearts)],
            [c(Rank::Nine, Suit::Diamonds), c(Rank::Eight, Suit::Clubs)],
            &[],
        );

        let settlement = game.settlement().expect("settled on deal");
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Blackjack);
        assert_eq!(settlement.hands[0].outcome.label(), "blackjack");
        assert_eq!(settlement.total_payout, 250);
        assert_eq!(game.dealer_cards().len(), 2);
    }

    #[test]
    fn natural_payout_floors_odd_bets() {
        let game = deal(
            25,
            [c(Rank::Ace, Suit::Spades), c(Rank::Queen, Suit::Hearts)],
            [c(Rank::Nine, Suit::Diamonds), c(Rank::Eight, Suit::Clubs)],
            &[],
        );

        assert_eq!(game.settlement().unwrap().total_payout, 62);
    }

    #[test]
    fn natural_against_dealer_blackjack_pushes() {
        let game = deal(
            100,
            [c(Rank::Ace, Suit::Spades), c(Rank::King, Suit::Hearts)],
            [c(Rank::Ace, Suit::Diamonds), c(Rank::Queen, Suit::Clubs)],
            &[],
        );

        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Push);
        assert_eq!(settlement.total_payout, 100);
    }

    #[test]
    fn bust_ends_round_without_dealer_play() {
        let mut game = deal(
            50,
            [c(Rank::Ten, Suit::Spades), c(Rank::Six, Suit::Hearts)],
            [c(Rank::Nine, Suit::Diamonds), c(Rank::Two, Suit::Clubs)],
            &[c(Rank::Queen, Suit::Clubs)],
        );

        game.hit(&mut SystemRandom).unwrap();

        let settlement = game.settlement().expect("bust settles");
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Bust);
        assert_eq!(settlement.total_payout, 0);
        assert_eq!(game.dealer_cards().len(), 2);
    }

    /// Dealer holding soft 17 must draw.
    #[test]
    fn dealer_hits_soft_seventeen() {
        let mut game = deal(
            100,
            [c(Rank::Ten, Suit::Spades), c(Rank::Eight, Suit::Hearts)],
            [c(Rank::Ace, Suit::Diamonds), c(Rank::Six, Suit::Clubs)],
            &[c(Rank::Two, Suit::Clubs)],
        );

        game.stand(&mut SystemRandom).unwrap();

        assert_eq!(game.dealer_cards().len(), 3);
        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.dealer_value, 19);
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Lose);
        assert_eq!(settlement.total_payout, 0);
    }

    #[test]
    fn dealer_stands_on_hard_seventeen() {
        let mut game = deal(
            100,
            [c(Rank::Ten, Suit::Spades), c(Rank::Seven, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[],
        );

        game.stand(&mut SystemRandom).unwrap();

        let settlement = game.settlement().unwrap();
        assert_eq!(game.dealer_cards().len(), 2);
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Push);
        assert_eq!(settlement.total_payout, 100);
    }

    #[test]
    fn dealer_bust_pays_double() {
        let mut game = deal(
            100,
            [c(Rank::Ten, Suit::Spades), c(Rank::Two, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Six, Suit::Clubs)],
            &[c(Rank::King, Suit::Clubs)],
        );

        game.stand(&mut SystemRandom).unwrap();

        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.hands[0].outcome, HandOutcome::DealerBust);
        assert_eq!(settlement.total_payout, 200);
    }

    /// Random rounds always leave the dealer on 17 or more once they stand.
    #[test]
    fn dealer_always_finishes_at_seventeen_or_more() {
        let mut rng = SystemRandom;
        for _ in 0..500 {
            let mut game = BlackjackGame::deal(10, Deck::shuffled(&mut rng), &mut rng);
            if game.settlement().is_some() {
                continue;
            }
            game.stand(&mut rng).unwrap();
            assert!(game.dealer_value() >= 17);
        }
    }

    #[test]
    fn double_down_draws_one_and_pays_four_times_bet() {
        let mut game = deal(
            100,
            [c(Rank::Five, Suit::Spades), c(Rank::Six, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[c(Rank::Nine, Suit::Clubs)],
        );

        game.double_down(&mut SystemRandom).unwrap();

        assert_eq!(game.hands()[0].cards().len(), 3);
        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Win);
        assert_eq!(settlement.total_stake, 200);
        assert_eq!(settlement.total_payout, 400);
    }

    #[test]
    fn double_down_push_returns_doubled_stake() {
        let mut game = deal(
            100,
            [c(Rank::Five, Suit::Spades), c(Rank::Five, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Ten, Suit::Clubs)],
            &[c(Rank::King, Suit::Clubs)],
        );

        game.double_down(&mut SystemRandom).unwrap();

        assert_eq!(game.settlement().unwrap().total_payout, 200);
    }

    #[test]
    fn double_down_rejected_after_hit() {
        let mut game = deal(
            100,
            [c(Rank::Two, Suit::Spades), c(Rank::Three, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[c(Rank::Four, Suit::Clubs)],
        );

        game.hit(&mut SystemRandom).unwrap();

        assert!(matches!(
            game.double_down(&mut SystemRandom),
            Err(GameError::InvalidAction(_))
        ));
        assert_eq!(game.hands()[0].cards().len(), 3);
    }

    #[test]
    fn split_requires_matching_pair() {
        let game = deal(
            100,
            [c(Rank::Nine, Suit::Spades), c(Rank::Eight, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[],
        );

        assert!(matches!(game.check_split(), Err(GameError::InvalidAction(_))));
    }

    #[test]
    fn ten_valued_cards_split() {
        let game = deal(
            100,
            [c(Rank::King, Suit::Spades), c(Rank::Ten, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[],
        );

        assert!(game.check_split().is_ok());
    }

    /// Split stakes 2× bet and each hand settles independently against the dealer.
    #[test]
    fn split_hands_settle_independently() {
        let mut game = deal(
            100,
            [c(Rank::Eight, Suit::Spades), c(Rank::Eight, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Eight, Suit::Clubs)],
            &[c(Rank::King, Suit::Clubs), c(Rank::Nine, Suit::Clubs)],
        );
        let mut rng = SystemRandom;

        game.split(&mut rng).unwrap();
        assert!(game.is_split());
        assert_eq!(game.total_stake(), 200);
        assert_eq!(game.phase(), &BlackjackPhase::SplitPlay { hand: 0 });

        // First hand 8+K = 18, second 8+9 = 17 against dealer 18
        game.stand(&mut rng).unwrap();
        assert_eq!(game.phase(), &BlackjackPhase::SplitPlay { hand: 1 });
        game.stand(&mut rng).unwrap();

        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Push);
        assert_eq!(settlement.hands[1].outcome, HandOutcome::Lose);
        assert_eq!(settlement.total_stake, 200);
        assert_eq!(settlement.total_payout, 100);
    }

    #[test]
    fn bust_on_first_split_hand_moves_to_second() {
        let mut game = deal(
            100,
            [c(Rank::Eight, Suit::Spades), c(Rank::Eight, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[
                c(Rank::Six, Suit::Clubs),
                c(Rank::Ten, Suit::Clubs),
                c(Rank::King, Suit::Hearts),
            ],
        );
        let mut rng = SystemRandom;

        game.split(&mut rng).unwrap();
        // 8+6 = 14, hit King = 24
        game.hit(&mut rng).unwrap();
        assert_eq!(game.phase(), &BlackjackPhase::SplitPlay { hand: 1 });

        // 8+10 = 18 beats dealer 17
        game.stand(&mut rng).unwrap();
        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Bust);
        assert_eq!(settlement.hands[1].outcome, HandOutcome::Win);
        assert_eq!(settlement.total_payout, 200);
    }

    #[test]
    fn split_twenty_one_is_not_a_natural() {
        let mut game = deal(
            100,
            [c(Rank::Ace, Suit::Spades), c(Rank::Ace, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[c(Rank::King, Suit::Clubs), c(Rank::Two, Suit::Clubs)],
        );
        let mut rng = SystemRandom;

        game.split(&mut rng).unwrap();
        game.stand(&mut rng).unwrap();
        game.stand(&mut rng).unwrap();

        let settlement = game.settlement().unwrap();
        assert_eq!(settlement.hands[0].outcome, HandOutcome::Win);
        assert_eq!(settlement.hands[0].payout, 200);
    }

    #[test]
    fn cannot_split_twice() {
        let mut game = deal(
            100,
            [c(Rank::Eight, Suit::Spades), c(Rank::Eight, Suit::Hearts)],
            [c(Rank::Ten, Suit::Diamonds), c(Rank::Seven, Suit::Clubs)],
            &[c(Rank::Eight, Suit::Clubs), c(Rank::Eight, Suit::Diamonds)],
        );
        let mut rng = SystemRandom;

        game.split(&mut rng).unwrap();
        assert!(game.check_split().is_err());
    }

    #[test]
    fn actions_rejected_once_settled() {
        let mut game = deal(
            100,
            [c(Rank::Ace, Suit::Spades), c(Rank::King, Suit::Hearts)],
            [c(Rank::Nine, Suit::Diamonds), c(Rank::Eight, Suit::Clubs)],
            &[],
        );
        let mut rng = SystemRandom;

        assert!(game.hit(&mut rng).is_err());
        assert!(game.stand(&mut rng).is_err());
        assert!(game.check_double_down().is_err());
        assert_eq!(game.stake_at_risk(), 0);
    }
}
