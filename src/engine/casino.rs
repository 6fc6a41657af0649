//! Single-shot games: one draw, one payout, no session.

use std::{fmt, str::FromStr};

use crate::{
    engine::{random::RandomSource, scale_tenths},
    error::game::GameError,
    model::game::GameKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CoinSide::Heads => "heads",
            CoinSide::Tails => "tails",
        })
    }
}

impl FromStr for CoinSide {
    type Err = GameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "heads" => Ok(CoinSide::Heads),
            "tails" => Ok(CoinSide::Tails),
            other => Err(GameError::invalid(format!("Unknown coin side `{other}`."))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Grape,
    Star,
    Diamond,
}

impl SlotSymbol {
    pub const ALL: [SlotSymbol; 6] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Orange,
        SlotSymbol::Grape,
        SlotSymbol::Star,
        SlotSymbol::Diamond,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            SlotSymbol::Cherry => "🍒",
            SlotSymbol::Lemon => "🍋",
            SlotSymbol::Orange => "🍊",
            SlotSymbol::Grape => "🍇",
            SlotSymbol::Star => "⭐",
            SlotSymbol::Diamond => "💎",
        }
    }

    /// Three-of-a-kind multiplier in tenths.
    fn triple_tenths(&self) -> i64 {
        match self {
            SlotSymbol::Diamond => 100,
            SlotSymbol::Star => 50,
            _ => 30,
        }
    }
}

const PAIR_TENTHS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouletteColor {
    Red,
    Black,
    Green,
}

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

impl RouletteColor {
    pub fn of(number: u8) -> Self {
        if number == 0 {
            RouletteColor::Green
        } else if RED_NUMBERS.contains(&number) {
            RouletteColor::Red
        } else {
            RouletteColor::Black
        }
    }
}

impl fmt::Display for RouletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouletteColor::Red => "red",
            RouletteColor::Black => "black",
            RouletteColor::Green => "green",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouletteBet {
    Red,
    Black,
    Number(u8),
}

impl FromStr for RouletteBet {
    type Err = GameError;

    /// Accepts `red`, `black` or a number from 0 to 36.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "red" => Ok(RouletteBet::Red),
            "black" => Ok(RouletteBet::Black),
            other => match other.parse::<u8>() {
                Ok(number) if number <= 36 => Ok(RouletteBet::Number(number)),
                _ => Err(GameError::invalid(
                    "Bet on `red`, `black` or a number from 0 to 36.",
                )),
            },
        }
    }
}

/// A wheel segment: name, multiplier in tenths and weight out of 100.
pub struct WheelSegment {
    pub name: &'static str,
    pub tenths: i64,
    pub weight: i64,
}

pub static WHEEL: [WheelSegment; 8] = [
    WheelSegment { name: "Bankrupt", tenths: 0, weight: 15 },
    WheelSegment { name: "Small Win", tenths: 15, weight: 25 },
    WheelSegment { name: "Double", tenths: 20, weight: 20 },
    WheelSegment { name: "Triple", tenths: 30, weight: 15 },
    WheelSegment { name: "Big Win", tenths: 50, weight: 10 },
    WheelSegment { name: "Mega Win", tenths: 100, weight: 8 },
    WheelSegment { name: "Super Win", tenths: 250, weight: 5 },
    WheelSegment { name: "Jackpot", tenths: 500, weight: 2 },
];

/// The call a player makes for one single-shot game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasinoBet {
    Coinflip(CoinSide),
    Dice(u8),
    Slots,
    Roulette(RouletteBet),
    Wheel,
}

/// What the draw produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasinoDraw {
    Coin(CoinSide),
    Die(u8),
    Reels([SlotSymbol; 3]),
    Pocket { number: u8, color: RouletteColor },
    Segment(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasinoOutcome {
    pub draw: CasinoDraw,
    pub payout: i64,
}

impl CasinoBet {
    pub fn game(&self) -> GameKind {
        match self {
            CasinoBet::Coinflip(_) => GameKind::Coinflip,
            CasinoBet::Dice(_) => GameKind::Dice,
            CasinoBet::Slots => GameKind::Slots,
            CasinoBet::Roulette(_) => GameKind::Roulette,
            CasinoBet::Wheel => GameKind::Wheel,
        }
    }

    /// Rejects calls no draw could ever match.
    pub fn validate(&self) -> Result<(), GameError> {
        match self {
            CasinoBet::Dice(face) if !(1..=6).contains(face) => {
                Err(GameError::invalid("Guess a number from 1 to 6."))
            }
            CasinoBet::Roulette(RouletteBet::Number(number)) if *number > 36 => {
                Err(GameError::invalid("Roulette numbers go from 0 to 36."))
            }
            _ => Ok(()),
        }
    }

    /// Draws once and computes the payout for `amount`.
    pub fn resolve(
        &self,
        amount: i64,
        rng: &mut impl RandomSource,
    ) -> Result<CasinoOutcome, GameError> {
        self.validate()?;

        let outcome = match *self {
            CasinoBet::Coinflip(guess) => {
                let landed = if rng.uniform() < 0.5 {
                    CoinSide::Heads
                } else {
                    CoinSide::Tails
                };
                CasinoOutcome {
                    draw: CasinoDraw::Coin(landed),
                    payout: if landed == guess { amount * 2 } else { 0 },
                }
            }
            CasinoBet::Dice(guess) => {
                let roll = rng.randint(1, 6) as u8;
                CasinoOutcome {
                    draw: CasinoDraw::Die(roll),
                    payout: if roll == guess { amount * 5 } else { 0 },
                }
            }
            CasinoBet::Slots => {
                let reels = [(); 3].map(|_| SlotSymbol::ALL[rng.randint(0, 5) as usize]);
                CasinoOutcome {
                    draw: CasinoDraw::Reels(reels),
                    payout: slots_payout(amount, &reels),
                }
            }
            CasinoBet::Roulette(bet) => {
                let number = rng.randint(0, 36) as u8;
                let color = RouletteColor::of(number);
                let payout = match bet {
                    RouletteBet::Red if color == RouletteColor::Red => amount * 2,
                    RouletteBet::Black if color == RouletteColor::Black => amount * 2,
                    RouletteBet::Number(n) if n == number => amount * 36,
                    _ => 0,
                };
                CasinoOutcome {
                    draw: CasinoDraw::Pocket { number, color },
                    payout,
                }
            }
            CasinoBet::Wheel => {
                let segment = spin_wheel(rng);
                CasinoOutcome {
                    draw: CasinoDraw::Segment(segment.name),
                    payout: scale_tenths(amount, segment.tenths),
                }
            }
        };

        Ok(outcome)
    }
}

fn slots_payout(amount: i64, reels: &[SlotSymbol; 3]) -> i64 {
    let [a, b, c] = *reels;
    if a == b && b == c {
        scale_tenths(amount, a.triple_tenths())
    } else if a == b || b == c || a == c {
        scale_tenths(amount, PAIR_TENTHS)
    } else {
        0
    }
}

fn spin_wheel(rng: &mut impl RandomSource) -> &'static WheelSegment {
    let mut ticket = rng.randint(1, 100);
    for segment in WHEEL.iter() {
        if ticket <= segment.weight {
            return segment;
        }
        ticket -= segment.weight;
    }
    &WHEEL[WHEEL.len() - 1]
}
