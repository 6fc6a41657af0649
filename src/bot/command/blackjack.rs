use serenity::all::CreateCommand;

use super::{bet_option, signed, subcommand, BetLimits, Options};
use crate::{
    engine::{blackjack::BlackjackGame, cards::Card},
    error::{game::GameError, AppError},
    model::game::PlayContext,
    service::blackjack::BlackjackService,
    state::AppState,
};

pub const LIMITS: BetLimits = BetLimits::new(25, 1000);

pub fn register() -> CreateCommand {
    CreateCommand::new("blackjack")
        .description("Play blackjack against the dealer")
        .add_option(subcommand("start", "Deal a new hand").add_sub_option(bet_option(LIMITS)))
        .add_option(subcommand("hit", "Take another card"))
        .add_option(subcommand("stand", "Keep your hand"))
        .add_option(subcommand("double", "Double your bet, take one card and stand"))
        .add_option(subcommand("split", "Split a pair into two hands"))
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    options: Options<'_>,
) -> Result<String, AppError> {
    let service = BlackjackService::new(&state.db, &state.blackjack);
    let (name, options) = options.subcommand()?;

    let game = match name {
        "start" => service.start(ctx, options.bet(LIMITS)?).await?,
        "hit" => service.hit(ctx).await?,
        "stand" => service.stand(ctx).await?,
        "double" => service.double_down(ctx).await?,
        "split" => service.split(ctx).await?,
        _ => return Err(GameError::invalid("Unknown blackjack action.").into()),
    };

    Ok(describe(&game))
}

fn cards(cards: &[Card]) -> String {
    let cards: Vec<String> = cards.iter().map(Card::to_string).collect();
    cards.join(" ")
}

fn describe(game: &BlackjackGame) -> String {
    let Some(settlement) = game.settlement() else {
        let active = game.active_hand();
        let hands: Vec<String> = game
            .hands()
            .iter()
            .enumerate()
            .map(|(index, hand)| {
                let marker = if game.is_split() && active == Some(index) {
                    "▶ "
                } else {
                    ""
                };
                let doubled = if hand.is_doubled() { ", doubled" } else { "" };
                format!("{marker}Your hand: {hand}{doubled}")
            })
            .collect();

        return format!(
            "{}\nDealer shows: {} ??\nUse `/blackjack hit`, `stand`, `double` or `split`.",
            hands.join("\n"),
            game.dealer_upcard()
        );
    };

    let hands: Vec<String> = game
        .hands()
        .iter()
        .zip(&settlement.hands)
        .map(|(hand, result)| format!("Your hand: {} **{}**", hand, result.outcome.label()))
        .collect();

    format!(
        "{}\nDealer: {} ({})\nPayout **{}** ({}).",
        hands.join("\n"),
        cards(game.dealer_cards()),
        settlement.dealer_value,
        settlement.total_payout,
        signed(settlement.total_payout - settlement.total_stake)
    )
}
