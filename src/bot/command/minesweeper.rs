use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

use super::{bet_option, subcommand, BetLimits, Options};
use crate::{
    engine::minesweeper::{
        MinesweeperGame, MinesweeperPhase, RevealOutcome, GRID_CELLS, MAX_MINES, MIN_MINES,
    },
    error::{game::GameError, AppError},
    model::game::PlayContext,
    service::minesweeper::MinesweeperService,
    state::AppState,
};

pub const LIMITS: BetLimits = BetLimits::new(25, 1000);

/// Cells per row when the board is drawn.
const ROW_WIDTH: usize = 6;

pub fn register() -> CreateCommand {
    CreateCommand::new("minesweeper")
        .description("Reveal safe cells, avoid the mines")
        .add_option(
            subcommand("start", "Start a new board")
                .add_sub_option(bet_option(LIMITS))
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "mines",
                        format!("Number of mines ({MIN_MINES}-{MAX_MINES})"),
                    )
                    .required(true),
                ),
        )
        .add_option(
            subcommand("reveal", "Reveal a cell").add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "cell",
                    format!("Cell number (1-{GRID_CELLS})"),
                )
                .required(true),
            ),
        )
        .add_option(subcommand("cashout", "Take your winnings"))
}

pub async fn run(
    state: &AppState,
    ctx: PlayContext,
    options: Options<'_>,
) -> Result<String, AppError> {
    let service = MinesweeperService::new(&state.db, &state.minesweeper);
    let (name, options) = options.subcommand()?;

    match name {
        "start" => {
            let bet = options.bet(LIMITS)?;
            let mines = usize::try_from(options.integer("mines")?).unwrap_or(0);
            MinesweeperGame::check_mine_count(mines)?;

            let board = service.start(ctx, bet, mines).await?;
            Ok(format!(
                "{}\n{} mines hidden. Use `/minesweeper reveal` to pick a cell.",
                render(&board),
                board.mine_count()
            ))
        }
        "reveal" => {
            let cell = parse_cell(options.integer("cell")?)?;
            let result = service.reveal(ctx, cell).await?;

            let status = match result.outcome {
                RevealOutcome::Safe { .. } => format!(
                    "Safe! Current multiplier **{:.2}x** ({} coins).",
                    result.board.current_multiplier(),
                    result.board.current_payout()
                ),
                RevealOutcome::Mine => "💥 You hit a mine and lost your bet.".to_string(),
                RevealOutcome::Cleared { payout } => {
                    format!("You cleared the board! **{payout}** coins paid.")
                }
            };
            Ok(format!("{}\n{}", render(&result.board), status))
        }
        "cashout" => {
            let board = service.cash_out(ctx).await?;
            let payout = match board.phase() {
                MinesweeperPhase::Won { payout } => payout,
                _ => 0,
            };
            Ok(format!(
                "{}\nYou cashed out for **{}** coins.",
                render(&board),
                payout
            ))
        }
        _ => Err(GameError::invalid("Unknown minesweeper action.").into()),
    }
}

/// Converts a 1-based cell number into a board index.
fn parse_cell(cell: i64) -> Result<usize, GameError> {
    usize::try_from(cell)
        .ok()
        .filter(|cell| (1..=GRID_CELLS).contains(cell))
        .map(|cell| cell - 1)
        .ok_or_else(|| GameError::invalid(format!("Pick a cell from 1 to {GRID_CELLS}.")))
}

fn render(board: &MinesweeperGame) -> String {
    let mines = board.mines();

    let cells: Vec<String> = (0..GRID_CELLS)
        .map(|cell| {
            if board.revealed().contains(&cell) {
                "💎".to_string()
            } else if mines.is_some_and(|mines| mines.contains(&cell)) {
                "💣".to_string()
            } else {
                format!("`{:>2}`", cell + 1)
            }
        })
        .collect();

    cells
        .chunks(ROW_WIDTH)
        .map(|row| row.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}
