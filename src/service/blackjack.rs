use sea_orm::DatabaseConnection;

use crate::{
    engine::{
        blackjack::BlackjackGame,
        cards::Deck,
        random::SystemRandom,
    },
    error::{game::GameError, AppError},
    model::game::{GameKind, PlayContext},
    service::{
        conclude, economy::EconomyService, ensure_no_session, lock_session, open_session,
        restriction::RestrictionService,
    },
    session::SessionStore,
};

/// Runs blackjack rounds against the ledger and the blackjack session store.
///
/// Each method returns a snapshot of the game after the action. A settled snapshot means
/// the payout has already been credited and the session is gone.
pub struct BlackjackService<'a> {
    db: &'a DatabaseConnection,
    sessions: &'a SessionStore<BlackjackGame>,
}

impl<'a> BlackjackService<'a> {
    pub fn new(db: &'a DatabaseConnection, sessions: &'a SessionStore<BlackjackGame>) -> Self {
        Self { db, sessions }
    }

    /// Takes the bet and deals a new round from a freshly shuffled deck.
    ///
    /// A natural blackjack settles on the deal and never opens a session.
    ///
    /// # Returns
    /// - `Ok(BlackjackGame)` - The dealt round
    /// - `Err(GameErr(GameRestricted))` - Blackjack is not allowed in this channel
    /// - `Err(GameErr(ActiveSessionExists))` - The player already has a round going
    /// - `Err(GameErr(InsufficientFunds))` - Balance below the bet
    pub async fn start(&self, ctx: PlayContext, bet: i64) -> Result<BlackjackGame, AppError> {
        let deck = Deck::shuffled(&mut SystemRandom);
        self.start_with_deck(ctx, bet, deck).await
    }

    pub(crate) async fn start_with_deck(
        &self,
        ctx: PlayContext,
        bet: i64,
        deck: Deck,
    ) -> Result<BlackjackGame, AppError> {
        RestrictionService::new(self.db)
            .ensure_allowed(ctx, GameKind::Blackjack)
            .await?;
        ensure_no_session(self.db, self.sessions, ctx).await?;

        let economy = EconomyService::new(self.db);
        economy.debit(ctx.wallet(), bet).await?;

        let game = BlackjackGame::deal(bet, deck, &mut SystemRandom);
        let handle = open_session(self.db, self.sessions, ctx, bet, game.clone()).await?;
        tracing::debug!("User {} started blackjack for {}", ctx.user_id, bet);

        // A natural settles on the deal
        if let Some(settlement) = game.settlement() {
            let mut session = handle.lock().await;
            conclude(self.db, self.sessions, &mut *session, Some(settlement.total_payout))
                .await?;
        }

        Ok(game)
    }

    pub async fn hit(&self, ctx: PlayContext) -> Result<BlackjackGame, AppError> {
        self.act(ctx, |game, rng| game.hit(rng).map(|_| ())).await
    }

    pub async fn stand(&self, ctx: PlayContext) -> Result<BlackjackGame, AppError> {
        self.act(ctx, |game, rng| game.stand(rng).map(|_| ())).await
    }

    /// Doubles the active hand's stake, draws one card and stands.
    ///
    /// The extra bet is debited only after the engine confirms the double is legal.
    pub async fn double_down(&self, ctx: PlayContext) -> Result<BlackjackGame, AppError> {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        session.game.check_double_down()?;

        let bet = session.game.bet();
        EconomyService::new(self.db).debit(ctx.wallet(), bet).await?;
        session.game.double_down(&mut SystemRandom)?;

        let payout = session.game.settlement().map(|s| s.total_payout);
        conclude(self.db, self.sessions, &mut *session, payout).await?;

        Ok(session.game.clone())
    }

    /// Splits the opening pair into two hands for a second bet.
    pub async fn split(&self, ctx: PlayContext) -> Result<BlackjackGame, AppError> {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        session.game.check_split()?;

        let bet = session.game.bet();
        EconomyService::new(self.db).debit(ctx.wallet(), bet).await?;
        session.game.split(&mut SystemRandom)?;

        conclude(self.db, self.sessions, &mut *session, None).await?;

        Ok(session.game.clone())
    }

    /// Applies a free action (hit or stand) and settles if the round ended.
    async fn act<F>(&self, ctx: PlayContext, action: F) -> Result<BlackjackGame, AppError>
    where
        F: FnOnce(&mut BlackjackGame, &mut SystemRandom) -> Result<(), GameError>,
    {
        let mut session = lock_session(self.db, self.sessions, ctx).await?;
        action(&mut session.game, &mut SystemRandom)?;

        let payout = session.game.settlement().map(|s| s.total_payout);
        conclude(self.db, self.sessions, &mut *session, payout).await?;

        Ok(session.game.clone())
    }
}
