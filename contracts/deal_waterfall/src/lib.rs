#![no_std]

mod allocation;
mod error;
mod events;
mod storage;

use allocation::{
    allocate_pro_rata, allocate_sequential, factor_after_payment, fee_amount, interest_due,
};
use error::Error;
use events::{
    CollectionsReportedEvent, DealConfiguredEvent, ExecutorSetEvent, FeePaidEvent,
    InterestPaidEvent, PrincipalPaidEvent, ReporterSetEvent, ResidualRecordedEvent,
    ResidualWithdrawnEvent, TriggerActivatedEvent, TriggerClearedEvent, WaterfallExecutedEvent,
};
use storage::{DataKey, Deal, FeeConfig, PeriodReport, PrincipalStrategy, TrancheSlot};

use soroban_sdk::auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation};
use soroban_sdk::{contract, contractimpl, token, vec, Address, Env, IntoVal, Symbol, Vec};

#[contract]
pub struct DealWaterfall;

#[contractimpl]
impl DealWaterfall {
    // ============================================
    // INITIALIZATION & CAPABILITIES
    // ============================================

    /// Initialize the engine
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        tranche_token: Address,
        payment_token: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::TrancheToken, &tranche_token);
        env.storage()
            .instance()
            .set(&DataKey::PaymentToken, &payment_token);

        Ok(())
    }

    /// Grant the collections-reporting capability
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn add_reporter(env: Env, reporter: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::Reporters(reporter.clone()), &true);
        env.events().publish(
            (Symbol::new(&env, "reporter_set"), reporter.clone()),
            ReporterSetEvent {
                account: reporter,
                granted: true,
            },
        );
        Ok(())
    }

    /// Revoke the collections-reporting capability
    pub fn remove_reporter(env: Env, reporter: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .remove(&DataKey::Reporters(reporter.clone()));
        env.events().publish(
            (Symbol::new(&env, "reporter_set"), reporter.clone()),
            ReporterSetEvent {
                account: reporter,
                granted: false,
            },
        );
        Ok(())
    }

    /// Grant the waterfall-execution capability
    pub fn add_executor(env: Env, executor: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::Executors(executor.clone()), &true);
        env.events().publish(
            (Symbol::new(&env, "executor_set"), executor.clone()),
            ExecutorSetEvent {
                account: executor,
                granted: true,
            },
        );
        Ok(())
    }

    /// Revoke the waterfall-execution capability
    pub fn remove_executor(env: Env, executor: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .remove(&DataKey::Executors(executor.clone()));
        env.events().publish(
            (Symbol::new(&env, "executor_set"), executor.clone()),
            ExecutorSetEvent {
                account: executor,
                granted: false,
            },
        );
        Ok(())
    }

    // ============================================
    // DEAL CONFIGURATION
    // ============================================

    /// One-time setup of a deal's tranching, fees, and principal strategy.
    ///
    /// Tranches must already exist on the ledger under the same deal ID and
    /// are listed senior to junior. Membership is immutable afterwards.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    /// - `DealAlreadyConfigured`: Deal ID already used
    /// - `EmptyTrancheList`: No tranches given
    /// - `MismatchedConfig`: Tranche and rate arrays differ in length
    /// - `InvalidFrequency`: Frequency outside 1..=12 months
    /// - `InvalidFeeRate` / `InvalidCouponRate`: Rate at or above 100%
    /// - `DuplicateTranche`: Same tranche listed twice
    /// - `UnknownTranche`: Tranche missing on the ledger
    /// - `TrancheDealMismatch`: Tranche belongs to another deal
    pub fn configure_deal(
        env: Env,
        deal_id: u32,
        tranche_ids: Vec<u32>,
        coupon_rates_bps: Vec<u32>,
        frequency_months: u32,
        fees: FeeConfig,
        principal_paying_agent: Address,
        residual_recipient: Address,
        strategy: PrincipalStrategy,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env)?;

        if env.storage().persistent().has(&DataKey::Deal(deal_id)) {
            return Err(Error::DealAlreadyConfigured);
        }
        if tranche_ids.is_empty() {
            return Err(Error::EmptyTrancheList);
        }
        if tranche_ids.len() != coupon_rates_bps.len() {
            return Err(Error::MismatchedConfig);
        }
        if frequency_months == 0 || frequency_months > 12 {
            return Err(Error::InvalidFrequency);
        }
        if fees.trustee_fee_bps >= 10_000 || fees.servicer_fee_bps >= 10_000 {
            return Err(Error::InvalidFeeRate);
        }

        let ledger = Self::ledger_address(&env)?;
        let mut slots: Vec<TrancheSlot> = Vec::new(&env);
        for i in 0..tranche_ids.len() {
            let tranche_id = tranche_ids.get_unchecked(i);
            let coupon_rate_bps = coupon_rates_bps.get_unchecked(i);
            if coupon_rate_bps >= 10_000 {
                return Err(Error::InvalidCouponRate);
            }
            for j in 0..i {
                if tranche_ids.get_unchecked(j) == tranche_id {
                    return Err(Error::DuplicateTranche);
                }
            }
            if !Self::invoke_has_tranche(&env, &ledger, tranche_id) {
                return Err(Error::UnknownTranche);
            }
            if Self::invoke_tranche_deal(&env, &ledger, tranche_id) != deal_id {
                return Err(Error::TrancheDealMismatch);
            }
            slots.push_back(TrancheSlot {
                tranche_id,
                coupon_rate_bps,
                deferred_interest: 0,
            });
        }

        let tranche_count = slots.len();
        let deal = Deal {
            deal_id,
            tranches: slots,
            frequency_months,
            fees,
            principal_paying_agent,
            residual_recipient,
            strategy,
            active: true,
            trigger_active: false,
            last_reported_period: 0,
            last_processed_period: 0,
            residual_accumulated: 0,
        };
        env.storage().persistent().set(&DataKey::Deal(deal_id), &deal);

        env.events().publish(
            (Symbol::new(&env, "deal_configured"), deal_id),
            DealConfiguredEvent {
                deal_id,
                tranche_count,
                frequency_months,
            },
        );

        Ok(())
    }

    // ============================================
    // PERIOD REPORTING
    // ============================================

    /// Record a period's verified collections and escrow the cash.
    ///
    /// The period number is always the next in sequence; a new period cannot
    /// be reported until the previous one has been executed.
    ///
    /// Returns the assigned period number.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotReporter`: Caller lacks the reporting capability
    /// - `DealNotFound` / `DealNotActive`
    /// - `InvalidAmount`: A negative amount
    /// - `PriorPeriodUnprocessed`: Last reported period not yet executed
    pub fn report_collections(
        env: Env,
        reporter: Address,
        deal_id: u32,
        interest_collected: i128,
        principal_collected: i128,
        losses_realized: i128,
        prepayments: i128,
    ) -> Result<u32, Error> {
        Self::require_initialized(&env)?;
        Self::require_reporter(&env, &reporter)?;
        reporter.require_auth();

        let mut deal = Self::read_deal(&env, deal_id)?;
        if !deal.active {
            return Err(Error::DealNotActive);
        }
        if interest_collected < 0
            || principal_collected < 0
            || losses_realized < 0
            || prepayments < 0
        {
            return Err(Error::InvalidAmount);
        }
        if deal.last_reported_period != deal.last_processed_period {
            return Err(Error::PriorPeriodUnprocessed);
        }

        let period = deal.last_reported_period + 1;

        let cash = interest_collected
            .checked_add(principal_collected)
            .and_then(|v| v.checked_add(prepayments))
            .ok_or(Error::InvalidAmount)?;
        if cash > 0 {
            let payment = Self::payment_address(&env)?;
            token::Client::new(&env, &payment).transfer(
                &reporter,
                &env.current_contract_address(),
                &cash,
            );
        }

        let report = PeriodReport {
            interest_collected,
            principal_collected,
            losses_realized,
            prepayments,
            processed: false,
            reported_at: env.ledger().timestamp(),
        };
        env.storage()
            .persistent()
            .set(&DataKey::Period(deal_id, period), &report);

        deal.last_reported_period = period;
        env.storage().persistent().set(&DataKey::Deal(deal_id), &deal);

        env.events().publish(
            (Symbol::new(&env, "collections_reported"), deal_id, period),
            CollectionsReportedEvent {
                deal_id,
                period,
                interest_collected,
                principal_collected,
                losses_realized,
                prepayments,
            },
        );

        Ok(period)
    }

    // ============================================
    // WATERFALL EXECUTION
    // ============================================

    /// Run the distribution waterfall for a reported period: fees, then
    /// interest senior to junior, then principal per the deal's strategy,
    /// then residual.
    ///
    /// The whole call is one invocation; any failed transfer or ledger call
    /// rolls back every prior step of the period.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotExecutor`: Caller lacks the execution capability
    /// - `DealNotFound` / `DealNotActive`
    /// - `PeriodNotFound`: No report stored for this period
    /// - `PeriodAlreadyProcessed`: Period was already executed
    /// - `PeriodOutOfSequence`: Not the most recently reported period
    pub fn execute_waterfall(
        env: Env,
        executor: Address,
        deal_id: u32,
        period: u32,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_executor(&env, &executor)?;
        executor.require_auth();

        let mut deal = Self::read_deal(&env, deal_id)?;
        if !deal.active {
            return Err(Error::DealNotActive);
        }

        let mut report: PeriodReport = env
            .storage()
            .persistent()
            .get(&DataKey::Period(deal_id, period))
            .ok_or(Error::PeriodNotFound)?;
        if report.processed {
            return Err(Error::PeriodAlreadyProcessed);
        }
        if period != deal.last_reported_period {
            return Err(Error::PeriodOutOfSequence);
        }

        let ledger = Self::ledger_address(&env)?;
        let payment = Self::payment_address(&env)?;
        let payment_client = token::Client::new(&env, &payment);

        // Collections are kept in two buckets: interest pays fees and
        // coupons, principal amortizes faces. Leftovers of either become
        // residual rather than crossing over.
        let mut interest_pool = report.interest_collected;
        let mut principal_pool = report
            .principal_collected
            .checked_add(report.prepayments)
            .ok_or(Error::InvalidAmount)?;

        // 1. Fees off the top, trustee before servicer
        let total_available = interest_pool
            .checked_add(principal_pool)
            .ok_or(Error::InvalidAmount)?;
        let trustee_fee =
            fee_amount(total_available, deal.fees.trustee_fee_bps).ok_or(Error::InvalidAmount)?;
        Self::draw(&mut interest_pool, &mut principal_pool, trustee_fee);
        if trustee_fee > 0 {
            payment_client.transfer(
                &env.current_contract_address(),
                &deal.fees.trustee,
                &trustee_fee,
            );
            env.events().publish(
                (Symbol::new(&env, "fee_paid"), deal_id, period),
                FeePaidEvent {
                    deal_id,
                    period,
                    role: Symbol::new(&env, "trustee"),
                    recipient: deal.fees.trustee.clone(),
                    amount: trustee_fee,
                },
            );
        }
        let servicer_fee = fee_amount(total_available - trustee_fee, deal.fees.servicer_fee_bps)
            .ok_or(Error::InvalidAmount)?;
        Self::draw(&mut interest_pool, &mut principal_pool, servicer_fee);
        if servicer_fee > 0 {
            payment_client.transfer(
                &env.current_contract_address(),
                &deal.fees.servicer,
                &servicer_fee,
            );
            env.events().publish(
                (Symbol::new(&env, "fee_paid"), deal_id, period),
                FeePaidEvent {
                    deal_id,
                    period,
                    role: Symbol::new(&env, "servicer"),
                    recipient: deal.fees.servicer.clone(),
                    amount: servicer_fee,
                },
            );
        }
        let fees_paid = trustee_fee + servicer_fee;

        // 2. Interest, senior to junior. Shortfall is deferred in full, not
        // forgiven. Each paid tranche snapshots its holders via the ledger.
        let mut faces: Vec<i128> = Vec::new(&env);
        let mut interest_paid_total: i128 = 0;
        let mut slots = deal.tranches.clone();
        for i in 0..slots.len() {
            let mut slot = slots.get_unchecked(i);
            let face = Self::invoke_face(&env, &ledger, slot.tranche_id);
            faces.push_back(face);

            let due = interest_due(
                face,
                slot.coupon_rate_bps,
                deal.frequency_months,
                slot.deferred_interest,
            )
            .ok_or(Error::InvalidAmount)?;
            let paid = if interest_pool <= due { interest_pool } else { due };
            if paid > 0 {
                Self::invoke_distribute_yield(&env, &ledger, &payment, slot.tranche_id, paid);
                interest_pool -= paid;
                interest_paid_total += paid;
            }
            slot.deferred_interest = due - paid;
            let deferred = slot.deferred_interest;
            let tranche_id = slot.tranche_id;
            slots.set(i, slot);

            env.events().publish(
                (Symbol::new(&env, "interest_paid"), deal_id, period),
                InterestPaidEvent {
                    deal_id,
                    period,
                    tranche_id,
                    due,
                    paid,
                    deferred,
                },
            );
        }
        deal.tranches = slots;

        // 3. Principal per the configured strategy. Every tranche gets a
        // factor update so its period advances, paid or not.
        let allocations = match &deal.strategy {
            PrincipalStrategy::Sequential => allocate_sequential(&env, &faces, principal_pool),
            PrincipalStrategy::ProRata => {
                allocate_pro_rata(&env, &faces, principal_pool).ok_or(Error::InvalidAmount)?
            }
        };

        let mut principal_paid_total: i128 = 0;
        for i in 0..deal.tranches.len() {
            let slot = deal.tranches.get_unchecked(i);
            let face = faces.get_unchecked(i);
            let paid = allocations.get_unchecked(i);

            let new_factor = if paid > 0 {
                let original = Self::invoke_original_face(&env, &ledger, slot.tranche_id);
                factor_after_payment(face, paid, original).ok_or(Error::InvalidAmount)?
            } else {
                Self::invoke_factor(&env, &ledger, slot.tranche_id)
            };
            Self::invoke_update_factor(&env, &ledger, slot.tranche_id, new_factor);

            principal_pool -= paid;
            principal_paid_total += paid;

            env.events().publish(
                (Symbol::new(&env, "principal_paid"), deal_id, period),
                PrincipalPaidEvent {
                    deal_id,
                    period,
                    tranche_id: slot.tranche_id,
                    paid,
                    new_factor,
                },
            );
        }
        if principal_paid_total > 0 {
            payment_client.transfer(
                &env.current_contract_address(),
                &deal.principal_paying_agent,
                &principal_paid_total,
            );
        }

        // 4. Residual: both buckets' leftovers stay in escrow, recorded on
        // the deal until withdrawn.
        let residual = interest_pool
            .checked_add(principal_pool)
            .ok_or(Error::InvalidAmount)?;
        if residual > 0 {
            deal.residual_accumulated = deal
                .residual_accumulated
                .checked_add(residual)
                .ok_or(Error::InvalidAmount)?;
            env.events().publish(
                (Symbol::new(&env, "residual_recorded"), deal_id, period),
                ResidualRecordedEvent {
                    deal_id,
                    period,
                    amount: residual,
                },
            );
        }

        report.processed = true;
        env.storage()
            .persistent()
            .set(&DataKey::Period(deal_id, period), &report);
        deal.last_processed_period = period;
        env.storage().persistent().set(&DataKey::Deal(deal_id), &deal);

        env.events().publish(
            (Symbol::new(&env, "waterfall_executed"), deal_id, period),
            WaterfallExecutedEvent {
                deal_id,
                period,
                fees_paid,
                interest_paid: interest_paid_total,
                principal_paid: principal_paid_total,
                residual,
            },
        );

        Ok(())
    }

    /// Pay a deal's accumulated residual to its residual recipient
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    /// - `DealNotFound`: Deal doesn't exist
    /// - `NothingToWithdraw`: No residual accumulated
    pub fn withdraw_residual(env: Env, deal_id: u32) -> Result<i128, Error> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env)?;

        let mut deal = Self::read_deal(&env, deal_id)?;
        let amount = deal.residual_accumulated;
        if amount <= 0 {
            return Err(Error::NothingToWithdraw);
        }

        let recipient = deal.residual_recipient.clone();
        let payment = Self::payment_address(&env)?;
        token::Client::new(&env, &payment).transfer(
            &env.current_contract_address(),
            &recipient,
            &amount,
        );

        deal.residual_accumulated = 0;
        env.storage().persistent().set(&DataKey::Deal(deal_id), &deal);

        env.events().publish(
            (Symbol::new(&env, "residual_withdrawn"), deal_id),
            ResidualWithdrawnEvent {
                deal_id,
                recipient,
                amount,
            },
        );

        Ok(amount)
    }

    // ============================================
    // TRIGGERS
    // ============================================

    /// Record a test breach (e.g. a failed coverage ratio). The flag is an
    /// audit record for downstream policy; the waterfall itself does not
    /// branch on it.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    /// - `DealNotFound`: Deal doesn't exist
    /// - `TriggerAlreadyActive`: Trigger already set
    pub fn activate_trigger(env: Env, deal_id: u32, reason: Symbol) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env)?;

        let mut deal = Self::read_deal(&env, deal_id)?;
        if deal.trigger_active {
            return Err(Error::TriggerAlreadyActive);
        }
        deal.trigger_active = true;
        env.storage().persistent().set(&DataKey::Deal(deal_id), &deal);

        env.events().publish(
            (Symbol::new(&env, "trigger_activated"), deal_id),
            TriggerActivatedEvent { deal_id, reason },
        );

        Ok(())
    }

    /// Clear a previously recorded trigger
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    /// - `DealNotFound`: Deal doesn't exist
    /// - `TriggerNotActive`: No trigger to clear
    pub fn clear_trigger(env: Env, deal_id: u32) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env)?;

        let mut deal = Self::read_deal(&env, deal_id)?;
        if !deal.trigger_active {
            return Err(Error::TriggerNotActive);
        }
        deal.trigger_active = false;
        env.storage().persistent().set(&DataKey::Deal(deal_id), &deal);

        env.events().publish(
            (Symbol::new(&env, "trigger_cleared"), deal_id),
            TriggerClearedEvent { deal_id },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Get the full deal record
    pub fn get_deal(env: Env, deal_id: u32) -> Result<Deal, Error> {
        Self::read_deal(&env, deal_id)
    }

    /// Get a period's collection report
    pub fn get_period(env: Env, deal_id: u32, period: u32) -> Result<PeriodReport, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Period(deal_id, period))
            .ok_or(Error::PeriodNotFound)
    }

    /// Residual accumulated and not yet withdrawn
    pub fn residual_of(env: Env, deal_id: u32) -> Result<i128, Error> {
        Ok(Self::read_deal(&env, deal_id)?.residual_accumulated)
    }

    /// Deferred (carried) interest for one tranche of a deal
    pub fn deferred_interest_of(env: Env, deal_id: u32, tranche_id: u32) -> Result<i128, Error> {
        let deal = Self::read_deal(&env, deal_id)?;
        for slot in deal.tranches.iter() {
            if slot.tranche_id == tranche_id {
                return Ok(slot.deferred_interest);
            }
        }
        Err(Error::UnknownTranche)
    }

    /// Check if address holds the reporting capability
    pub fn is_reporter(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Reporters(account))
            .unwrap_or(false)
    }

    /// Check if address holds the execution capability
    pub fn is_executor(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Executors(account))
            .unwrap_or(false)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn require_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();
        Ok(())
    }

    fn require_reporter(env: &Env, account: &Address) -> Result<(), Error> {
        let granted = env
            .storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Reporters(account.clone()))
            .unwrap_or(false);
        if !granted {
            return Err(Error::NotReporter);
        }
        Ok(())
    }

    fn require_executor(env: &Env, account: &Address) -> Result<(), Error> {
        let granted = env
            .storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Executors(account.clone()))
            .unwrap_or(false);
        if !granted {
            return Err(Error::NotExecutor);
        }
        Ok(())
    }

    fn read_deal(env: &Env, deal_id: u32) -> Result<Deal, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Deal(deal_id))
            .ok_or(Error::DealNotFound)
    }

    fn ledger_address(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::TrancheToken)
            .ok_or(Error::NotInitialized)
    }

    fn payment_address(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::PaymentToken)
            .ok_or(Error::NotInitialized)
    }

    /// Draw a fee from the interest bucket first, spilling into principal.
    /// The caller guarantees the fee never exceeds the two buckets combined.
    fn draw(interest_pool: &mut i128, principal_pool: &mut i128, amount: i128) {
        let from_interest = if amount <= *interest_pool {
            amount
        } else {
            *interest_pool
        };
        *interest_pool -= from_interest;
        *principal_pool -= amount - from_interest;
    }

    // Read-only queries against the ledger

    fn invoke_has_tranche(env: &Env, ledger: &Address, tranche_id: u32) -> bool {
        env.invoke_contract(
            ledger,
            &Symbol::new(env, "has_tranche"),
            vec![env, tranche_id.into_val(env)],
        )
    }

    fn invoke_tranche_deal(env: &Env, ledger: &Address, tranche_id: u32) -> u32 {
        env.invoke_contract(
            ledger,
            &Symbol::new(env, "tranche_deal"),
            vec![env, tranche_id.into_val(env)],
        )
    }

    fn invoke_face(env: &Env, ledger: &Address, tranche_id: u32) -> i128 {
        env.invoke_contract(
            ledger,
            &Symbol::new(env, "total_current_face_value"),
            vec![env, tranche_id.into_val(env)],
        )
    }

    fn invoke_factor(env: &Env, ledger: &Address, tranche_id: u32) -> i128 {
        env.invoke_contract(
            ledger,
            &Symbol::new(env, "current_factor"),
            vec![env, tranche_id.into_val(env)],
        )
    }

    fn invoke_original_face(env: &Env, ledger: &Address, tranche_id: u32) -> i128 {
        env.invoke_contract(
            ledger,
            &Symbol::new(env, "original_face"),
            vec![env, tranche_id.into_val(env)],
        )
    }

    // Writes through the ledger's distribution capability

    fn invoke_update_factor(env: &Env, ledger: &Address, tranche_id: u32, new_factor: i128) {
        let operator = env.current_contract_address();
        env.invoke_contract::<()>(
            ledger,
            &Symbol::new(env, "update_factor"),
            vec![
                env,
                operator.to_val(),
                tranche_id.into_val(env),
                new_factor.into_val(env),
            ],
        );
    }

    fn invoke_distribute_yield(
        env: &Env,
        ledger: &Address,
        payment: &Address,
        tranche_id: u32,
        amount: i128,
    ) {
        // The ledger pulls the yield pool from this contract inside its own
        // frame, so the nested token transfer needs an explicit invoker
        // authorization.
        let operator = env.current_contract_address();
        env.authorize_as_current_contract(vec![
            env,
            InvokerContractAuthEntry::Contract(SubContractInvocation {
                context: ContractContext {
                    contract: payment.clone(),
                    fn_name: Symbol::new(env, "transfer"),
                    args: (operator.clone(), ledger.clone(), amount).into_val(env),
                },
                sub_invocations: Vec::new(env),
            }),
        ]);

        env.invoke_contract::<()>(
            ledger,
            &Symbol::new(env, "distribute_yield"),
            vec![
                env,
                operator.to_val(),
                tranche_id.into_val(env),
                amount.into_val(env),
            ],
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::{FACTOR_ONE, SCALE};
    use compliance_registry::{ComplianceRegistry, ComplianceRegistryClient};
    use soroban_sdk::{
        testutils::Address as _, token::StellarAssetClient, Address, Env,
    };
    use tranche_token::{TrancheToken, TrancheTokenClient};

    struct TestContext {
        env: Env,
        admin: Address,
        reporter: Address,
        trustee: Address,
        servicer: Address,
        paying_agent: Address,
        residual_recipient: Address,
        payment: Address,
        ledger_id: Address,
        engine_id: Address,
    }

    fn setup() -> TestContext {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let reporter = Address::generate(&env);
        let trustee = Address::generate(&env);
        let servicer = Address::generate(&env);
        let paying_agent = Address::generate(&env);
        let residual_recipient = Address::generate(&env);

        let payment_contract = env.register_stellar_asset_contract_v2(admin.clone());
        let payment = payment_contract.address();

        let registry_id = env.register_contract(None, ComplianceRegistry);
        ComplianceRegistryClient::new(&env, &registry_id).initialize(&admin);

        let ledger_id = env.register_contract(None, TrancheToken);
        let ledger = TrancheTokenClient::new(&env, &ledger_id);
        ledger.initialize(&admin, &payment, &registry_id);
        ledger.add_issuer(&admin);

        let engine_id = env.register_contract(None, DealWaterfall);
        let engine = DealWaterfallClient::new(&env, &engine_id);
        engine.initialize(&admin, &ledger_id, &payment);

        // The engine holds the ledger's distribution capability
        ledger.add_distributor(&engine_id);

        engine.add_reporter(&reporter);
        engine.add_executor(&admin);

        TestContext {
            env,
            admin,
            reporter,
            trustee,
            servicer,
            paying_agent,
            residual_recipient,
            payment,
            ledger_id,
            engine_id,
        }
    }

    fn engine<'a>(ctx: &TestContext) -> DealWaterfallClient<'a> {
        DealWaterfallClient::new(&ctx.env, &ctx.engine_id)
    }

    fn ledger<'a>(ctx: &TestContext) -> TrancheTokenClient<'a> {
        TrancheTokenClient::new(&ctx.env, &ctx.ledger_id)
    }

    fn payment<'a>(ctx: &TestContext) -> soroban_sdk::token::Client<'a> {
        soroban_sdk::token::Client::new(&ctx.env, &ctx.payment)
    }

    fn fund_reporter(ctx: &TestContext, amount: i128) {
        StellarAssetClient::new(&ctx.env, &ctx.payment).mint(&ctx.reporter, &amount);
    }

    fn zero_fees(ctx: &TestContext) -> FeeConfig {
        FeeConfig {
            trustee: ctx.trustee.clone(),
            trustee_fee_bps: 0,
            servicer: ctx.servicer.clone(),
            servicer_fee_bps: 0,
        }
    }

    /// Create tranches 1..=n under the deal, fully issue each face to a
    /// fresh holder, and configure the deal.
    fn setup_deal(
        ctx: &TestContext,
        deal_id: u32,
        faces: &[i128],
        rates: &[u32],
        fees: FeeConfig,
        strategy: PrincipalStrategy,
    ) -> soroban_sdk::Vec<Address> {
        let ledger_client = ledger(ctx);
        let mut tranche_ids = soroban_sdk::Vec::new(&ctx.env);
        let mut rate_vec = soroban_sdk::Vec::new(&ctx.env);
        let mut holders = soroban_sdk::Vec::new(&ctx.env);
        for (i, face) in faces.iter().enumerate() {
            let tranche_id = i as u32 + 1;
            ledger_client.create_tranche(&ctx.admin, &tranche_id, &deal_id, face);
            let holder = Address::generate(&ctx.env);
            ledger_client.issue(&ctx.admin, &tranche_id, &holder, face);
            holders.push_back(holder);
            tranche_ids.push_back(tranche_id);
            rate_vec.push_back(rates[i]);
        }

        engine(ctx).configure_deal(
            &deal_id,
            &tranche_ids,
            &rate_vec,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &strategy,
        );
        holders
    }

    #[test]
    fn test_initialize_once() {
        let ctx = setup();
        let client = engine(&ctx);
        let result = client.try_initialize(&ctx.admin, &ctx.ledger_id, &ctx.payment);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_sequential_waterfall_full_period() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        // Senior $70M at 4%, Mezz $20M at 6%, Junior $10M at 9%, monthly
        let holders = setup_deal(
            &ctx,
            100,
            &[70_000_000 * SCALE, 20_000_000 * SCALE, 10_000_000 * SCALE],
            &[400, 600, 900],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 900_000 * SCALE);
        let period = engine(&ctx).report_collections(
            &ctx.reporter,
            &100,
            &(500_000 * SCALE),
            &(400_000 * SCALE),
            &0,
            &0,
        );
        assert_eq!(period, 1);

        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        let ledger_client = ledger(&ctx);

        // Interest: senior due $233,333.33, mezz $100k, junior $75k, all
        // paid in full; the $91,666.67 of leftover interest is residual,
        // not principal
        assert_eq!(
            ledger_client.get_snapshot(&1, &1).yield_amount,
            2_333_333_333_333
        );
        assert_eq!(
            ledger_client.get_snapshot(&2, &1).yield_amount,
            1_000_000_000_000
        );
        assert_eq!(
            ledger_client.get_snapshot(&3, &1).yield_amount,
            750_000_000_000
        );
        assert_eq!(engine(&ctx).residual_of(&100), 916_666_666_667);

        // Principal: all $400k to the senior tranche
        assert_eq!(ledger_client.current_factor(&1), 9_942_857);
        assert_eq!(ledger_client.current_factor(&2), FACTOR_ONE);
        assert_eq!(ledger_client.current_factor(&3), FACTOR_ONE);
        assert_eq!(
            ledger_client.total_current_face_value(&1),
            695_999_990_000_000
        );
        assert_eq!(payment(&ctx).balance(&ctx.paying_agent), 400_000 * SCALE);

        // No shortfall carried anywhere
        for tranche_id in 1..=3u32 {
            assert_eq!(engine(&ctx).deferred_interest_of(&100, &tranche_id), 0);
        }
        assert!(engine(&ctx).get_period(&100, &1).processed);

        // The sole senior holder can pull the whole senior coupon
        let senior_holder = holders.get_unchecked(0);
        let paid = ledger_client.claim_yield(&1, &senior_holder);
        assert_eq!(paid, 2_333_333_333_333);
    }

    #[test]
    fn test_pro_rata_principal_is_proportional() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[70_000_000 * SCALE, 20_000_000 * SCALE, 10_000_000 * SCALE],
            &[0, 0, 0],
            fees,
            PrincipalStrategy::ProRata,
        );

        fund_reporter(&ctx, 1_000_000 * SCALE);
        engine(&ctx).report_collections(
            &ctx.reporter,
            &100,
            &0,
            &(1_000_000 * SCALE),
            &0,
            &0,
        );
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        // A 1% paydown everywhere: every factor drops to 0.99
        let ledger_client = ledger(&ctx);
        assert_eq!(ledger_client.current_factor(&1), 9_900_000);
        assert_eq!(ledger_client.current_factor(&2), 9_900_000);
        assert_eq!(ledger_client.current_factor(&3), 9_900_000);
        assert_eq!(payment(&ctx).balance(&ctx.paying_agent), 1_000_000 * SCALE);
        assert_eq!(engine(&ctx).residual_of(&100), 0);
    }

    #[test]
    fn test_sequential_junior_untouched_until_seniors_retired() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE, 500 * SCALE, 300 * SCALE],
            &[0, 0, 0],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 1_200 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &0, &(1_200 * SCALE), &0, &0);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        let ledger_client = ledger(&ctx);
        // Senior fully retired, mezz partially, junior untouched
        assert_eq!(ledger_client.current_factor(&1), 0);
        assert_eq!(ledger_client.current_factor(&2), 6_000_000);
        assert_eq!(ledger_client.current_factor(&3), FACTOR_ONE);
    }

    #[test]
    fn test_fees_come_off_the_top() {
        let ctx = setup();
        let fees = FeeConfig {
            trustee: ctx.trustee.clone(),
            trustee_fee_bps: 100, // 1%
            servicer: ctx.servicer.clone(),
            servicer_fee_bps: 200, // 2%
        };
        let _holders = setup_deal(
            &ctx,
            100,
            &[10_000_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 100_000 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &(100_000 * SCALE), &0, &0, &0);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        // Trustee: 100,000 × 1% = 1,000. Servicer: 99,000 × 2% = 1,980.
        assert_eq!(payment(&ctx).balance(&ctx.trustee), 1_000 * SCALE);
        assert_eq!(payment(&ctx).balance(&ctx.servicer), 1_980 * SCALE);
        assert_eq!(engine(&ctx).residual_of(&100), 97_020 * SCALE);
    }

    #[test]
    fn test_residual_withdrawal() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[10_000_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 50_000 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &(50_000 * SCALE), &0, &0, &0);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);
        assert_eq!(engine(&ctx).residual_of(&100), 50_000 * SCALE);

        let withdrawn = engine(&ctx).withdraw_residual(&100);
        assert_eq!(withdrawn, 50_000 * SCALE);
        assert_eq!(
            payment(&ctx).balance(&ctx.residual_recipient),
            50_000 * SCALE
        );
        assert_eq!(engine(&ctx).residual_of(&100), 0);

        let result = engine(&ctx).try_withdraw_residual(&100);
        assert_eq!(result, Err(Ok(Error::NothingToWithdraw)));
    }

    #[test]
    fn test_interest_shortfall_is_deferred_not_forgiven() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        // $10M at 12%: $100k due per month
        let _holders = setup_deal(
            &ctx,
            100,
            &[10_000_000 * SCALE],
            &[1200],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 210_000 * SCALE);

        // Period 1 collects only $60k: $40k is carried
        engine(&ctx).report_collections(&ctx.reporter, &100, &(60_000 * SCALE), &0, &0, &0);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);
        assert_eq!(
            engine(&ctx).deferred_interest_of(&100, &1),
            40_000 * SCALE
        );
        assert_eq!(ledger(&ctx).get_snapshot(&1, &1).yield_amount, 60_000 * SCALE);

        // Period 2 collects $150k: $100k accrued + $40k carried all paid
        engine(&ctx).report_collections(&ctx.reporter, &100, &(150_000 * SCALE), &0, &0, &0);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &2);
        assert_eq!(engine(&ctx).deferred_interest_of(&100, &1), 0);
        assert_eq!(
            ledger(&ctx).get_snapshot(&1, &2).yield_amount,
            140_000 * SCALE
        );
        assert_eq!(engine(&ctx).residual_of(&100), 10_000 * SCALE);
    }

    #[test]
    fn test_period_sequencing_is_strict() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 10_000 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &(1_000 * SCALE), &0, &0, &0);

        // Period 1 not yet executed: no new report
        let result = engine(&ctx).try_report_collections(
            &ctx.reporter,
            &100,
            &(1_000 * SCALE),
            &0,
            &0,
            &0,
        );
        assert_eq!(result, Err(Ok(Error::PriorPeriodUnprocessed)));

        // Unknown period
        let result = engine(&ctx).try_execute_waterfall(&ctx.admin, &100, &2);
        assert_eq!(result, Err(Ok(Error::PeriodNotFound)));

        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        // Replays fail with no side effects
        let residual_before = engine(&ctx).residual_of(&100);
        let result = engine(&ctx).try_execute_waterfall(&ctx.admin, &100, &1);
        assert_eq!(result, Err(Ok(Error::PeriodAlreadyProcessed)));
        assert_eq!(engine(&ctx).residual_of(&100), residual_before);
    }

    #[test]
    fn test_configure_rejects_bad_input() {
        let ctx = setup();
        let ledger_client = ledger(&ctx);
        ledger_client.create_tranche(&ctx.admin, &1, &100, &(1_000 * SCALE));
        ledger_client.create_tranche(&ctx.admin, &2, &200, &(1_000 * SCALE));

        let client = engine(&ctx);
        let fees = zero_fees(&ctx);

        let one_tranche = soroban_sdk::vec![&ctx.env, 1u32];
        let two_rates = soroban_sdk::vec![&ctx.env, 100u32, 200u32];
        let one_rate = soroban_sdk::vec![&ctx.env, 100u32];
        let empty_ids: soroban_sdk::Vec<u32> = soroban_sdk::Vec::new(&ctx.env);
        let empty_rates: soroban_sdk::Vec<u32> = soroban_sdk::Vec::new(&ctx.env);

        let result = client.try_configure_deal(
            &100,
            &empty_ids,
            &empty_rates,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::EmptyTrancheList)));

        let result = client.try_configure_deal(
            &100,
            &one_tranche,
            &two_rates,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::MismatchedConfig)));

        let result = client.try_configure_deal(
            &100,
            &one_tranche,
            &one_rate,
            &0,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::InvalidFrequency)));

        let bad_fees = FeeConfig {
            trustee: ctx.trustee.clone(),
            trustee_fee_bps: 10_000,
            servicer: ctx.servicer.clone(),
            servicer_fee_bps: 0,
        };
        let result = client.try_configure_deal(
            &100,
            &one_tranche,
            &one_rate,
            &1,
            &bad_fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::InvalidFeeRate)));

        // Tranche 2 belongs to deal 200
        let mismatched = soroban_sdk::vec![&ctx.env, 2u32];
        let result = client.try_configure_deal(
            &100,
            &mismatched,
            &one_rate,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::TrancheDealMismatch)));

        // Tranche 9 does not exist
        let unknown = soroban_sdk::vec![&ctx.env, 9u32];
        let result = client.try_configure_deal(
            &100,
            &unknown,
            &one_rate,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::UnknownTranche)));

        // Same tranche twice
        let doubled = soroban_sdk::vec![&ctx.env, 1u32, 1u32];
        let result = client.try_configure_deal(
            &100,
            &doubled,
            &two_rates,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::DuplicateTranche)));

        // A valid configuration cannot be repeated
        client.configure_deal(
            &100,
            &one_tranche,
            &one_rate,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        let result = client.try_configure_deal(
            &100,
            &one_tranche,
            &one_rate,
            &1,
            &fees,
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );
        assert_eq!(result, Err(Ok(Error::DealAlreadyConfigured)));
    }

    #[test]
    fn test_capabilities_fail_closed() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        let outsider = Address::generate(&ctx.env);

        let result = engine(&ctx).try_report_collections(
            &outsider,
            &100,
            &(1_000 * SCALE),
            &0,
            &0,
            &0,
        );
        assert_eq!(result, Err(Ok(Error::NotReporter)));

        fund_reporter(&ctx, 1_000 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &(1_000 * SCALE), &0, &0, &0);

        let result = engine(&ctx).try_execute_waterfall(&outsider, &100, &1);
        assert_eq!(result, Err(Ok(Error::NotExecutor)));

        // Revocation closes the door again
        engine(&ctx).remove_reporter(&ctx.reporter);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);
        let result = engine(&ctx).try_report_collections(
            &ctx.reporter,
            &100,
            &(1_000 * SCALE),
            &0,
            &0,
            &0,
        );
        assert_eq!(result, Err(Ok(Error::NotReporter)));
    }

    #[test]
    fn test_trigger_is_recorded_but_inert() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        let reason = Symbol::new(&ctx.env, "oc_test_breach");
        engine(&ctx).activate_trigger(&100, &reason);
        assert!(engine(&ctx).get_deal(&100).trigger_active);

        let result = engine(&ctx).try_activate_trigger(&100, &reason);
        assert_eq!(result, Err(Ok(Error::TriggerAlreadyActive)));

        // The waterfall runs unchanged while the trigger is active
        fund_reporter(&ctx, 1_000 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &(1_000 * SCALE), &0, &0, &0);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        engine(&ctx).clear_trigger(&100);
        assert!(!engine(&ctx).get_deal(&100).trigger_active);

        let result = engine(&ctx).try_clear_trigger(&100);
        assert_eq!(result, Err(Ok(Error::TriggerNotActive)));
    }

    #[test]
    fn test_report_rejects_negative_amounts() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        let result =
            engine(&ctx).try_report_collections(&ctx.reporter, &100, &-1, &0, &0, &0);
        assert_eq!(result, Err(Ok(Error::InvalidAmount)));
    }

    #[test]
    fn test_independent_deals_do_not_interfere() {
        let ctx = setup();
        let _h1 = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE],
            &[0],
            zero_fees(&ctx),
            PrincipalStrategy::Sequential,
        );

        // Second deal with its own tranche (IDs continue after deal 100's)
        let ledger_client = ledger(&ctx);
        ledger_client.create_tranche(&ctx.admin, &50, &200, &(2_000 * SCALE));
        let holder = Address::generate(&ctx.env);
        ledger_client.issue(&ctx.admin, &50, &holder, &(2_000 * SCALE));
        engine(&ctx).configure_deal(
            &200,
            &soroban_sdk::vec![&ctx.env, 50u32],
            &soroban_sdk::vec![&ctx.env, 0u32],
            &1,
            &zero_fees(&ctx),
            &ctx.paying_agent,
            &ctx.residual_recipient,
            &PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 3_000 * SCALE);
        engine(&ctx).report_collections(&ctx.reporter, &100, &0, &(1_000 * SCALE), &0, &0);
        engine(&ctx).report_collections(&ctx.reporter, &200, &0, &(500 * SCALE), &0, &0);

        engine(&ctx).execute_waterfall(&ctx.admin, &200, &1);
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        assert_eq!(ledger_client.current_factor(&1), 0);
        assert_eq!(ledger_client.current_factor(&50), 7_500_000);
        assert_eq!(engine(&ctx).get_deal(&100).last_processed_period, 1);
        assert_eq!(engine(&ctx).get_deal(&200).last_processed_period, 1);
    }

    #[test]
    fn test_prepayments_flow_into_principal() {
        let ctx = setup();
        let fees = zero_fees(&ctx);
        let _holders = setup_deal(
            &ctx,
            100,
            &[1_000 * SCALE],
            &[0],
            fees,
            PrincipalStrategy::Sequential,
        );

        fund_reporter(&ctx, 1_000 * SCALE);
        // $600 scheduled principal + $400 prepaid: the face is retired
        engine(&ctx).report_collections(
            &ctx.reporter,
            &100,
            &0,
            &(600 * SCALE),
            &0,
            &(400 * SCALE),
        );
        engine(&ctx).execute_waterfall(&ctx.admin, &100, &1);

        assert_eq!(ledger(&ctx).current_factor(&1), 0);
        assert_eq!(payment(&ctx).balance(&ctx.paying_agent), 1_000 * SCALE);
    }
}
