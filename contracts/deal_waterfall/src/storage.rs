use soroban_sdk::{contracttype, Address, Vec};

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals
pub const FACTOR_ONE: i128 = 1 * SCALE; // 1.0000000
pub const BASIS_POINTS: i128 = 10_000;
pub const MONTHS_PER_YEAR: i128 = 12;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrincipalStrategy {
    /// Retire each tranche's full face value senior-first
    Sequential = 0,
    /// Split principal across tranches in proportion to outstanding face
    ProRata = 1,
}

/// One tranche's slot in a deal, ordered senior to junior
#[contracttype]
#[derive(Clone, Debug)]
pub struct TrancheSlot {
    /// Tranche ID on the ledger contract
    pub tranche_id: u32,
    /// Annualized coupon in basis points
    pub coupon_rate_bps: u32,
    /// Unpaid interest carried forward, never forgiven
    pub deferred_interest: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FeeConfig {
    pub trustee: Address,
    pub trustee_fee_bps: u32,
    pub servicer: Address,
    pub servicer_fee_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Deal {
    pub deal_id: u32,
    /// Senior to junior; membership fixed at configuration
    pub tranches: Vec<TrancheSlot>,
    /// Months between coupon periods
    pub frequency_months: u32,
    pub fees: FeeConfig,
    /// Receives principal cash for onward distribution to holders of record
    pub principal_paying_agent: Address,
    /// Receives accumulated residual on withdrawal
    pub residual_recipient: Address,
    pub strategy: PrincipalStrategy,
    pub active: bool,
    /// Breach flag, recorded for downstream policy; does not alter the
    /// waterfall
    pub trigger_active: bool,
    pub last_reported_period: u32,
    pub last_processed_period: u32,
    /// Residual cash held in escrow until withdrawn
    pub residual_accumulated: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PeriodReport {
    pub interest_collected: i128,
    pub principal_collected: i128,
    pub losses_realized: i128,
    pub prepayments: i128,
    pub processed: bool,
    pub reported_at: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    TrancheToken,
    PaymentToken,
    Initialized,
    Reporters(Address),
    Executors(Address),
    Deal(u32),
    Period(u32, u32), // (deal_id, period)
}
