use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Caller does not hold the collections-reporting capability
    NotReporter = 10,
    /// Caller does not hold the execution capability
    NotExecutor = 11,
    /// Caller is not admin
    Unauthorized = 12,

    // ============================================
    // CONFIGURATION ERRORS (20-29)
    // ============================================
    /// Deal already configured with this ID
    DealAlreadyConfigured = 20,
    /// Deal not found
    DealNotFound = 21,
    /// Deal is not active
    DealNotActive = 22,
    /// Tranche and rate arrays must be the same length
    MismatchedConfig = 23,
    /// A deal needs at least one tranche
    EmptyTrancheList = 24,
    /// Fee rates must stay below 100%
    InvalidFeeRate = 25,
    /// Coupon rates must stay below 100%
    InvalidCouponRate = 26,
    /// Payment frequency must be between 1 and 12 months
    InvalidFrequency = 27,
    /// Tranche does not exist on the ledger
    UnknownTranche = 28,
    /// Tranche belongs to a different deal
    TrancheDealMismatch = 29,

    // ============================================
    // SEQUENCING ERRORS (30-39)
    // ============================================
    /// No report stored for this period
    PeriodNotFound = 30,
    /// Period has already been processed
    PeriodAlreadyProcessed = 31,
    /// Only the most recently reported period can be executed
    PeriodOutOfSequence = 32,
    /// The previous period must be executed before reporting a new one
    PriorPeriodUnprocessed = 33,
    /// Same tranche listed twice in one deal
    DuplicateTranche = 34,

    // ============================================
    // STATE & AMOUNT ERRORS (40-49)
    // ============================================
    /// Amount must not be negative
    InvalidAmount = 40,
    /// No residual accumulated for this deal
    NothingToWithdraw = 41,
    /// Trigger is already active
    TriggerAlreadyActive = 42,
    /// Trigger is not active
    TriggerNotActive = 43,
}
