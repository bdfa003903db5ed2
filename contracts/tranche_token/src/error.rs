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
    /// Caller does not hold the issuance capability
    NotIssuer = 10,
    /// Caller does not hold the distribution capability
    NotDistributor = 11,
    /// Caller is not admin
    Unauthorized = 12,

    // ============================================
    // VALIDATION ERRORS (20-29)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 20,
    /// Tranche already exists with this ID
    TrancheAlreadyExists = 21,
    /// Tranche not found
    TrancheNotFound = 22,
    /// Issuance would push supply past the original face value
    ExceedsOriginalFace = 23,
    /// Tranche holder registry is full
    HolderLimitReached = 24,
    /// Holder doesn't have enough units
    InsufficientBalance = 25,
    /// Sender and receiver are the same account
    SelfTransfer = 26,

    // ============================================
    // STATE ERRORS (40-49)
    // ============================================
    /// Factor can never increase
    FactorIncrease = 40,
    /// Factor must be within [0, FACTOR_ONE]
    InvalidFactor = 41,
    /// This period's snapshot has already been taken
    SnapshotAlreadyTaken = 42,
    /// No unclaimed periods at or below the requested period
    NothingToClaim = 43,
    /// Requested period is not yet claimable
    InvalidClaimPeriod = 44,
    /// No snapshot recorded for this period
    SnapshotNotFound = 45,

    // ============================================
    // BOUNDS ERRORS (50-59)
    // ============================================
    /// Unclaimed span exceeds the claim batch cap
    ClaimBatchTooLarge = 50,

    // ============================================
    // COMPLIANCE REJECTIONS (60-69)
    // ============================================
    /// Gateway rejected: sender not eligible
    SenderNotEligible = 61,
    /// Gateway rejected: receiver not eligible
    ReceiverNotEligible = 62,
    /// Gateway rejected: sender frozen
    SenderFrozen = 63,
    /// Gateway rejected: receiver frozen
    ReceiverFrozen = 64,
    /// Gateway rejected with an unrecognized reason code
    ComplianceRejected = 65,
}
