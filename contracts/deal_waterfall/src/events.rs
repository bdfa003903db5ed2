use soroban_sdk::{contracttype, Address, Symbol};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DealConfiguredEvent {
    pub deal_id: u32,
    pub tranche_count: u32,
    pub frequency_months: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReporterSetEvent {
    pub account: Address,
    pub granted: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutorSetEvent {
    pub account: Address,
    pub granted: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionsReportedEvent {
    pub deal_id: u32,
    pub period: u32,
    pub interest_collected: i128,
    pub principal_collected: i128,
    pub losses_realized: i128,
    pub prepayments: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeePaidEvent {
    pub deal_id: u32,
    pub period: u32,
    pub role: Symbol,
    pub recipient: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterestPaidEvent {
    pub deal_id: u32,
    pub period: u32,
    pub tranche_id: u32,
    pub due: i128,
    pub paid: i128,
    pub deferred: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrincipalPaidEvent {
    pub deal_id: u32,
    pub period: u32,
    pub tranche_id: u32,
    pub paid: i128,
    pub new_factor: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResidualRecordedEvent {
    pub deal_id: u32,
    pub period: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResidualWithdrawnEvent {
    pub deal_id: u32,
    pub recipient: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WaterfallExecutedEvent {
    pub deal_id: u32,
    pub period: u32,
    pub fees_paid: i128,
    pub interest_paid: i128,
    pub principal_paid: i128,
    pub residual: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TriggerActivatedEvent {
    pub deal_id: u32,
    pub reason: Symbol,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TriggerClearedEvent {
    pub deal_id: u32,
}
