use crate::storage::FACTOR_ONE;

/// Outstanding value of a position after amortization
///
/// Formula: current_face = balance × factor / FACTOR_ONE
///
/// Example:
/// - balance: 70,000,000 face units
/// - factor: 0.9000000
/// - current_face: 63,000,000
pub fn current_face(balance: i128, factor: i128) -> Option<i128> {
    balance.checked_mul(factor)?.checked_div(FACTOR_ONE)
}

/// One holder's share of a period's yield pool
///
/// Formula: share = snapshot_balance × yield / snapshot_total_supply
///
/// Division truncates; the dust left behind stays in the escrow rather than
/// being paid out.
pub fn pro_rata_share(
    snapshot_balance: i128,
    yield_amount: i128,
    snapshot_total_supply: i128,
) -> Option<i128> {
    if snapshot_total_supply <= 0 || snapshot_balance <= 0 {
        return Some(0);
    }
    snapshot_balance
        .checked_mul(yield_amount)?
        .checked_div(snapshot_total_supply)
}
