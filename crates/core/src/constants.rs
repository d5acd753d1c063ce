/// Fractional digits kept for cash amounts (deposits, transaction values).
pub const CASH_SCALE: u32 = 2;

/// Fractional digits kept for target weights.
pub const WEIGHT_SCALE: u32 = 4;

/// Fractional digits kept for quantities derived from cash / price.
pub const QUANTITY_SCALE: u32 = 8;

/// Maximum length of portfolio and asset names.
pub const MAX_NAME_LENGTH: usize = 100;
