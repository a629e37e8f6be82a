//! Domain types for bond records.

mod bond;
mod bond_type;
mod currency;

pub use bond::{BondRecord, DetailInfo, EmitentInfo, Liquidity, AMORTIZATION, FIXED_COUPON};
pub use bond_type::BondType;
pub use currency::Currency;
