//! Cost computation and usage records.

mod accountant;
mod pricing;
mod sink;

pub use accountant::{CURRENCY, UsageAccountant, UsageLogRecord, compute_cost};
pub use pricing::{PricingEntry, PricingTable};
pub use sink::{JsonlUsageSink, MemoryUsageSink, UsageSink};
