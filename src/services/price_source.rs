use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::FetchError;

/// Latest-quote source for the tracked symbol universe.
///
/// The monitor calls this once per tick with the deduplicated set of
/// symbols referenced by active alerts, so an implementation never sees
/// the same symbol twice within a tick; that call boundary is also the
/// cache boundary for implementations that batch or memoize upstream
/// requests.
///
/// Contract: the returned map has an entry for every requested symbol,
/// success or typed failure, never silently omitted. A failure for one
/// symbol must not suppress results for the others.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(
        &self,
        symbols: &BTreeSet<String>,
    ) -> HashMap<String, Result<Decimal, FetchError>>;
}
