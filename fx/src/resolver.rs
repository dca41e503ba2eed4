//! Rate resolution over a sparse set of directed edges.
//!
//! Only the latest stored edge per ordered pair is consulted. A pair is
//! resolved, in order, by the direct edge, by inverting the reverse edge, or
//! by a single bridge through the reference currency. Nothing is cached.

use std::fmt;
use std::sync::Arc;

use currex_common::{CurrencyCode, CurrencyId};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::store::{CurrencyLookup, RateEdgeStore};

/// How a bridged rate was assembled from edges touching the reference `R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeRoute {
    /// R→base and R→target: `rate(R→target) / rate(R→base)`.
    FromReference,
    /// base→R and target→R: `rate(base→R) / rate(target→R)`.
    ToReference,
    /// base→R and R→target: `rate(base→R) * rate(R→target)`.
    Through,
    /// R→base and target→R: `1/rate(R→base) * 1/rate(target→R)`.
    Reversed,
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Stored edge base→target.
    Direct,
    /// Inverse of the stored edge target→base.
    Inverse,
    /// Two edges through the reference currency.
    Bridged(BridgeRoute),
    /// Base and target are the same currency.
    Identity,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Direct => write!(f, "direct"),
            Provenance::Inverse => write!(f, "inverse"),
            Provenance::Bridged(route) => write!(f, "bridged:{:?}", route),
            Provenance::Identity => write!(f, "identity"),
        }
    }
}

/// An effective rate for one requested pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub provenance: Provenance,
}

impl ResolvedRate {
    pub fn new(rate: Decimal, provenance: Provenance) -> Self {
        Self { rate, provenance }
    }

    /// Rate 1 for converting a currency into itself.
    pub fn identity() -> Self {
        Self::new(Decimal::ONE, Provenance::Identity)
    }
}

/// Resolves pairwise rates against a read-only view of the edge store.
#[derive(Clone)]
pub struct RateResolver {
    currencies: Arc<dyn CurrencyLookup>,
    rates: Arc<dyn RateEdgeStore>,
    reference: CurrencyCode,
}

impl RateResolver {
    /// Create a resolver bridging through `reference`.
    pub fn new(
        currencies: Arc<dyn CurrencyLookup>,
        rates: Arc<dyn RateEdgeStore>,
        reference: CurrencyCode,
    ) -> Self {
        Self {
            currencies,
            rates,
            reference,
        }
    }

    /// Resolve the rate for base→target, or `None` when no path exists.
    ///
    /// A currency resolves to itself only through a stored identity edge;
    /// the reference bridge never applies to `base == target`.
    #[instrument(skip_all, fields(base = %base, target = %target))]
    pub async fn resolve(&self, base: CurrencyId, target: CurrencyId) -> Option<ResolvedRate> {
        if let Some(rate) = self.edge_rate(base, target).await {
            debug!(%rate, "Direct edge");
            return Some(ResolvedRate::new(rate, Provenance::Direct));
        }

        if let Some(reverse) = self.edge_rate(target, base).await {
            match invert(reverse) {
                Some(rate) => {
                    debug!(%rate, "Inverse of reverse edge");
                    return Some(ResolvedRate::new(rate, Provenance::Inverse));
                }
                None => warn!(rate = %reverse, "Reverse edge has zero rate; ignoring"),
            }
        }

        self.resolve_bridged(base, target).await
    }

    async fn resolve_bridged(&self, base: CurrencyId, target: CurrencyId) -> Option<ResolvedRate> {
        // A bridge needs two distinct endpoints.
        if base == target {
            return None;
        }

        let reference = match self.currencies.by_code(&self.reference).await {
            Ok(Some(currency)) => currency.id,
            Ok(None) => {
                debug!(reference = %self.reference, "Reference currency not registered");
                return None;
            }
            Err(e) => {
                warn!(reference = %self.reference, error = %e, "Reference lookup failed");
                return None;
            }
        };

        if base == reference || target == reference {
            debug!("Pair touches the reference currency; no bridge");
            return None;
        }

        let ref_to_base = self.edge_rate(reference, base).await;
        let ref_to_target = self.edge_rate(reference, target).await;
        if let (Some(rb), Some(rt)) = (ref_to_base, ref_to_target) {
            if let Some(rate) = rt.checked_div(rb) {
                return Some(bridged(rate, BridgeRoute::FromReference));
            }
        }

        let base_to_ref = self.edge_rate(base, reference).await;
        let target_to_ref = self.edge_rate(target, reference).await;
        if let (Some(br), Some(tr)) = (base_to_ref, target_to_ref) {
            if let Some(rate) = br.checked_div(tr) {
                return Some(bridged(rate, BridgeRoute::ToReference));
            }
        }

        if let (Some(br), Some(rt)) = (base_to_ref, ref_to_target) {
            if let Some(rate) = br.checked_mul(rt) {
                return Some(bridged(rate, BridgeRoute::Through));
            }
        }

        if let (Some(rb), Some(tr)) = (ref_to_base, target_to_ref) {
            if let Some(rate) = invert(rb).zip(invert(tr)).and_then(|(a, b)| a.checked_mul(b)) {
                return Some(bridged(rate, BridgeRoute::Reversed));
            }
        }

        debug!("No bridge through reference currency");
        None
    }

    /// Rate of the stored edge, treating read failures as absence.
    async fn edge_rate(&self, base: CurrencyId, target: CurrencyId) -> Option<Decimal> {
        match self.rates.read(base, target).await {
            Ok(edge) => edge.map(|e| e.rate),
            Err(e) => {
                warn!(base = %base, target = %target, error = %e, "Edge read failed");
                None
            }
        }
    }
}

fn bridged(rate: Decimal, route: BridgeRoute) -> ResolvedRate {
    debug!(%rate, ?route, "Bridged through reference currency");
    ResolvedRate::new(rate, Provenance::Bridged(route))
}

/// `1 / rate`, or `None` for a zero rate.
fn invert(rate: Decimal) -> Option<Decimal> {
    Decimal::ONE.checked_div(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use currex_common::Currency;
    use rust_decimal_macros::dec;

    struct Fixture {
        store: Arc<InMemoryStore>,
        resolver: RateResolver,
        usd: Currency,
        eur: Currency,
        gbp: Currency,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let usd = store.add_currency("USD", "United States dollar", "$");
        let eur = store.add_currency("EUR", "Euro", "€");
        let gbp = store.add_currency("GBP", "British pound sterling", "£");
        let resolver = RateResolver::new(
            store.clone(),
            store.clone(),
            CurrencyCode::parse("USD").unwrap(),
        );
        Fixture {
            store,
            resolver,
            usd,
            eur,
            gbp,
        }
    }

    #[tokio::test]
    async fn test_direct_edge_returned_exactly() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.91));

        let resolved = f.resolver.resolve(f.usd.id, f.eur.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(0.91));
        assert_eq!(resolved.provenance, Provenance::Direct);
        assert_eq!(f.store.edge_reads(), 1);
    }

    #[tokio::test]
    async fn test_inverse_of_reverse_edge() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.8));

        let resolved = f.resolver.resolve(f.eur.id, f.usd.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(1.25));
        assert_eq!(resolved.provenance, Provenance::Inverse);
    }

    #[tokio::test]
    async fn test_no_implicit_self_rate() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.91));
        f.store.set_rate(f.usd.id, f.gbp.id, dec!(0.79));

        f.store.set_rate(f.gbp.id, f.usd.id, dec!(1.27));

        assert_eq!(f.resolver.resolve(f.eur.id, f.eur.id).await, None);
        assert_eq!(f.resolver.resolve(f.usd.id, f.usd.id).await, None);

        // Edges to and from the reference never bridge a currency to itself.
        let reads = f.store.edge_reads();
        assert_eq!(f.resolver.resolve(f.gbp.id, f.gbp.id).await, None);
        assert_eq!(f.store.edge_reads() - reads, 2);
    }

    #[tokio::test]
    async fn test_stored_identity_edge_is_used() {
        let f = fixture();
        f.store.set_rate(f.eur.id, f.eur.id, dec!(1));

        let resolved = f.resolver.resolve(f.eur.id, f.eur.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(1));
        assert_eq!(resolved.provenance, Provenance::Direct);
    }

    #[tokio::test]
    async fn test_bridge_from_reference() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.91));
        f.store.set_rate(f.usd.id, f.gbp.id, dec!(0.79));

        let resolved = f.resolver.resolve(f.gbp.id, f.eur.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(0.91) / dec!(0.79));
        assert_eq!(
            resolved.provenance,
            Provenance::Bridged(BridgeRoute::FromReference)
        );
    }

    #[tokio::test]
    async fn test_bridge_to_reference() {
        let f = fixture();
        f.store.set_rate(f.eur.id, f.usd.id, dec!(1.10));
        f.store.set_rate(f.gbp.id, f.usd.id, dec!(1.25));

        let resolved = f.resolver.resolve(f.eur.id, f.gbp.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(0.88));
        assert_eq!(resolved.provenance, Provenance::Bridged(BridgeRoute::ToReference));
    }

    #[tokio::test]
    async fn test_bridge_through_reference() {
        let f = fixture();
        f.store.set_rate(f.eur.id, f.usd.id, dec!(1.10));
        f.store.set_rate(f.usd.id, f.gbp.id, dec!(0.80));

        let resolved = f.resolver.resolve(f.eur.id, f.gbp.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(0.88));
        assert_eq!(resolved.provenance, Provenance::Bridged(BridgeRoute::Through));
    }

    #[tokio::test]
    async fn test_bridge_reversed() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.8));
        f.store.set_rate(f.gbp.id, f.usd.id, dec!(1.25));

        let resolved = f.resolver.resolve(f.eur.id, f.gbp.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(1));
        assert_eq!(resolved.provenance, Provenance::Bridged(BridgeRoute::Reversed));
    }

    #[tokio::test]
    async fn test_bridge_priority_prefers_from_reference() {
        let f = fixture();
        // Every edge around the reference is present; route (a) must win.
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.5));
        f.store.set_rate(f.usd.id, f.gbp.id, dec!(2));
        f.store.set_rate(f.eur.id, f.usd.id, dec!(3));
        f.store.set_rate(f.gbp.id, f.usd.id, dec!(7));

        let resolved = f.resolver.resolve(f.eur.id, f.gbp.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(4));
        assert_eq!(
            resolved.provenance,
            Provenance::Bridged(BridgeRoute::FromReference)
        );
    }

    #[tokio::test]
    async fn test_direct_beats_bridge() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.91));
        f.store.set_rate(f.usd.id, f.gbp.id, dec!(0.79));
        f.store.set_rate(f.gbp.id, f.eur.id, dec!(1.2));

        let resolved = f.resolver.resolve(f.gbp.id, f.eur.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(1.2));
        assert_eq!(resolved.provenance, Provenance::Direct);
    }

    #[tokio::test]
    async fn test_no_bridge_when_endpoint_is_reference() {
        let f = fixture();
        f.store.set_rate(f.eur.id, f.gbp.id, dec!(0.87));

        assert_eq!(f.resolver.resolve(f.usd.id, f.eur.id).await, None);
        assert_eq!(f.resolver.resolve(f.gbp.id, f.usd.id).await, None);
    }

    #[tokio::test]
    async fn test_missing_reference_currency() {
        let store = Arc::new(InMemoryStore::new());
        let eur = store.add_currency("EUR", "Euro", "€");
        let gbp = store.add_currency("GBP", "British pound sterling", "£");
        let resolver = RateResolver::new(
            store.clone(),
            store.clone(),
            CurrencyCode::parse("USD").unwrap(),
        );

        assert_eq!(resolver.resolve(eur.id, gbp.id).await, None);
        // Only the direct and reverse reads happen.
        assert_eq!(store.edge_reads(), 2);
    }

    #[tokio::test]
    async fn test_unconnected_pair() {
        let f = fixture();
        let jpy = f.store.add_currency("JPY", "Japanese yen", "¥");
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.91));

        assert_eq!(f.resolver.resolve(jpy.id, f.eur.id).await, None);
        assert_eq!(f.store.edge_reads(), 6);
    }

    #[tokio::test]
    async fn test_zero_rate_is_not_found() {
        let f = fixture();
        f.store.set_rate(f.eur.id, f.gbp.id, Decimal::ZERO);

        assert_eq!(f.resolver.resolve(f.gbp.id, f.eur.id).await, None);
    }

    #[tokio::test]
    async fn test_zero_rate_skips_bridge_route() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, Decimal::ZERO);
        f.store.set_rate(f.usd.id, f.gbp.id, dec!(0.8));
        f.store.set_rate(f.eur.id, f.usd.id, dec!(1.1));

        // Route (a) divides by zero; route (c) is next usable.
        let resolved = f.resolver.resolve(f.eur.id, f.gbp.id).await.unwrap();
        assert_eq!(resolved.rate, dec!(0.88));
        assert_eq!(resolved.provenance, Provenance::Bridged(BridgeRoute::Through));
    }

    #[tokio::test]
    async fn test_read_failure_is_not_found() {
        let f = fixture();
        f.store.set_rate(f.usd.id, f.eur.id, dec!(0.91));
        f.store.fail_reads(true);

        assert_eq!(f.resolver.resolve(f.usd.id, f.eur.id).await, None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_rate() -> impl Strategy<Value = Decimal> {
            (1u64..10_000_000u64).prop_map(|n| Decimal::new(n as i64, 4))
        }

        fn block_on<F: std::future::Future>(fut: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(fut)
        }

        proptest! {
            #[test]
            fn direct_edge_is_exact(rate in arb_rate()) {
                let f = fixture();
                f.store.set_rate(f.eur.id, f.gbp.id, rate);
                let resolved = block_on(f.resolver.resolve(f.eur.id, f.gbp.id)).unwrap();
                prop_assert_eq!(resolved.rate, rate);
            }

            #[test]
            fn inverse_is_reciprocal(rate in arb_rate()) {
                let f = fixture();
                f.store.set_rate(f.eur.id, f.gbp.id, rate);
                let resolved = block_on(f.resolver.resolve(f.gbp.id, f.eur.id)).unwrap();
                let product = resolved.rate * rate;
                prop_assert!((product - Decimal::ONE).abs() < dec!(0.000000000001));
            }

            #[test]
            fn bridge_is_quotient(r1 in arb_rate(), r2 in arb_rate()) {
                let f = fixture();
                f.store.set_rate(f.usd.id, f.eur.id, r1);
                f.store.set_rate(f.usd.id, f.gbp.id, r2);
                let resolved = block_on(f.resolver.resolve(f.eur.id, f.gbp.id)).unwrap();
                prop_assert_eq!(resolved.rate, r2 / r1);
            }

            #[test]
            fn self_pair_needs_identity_edge(r1 in arb_rate(), r2 in arb_rate()) {
                let f = fixture();
                f.store.set_rate(f.usd.id, f.eur.id, r1);
                f.store.set_rate(f.eur.id, f.usd.id, r2);
                prop_assert_eq!(block_on(f.resolver.resolve(f.eur.id, f.eur.id)), None);
            }
        }
    }
}
