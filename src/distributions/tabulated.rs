//! Lazily built cumulative tables shared by the families without a
//! closed-form CDF or quantile.

use std::sync::{Arc, OnceLock};

use crate::domain::Interval;
use crate::error::ParamError;
use crate::math::{NewtonSettings, QuantileBuilder, ReparametrizedDomain, SegmentCache};

/// CDF and quantile builder from a single segment cache of a density.
///
/// A density symmetric about `center` only answers from the left half of its
/// table; points right of the center are mirrored. Sampling coordinates near
/// `t = 1` cannot resolve far right tails, those near `t = 0` can.
#[derive(Debug)]
pub(crate) struct TabulatedCdf {
    domain: ReparametrizedDomain,
    cache: SegmentCache,
    builder: QuantileBuilder,
    mirror: Option<f64>,
}

impl TabulatedCdf {
    pub(crate) fn new<F>(density: F, domain: ReparametrizedDomain, samples: usize) -> Result<Self, ParamError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let cache = SegmentCache::new(domain.pullback(density), 0.0, 1.0, samples)?;
        let builder = QuantileBuilder::from_cache(&cache, domain)?;
        Ok(TabulatedCdf {
            domain,
            cache,
            builder,
            mirror: None,
        })
    }

    /// Table of a density with `f(center - d) = f(center + d)`.
    pub(crate) fn symmetric<F>(
        density: F,
        domain: ReparametrizedDomain,
        samples: usize,
        center: f64,
    ) -> Result<Self, ParamError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let mut table = Self::new(density, domain, samples)?;
        table.mirror = Some(center);
        Ok(table)
    }

    pub(crate) fn cdf(&self, x: f64, interval: Interval) -> f64 {
        match self.mirror {
            Some(center) if x > center => self.table_cdf(2.0 * center - x, interval.flip()),
            _ => self.table_cdf(x, interval),
        }
    }

    /// Quantile polished by Newton with `pdf` as derivative.
    pub(crate) fn quantile<D>(&self, p: f64, interval: Interval, pdf: D) -> f64
    where
        D: Fn(f64) -> f64,
    {
        if let Some(center) = self.mirror {
            if interval.to_lower(p) > 0.5 {
                let reflected = refine_quantile(&self.builder, p, interval.flip(), |x, i| self.cdf(x, i), &pdf);
                return 2.0 * center - reflected;
            }
        }
        refine_quantile(&self.builder, p, interval, |x, i| self.cdf(x, i), pdf)
    }

    fn table_cdf(&self, x: f64, interval: Interval) -> f64 {
        let t = self.domain.to_t(x);
        if t.is_nan() {
            return f64::NAN;
        }
        match interval {
            Interval::Lower => (self.cache.lower(t) / self.cache.total()).clamp(0.0, 1.0),
            Interval::Upper => (self.cache.upper(t) / self.cache.upper_table()[0]).clamp(0.0, 1.0),
        }
    }
}

/// Single-initialization slot for a table owned by one distribution instance.
///
/// Concurrent first use builds the table once; a failed build is remembered
/// as `None` and makes dependent queries return NaN.
#[derive(Debug)]
pub(crate) struct LazyTable<T>(OnceLock<Option<Arc<T>>>);

impl<T> LazyTable<T> {
    pub(crate) fn new() -> Self {
        LazyTable(OnceLock::new())
    }

    pub(crate) fn get_or_build<F>(&self, build: F) -> Option<&T>
    where
        F: FnOnce() -> Result<T, ParamError>,
    {
        self.0
            .get_or_init(|| match build() {
                Ok(table) => Some(Arc::new(table)),
                Err(err) => {
                    tracing::warn!(%err, "cumulative table could not be built");
                    None
                }
            })
            .as_deref()
    }
}

impl<T> Clone for LazyTable<T> {
    fn clone(&self) -> Self {
        let slot = OnceLock::new();
        if let Some(built) = self.0.get() {
            let _ = slot.set(built.clone());
        }
        LazyTable(slot)
    }
}

impl<T> Default for LazyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Table estimate polished by bracketed Newton on `cdf` with `pdf` as derivative.
pub(crate) fn refine_quantile<C, D>(builder: &QuantileBuilder, p: f64, interval: Interval, cdf: C, pdf: D) -> f64
where
    C: Fn(f64, Interval) -> f64,
    D: Fn(f64) -> f64,
{
    match builder.estimate(p, interval) {
        Some(bracket) => bracket.refine(p, interval, cdf, pdf, &NewtonSettings::default()),
        None => f64::NAN,
    }
}
