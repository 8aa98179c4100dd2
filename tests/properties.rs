use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use distfit::distributions::{AnyDistribution, Cumulative, Density};
use distfit::domain::{DistributionKind, DistributionSpec, Interval};
use distfit::math::{QuantileBuilder, ReparametrizedDomain, SegmentCache};

fn any_spec() -> impl Strategy<Value = DistributionSpec> {
    use DistributionKind::*;
    prop_oneof![
        (0.1..10.0f64).prop_map(|s| DistributionSpec::new(Exponential, vec![s])),
        (-5.0..5.0f64, 0.1..4.0f64).prop_map(|(m, s)| DistributionSpec::new(Normal, vec![m, s])),
        (0.5..10.0f64, 0.1..5.0f64).prop_map(|(k, t)| DistributionSpec::new(Gamma, vec![k, t])),
        (0.5..5.0f64, 0.1..5.0f64).prop_map(|(k, l)| DistributionSpec::new(Weibull, vec![k, l])),
        (0.5..5.0f64, 0.5..10.0f64).prop_map(|(m, l)| DistributionSpec::new(InverseGauss, vec![m, l])),
        (-3.0..3.0f64, -1.0..2.5f64, 0.2..5.0f64).prop_map(|(m, q, b)| DistributionSpec::new(QGaussian, vec![m, q, b])),
        (0.0..1.8f64, 0.2..5.0f64).prop_map(|(q, r)| DistributionSpec::new(QExponential, vec![q, r])),
        (-3.0..3.0f64, 0.2..3.0f64, 0.0..2.0f64).prop_map(|(m, s, g)| DistributionSpec::new(Voigt, vec![m, s, g])),
        (-3.0..3.0f64, 0.2..3.0f64, -0.9..0.9f64).prop_map(|(m, s, l)| DistributionSpec::new(SkewCauchy, vec![m, s, l])),
        (0.3..5.0f64, 0.3..5.0f64).prop_map(|(a, b)| DistributionSpec::new(Kumaraswamy, vec![a, b])),
    ]
}

fn build(spec: &DistributionSpec) -> AnyDistribution {
    spec.build().unwrap_or_else(|e| panic!("{spec}: {e}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cdf_inverts_quantile(spec in any_spec(), p in 0.001..0.999f64, upper in any::<bool>()) {
        let dist = build(&spec);
        let interval = if upper { Interval::Upper } else { Interval::Lower };
        let x = dist.quantile(p, interval);
        prop_assert!(x.is_finite(), "{spec} p={p}: x={x}");
        let back = dist.cdf(x, interval);
        prop_assert!((back - p).abs() < 1e-9, "{spec} p={p} {interval:?}: x={x} cdf={back}");
    }

    #[test]
    fn tails_are_complementary(spec in any_spec(), p in 0.01..0.99f64, dx in -2.0..2.0f64) {
        let dist = build(&spec);
        let x = dist.quantile(p, Interval::Lower) + dx;
        let sum = dist.cdf(x, Interval::Lower) + dist.cdf(x, Interval::Upper);
        prop_assert!((sum - 1.0).abs() < 1e-9, "{spec} x={x}: sum={sum}");
    }

    #[test]
    fn quantiles_are_monotone(spec in any_spec(), p in 0.001..0.99f64, gap in 1e-4..0.009f64) {
        let dist = build(&spec);
        let a = dist.quantile(p, Interval::Lower);
        let b = dist.quantile(p + gap, Interval::Lower);
        prop_assert!(a <= b, "{spec}: q({p})={a} > q({})={b}", p + gap);
        // Upper tail runs the other way.
        let a = dist.quantile(p, Interval::Upper);
        let b = dist.quantile(p + gap, Interval::Upper);
        prop_assert!(a >= b, "{spec}: upper q({p})={a} < q({})={b}", p + gap);
    }

    #[test]
    fn boundary_probabilities_hit_the_support(spec in any_spec()) {
        let dist = build(&spec);
        let (lo, hi) = dist.support();
        prop_assert_eq!(dist.quantile(0.0, Interval::Lower), lo);
        prop_assert_eq!(dist.quantile(1.0, Interval::Lower), hi);
        prop_assert_eq!(dist.quantile(1.0, Interval::Upper), lo);
        prop_assert_eq!(dist.quantile(0.0, Interval::Upper), hi);
        prop_assert!(dist.quantile(1.5, Interval::Lower).is_nan());
    }

    #[test]
    fn segment_tables_are_monotone_with_constant_sum(
        a in 0.0..3.0f64,
        b in 0.0..3.0f64,
        lo in -2.0..0.0f64,
        width in 0.5..4.0f64,
        n in 1usize..64,
        ts in proptest::collection::vec(0.0..1.0f64, 2..16),
    ) {
        let cache = SegmentCache::new(move |t| a + b * t * t + 1e-3, lo, lo + width, n).unwrap();
        let total = cache.total();
        let mut ts: Vec<f64> = ts.into_iter().map(|u| lo + u * width).collect();
        ts.sort_by(|x, y| x.total_cmp(y));
        let mut prev_lower = 0.0;
        let mut prev_upper = total;
        for t in ts {
            let lower = cache.lower(t);
            let upper = cache.upper(t);
            prop_assert!(lower >= prev_lower, "lower decreased at t={t}");
            prop_assert!(upper <= prev_upper, "upper increased at t={t}");
            prop_assert!((lower + upper - total).abs() <= 1e-12 * total.max(1.0));
            prev_lower = lower;
            prev_upper = upper;
        }
    }

    #[test]
    fn estimate_lies_inside_its_bracket(target in 0.0..=1.0f64, upper in any::<bool>(), n in 4usize..256) {
        let density = |x: f64| (-0.5 * x * x).exp();
        let domain = ReparametrizedDomain::unbounded(0.0, 1.0).unwrap();
        let builder = QuantileBuilder::from_density(density, domain, n).unwrap();
        let interval = if upper { Interval::Upper } else { Interval::Lower };
        let bracket = builder.estimate(target, interval).unwrap();
        prop_assert!(bracket.low <= bracket.estimate && bracket.estimate <= bracket.high, "{bracket:?}");
    }
}

#[test]
fn unit_table_on_four_segments() {
    let cache = SegmentCache::new(|_| 1.0, 0.0, 1.0, 4).unwrap();
    assert_abs_diff_eq!(cache.lower(0.5), 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(cache.upper(0.5), 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(cache.lower(1.0), 1.0, epsilon = 1e-15);

    let domain = ReparametrizedDomain::bounded(0.0, 1.0).unwrap();
    let builder = QuantileBuilder::from_cache(&cache, domain).unwrap();
    let bracket = builder.estimate(0.5, Interval::Lower).unwrap();
    assert_abs_diff_eq!(bracket.estimate, 0.5, epsilon = 1e-12);
    assert!(bracket.low <= 0.5 && bracket.high >= 0.5);
    assert!(bracket.low >= 0.25 && bracket.high <= 0.75);
}

#[test]
fn density_matches_numerical_derivative_of_cdf() {
    let specs = [
        DistributionSpec::new(DistributionKind::Gamma, vec![2.5, 1.5]),
        DistributionSpec::new(DistributionKind::QGaussian, vec![0.0, 1.5, 2.0]),
        DistributionSpec::new(DistributionKind::Voigt, vec![1.0, 0.8, 0.4]),
        DistributionSpec::new(DistributionKind::InverseGauss, vec![1.0, 3.0]),
    ];
    for spec in &specs {
        let dist = build(spec);
        for p in [0.1, 0.5, 0.9] {
            let x = dist.quantile(p, Interval::Lower);
            let h = 1e-5 * x.abs().max(1.0);
            let slope = (dist.cdf(x + h, Interval::Lower) - dist.cdf(x - h, Interval::Lower)) / (2.0 * h);
            assert!((slope - dist.pdf(x)).abs() < 1e-5, "{spec} at {x}: {slope} vs {}", dist.pdf(x));
        }
    }
}
