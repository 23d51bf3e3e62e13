//! Derived sky quality figures attached to query results.

/// Converts sky brightness (mag/arcsec²) to naked eye limiting magnitude.
///
/// Uses the empirical Unihedron relation
/// `NELM = 7.93 - 5 · log10(10^(4.316 - mpas / 5) + 1)`.
///
/// ```
/// use skyglow::enrichment::mpas_to_nelm;
///
/// // A pristine 21.5 mpas sky shows stars to about magnitude 6.4
/// assert!((mpas_to_nelm(21.5) - 6.38).abs() < 0.05);
/// // Darker skies always reveal fainter stars
/// assert!(mpas_to_nelm(20.0) > mpas_to_nelm(18.0));
/// ```
pub fn mpas_to_nelm(mpas: f64) -> f64 {
    7.93 - 5.0 * (10f64.powf(4.316 - mpas / 5.0) + 1.0).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_sky_is_poor() {
        // bright suburbs sit near 18 mpas and magnitude 4
        let nelm = mpas_to_nelm(18.0);
        assert!(nelm > 3.5 && nelm < 4.5, "{nelm}");
    }

    #[test]
    fn brightest_accepted_value_is_finite() {
        assert!(mpas_to_nelm(12.0).is_finite());
        assert!(mpas_to_nelm(21.0).is_finite());
    }
}
