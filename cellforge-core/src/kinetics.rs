//! Rate laws used by enzymes.
//!
//! Every function here is pure: it takes concentrations and constants and
//! returns a rate, never touching a pool.
//!
//! - Michaelis-Menten kinetics
//! - Hill kinetics (cooperative binding)
//! - Allosteric modulation by inhibitors and activators

/// Michaelis-Menten kinetics
///
/// v = Vmax * [S] / (Km + [S])
///
/// Returns 0 for an empty or negative substrate concentration.
#[inline]
pub fn michaelis_menten(substrate: f64, vmax: f64, km: f64) -> f64 {
    if substrate <= 0.0 {
        return 0.0;
    }
    vmax * substrate / (km + substrate)
}

/// Hill kinetics for cooperative enzymes
///
/// v = Vmax * [S]^n / (K^n + [S]^n)
///
/// With `n = 1` this reduces to [`michaelis_menten`].
#[inline]
pub fn hill_equation(substrate: f64, vmax: f64, k: f64, n: f64) -> f64 {
    if substrate <= 0.0 {
        return 0.0;
    }
    let s_n = substrate.powf(n);
    vmax * s_n / (k.powf(n) + s_n)
}

/// A regulator bound at `concentration` with dissociation constant `constant`
/// (Ki for inhibitors, Ka for activators).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effector {
    pub concentration: f64,
    pub constant: f64,
}

impl Effector {
    pub fn new(concentration: f64, constant: f64) -> Self {
        Self {
            concentration,
            constant,
        }
    }

    fn ratio(&self) -> f64 {
        if self.concentration <= 0.0 || self.constant <= 0.0 {
            return 0.0;
        }
        self.concentration / self.constant
    }
}

/// Product of 1 / (1 + [I]/Ki) over all inhibitors.
pub fn inhibition_factor(inhibitors: &[Effector]) -> f64 {
    inhibitors.iter().map(|i| 1.0 / (1.0 + i.ratio())).product()
}

/// Product of (1 + [A]/Ka) over all activators.
pub fn activation_factor(activators: &[Effector]) -> f64 {
    activators.iter().map(|a| 1.0 + a.ratio()).product()
}

/// Scales a base rate by allosteric inhibition and activation.
///
/// rate = base * Π 1/(1 + [I]/Ki) * Π (1 + [A]/Ka)
pub fn allosteric_regulation(base_rate: f64, inhibitors: &[Effector], activators: &[Effector]) -> f64 {
    base_rate * inhibition_factor(inhibitors) * activation_factor(activators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn michaelis_menten_half_saturation() {
        let v = michaelis_menten(10.0, 2.0, 10.0);
        assert!((v - 1.0).abs() < 1e-12);
        assert_eq!(michaelis_menten(0.0, 2.0, 10.0), 0.0);
        assert_eq!(michaelis_menten(-1.0, 2.0, 10.0), 0.0);
    }

    #[test]
    fn hill_with_unit_coefficient_matches_michaelis_menten() {
        for s in [0.5, 5.0, 50.0] {
            let mm = michaelis_menten(s, 3.0, 4.0);
            let hill = hill_equation(s, 3.0, 4.0, 1.0);
            assert!((mm - hill).abs() < 1e-12);
        }
    }

    #[test]
    fn hill_is_sigmoidal() {
        let low = hill_equation(1.0, 1.0, 4.0, 4.0);
        let half = hill_equation(4.0, 1.0, 4.0, 4.0);
        assert!(low < michaelis_menten(1.0, 1.0, 4.0));
        assert!((half - 0.5).abs() < 1e-12);
    }

    #[test]
    fn allosteric_factors_multiply() {
        let inhibitors = [Effector::new(10.0, 10.0), Effector::new(5.0, 5.0)];
        let activators = [Effector::new(2.0, 1.0)];
        let rate = allosteric_regulation(8.0, &inhibitors, &activators);
        // 8 * 1/2 * 1/2 * 3
        assert!((rate - 6.0).abs() < 1e-12);
    }

    #[test]
    fn absent_effectors_are_neutral() {
        assert_eq!(allosteric_regulation(2.5, &[], &[]), 2.5);
        assert_eq!(inhibition_factor(&[Effector::new(0.0, 1.0)]), 1.0);
    }
}
