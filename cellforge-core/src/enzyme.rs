use crate::{
    error::MetabolismError,
    kinetics::{allosteric_regulation, hill_equation, michaelis_menten, Effector},
    metabolite::{normalize_name, MetabolitePool},
};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// How one enzyme acts on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulationAction {
    Activate,
    Deactivate,
}

/// A catalyst with turnover number, per-substrate affinities and allosteric
/// regulators. Names of substrates and regulators refer to metabolites in
/// the pool the enzyme is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct Enzyme {
    pub name: String,
    pub k_cat: f64,
    pub k_m: BTreeMap<String, f64>,
    pub hill_coefficients: BTreeMap<String, f64>,
    pub inhibitors: BTreeMap<String, f64>,
    pub activators: BTreeMap<String, f64>,
    pub downstream: Vec<String>,
    active: bool,
}

impl Enzyme {
    pub fn new(name: &str, k_cat: f64) -> Self {
        Self {
            name: normalize_name(name),
            k_cat,
            k_m: BTreeMap::new(),
            hill_coefficients: BTreeMap::new(),
            inhibitors: BTreeMap::new(),
            activators: BTreeMap::new(),
            downstream: Vec::new(),
            active: true,
        }
    }

    pub fn with_km(mut self, substrate: &str, km: f64) -> Self {
        self.k_m.insert(normalize_name(substrate), km);
        self
    }

    pub fn with_hill(mut self, substrate: &str, n: f64) -> Self {
        self.hill_coefficients.insert(normalize_name(substrate), n);
        self
    }

    pub fn with_inhibitor(mut self, metabolite: &str, ki: f64) -> Self {
        self.inhibitors.insert(normalize_name(metabolite), ki);
        self
    }

    pub fn with_activator(mut self, metabolite: &str, ka: f64) -> Self {
        self.activators.insert(normalize_name(metabolite), ka);
        self
    }

    pub fn with_downstream(mut self, enzyme: &str) -> Self {
        self.downstream.push(normalize_name(enzyme));
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn regulate(&self, target: &mut Enzyme, action: RegulationAction) {
        log::debug!("{} regulates {}: {:?}", self.name, target.name, action);
        match action {
            RegulationAction::Activate => target.activate(),
            RegulationAction::Deactivate => target.deactivate(),
        }
    }

    /// Catalytic rate against the current pool contents.
    ///
    /// Each substrate with a declared Km contributes a saturation term
    /// (Hill when a coefficient is declared, Michaelis-Menten otherwise);
    /// the product of those terms scales `k_cat`. Regulators absent from the
    /// pool have no effect. An inactive enzyme has rate 0.
    pub fn rate(&self, pool: &MetabolitePool) -> Result<f64, MetabolismError> {
        if !self.active {
            return Ok(0.0);
        }

        let mut base = self.k_cat;
        for (substrate, km) in &self.k_m {
            let concentration = pool.quantity(substrate)?;
            let saturation = match self.hill_coefficients.get(substrate) {
                Some(n) => hill_equation(concentration, 1.0, *km, *n),
                None => michaelis_menten(concentration, 1.0, *km),
            };
            base *= saturation;
        }

        let inhibitors = Self::effectors(&self.inhibitors, pool);
        let activators = Self::effectors(&self.activators, pool);
        Ok(allosteric_regulation(base, &inhibitors, &activators))
    }

    fn effectors(constants: &BTreeMap<String, f64>, pool: &MetabolitePool) -> Vec<Effector> {
        constants
            .iter()
            .map(|(name, constant)| {
                let concentration = pool.get(name).map_or(0.0, |m| m.quantity());
                Effector::new(concentration, *constant)
            })
            .collect()
    }
}

/// Activates `root` and, breadth-first, every enzyme reachable through
/// `downstream` links. Each enzyme is visited once, so cyclic links
/// terminate. Links naming enzymes outside the given set are ignored.
///
/// Returns the names activated, in visiting order.
pub fn cascade_activation<'a, I>(enzymes: I, root: &str) -> Result<Vec<String>, MetabolismError>
where
    I: IntoIterator<Item = &'a mut Enzyme>,
{
    let mut by_name: BTreeMap<String, Vec<&'a mut Enzyme>> = BTreeMap::new();
    for enzyme in enzymes {
        by_name.entry(enzyme.name.clone()).or_default().push(enzyme);
    }

    let root = normalize_name(root);
    if !by_name.contains_key(&root) {
        return Err(MetabolismError::UnknownEnzyme(root));
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root]);
    let mut activated = Vec::new();

    while let Some(name) = queue.pop_front() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(group) = by_name.get_mut(&name) else {
            continue;
        };
        let mut next = Vec::new();
        for enzyme in group.iter_mut() {
            enzyme.activate();
            next.extend(enzyme.downstream.iter().cloned());
        }
        activated.push(name);
        queue.extend(next.into_iter().filter(|n| !visited.contains(n)));
    }

    Ok(activated)
}

/// Deactivates exactly the named enzyme; nothing downstream changes.
pub fn deactivate<'a, I>(enzymes: I, name: &str) -> Result<(), MetabolismError>
where
    I: IntoIterator<Item = &'a mut Enzyme>,
{
    let name = normalize_name(name);
    let mut found = false;
    for enzyme in enzymes.into_iter().filter(|e| e.name == name) {
        enzyme.deactivate();
        found = true;
    }
    if found {
        Ok(())
    } else {
        Err(MetabolismError::UnknownEnzyme(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellforge_schemas::metabolite::SeedRegistry;

    fn pool(pairs: &[(&str, f64, f64)]) -> MetabolitePool {
        MetabolitePool::from_seed("test", &SeedRegistry::from_pairs(pairs)).unwrap()
    }

    #[test]
    fn single_substrate_rate() {
        let enzyme = Enzyme::new("E", 1.0).with_km("A", 10.0);
        let rate = enzyme.rate(&pool(&[("a", 50.0, 100.0)])).unwrap();
        assert!((rate - 0.833_333_3).abs() < 1e-6);
    }

    #[test]
    fn multi_substrate_rate_is_product_of_saturations() {
        let enzyme = Enzyme::new("E", 1.0).with_km("a", 10.0).with_km("b", 20.0);
        let rate = enzyme
            .rate(&pool(&[("a", 50.0, 100.0), ("b", 60.0, 100.0)]))
            .unwrap();
        assert!((rate - 0.625).abs() < 1e-12);
    }

    #[test]
    fn inactive_enzyme_has_zero_rate() {
        let enzyme = Enzyme::new("E", 5.0).with_km("a", 1.0).inactive();
        assert_eq!(enzyme.rate(&pool(&[("a", 50.0, 100.0)])).unwrap(), 0.0);
    }

    #[test]
    fn missing_substrate_is_an_error() {
        let enzyme = Enzyme::new("E", 1.0).with_km("a", 1.0);
        let err = enzyme.rate(&pool(&[("b", 1.0, 10.0)])).unwrap_err();
        assert!(matches!(err, MetabolismError::UnknownMetabolite(name) if name == "a"));
    }

    #[test]
    fn regulators_scale_rate() {
        let enzyme = Enzyme::new("E", 4.0)
            .with_inhibitor("atp", 10.0)
            .with_activator("adp", 5.0)
            .with_activator("amp", 1.0);
        // amp is not registered and so has no effect
        let rate = enzyme
            .rate(&pool(&[("atp", 10.0, 100.0), ("adp", 5.0, 100.0)]))
            .unwrap();
        assert!((rate - 4.0).abs() < 1e-12);
    }

    #[test]
    fn regulate_switches_target() {
        let regulator = Enzyme::new("kinase", 1.0);
        let mut target = Enzyme::new("target", 1.0);
        regulator.regulate(&mut target, RegulationAction::Deactivate);
        assert!(!target.is_active());
        regulator.regulate(&mut target, RegulationAction::Activate);
        assert!(target.is_active());
    }

    #[test]
    fn cascade_follows_downstream_links_and_survives_cycles() {
        let mut enzymes = vec![
            Enzyme::new("a", 1.0).with_downstream("b").inactive(),
            Enzyme::new("b", 1.0).with_downstream("c").with_downstream("elsewhere").inactive(),
            Enzyme::new("c", 1.0).with_downstream("a").inactive(),
            Enzyme::new("d", 1.0).inactive(),
        ];
        let activated = cascade_activation(enzymes.iter_mut(), "A").unwrap();
        assert_eq!(activated, vec!["a", "b", "c"]);
        assert!(enzymes[..3].iter().all(Enzyme::is_active));
        assert!(!enzymes[3].is_active());
    }

    #[test]
    fn deactivation_does_not_cascade() {
        let mut enzymes = vec![
            Enzyme::new("a", 1.0).with_downstream("b"),
            Enzyme::new("b", 1.0),
        ];
        deactivate(enzymes.iter_mut(), "a").unwrap();
        assert!(!enzymes[0].is_active());
        assert!(enzymes[1].is_active());
        assert!(cascade_activation(enzymes.iter_mut(), "zzz").is_err());
    }
}
