/// Mutable equation the balancing stages work on.
///
/// Built from the parsed species with every coefficient set to 1. The half-reaction stages
/// assign coefficients and append the auxiliary species (water, protons, electrons); the
/// finished equation is rendered once by the formatter and then dropped.
use crate::Redox::errors::{RedoxError, checked_add, checked_mul};
use crate::Redox::formula::Species;
use num_integer::Integer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reactants,
    Products,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Reactants => Side::Products,
            Side::Products => Side::Reactants,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    /// species supplied by the user
    Given,
    Water,
    Proton,
    /// bookkeeping only, never rendered
    Electron,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub species: Species,
    pub coefficient: i64,
    pub kind: TermKind,
    assigned: bool,
}

impl Term {
    pub fn given(species: Species) -> Self {
        Self {
            species,
            coefficient: 1,
            kind: TermKind::Given,
            assigned: false,
        }
    }

    pub fn with_coefficient(species: Species, coefficient: i64, kind: TermKind) -> Self {
        Self {
            species,
            coefficient,
            kind,
            assigned: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.kind != TermKind::Electron
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub reactants: Vec<Term>,
    pub products: Vec<Term>,
    given_species: usize,
}

impl Equation {
    pub fn from_species(reactants: Vec<Species>, products: Vec<Species>) -> Self {
        let given_species = reactants.len() + products.len();
        Self {
            reactants: reactants.into_iter().map(Term::given).collect(),
            products: products.into_iter().map(Term::given).collect(),
            given_species,
        }
    }

    pub fn from_terms(reactants: Vec<Term>, products: Vec<Term>) -> Self {
        let given_species = reactants
            .iter()
            .chain(products.iter())
            .filter(|t| t.kind == TermKind::Given)
            .count();
        Self {
            reactants,
            products,
            given_species,
        }
    }

    pub fn side(&self, side: Side) -> &[Term] {
        match side {
            Side::Reactants => &self.reactants,
            Side::Products => &self.products,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<Term> {
        match side {
            Side::Reactants => &mut self.reactants,
            Side::Products => &mut self.products,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.reactants.iter().chain(self.products.iter())
    }

    // sum of coefficient * per-unit value over the selected terms of one side
    fn weighted_total(
        &self,
        side: Side,
        visible_only: bool,
        per_unit: impl Fn(&Term) -> i64,
        context: &str,
    ) -> Result<i64, RedoxError> {
        self.side(side)
            .iter()
            .filter(|t| !visible_only || t.is_visible())
            .try_fold(0i64, |total, t| {
                checked_add(total, checked_mul(t.coefficient, per_unit(t), context)?, context)
            })
    }

    /// total number of atoms of the element on one side
    pub fn atom_total(&self, side: Side, element: &str) -> Result<i64, RedoxError> {
        self.weighted_total(
            side,
            false,
            |t| t.species.atoms.get(element) as i64,
            &format!("counting {} atoms", element),
        )
    }

    /// total charge of one side, electrons included
    pub fn charge_total(&self, side: Side) -> Result<i64, RedoxError> {
        self.weighted_total(side, false, |t| t.species.charge as i64, "summing charges")
    }

    pub fn visible_charge_total(&self, side: Side) -> Result<i64, RedoxError> {
        self.weighted_total(side, true, |t| t.species.charge as i64, "summing charges")
    }

    /// Fixes the coefficient of a term; a term can be fixed twice only to the same value.
    pub fn assign(&mut self, side: Side, index: usize, coefficient: i64) -> Result<(), RedoxError> {
        let Some(term) = self.side_mut(side).get_mut(index) else {
            return Err(RedoxError::Unbalanceable(format!(
                "no species at position {} of the {:?}",
                index, side
            )));
        };
        if term.assigned && term.coefficient != coefficient {
            return Err(RedoxError::CoefficientConflict {
                species: term.species.formula.clone(),
                first: term.coefficient,
                second: coefficient,
            });
        }
        term.coefficient = coefficient;
        term.assigned = true;
        Ok(())
    }

    /// Puts `amount` units of an auxiliary species on `side`. The same species on the other
    /// side is consumed first; whatever remains is added to an existing term or appended.
    pub fn add_auxiliary(
        &mut self,
        side: Side,
        species: Species,
        kind: TermKind,
        amount: i64,
    ) -> Result<(), RedoxError> {
        if amount <= 0 {
            return Ok(());
        }
        let mut amount = amount;
        let opposite = self.side_mut(side.opposite());
        if let Some(pos) = opposite
            .iter()
            .position(|t| t.species.formula == species.formula)
        {
            let present = opposite[pos].coefficient;
            if present > amount {
                opposite[pos].coefficient -= amount;
                return Ok(());
            }
            opposite.remove(pos);
            amount -= present;
            if amount == 0 {
                return Ok(());
            }
        }
        let own = self.side_mut(side);
        match own.iter_mut().find(|t| t.species.formula == species.formula) {
            Some(term) => {
                term.coefficient = checked_add(
                    term.coefficient,
                    amount,
                    &format!("adding {}", species.formula),
                )?
            }
            None => own.push(Term::with_coefficient(species, amount, kind)),
        }
        Ok(())
    }

    /// Divides every coefficient by their greatest common divisor.
    pub fn reduce_coefficients(&mut self) {
        let divisor = self
            .terms()
            .fold(0i64, |acc, t| acc.gcd(&t.coefficient));
        if divisor > 1 {
            for term in self.reactants.iter_mut().chain(self.products.iter_mut()) {
                term.coefficient /= divisor;
            }
        }
    }

    /// elements of the visible terms, in first appearance order
    pub fn elements(&self) -> Vec<String> {
        let mut elements: Vec<String> = Vec::new();
        for term in self.terms().filter(|t| t.is_visible()) {
            for (element, _) in term.species.atoms.iter() {
                if !elements.iter().any(|e| e == element) {
                    elements.push(element.to_string());
                }
            }
        }
        elements
    }

    /// Every user species still present with a positive coefficient, and every element as well
    /// as the charge conserved over the visible terms.
    pub fn is_balanced(&self) -> bool {
        let given_present = self
            .terms()
            .filter(|t| t.kind == TermKind::Given && t.coefficient > 0)
            .count();
        if given_present != self.given_species {
            return false;
        }
        let visible_atoms = |side: Side, element: &str| {
            self.weighted_total(side, true, |t| t.species.atoms.get(element) as i64, "counting atoms")
        };
        let atoms_conserved = self.elements().iter().all(|element| {
            matches!(
                (
                    visible_atoms(Side::Reactants, element.as_str()),
                    visible_atoms(Side::Products, element.as_str())
                ),
                (Ok(left), Ok(right)) if left == right
            )
        });
        atoms_conserved
            && matches!(
                (
                    self.visible_charge_total(Side::Reactants),
                    self.visible_charge_total(Side::Products)
                ),
                (Ok(left), Ok(right)) if left == right
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species(list: &[&str]) -> Vec<Species> {
        list.iter().map(|s| Species::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_totals() {
        let mut equation = Equation::from_species(species(&["Fe", "O2"]), species(&["Fe2O3"]));
        equation.assign(Side::Reactants, 0, 4).unwrap();
        equation.assign(Side::Reactants, 1, 3).unwrap();
        equation.assign(Side::Products, 0, 2).unwrap();
        assert_eq!(equation.atom_total(Side::Reactants, "O"), Ok(6));
        assert_eq!(equation.atom_total(Side::Products, "Fe"), Ok(4));
        assert!(equation.is_balanced());
    }

    #[test]
    fn test_assign_conflict() {
        let mut equation = Equation::from_species(species(&["C2H6", "O2"]), species(&["CO2"]));
        equation.assign(Side::Products, 0, 4).unwrap();
        // same value twice is fine
        equation.assign(Side::Products, 0, 4).unwrap();
        assert_eq!(
            equation.assign(Side::Products, 0, 7),
            Err(RedoxError::CoefficientConflict {
                species: "CO2".to_string(),
                first: 4,
                second: 7,
            })
        );
    }

    #[test]
    fn test_auxiliary_cancels_opposite_side() {
        let mut equation = Equation::from_species(species(&["Cl2"]), species(&["Cl^-"]));
        equation.add_auxiliary(Side::Reactants, Species::water(), TermKind::Water, 6).unwrap();
        equation.add_auxiliary(Side::Products, Species::water(), TermKind::Water, 2).unwrap();
        assert_eq!(equation.reactants[1].coefficient, 4);
        assert_eq!(equation.products.len(), 1);

        equation.add_auxiliary(Side::Products, Species::water(), TermKind::Water, 5).unwrap();
        assert_eq!(equation.reactants.len(), 1);
        assert_eq!(equation.products[1].species.formula, "H2O");
        assert_eq!(equation.products[1].coefficient, 1);

        equation.add_auxiliary(Side::Products, Species::water(), TermKind::Water, 2).unwrap();
        assert_eq!(equation.products[1].coefficient, 3);
        equation.add_auxiliary(Side::Products, Species::water(), TermKind::Water, 0).unwrap();
        assert_eq!(equation.products.len(), 2);
    }

    #[test]
    fn test_reduce_coefficients() {
        let mut equation = Equation::from_species(species(&["H2", "O2"]), species(&["H2O"]));
        equation.assign(Side::Reactants, 0, 4).unwrap();
        equation.assign(Side::Reactants, 1, 2).unwrap();
        equation.assign(Side::Products, 0, 4).unwrap();
        equation.reduce_coefficients();
        let coefficients: Vec<i64> = equation.terms().map(|t| t.coefficient).collect();
        assert_eq!(coefficients, vec![2, 1, 2]);
    }

    #[test]
    fn test_electrons_are_invisible() {
        let mut equation = Equation::from_species(species(&["Fe^2+"]), species(&["Fe^3+"]));
        equation.add_auxiliary(Side::Products, Species::electron(), TermKind::Electron, 1).unwrap();
        assert_eq!(equation.charge_total(Side::Products), Ok(2));
        assert_eq!(equation.visible_charge_total(Side::Products), Ok(3));
        assert!(!equation.is_balanced());
    }

    #[test]
    fn test_removed_user_species_is_not_balanced() {
        let mut equation = Equation::from_species(species(&["H2O2"]), species(&["H2O", "O2"]));
        equation.add_auxiliary(Side::Reactants, Species::water(), TermKind::Water, 1).unwrap();
        assert_eq!(equation.products.len(), 1);
        assert!(!equation.is_balanced());
    }

    #[test]
    fn test_totals_report_overflow() {
        let huge = Term::with_coefficient(
            Species::parse("Fe^2000000000+").unwrap(),
            5_000_000_000,
            TermKind::Given,
        );
        let equation = Equation::from_terms(vec![huge.clone()], vec![huge]);
        assert!(matches!(
            equation.charge_total(Side::Reactants),
            Err(RedoxError::Overflow(_))
        ));
        assert_eq!(equation.atom_total(Side::Reactants, "Fe"), Ok(5_000_000_000));
        // an overflowing side never counts as balanced
        assert!(!equation.is_balanced());

        let mut equation = Equation::from_species(species(&["H2"]), species(&["H2O"]));
        equation.assign(Side::Products, 0, i64::MAX).unwrap();
        assert!(matches!(
            equation.add_auxiliary(Side::Products, Species::water(), TermKind::Water, 1),
            Err(RedoxError::Overflow(_))
        ));
    }
}
