/// Half-reaction (ion-electron) method as a state machine over an [`Equation`].
///
/// Stages run in a fixed order:
/// 1) DetectPairs: find the oxidized and the reduced element with their source reactant and target
///    product. Candidates are scanned in reactant order, element order within the reactant formula
///    and product order; the ordinary pair is the first oxidation combined with the first reduction
///    coming from a different reactant. Without such a pair the same reactant may be both oxidized
///    and reduced (disproportionation).
/// 2) ScaleElectrons: electrons per formula unit of each source, their least common multiple, and
///    from it the coefficients of both sources and both targets. Atom ratios must divide exactly.
/// 3) BalanceOxygen: water on the side lacking oxygen.
/// 4) BalanceHydrogen: protons on the side lacking hydrogen.
/// 5) BalanceCharge: electrons on the side with the higher charge.
/// 6) Format: coefficients divided by their common divisor.
use crate::Redox::equation::{Equation, Side, TermKind};
use crate::Redox::errors::{RedoxError, checked_add, checked_mul, checked_sub, exact_div};
use crate::Redox::formula::Species;
use crate::Redox::oxidation_states::AnalyzedSpecies;
use crate::Redox::trace::Trace;
use num_integer::Integer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfKind {
    Oxidation,
    Reduction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfReaction {
    pub kind: HalfKind,
    pub element: String,
    pub source: String,
    pub target: String,
    pub source_index: usize,
    pub target_index: usize,
    /// change of the oxidation number per atom, always positive
    pub change: i64,
    /// atoms of the element in the source formula
    pub source_count: i64,
    /// atoms of the element in the target formula
    pub target_count: i64,
}

impl HalfReaction {
    pub fn electrons_per_unit(&self) -> Result<i64, RedoxError> {
        checked_mul(
            self.change,
            self.source_count,
            &format!("counting electrons of {} in {}", self.element, self.source),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DetectPairs,
    ScaleElectrons,
    BalanceOxygen,
    BalanceHydrogen,
    BalanceCharge,
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedoxBalance {
    pub equation: Equation,
    pub oxidation: HalfReaction,
    pub reduction: HalfReaction,
    pub electron_lcm: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalfReactionOutcome {
    Balanced(RedoxBalance),
    /// no oxidation/reduction pair, the linear solver has to take over
    NoRedoxPair,
}

pub struct HalfReactionBalancer<'a> {
    reactants: &'a [AnalyzedSpecies],
    products: &'a [AnalyzedSpecies],
    equation: Equation,
    stage: Stage,
    pair: Option<(HalfReaction, HalfReaction)>,
    electron_lcm: i64,
}

impl<'a> HalfReactionBalancer<'a> {
    pub fn new(reactants: &'a [AnalyzedSpecies], products: &'a [AnalyzedSpecies]) -> Self {
        let equation = Equation::from_species(
            reactants.iter().map(|r| r.species.clone()).collect(),
            products.iter().map(|p| p.species.clone()).collect(),
        );
        Self {
            reactants,
            products,
            equation,
            stage: Stage::DetectPairs,
            pair: None,
            electron_lcm: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(mut self, trace: &mut Trace) -> Result<HalfReactionOutcome, RedoxError> {
        loop {
            self.stage = match self.stage {
                Stage::DetectPairs => match self.detect_pairs() {
                    Some((oxidation, reduction)) => {
                        trace.record(
                            "detect",
                            format!(
                                "oxidation {} {} -> {}, reduction {} {} -> {}",
                                oxidation.element,
                                oxidation.source,
                                oxidation.target,
                                reduction.element,
                                reduction.source,
                                reduction.target
                            ),
                        );
                        self.pair = Some((oxidation, reduction));
                        Stage::ScaleElectrons
                    }
                    None => {
                        trace.record("detect", "no oxidation/reduction pair");
                        return Ok(HalfReactionOutcome::NoRedoxPair);
                    }
                },
                Stage::ScaleElectrons => {
                    self.scale_electrons(trace)?;
                    Stage::BalanceOxygen
                }
                Stage::BalanceOxygen => {
                    self.balance_element("O", Species::water(), TermKind::Water, trace)?;
                    Stage::BalanceHydrogen
                }
                Stage::BalanceHydrogen => {
                    self.balance_element("H", Species::proton(), TermKind::Proton, trace)?;
                    Stage::BalanceCharge
                }
                Stage::BalanceCharge => {
                    self.balance_charge(trace)?;
                    Stage::Format
                }
                Stage::Format => return self.finish(trace),
            };
        }
    }

    fn candidates(&self) -> (Vec<HalfReaction>, Vec<HalfReaction>) {
        let mut oxidations = Vec::new();
        let mut reductions = Vec::new();
        for (source_index, reactant) in self.reactants.iter().enumerate() {
            for (element, from) in reactant.profile.iter() {
                for (target_index, product) in self.products.iter().enumerate() {
                    let Some(to) = product.profile.get(element) else {
                        continue;
                    };
                    if to == from {
                        continue;
                    }
                    let half = HalfReaction {
                        kind: if to > from {
                            HalfKind::Oxidation
                        } else {
                            HalfKind::Reduction
                        },
                        element: element.to_string(),
                        source: reactant.species.formula.clone(),
                        target: product.species.formula.clone(),
                        source_index,
                        target_index,
                        change: (to as i64 - from as i64).abs(),
                        source_count: reactant.species.atoms.get(element) as i64,
                        target_count: product.species.atoms.get(element) as i64,
                    };
                    match half.kind {
                        HalfKind::Oxidation => oxidations.push(half),
                        HalfKind::Reduction => reductions.push(half),
                    }
                }
            }
        }
        (oxidations, reductions)
    }

    fn detect_pairs(&self) -> Option<(HalfReaction, HalfReaction)> {
        let (oxidations, reductions) = self.candidates();
        for oxidation in &oxidations {
            if let Some(reduction) = reductions
                .iter()
                .find(|r| r.source_index != oxidation.source_index)
            {
                return Some((oxidation.clone(), reduction.clone()));
            }
        }
        // disproportionation: one element of one reactant goes both up and down
        for oxidation in &oxidations {
            if let Some(reduction) = reductions.iter().find(|r| {
                r.source_index == oxidation.source_index && r.element == oxidation.element
            }) {
                return Some((oxidation.clone(), reduction.clone()));
            }
        }
        None
    }

    fn scale_electrons(&mut self, trace: &mut Trace) -> Result<(), RedoxError> {
        let Some((oxidation, reduction)) = self.pair.clone() else {
            return Err(RedoxError::Unbalanceable(
                "electron scaling without a detected pair".to_string(),
            ));
        };
        let lost = oxidation.electrons_per_unit()?;
        let gained = reduction.electrons_per_unit()?;
        let lcm = checked_mul(lost / lost.gcd(&gained), gained, "taking the electron lcm")?;
        let oxidation_multiplier = exact_div(lcm, lost, "scaling the oxidation half")?;
        let reduction_multiplier = exact_div(lcm, gained, "scaling the reduction half")?;
        self.electron_lcm = lcm;
        trace.record(
            "scale",
            format!(
                "electrons lost {}, gained {}, lcm {}, multipliers {} and {}",
                lost, gained, lcm, oxidation_multiplier, reduction_multiplier
            ),
        );

        if oxidation.source_index == reduction.source_index {
            self.equation.assign(
                Side::Reactants,
                oxidation.source_index,
                checked_add(
                    oxidation_multiplier,
                    reduction_multiplier,
                    "scaling the shared source",
                )?,
            )?;
        } else {
            self.equation
                .assign(Side::Reactants, oxidation.source_index, oxidation_multiplier)?;
            self.equation
                .assign(Side::Reactants, reduction.source_index, reduction_multiplier)?;
        }

        for (half, multiplier) in [
            (&oxidation, oxidation_multiplier),
            (&reduction, reduction_multiplier),
        ] {
            let context =
                format!("keeping the {} atom ratio {} -> {}", half.element, half.source, half.target);
            let coefficient = exact_div(
                checked_mul(multiplier, half.source_count, &context)?,
                half.target_count,
                &context,
            )?;
            self.equation
                .assign(Side::Products, half.target_index, coefficient)?;
        }
        Ok(())
    }

    fn balance_element(
        &mut self,
        element: &str,
        carrier: Species,
        kind: TermKind,
        trace: &mut Trace,
    ) -> Result<(), RedoxError> {
        let left = self.equation.atom_total(Side::Reactants, element)?;
        let right = self.equation.atom_total(Side::Products, element)?;
        let context = format!("balancing {}", element);
        let (side, amount) = if left > right {
            (Side::Products, checked_sub(left, right, &context)?)
        } else {
            (Side::Reactants, checked_sub(right, left, &context)?)
        };
        if amount > 0 {
            trace.record(
                "balance",
                format!("{} {} added to the {:?} for {}", amount, carrier.formula, side, element),
            );
            self.equation.add_auxiliary(side, carrier, kind, amount)?;
        }
        Ok(())
    }

    fn balance_charge(&mut self, trace: &mut Trace) -> Result<(), RedoxError> {
        let left = self.equation.charge_total(Side::Reactants)?;
        let right = self.equation.charge_total(Side::Products)?;
        let (side, amount) = if left > right {
            (Side::Reactants, checked_sub(left, right, "balancing the charge")?)
        } else {
            (Side::Products, checked_sub(right, left, "balancing the charge")?)
        };
        if amount > 0 {
            trace.record("balance", format!("{} e^- added to the {:?}", amount, side));
            self.equation
                .add_auxiliary(side, Species::electron(), TermKind::Electron, amount)?;
        }
        Ok(())
    }

    fn finish(mut self, trace: &mut Trace) -> Result<HalfReactionOutcome, RedoxError> {
        self.equation.reduce_coefficients();
        let Some((oxidation, reduction)) = self.pair else {
            return Ok(HalfReactionOutcome::NoRedoxPair);
        };
        trace.record(
            "format",
            format!("balanced: {}", self.equation.is_balanced()),
        );
        Ok(HalfReactionOutcome::Balanced(RedoxBalance {
            equation: self.equation,
            oxidation,
            reduction,
            electron_lcm: self.electron_lcm,
        }))
    }
}
