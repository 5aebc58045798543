/// Module to calculate the atomic composition, net charge and molar mass of a species
/// written in normalized notation (`H2O2`, `MnO4^-`, `Fe^3+`).
///
/// Parenthesized groups, hydrates and adducts are not expanded: the atom scanner
/// simply skips the brackets, so `Fe(OH)3` would be undercounted. The species
/// parser rejects such input before it gets here.
use crate::Redox::errors::RedoxError;
use nalgebra::DMatrix;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

// Define a struct to hold element data
pub struct Element {
    pub symbol: &'static str,
    pub atomic_mass: f64,
}

// Elements H..U with their standard atomic masses
const ELEMENTS: &[Element] = &[
    Element { symbol: "H", atomic_mass: 1.008 },
    Element { symbol: "He", atomic_mass: 4.0026 },
    Element { symbol: "Li", atomic_mass: 6.94 },
    Element { symbol: "Be", atomic_mass: 9.0122 },
    Element { symbol: "B", atomic_mass: 10.81 },
    Element { symbol: "C", atomic_mass: 12.011 },
    Element { symbol: "N", atomic_mass: 14.007 },
    Element { symbol: "O", atomic_mass: 15.999 },
    Element { symbol: "F", atomic_mass: 18.998 },
    Element { symbol: "Ne", atomic_mass: 20.18 },
    Element { symbol: "Na", atomic_mass: 22.99 },
    Element { symbol: "Mg", atomic_mass: 24.305 },
    Element { symbol: "Al", atomic_mass: 26.98 },
    Element { symbol: "Si", atomic_mass: 28.085 },
    Element { symbol: "P", atomic_mass: 30.974 },
    Element { symbol: "S", atomic_mass: 32.065 },
    Element { symbol: "Cl", atomic_mass: 35.45 },
    Element { symbol: "Ar", atomic_mass: 39.948 },
    Element { symbol: "K", atomic_mass: 39.098 },
    Element { symbol: "Ca", atomic_mass: 40.078 },
    Element { symbol: "Sc", atomic_mass: 44.9559 },
    Element { symbol: "Ti", atomic_mass: 47.867 },
    Element { symbol: "V", atomic_mass: 50.9415 },
    Element { symbol: "Cr", atomic_mass: 51.9961 },
    Element { symbol: "Mn", atomic_mass: 54.938 },
    Element { symbol: "Fe", atomic_mass: 55.845 },
    Element { symbol: "Co", atomic_mass: 58.933 },
    Element { symbol: "Ni", atomic_mass: 58.693 },
    Element { symbol: "Cu", atomic_mass: 63.546 },
    Element { symbol: "Zn", atomic_mass: 65.38 },
    Element { symbol: "Ga", atomic_mass: 69.723 },
    Element { symbol: "Ge", atomic_mass: 72.63 },
    Element { symbol: "As", atomic_mass: 74.9216 },
    Element { symbol: "Se", atomic_mass: 78.971 },
    Element { symbol: "Br", atomic_mass: 79.904 },
    Element { symbol: "Kr", atomic_mass: 83.798 },
    Element { symbol: "Rb", atomic_mass: 85.4678 },
    Element { symbol: "Sr", atomic_mass: 87.62 },
    Element { symbol: "Y", atomic_mass: 88.9059 },
    Element { symbol: "Zr", atomic_mass: 91.224 },
    Element { symbol: "Nb", atomic_mass: 92.9064 },
    Element { symbol: "Mo", atomic_mass: 95.95 },
    Element { symbol: "Tc", atomic_mass: 98.0 },
    Element { symbol: "Ru", atomic_mass: 101.07 },
    Element { symbol: "Rh", atomic_mass: 102.9055 },
    Element { symbol: "Pd", atomic_mass: 106.42 },
    Element { symbol: "Ag", atomic_mass: 107.8682 },
    Element { symbol: "Cd", atomic_mass: 112.414 },
    Element { symbol: "In", atomic_mass: 114.818 },
    Element { symbol: "Sn", atomic_mass: 118.71 },
    Element { symbol: "Sb", atomic_mass: 121.76 },
    Element { symbol: "Te", atomic_mass: 127.6 },
    Element { symbol: "I", atomic_mass: 126.904 },
    Element { symbol: "Xe", atomic_mass: 131.293 },
    Element { symbol: "Cs", atomic_mass: 132.9055 },
    Element { symbol: "Ba", atomic_mass: 137.327 },
    Element { symbol: "La", atomic_mass: 138.9055 },
    Element { symbol: "Ce", atomic_mass: 140.116 },
    Element { symbol: "Pr", atomic_mass: 140.9077 },
    Element { symbol: "Nd", atomic_mass: 144.242 },
    Element { symbol: "Pm", atomic_mass: 145.0 },
    Element { symbol: "Sm", atomic_mass: 150.36 },
    Element { symbol: "Eu", atomic_mass: 151.964 },
    Element { symbol: "Gd", atomic_mass: 157.25 },
    Element { symbol: "Tb", atomic_mass: 158.9254 },
    Element { symbol: "Dy", atomic_mass: 162.5 },
    Element { symbol: "Ho", atomic_mass: 164.9303 },
    Element { symbol: "Er", atomic_mass: 167.259 },
    Element { symbol: "Tm", atomic_mass: 168.9342 },
    Element { symbol: "Yb", atomic_mass: 173.045 },
    Element { symbol: "Lu", atomic_mass: 174.9668 },
    Element { symbol: "Hf", atomic_mass: 178.49 },
    Element { symbol: "Ta", atomic_mass: 180.9479 },
    Element { symbol: "W", atomic_mass: 183.84 },
    Element { symbol: "Re", atomic_mass: 186.207 },
    Element { symbol: "Os", atomic_mass: 190.23 },
    Element { symbol: "Ir", atomic_mass: 192.217 },
    Element { symbol: "Pt", atomic_mass: 195.084 },
    Element { symbol: "Au", atomic_mass: 196.9666 },
    Element { symbol: "Hg", atomic_mass: 200.592 },
    Element { symbol: "Tl", atomic_mass: 204.38 },
    Element { symbol: "Pb", atomic_mass: 207.2 },
    Element { symbol: "Bi", atomic_mass: 208.9804 },
    Element { symbol: "Po", atomic_mass: 209.0 },
    Element { symbol: "At", atomic_mass: 210.0 },
    Element { symbol: "Rn", atomic_mass: 222.0 },
    Element { symbol: "Fr", atomic_mass: 223.0 },
    Element { symbol: "Ra", atomic_mass: 226.0 },
    Element { symbol: "Ac", atomic_mass: 227.0 },
    Element { symbol: "Th", atomic_mass: 232.0377 },
    Element { symbol: "Pa", atomic_mass: 231.0359 },
    Element { symbol: "U", atomic_mass: 238.0289 },
];

/// normalized species: formula, then an optional `^<digits><sign>` charge suffix
const SPECIES_PATTERN: &str = r"^[A-Z][a-z]?\d*(?:[A-Z][a-z]?\d*)*(?:\^\d*[+-])?$";
/// element symbol followed by an optional multiplicity
const ATOM_PATTERN: &str = r"([A-Z][a-z]?)(\d*)";

fn species_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SPECIES_PATTERN).expect("species pattern is a valid regex"))
}

fn atom_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ATOM_PATTERN).expect("atom pattern is a valid regex"))
}

pub fn find_element(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|element| element.symbol == symbol)
}

/// true if the string is a species in normalized notation
pub fn is_well_formed(species: &str) -> bool {
    species_regex().is_match(species)
}

/// Formula part of a species, i.e. everything in front of the charge suffix.
pub fn formula_part(species: &str) -> &str {
    match species.split_once('^') {
        Some((base, _)) => base,
        None => species.trim_end_matches(['+', '-']),
    }
}

/// Element symbol -> number of atoms, in order of first appearance in the formula.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    atoms: Vec<(String, u32)>,
}

impl Composition {
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        let mut composition = Composition::default();
        for (element, count) in pairs {
            composition.add(element, *count);
        }
        composition
    }

    /// number of atoms of the element, 0 if absent
    pub fn get(&self, element: &str) -> u32 {
        self.atoms
            .iter()
            .find(|(el, _)| el == element)
            .map_or(0, |(_, count)| *count)
    }

    pub fn contains(&self, element: &str) -> bool {
        self.atoms.iter().any(|(el, _)| el == element)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.atoms.iter().map(|(el, count)| (el.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    fn add(&mut self, element: &str, count: u32) {
        match self.atoms.iter_mut().find(|(el, _)| el == element) {
            Some((_, existing)) => *existing += count,
            None => self.atoms.push((element.to_string(), count)),
        }
    }
}

// Function to scan a species and return its elements with their counts. Only the formula
// part is scanned, repeated symbols are summed (CH3COOH -> C2H4O2)
pub fn count_atoms(species: &str) -> Result<Composition, RedoxError> {
    let mut atoms = Composition::default();
    for capture in atom_regex().captures_iter(formula_part(species)) {
        let element = &capture[1];
        let count = match &capture[2] {
            "" => 1,
            digits => digits
                .parse::<u32>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or_else(|| RedoxError::InvalidSpecies(species.to_string()))?,
        };
        atoms.add(element, count);
    }
    Ok(atoms)
}

/// Net ionic charge: no suffix means 0, a bare trailing sign means ±1,
/// `^<digits><sign>` means ±digits (`^+` is +1, `^2` without a sign is +2).
pub fn get_charge(species: &str) -> Result<i32, RedoxError> {
    let Some((_, suffix)) = species.split_once('^') else {
        return Ok(if species.ends_with('+') {
            1
        } else if species.ends_with('-') {
            -1
        } else {
            0
        });
    };
    let (magnitude, sign) = if let Some(magnitude) = suffix.strip_suffix('+') {
        (magnitude, 1)
    } else if let Some(magnitude) = suffix.strip_suffix('-') {
        (magnitude, -1)
    } else {
        (suffix, 1)
    };
    let magnitude: i32 = if magnitude.is_empty() {
        1
    } else {
        magnitude
            .parse()
            .map_err(|_| RedoxError::InvalidSpecies(species.to_string()))?
    };
    Ok(sign * magnitude)
}

/// One occurrence of a species in an equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    pub formula: String,
    pub atoms: Composition,
    pub charge: i32,
}

impl Species {
    /// Parses a species already in normalized notation.
    pub fn parse(formula: &str) -> Result<Self, RedoxError> {
        if !is_well_formed(formula) {
            return Err(RedoxError::InvalidSpecies(formula.to_string()));
        }
        let atoms = count_atoms(formula)?;
        if let Some((element, _)) = atoms.iter().find(|(el, _)| find_element(el).is_none()) {
            return Err(RedoxError::UnknownElement {
                species: formula.to_string(),
                element: element.to_string(),
            });
        }
        let charge = get_charge(formula)?;
        Ok(Self {
            formula: formula.to_string(),
            atoms,
            charge,
        })
    }

    pub fn water() -> Self {
        Self {
            formula: "H2O".to_string(),
            atoms: Composition::from_pairs(&[("H", 2), ("O", 1)]),
            charge: 0,
        }
    }

    pub fn proton() -> Self {
        Self {
            formula: "H^+".to_string(),
            atoms: Composition::from_pairs(&[("H", 1)]),
            charge: 1,
        }
    }

    /// bookkeeping species of the charge balance, never printed
    pub fn electron() -> Self {
        Self {
            formula: "e^-".to_string(),
            atoms: Composition::default(),
            charge: -1,
        }
    }

    /// written with an explicit charge suffix
    pub fn has_ionic_notation(&self) -> bool {
        self.formula.contains('^')
    }

    pub fn molar_mass(&self) -> Option<f64> {
        self.atoms.iter().try_fold(0.0, |mass, (element, count)| {
            find_element(element).map(|e| mass + e.atomic_mass * count as f64)
        })
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formula)
    }
}

/// Element-by-species matrix: rows follow the first appearance of each element,
/// columns follow the order of the given species.
pub fn create_elem_composition_matrix(species: &[Species]) -> (DMatrix<i64>, Vec<String>) {
    let mut elements: Vec<String> = Vec::new();
    for s in species {
        for (element, _) in s.atoms.iter() {
            if !elements.iter().any(|e| e == element) {
                elements.push(element.to_string());
            }
        }
    }
    let mut matrix = DMatrix::<i64>::zeros(elements.len(), species.len());
    for (col, s) in species.iter().enumerate() {
        for (row, element) in elements.iter().enumerate() {
            matrix[(row, col)] = s.atoms.get(element) as i64;
        }
    }
    (matrix, elements)
}
