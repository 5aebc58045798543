/// Linear stoichiometry for reactions the half-reaction method cannot handle.
///
/// Conservation of every element and of the charge gives a homogeneous linear system
/// A·x = 0 with one column per species (products with negative sign). The system is reduced
/// exactly over `BigRational` and its null space taken from the reduced row echelon form; a
/// balanceable reaction has exactly one null space direction whose entries share one sign.
/// Scaling that direction to the smallest integers gives the coefficients.
///
/// When oxygen or hydrogen is present, water and protons are offered on the product side as
/// placeholders; they are kept only with a positive coefficient.
use crate::Redox::equation::{Equation, Term, TermKind};
use crate::Redox::errors::RedoxError;
use crate::Redox::formula::{Species, create_elem_composition_matrix};
use crate::Redox::trace::Trace;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// `MnO4^-` -> `MnO4-`, `Mn^2+` -> `Mn+2`: the sign right after the formula, magnitude last
pub fn solver_notation(formula: &str) -> String {
    let Some((base, suffix)) = formula.split_once('^') else {
        return formula.to_string();
    };
    let (magnitude, sign) = match suffix.strip_suffix('-') {
        Some(magnitude) => (magnitude, '-'),
        None => (suffix.trim_end_matches('+'), '+'),
    };
    if magnitude.is_empty() || magnitude == "1" {
        format!("{}{}", base, sign)
    } else {
        format!("{}{}{}", base, sign, magnitude)
    }
}

/// Inverse of [`solver_notation`]
pub fn from_solver_notation(label: &str) -> String {
    let Some(pos) = label.find(['+', '-']) else {
        return label.to_string();
    };
    let (base, rest) = label.split_at(pos);
    let sign = &rest[..1];
    let magnitude = &rest[1..];
    format!("{}^{}{}", base, magnitude, sign)
}

#[derive(Debug, Clone)]
struct Column {
    label: String,
    species: Species,
    reactant: bool,
    kind: TermKind,
}

fn dedup(formulas: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for formula in formulas {
        if !unique.contains(formula) {
            unique.push(formula.clone());
        }
    }
    unique
}

fn columns(formulas: &[String], reactant: bool) -> Result<Vec<Column>, RedoxError> {
    formulas
        .iter()
        .map(|formula| {
            Ok(Column {
                label: solver_notation(formula),
                species: Species::parse(formula)?,
                reactant,
                kind: TermKind::Given,
            })
        })
        .collect()
}

/// Balances the reaction by exact linear algebra.
pub fn solve_linear(
    reactants: &[String],
    products: &[String],
    trace: &mut Trace,
) -> Result<Equation, RedoxError> {
    let reactants = dedup(reactants);
    let products = dedup(products);
    let mut given = columns(&reactants, true)?;
    given.extend(columns(&products, false)?);

    let listed = |formula: &str| reactants.iter().chain(products.iter()).any(|f| f == formula);
    let mut placeholders = Vec::new();
    if given.iter().any(|c| c.species.atoms.contains("O")) && !listed("H2O") {
        placeholders.push((Species::water(), TermKind::Water));
    }
    if given.iter().any(|c| c.species.atoms.contains("H")) && !listed("H^+") {
        placeholders.push((Species::proton(), TermKind::Proton));
    }

    if placeholders.is_empty() {
        return solve_columns(&given, trace);
    }
    let mut with_placeholders = given.clone();
    with_placeholders.extend(placeholders.into_iter().map(|(species, kind)| Column {
        label: solver_notation(&species.formula),
        species,
        reactant: false,
        kind,
    }));
    match solve_columns(&with_placeholders, trace) {
        Ok(equation) => Ok(equation),
        Err(e) => {
            trace.record("linear", format!("{}; retrying without water and protons", e));
            solve_columns(&given, trace)
        }
    }
}

fn solve_columns(columns: &[Column], trace: &mut Trace) -> Result<Equation, RedoxError> {
    let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    trace.record("linear", format!("species {:?}", labels));

    let species: Vec<Species> = columns.iter().map(|c| c.species.clone()).collect();
    let (composition, elements) = create_elem_composition_matrix(&species);
    trace.record("linear", format!("conserved: {:?} and the charge", elements));
    // products enter with a negative sign
    let sign = |column: &Column| if column.reactant { 1i64 } else { -1i64 };
    let mut matrix: Vec<Vec<BigRational>> = (0..composition.nrows())
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(col, c)| rational(sign(c) * composition[(row, col)]))
                .collect()
        })
        .collect();
    matrix.push(
        columns
            .iter()
            .map(|c| rational(sign(c) * c.species.charge as i64))
            .collect(),
    );

    let basis = null_space(matrix, columns.len());
    let vector = match basis.as_slice() {
        [] => {
            return Err(RedoxError::Unbalanceable(
                "no set of coefficients conserves every element and the charge".to_string(),
            ));
        }
        [vector] => vector.clone(),
        several => {
            return Err(RedoxError::Unbalanceable(format!(
                "coefficients are not unique, {} independent solutions",
                several.len()
            )));
        }
    };
    let coefficients = integer_coefficients(vector)?;
    trace.record("linear", format!("coefficients {:?}", coefficients));

    let mut reactant_terms = Vec::new();
    let mut product_terms = Vec::new();
    for (column, &coefficient) in columns.iter().zip(coefficients.iter()) {
        if coefficient == 0 {
            if column.kind == TermKind::Given {
                return Err(RedoxError::Unbalanceable(format!(
                    "{} cannot take part in a balanced reaction",
                    from_solver_notation(&column.label)
                )));
            }
            continue;
        }
        let species = Species::parse(&from_solver_notation(&column.label))?;
        let term = Term::with_coefficient(species, coefficient, column.kind);
        if column.reactant {
            reactant_terms.push(term);
        } else {
            product_terms.push(term);
        }
    }
    Ok(Equation::from_terms(reactant_terms, product_terms))
}

fn rational(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// Reduced row echelon form, returns the pivot column of every non-zero row
fn reduce_matrix(matrix: &mut [Vec<BigRational>], cols: usize) -> Vec<usize> {
    let rows = matrix.len();
    let mut pivots = Vec::new();
    let mut pivot_row = 0;
    for col in 0..cols {
        if pivot_row >= rows {
            break;
        }
        let Some(pivot_idx) = (pivot_row..rows).find(|&row| !matrix[row][col].is_zero()) else {
            continue;
        };
        if pivot_idx != pivot_row {
            matrix.swap(pivot_row, pivot_idx);
        }
        let pivot_val = matrix[pivot_row][col].clone();
        for entry in matrix[pivot_row].iter_mut() {
            *entry = &*entry / &pivot_val;
        }
        for row in 0..rows {
            if row != pivot_row {
                let factor = matrix[row][col].clone();
                if !factor.is_zero() {
                    for c in 0..cols {
                        let sub_val = &matrix[pivot_row][c] * &factor;
                        matrix[row][c] = &matrix[row][c] - &sub_val;
                    }
                }
            }
        }
        pivots.push(col);
        pivot_row += 1;
    }
    pivots
}

/// Basis of the null space, one vector per free column
fn null_space(mut matrix: Vec<Vec<BigRational>>, cols: usize) -> Vec<Vec<BigRational>> {
    let pivots = reduce_matrix(&mut matrix, cols);
    (0..cols)
        .filter(|col| !pivots.contains(col))
        .map(|free| {
            let mut vector = vec![BigRational::zero(); cols];
            vector[free] = BigRational::one();
            for (row, &pivot) in pivots.iter().enumerate() {
                vector[pivot] = -matrix[row][free].clone();
            }
            vector
        })
        .collect()
}

/// Smallest integer multiple of a sign-consistent rational vector
fn integer_coefficients(vector: Vec<BigRational>) -> Result<Vec<i64>, RedoxError> {
    let positive = vector.iter().any(|x| x.is_positive());
    let negative = vector.iter().any(|x| x.is_negative());
    if positive && negative {
        return Err(RedoxError::Unbalanceable(
            "conservation requires coefficients of opposite sign".to_string(),
        ));
    }
    let vector: Vec<BigRational> = if negative {
        vector.into_iter().map(|x| -x).collect()
    } else {
        vector
    };
    let denominator = vector
        .iter()
        .fold(BigInt::one(), |acc, x| acc.lcm(x.denom()));
    let numerators: Vec<BigInt> = vector
        .iter()
        .map(|x| (x * BigRational::from_integer(denominator.clone())).to_integer())
        .collect();
    let divisor = numerators
        .iter()
        .fold(BigInt::zero(), |acc, n| acc.gcd(n));
    numerators
        .iter()
        .map(|n| {
            let n = if divisor.is_zero() { n.clone() } else { n / &divisor };
            n.to_i64().ok_or_else(|| {
                RedoxError::Unbalanceable(format!("coefficient {} is too large", n))
            })
        })
        .collect()
}
