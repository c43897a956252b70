//! Dense discrete factors.
//!
//! A factor is a non-negative table over a list of variables, stored row-major
//! with the last variable varying fastest (the same mixed-radix layout as
//! [`TabularCpd`]). All operations return new factors.

use crate::{cpd::TabularCpd, identifiers::NodeId, utils};

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    variables: Vec<NodeId>,
    cardinalities: Vec<usize>,
    values: Vec<f64>,
}

impl Factor {
    /// Factor from explicit parts.
    ///
    /// Returns `None` if the table length does not match the cardinalities or
    /// a variable is listed twice.
    pub fn new(variables: Vec<NodeId>, cardinalities: Vec<usize>, values: Vec<f64>) -> Option<Self> {
        if variables.len() != cardinalities.len() {
            return None;
        }
        if (1..variables.len()).any(|i| variables[..i].contains(&variables[i])) {
            return None;
        }
        if utils::assignment_count(&cardinalities)? != values.len() {
            return None;
        }
        Some(Self {
            variables,
            cardinalities,
            values,
        })
    }

    /// The scalar factor 1, neutral for [`Factor::product`].
    pub fn unit() -> Self {
        Self {
            variables: Vec::new(),
            cardinalities: Vec::new(),
            values: vec![1.0],
        }
    }

    /// Factor over `parents ++ [variable]` holding the CPD entries.
    pub fn from_cpd(cpd: &TabularCpd) -> Self {
        let mut variables = cpd.parents().to_vec();
        variables.push(cpd.variable().clone());
        let mut cardinalities = cpd.parent_cardinalities().to_vec();
        cardinalities.push(cpd.cardinality());
        Self {
            variables,
            cardinalities,
            values: cpd.values().to_vec(),
        }
    }

    pub fn variables(&self) -> &[NodeId] {
        &self.variables
    }

    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.position(variable).is_some()
    }

    fn position(&self, variable: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == variable)
    }

    /// Entry for the given state indices, one per variable in factor order.
    pub fn value(&self, states: &[usize]) -> f64 {
        self.values[utils::encode_index(states, &self.cardinalities)]
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Pointwise product over the union of both scopes.
    ///
    /// The result lists `self`'s variables first, then the variables only
    /// `other` mentions.
    pub fn product(&self, other: &Factor) -> Factor {
        let mut variables = self.variables.clone();
        let mut cardinalities = self.cardinalities.clone();
        for (var, &card) in other.variables.iter().zip(&other.cardinalities) {
            if !variables.contains(var) {
                variables.push(var.clone());
                cardinalities.push(card);
            }
        }

        let lhs = projection(&variables, &self.variables, &self.cardinalities);
        let rhs = projection(&variables, &other.variables, &other.cardinalities);

        let size = utils::assignment_count(&cardinalities).unwrap_or(0);
        let mut values = Vec::with_capacity(size);
        let mut digits = vec![0; variables.len()];
        for _ in 0..size {
            let a = offset(&digits, &lhs);
            let b = offset(&digits, &rhs);
            values.push(self.values[a] * other.values[b]);
            utils::increment_digits(&mut digits, &cardinalities);
        }

        Factor {
            variables,
            cardinalities,
            values,
        }
    }

    /// Sum `variable` out. Unknown variables leave the factor unchanged.
    pub fn marginalize(&self, variable: &str) -> Factor {
        let Some(pos) = self.position(variable) else {
            return self.clone();
        };
        let mut variables = self.variables.clone();
        let mut cardinalities = self.cardinalities.clone();
        variables.remove(pos);
        cardinalities.remove(pos);

        let strides = utils::strides(&self.cardinalities);
        let mut values = vec![0.0; self.values.len() / self.cardinalities[pos]];
        for (index, &value) in self.values.iter().enumerate() {
            // drop the digit at `pos` from the mixed-radix index
            let high = index / (strides[pos] * self.cardinalities[pos]);
            let low = index % strides[pos];
            values[high * strides[pos] + low] += value;
        }

        Factor {
            variables,
            cardinalities,
            values,
        }
    }

    /// Condition on `variable = state`, removing the variable from the scope.
    pub fn reduce(&self, variable: &str, state: usize) -> Factor {
        let Some(pos) = self.position(variable) else {
            return self.clone();
        };
        let mut variables = self.variables.clone();
        let mut cardinalities = self.cardinalities.clone();
        variables.remove(pos);
        cardinalities.remove(pos);

        let strides = utils::strides(&self.cardinalities);
        let values = self
            .values
            .iter()
            .enumerate()
            .filter(|(index, _)| (index / strides[pos]) % self.cardinalities[pos] == state)
            .map(|(_, &value)| value)
            .collect();

        Factor {
            variables,
            cardinalities,
            values,
        }
    }

    /// Scale entries to sum to one; `None` if the total is not positive.
    pub fn normalize(&self) -> Option<Factor> {
        let values = utils::normalize_weights(self.values.iter().copied())?;
        Some(Factor {
            variables: self.variables.clone(),
            cardinalities: self.cardinalities.clone(),
            values,
        })
    }

    /// Reorder the scope. `order` must be a permutation of the variables.
    pub fn permute(&self, order: &[NodeId]) -> Option<Factor> {
        if order.len() != self.variables.len() {
            return None;
        }
        let positions: Vec<usize> = order
            .iter()
            .map(|var| self.position(var.as_str()))
            .collect::<Option<_>>()?;
        let cardinalities: Vec<usize> = positions.iter().map(|&p| self.cardinalities[p]).collect();

        let mut values = Vec::with_capacity(self.values.len());
        let mut digits = vec![0; order.len()];
        let mut source = vec![0; order.len()];
        for _ in 0..self.values.len() {
            for (slot, &p) in positions.iter().enumerate() {
                source[p] = digits[slot];
            }
            values.push(self.value(&source));
            utils::increment_digits(&mut digits, &cardinalities);
        }

        Some(Factor {
            variables: order.to_vec(),
            cardinalities,
            values,
        })
    }
}

/// For each variable of `scope`, the stride it has in a factor over `subset`
/// (zero if the subset does not mention it).
fn projection(scope: &[NodeId], subset: &[NodeId], cardinalities: &[usize]) -> Vec<usize> {
    let strides = utils::strides(cardinalities);
    scope
        .iter()
        .map(|var| {
            subset
                .iter()
                .position(|v| v == var)
                .map_or(0, |pos| strides[pos])
        })
        .collect()
}

fn offset(digits: &[usize], strides: &[usize]) -> usize {
    digits.iter().zip(strides).map(|(d, s)| d * s).sum()
}
