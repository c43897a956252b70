//! Tabular conditional probability distributions.
//!
//! A [`TabularCpd`] stores `P(variable | parents)` as one row per joint parent
//! assignment. Rows are laid out in mixed-radix order over the declared
//! parents (last parent varies fastest) and each row is a distribution over
//! the variable's state indices. Decision rules are CPDs whose rows are point
//! masses.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    identifiers::NodeId,
    utils::{self, PROBABILITY_TOLERANCE},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularCpd {
    variable: NodeId,
    cardinality: usize,
    parents: Vec<NodeId>,
    parent_cardinalities: Vec<usize>,
    values: Vec<f64>,
}

impl TabularCpd {
    /// Create a CPD from explicit rows, one per parent assignment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CpdShapeMismatch`] if the number of rows does not match
    /// the parent cardinalities or a row does not have `cardinality` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use macid::{TabularCpd, identifiers::NodeId};
    ///
    /// // D copies its parent S.
    /// let cpd = TabularCpd::new(
    ///     "D",
    ///     2,
    ///     vec![(NodeId::new("S"), 2)],
    ///     vec![vec![1.0, 0.0], vec![0.0, 1.0]],
    /// )?;
    /// assert!(cpd.is_deterministic());
    /// # Ok::<(), macid::Error>(())
    /// ```
    pub fn new(
        variable: impl Into<NodeId>,
        cardinality: usize,
        parents: Vec<(NodeId, usize)>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let variable = variable.into();
        let (parents, parent_cardinalities): (Vec<NodeId>, Vec<usize>) =
            parents.into_iter().unzip();
        let expected_rows = utils::assignment_count(&parent_cardinalities).ok_or_else(|| {
            Error::CpdShapeMismatch {
                node: variable.to_string(),
                reason: "parent assignment count overflows".to_string(),
            }
        })?;
        if cardinality == 0 {
            return Err(Error::CpdShapeMismatch {
                node: variable.into_inner(),
                reason: "cardinality must be positive".to_string(),
            });
        }
        if rows.len() != expected_rows {
            return Err(Error::CpdShapeMismatch {
                node: variable.into_inner(),
                reason: format!("expected {expected_rows} rows, got {}", rows.len()),
            });
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != cardinality)
        {
            return Err(Error::CpdShapeMismatch {
                node: variable.into_inner(),
                reason: format!(
                    "row {index} has {} entries, expected {cardinality}",
                    row.len()
                ),
            });
        }

        Ok(Self {
            variable,
            cardinality,
            parents,
            parent_cardinalities,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Unconditional distribution for a root node.
    pub fn root(variable: impl Into<NodeId>, probabilities: Vec<f64>) -> Result<Self> {
        let cardinality = probabilities.len();
        Self::new(variable, cardinality, Vec::new(), vec![probabilities])
    }

    /// Unconditional point mass on `state`.
    pub fn point_mass(variable: impl Into<NodeId>, cardinality: usize, state: usize) -> Result<Self> {
        let variable = variable.into();
        if state >= cardinality {
            return Err(Error::CpdShapeMismatch {
                node: variable.into_inner(),
                reason: format!("state {state} out of range for cardinality {cardinality}"),
            });
        }
        let mut row = vec![0.0; cardinality];
        row[state] = 1.0;
        Self::new(variable, cardinality, Vec::new(), vec![row])
    }

    /// Every row uniform over the variable's states.
    pub fn uniform(
        variable: impl Into<NodeId>,
        cardinality: usize,
        parents: Vec<(NodeId, usize)>,
    ) -> Result<Self> {
        let parent_cards: Vec<usize> = parents.iter().map(|(_, card)| *card).collect();
        let rows = utils::assignment_count(&parent_cards).unwrap_or(0);
        Self::new(
            variable,
            cardinality,
            parents,
            vec![utils::uniform(cardinality); rows],
        )
    }

    /// Deterministic CPD choosing state `choices[r]` for parent assignment `r`.
    pub fn deterministic(
        variable: impl Into<NodeId>,
        cardinality: usize,
        parents: Vec<(NodeId, usize)>,
        choices: &[usize],
    ) -> Result<Self> {
        let variable = variable.into();
        if let Some(&bad) = choices.iter().find(|&&choice| choice >= cardinality) {
            return Err(Error::CpdShapeMismatch {
                node: variable.into_inner(),
                reason: format!("choice {bad} out of range for cardinality {cardinality}"),
            });
        }
        let rows = choices
            .iter()
            .map(|&choice| {
                let mut row = vec![0.0; cardinality];
                row[choice] = 1.0;
                row
            })
            .collect();
        Self::new(variable, cardinality, parents, rows)
    }

    /// Deterministic table from already validated parts.
    pub(crate) fn from_choices(
        variable: NodeId,
        cardinality: usize,
        parents: &[(NodeId, usize)],
        choices: &[usize],
    ) -> Self {
        let mut values = vec![0.0; choices.len() * cardinality];
        for (row, &choice) in choices.iter().enumerate() {
            values[row * cardinality + choice] = 1.0;
        }
        Self {
            variable,
            cardinality,
            parents: parents.iter().map(|(p, _)| p.clone()).collect(),
            parent_cardinalities: parents.iter().map(|(_, c)| *c).collect(),
            values,
        }
    }

    pub fn variable(&self) -> &NodeId {
        &self.variable
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Parents in the order the table was declared with.
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn parent_cardinalities(&self) -> &[usize] {
        &self.parent_cardinalities
    }

    /// Cardinality declared for `parent`, if it is a parent of this table.
    pub fn parent_cardinality(&self, parent: &str) -> Option<usize> {
        self.parents
            .iter()
            .position(|p| p == parent)
            .map(|idx| self.parent_cardinalities[idx])
    }

    pub fn row_count(&self) -> usize {
        self.values.len() / self.cardinality
    }

    /// Distribution over states for parent assignment `index`.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.cardinality;
        &self.values[start..start + self.cardinality]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.cardinality)
    }

    /// Flat table, rows concatenated.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `P(variable = state | parents = parent_states)`, states given as indices
    /// in declared parent order.
    pub fn probability(&self, parent_states: &[usize], state: usize) -> f64 {
        let row = utils::encode_index(parent_states, &self.parent_cardinalities);
        self.row(row)[state]
    }

    /// Whether every row puts all mass on one state.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic_choices().is_some()
    }

    /// The chosen state per row, if the CPD is deterministic.
    pub fn deterministic_choices(&self) -> Option<Vec<usize>> {
        self.rows()
            .map(|row| {
                let chosen = row
                    .iter()
                    .position(|&p| utils::approx_eq(p, 1.0, PROBABILITY_TOLERANCE))?;
                let rest_zero = row
                    .iter()
                    .enumerate()
                    .all(|(idx, &p)| idx == chosen || utils::approx_eq(p, 0.0, PROBABILITY_TOLERANCE));
                rest_zero.then_some(chosen)
            })
            .collect()
    }

    /// Check entries are finite, non-negative, and that rows sum to one.
    pub fn validate_rows(&self, tolerance: f64) -> Result<()> {
        for (index, row) in self.rows().enumerate() {
            if let Some(&bad) = row.iter().find(|p| !p.is_finite() || **p < 0.0) {
                return Err(Error::InvalidProbability {
                    node: self.variable.to_string(),
                    row: index,
                    value: bad,
                });
            }
            let sum: f64 = row.iter().sum();
            if !utils::approx_eq(sum, 1.0, tolerance) {
                return Err(Error::UnnormalizedCpd {
                    node: self.variable.to_string(),
                    row: index,
                    sum,
                });
            }
        }
        Ok(())
    }
}
