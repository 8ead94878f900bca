//! Core types for AUTOCAL
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Provides fundamental type aliases and validated wrapper types
//! used throughout the AUTOCAL system.

use crate::error::{AutocalError, AutocalResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

// ============================================================================
// Shot
// ============================================================================

/// One single-repetition quadrature measurement outcome for one qubit
/// Gantree: Shot // IQ 샷
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// In-phase quadrature
    pub i: f64,
    /// Quadrature component
    pub q: f64,
}

impl Shot {
    /// Create a new shot
    pub fn new(i: f64, q: f64) -> Self {
        Self { i, q }
    }

    /// Rotate the IQ plane by `theta` radians
    /// Gantree: rotated(theta) -> Shot // IQ 회전
    pub fn rotated(&self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            i: self.i * cos - self.q * sin,
            q: self.i * sin + self.q * cos,
        }
    }

    /// Amplitude of the IQ vector
    pub fn amplitude(&self) -> f64 {
        (self.i * self.i + self.q * self.q).sqrt()
    }
}

impl fmt::Display for Shot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.i, self.q)
    }
}

// ============================================================================
// Level
// ============================================================================

/// Energy level of a multi-level qubit
/// Gantree: Level // g/e/f
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Ground state
    Ground,
    /// First excited state
    Excited,
    /// Second excited state
    SecondExcited,
}

impl Level {
    /// Parse from character
    pub fn from_char(c: char) -> AutocalResult<Self> {
        match c {
            'g' => Ok(Level::Ground),
            'e' => Ok(Level::Excited),
            'f' => Ok(Level::SecondExcited),
            _ => Err(AutocalError::InvalidStateLabel(c.to_string())),
        }
    }

    /// Convert to character
    pub fn to_char(&self) -> char {
        match self {
            Level::Ground => 'g',
            Level::Excited => 'e',
            Level::SecondExcited => 'f',
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ============================================================================
// CalibLabel
// ============================================================================

/// Reference state-preparation label (e.g. "gg", "ge")
/// Gantree: CalibLabel // 보정 라벨
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalibLabel {
    levels: Vec<Level>,
}

impl CalibLabel {
    /// Parse from string (one character per qubit)
    /// Gantree: parse(s) -> Self // 파싱
    pub fn parse(s: &str) -> AutocalResult<Self> {
        if s.is_empty() {
            return Err(AutocalError::InvalidStateLabel(s.to_string()));
        }
        let levels: Result<Vec<Level>, _> = s
            .chars()
            .map(|c| Level::from_char(c).map_err(|_| AutocalError::InvalidStateLabel(s.to_string())))
            .collect();
        Ok(Self { levels: levels? })
    }

    /// All-ground label of length `n`
    pub fn ground(n: usize) -> Self {
        Self {
            levels: vec![Level::Ground; n],
        }
    }

    /// Label of length `n` with `e` at position `pos`, `g` elsewhere
    ///
    /// Designates the single-excitation calibration run used for
    /// threshold estimation of the qubit at `pos`.
    pub fn excited_at(pos: usize, n: usize) -> AutocalResult<Self> {
        if pos >= n {
            return Err(AutocalError::QubitOutOfRange { qubit: pos, max: n });
        }
        let mut levels = vec![Level::Ground; n];
        levels[pos] = Level::Excited;
        Ok(Self { levels })
    }

    /// Number of qubits in the label
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at qubit position
    /// Gantree: level_at(pos) -> Option<Level> // 위치 조회
    pub fn level_at(&self, pos: usize) -> Option<Level> {
        self.levels.get(pos).copied()
    }

    /// Iterate over levels
    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

impl fmt::Display for CalibLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for l in &self.levels {
            write!(f, "{}", l.to_char())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for CalibLabel {
    type Error = AutocalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CalibLabel> for String {
    fn from(label: CalibLabel) -> Self {
        label.to_string()
    }
}

// ============================================================================
// Basis
// ============================================================================

/// Measurement basis for a single qubit
/// Gantree: Basis // I/X/Y/Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Identity (no pre-measurement rotation, same as Z)
    I,
    /// X (Hadamard) basis
    X,
    /// Y basis
    Y,
    /// Z (computational) basis
    Z,
}

impl Basis {
    /// Parse from character
    pub fn from_char(c: char) -> AutocalResult<Self> {
        match c.to_ascii_uppercase() {
            'I' => Ok(Basis::I),
            'X' => Ok(Basis::X),
            'Y' => Ok(Basis::Y),
            'Z' => Ok(Basis::Z),
            _ => Err(AutocalError::InvalidBasis(c.to_string())),
        }
    }

    /// Convert to character
    pub fn to_char(&self) -> char {
        match self {
            Basis::I => 'I',
            Basis::X => 'X',
            Basis::Y => 'Y',
            Basis::Z => 'Z',
        }
    }

    /// Whether a pre-measurement rotation is required
    pub fn needs_rotation(&self) -> bool {
        matches!(self, Basis::X | Basis::Y)
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Measurement basis label, one basis per qubit (e.g. "ZX")
/// Gantree: BasisLabel // 기저 문자열
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BasisLabel {
    bases: Vec<Basis>,
}

impl BasisLabel {
    /// Parse from string
    pub fn parse(s: &str) -> AutocalResult<Self> {
        if s.is_empty() {
            return Err(AutocalError::InvalidBasis(s.to_string()));
        }
        let bases: Result<Vec<Basis>, _> = s.chars().map(Basis::from_char).collect();
        Ok(Self { bases: bases? })
    }

    /// Uniform basis for n qubits
    pub fn uniform(basis: Basis, n: usize) -> Self {
        Self {
            bases: vec![basis; n],
        }
    }

    /// All Z basis (plain computational measurement)
    pub fn all_z(n: usize) -> Self {
        Self::uniform(Basis::Z, n)
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Basis at index
    pub fn get(&self, index: usize) -> Option<Basis> {
        self.bases.get(index).copied()
    }

    /// Iterate over bases
    pub fn iter(&self) -> impl Iterator<Item = &Basis> {
        self.bases.iter()
    }

    /// Whether every qubit is measured in the computational basis
    pub fn is_computational(&self) -> bool {
        self.bases.iter().all(|b| matches!(b, Basis::I | Basis::Z))
    }
}

impl fmt::Display for BasisLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.bases {
            write!(f, "{}", b.to_char())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for BasisLabel {
    type Error = AutocalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<BasisLabel> for String {
    fn from(label: BasisLabel) -> Self {
        label.to_string()
    }
}

// ============================================================================
// CountVector
// ============================================================================

/// Ordered outcome-bin counts, aligned to a fixed label order
/// Gantree: CountVector // 카운트 벡터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountVector {
    counts: Vec<f64>,
}

impl CountVector {
    /// Create from raw bin counts
    pub fn new(counts: Vec<f64>) -> Self {
        Self { counts }
    }

    /// Zero vector with `n` bins
    pub fn zeros(n: usize) -> Self {
        Self {
            counts: vec![0.0; n],
        }
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total shot count
    /// Gantree: total() -> f64 // 총합
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Bin value at index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.counts.get(index).copied()
    }

    /// Smallest entry
    pub fn min_entry(&self) -> f64 {
        self.counts.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Check all entries are >= 0
    pub fn is_nonnegative(&self) -> bool {
        self.counts.iter().all(|&c| c >= 0.0)
    }

    /// Normalized weights (count / total)
    ///
    /// Errors with `NonpositiveTotalCount` when the total is zero or less.
    pub fn normalized(&self) -> AutocalResult<Vec<f64>> {
        let total = self.total();
        if total <= 0.0 {
            return Err(AutocalError::NonpositiveTotalCount(total));
        }
        Ok(self.counts.iter().map(|&c| c / total).collect())
    }

    /// Increment a bin by one shot
    pub fn increment(&mut self, index: usize) {
        if let Some(c) = self.counts.get_mut(index) {
            *c += 1.0;
        }
    }

    /// Borrow the raw entries
    pub fn as_slice(&self) -> &[f64] {
        &self.counts
    }

    /// Consume into the raw entries
    pub fn into_vec(self) -> Vec<f64> {
        self.counts
    }
}

impl From<Vec<f64>> for CountVector {
    fn from(counts: Vec<f64>) -> Self {
        Self::new(counts)
    }
}

impl fmt::Display for CountVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.1}", c)?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// PopulationEstimate
// ============================================================================

/// Per-qubit occupation probabilities over up to three levels
/// Gantree: PopulationEstimate // 점유율
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationEstimate {
    /// Ground-state population
    pub g: f64,
    /// Excited-state population
    pub e: f64,
    /// Second-excited-state population
    pub f: f64,
}

impl PopulationEstimate {
    /// Two-level estimate (f fixed at zero)
    pub fn two_level(g: f64, e: f64) -> Self {
        Self { g, e, f: 0.0 }
    }

    /// Three-level estimate
    pub fn three_level(g: f64, e: f64, f: f64) -> Self {
        Self { g, e, f }
    }

    /// Sum of populations (should be 1 within tolerance)
    pub fn total(&self) -> f64 {
        self.g + self.e + self.f
    }

    /// Check normalization within `tol`
    pub fn is_normalized(&self, tol: f64) -> bool {
        (self.total() - 1.0).abs() <= tol
    }
}

impl fmt::Display for PopulationEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(g={:.4}, e={:.4}, f={:.4})",
            self.g, self.e, self.f
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
