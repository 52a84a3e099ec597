//! A tape that records one jacobian entry per statement argument.
//!
//! Recording walks the expression tree of each statement once and stores
//! `(jacobian, identifier)` pairs; the sweeps replay those pairs through an
//! [`AdjointVectorAccess`] and never look at the expressions again.

use std::fmt;

use num_traits::{One, Zero};

use crate::access::{AdjointVectorAccess, VectorAccess};
use crate::active::ActiveReal;
use crate::config::{IdentifierPolicy, TapeConfig};
use crate::errors::{ADError, Result};
use crate::gradient::Gradient;
use crate::identifier::Identifier;
use crate::node::Node;
use crate::parameters::{preallocate, sizing_report, TapeParameter, TapeSizing};
use crate::traversal::{for_each_jacobian, ActiveArguments, StaticTraversal};

#[derive(Clone, Copy, Debug)]
struct Statement {
    lhs: Identifier,
    arguments: usize,
}

/// A point in the recording, see [`JacobianTape::position`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    statements: usize,
    jacobians: usize,
}

/// Records statements as jacobian entries and evaluates them in reverse or
/// forward mode.
///
/// `G` is the gradient stored per identifier: a float for scalar mode or a
/// [`crate::gradient::Direction`] for vector mode.
pub struct JacobianTape<G: Gradient = f64> {
    config: TapeConfig,
    statements: Vec<Statement>,
    jacobians: Vec<(G::Real, Identifier)>,
    adjoints: Vec<G>,
    primals: Vec<G::Real>,
    largest: u32,
    active: bool,
}

impl<G: Gradient> Default for JacobianTape<G> {
    fn default() -> Self {
        Self::from_config(TapeConfig::default())
    }
}

impl<G: Gradient> JacobianTape<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tape and applies the capacities requested by `config`.
    pub fn with_config(config: TapeConfig) -> Result<Self> {
        let capacities = config.capacities.clone();
        let mut tape = Self::from_config(config);
        preallocate(&mut tape, capacities)?;
        log::debug!("tape configured: {:?}", tape.config);
        Ok(tape)
    }

    fn from_config(config: TapeConfig) -> Self {
        Self {
            config,
            statements: Vec::new(),
            jacobians: Vec::new(),
            adjoints: Vec::new(),
            primals: Vec::new(),
            largest: 0,
            active: false,
        }
    }

    pub fn config(&self) -> &TapeConfig {
        &self.config
    }

    /// Starts recording.
    pub fn set_active(&mut self) {
        self.active = true;
    }

    /// Stops recording. Values computed while passive carry no identifier.
    pub fn set_passive(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn largest_identifier(&self) -> Identifier {
        Identifier::new(self.largest)
    }

    #[inline]
    fn issue(&mut self) -> Identifier {
        self.largest += 1;
        Identifier::new(self.largest)
    }

    /// Creates an independent variable. Passive if the tape is not recording.
    pub fn register_input(&mut self, value: G::Real) -> ActiveReal<G::Real> {
        if !self.active {
            return ActiveReal::passive(value);
        }
        let identifier = self.issue();
        self.store_primal(identifier, value);
        log::trace!("input {identifier}");
        ActiveReal::with_identifier(value, identifier)
    }

    /// Gives `value` an identifier of its own through a copy statement, so
    /// that no other variable shares it.
    pub fn register_output(&mut self, value: &mut ActiveReal<G::Real>) {
        if !self.active || !value.is_active() {
            return;
        }
        let identifier = self.issue();
        self.jacobians.push((G::Real::one(), value.identifier()));
        self.push_statement(identifier, 1, value.value());
        *value = ActiveReal::with_identifier(value.value(), identifier);
    }

    /// Records `lhs = rhs`.
    ///
    /// Leaves with the passive identifier are skipped. If no active argument
    /// remains, `lhs` becomes passive and nothing is recorded. Under
    /// [`IdentifierPolicy::Reuse`] an active `lhs` keeps its identifier;
    /// copies of an active value then share that identifier, use
    /// [`JacobianTape::record`] to give a copy its own.
    pub fn store<E>(&mut self, lhs: &mut ActiveReal<G::Real>, rhs: &E)
    where
        E: Node<Real = G::Real> + StaticTraversal<ActiveArguments>,
    {
        let value = rhs.value();
        if !self.active {
            *lhs = ActiveReal::passive(value);
            return;
        }

        self.jacobians
            .reserve(<E as StaticTraversal<ActiveArguments>>::VALUE);
        let start = self.jacobians.len();
        let skip_zero = self.config.skip_zero_jacobians;
        let jacobians = &mut self.jacobians;
        for_each_jacobian(rhs, G::Real::one(), |identifier, jacobian| {
            if identifier.is_active() && !(skip_zero && jacobian.is_zero()) {
                jacobians.push((jacobian, identifier));
            }
        });
        let arguments = self.jacobians.len() - start;
        if arguments == 0 {
            *lhs = ActiveReal::passive(value);
            return;
        }

        let identifier = match self.config.identifiers {
            IdentifierPolicy::Reuse if lhs.is_active() => lhs.identifier(),
            _ => self.issue(),
        };
        self.push_statement(identifier, arguments, value);
        *lhs = ActiveReal::with_identifier(value, identifier);
    }

    /// Records `rhs` into a new variable.
    pub fn record<E>(&mut self, rhs: &E) -> ActiveReal<G::Real>
    where
        E: Node<Real = G::Real> + StaticTraversal<ActiveArguments>,
    {
        let mut out = ActiveReal::passive(G::Real::zero());
        self.store(&mut out, rhs);
        out
    }

    fn push_statement(&mut self, lhs: Identifier, arguments: usize, value: G::Real) {
        self.statements.push(Statement { lhs, arguments });
        self.store_primal(lhs, value);
        log::trace!("statement {lhs} with {arguments} arguments");
    }

    fn store_primal(&mut self, identifier: Identifier, value: G::Real) {
        if !self.config.track_primals {
            return;
        }
        if self.primals.len() <= identifier.index() {
            self.primals.resize(identifier.index() + 1, G::Real::zero());
        }
        self.primals[identifier.index()] = value;
    }

    fn ensure_storage(&mut self) {
        let needed = self.largest as usize + 1;
        if self.adjoints.len() < needed {
            self.adjoints.resize(needed, G::default());
        }
        if self.config.track_primals && self.primals.len() < needed {
            self.primals.resize(needed, G::Real::zero());
        }
    }

    fn check(&self, identifier: Identifier) -> Result<()> {
        if !identifier.is_active() {
            Err(ADError::PassiveIdentifier)
        } else if identifier.raw() > self.largest {
            Err(ADError::UnknownIdentifier(identifier))
        } else {
            Ok(())
        }
    }

    /// The adjoint (reverse) or tangent (forward) of `identifier`.
    pub fn gradient(&self, identifier: Identifier) -> Result<G> {
        self.check(identifier)?;
        Ok(self
            .adjoints
            .get(identifier.index())
            .copied()
            .unwrap_or_default())
    }

    /// Shorthand for `gradient(value.identifier())`.
    pub fn gradient_of(&self, value: &ActiveReal<G::Real>) -> Result<G> {
        self.gradient(value.identifier())
    }

    /// Overwrites the adjoint or tangent of `identifier`.
    pub fn seed(&mut self, identifier: Identifier, gradient: G) -> Result<()> {
        self.check(identifier)?;
        self.ensure_storage();
        self.adjoints[identifier.index()] = gradient;
        Ok(())
    }

    /// Lends the derivative storage to an access object.
    pub fn access(&mut self) -> AdjointVectorAccess<'_, G> {
        self.ensure_storage();
        if self.config.track_primals {
            AdjointVectorAccess::with_primals(&mut self.adjoints, &mut self.primals)
        } else {
            AdjointVectorAccess::new(&mut self.adjoints)
        }
    }

    /// The current end of the recording.
    pub fn position(&self) -> Position {
        Position {
            statements: self.statements.len(),
            jacobians: self.jacobians.len(),
        }
    }

    /// Reverse sweep over the whole recording.
    pub fn evaluate(&mut self) {
        self.evaluate_to(Position::default());
    }

    /// Reverse sweep from the end of the recording down to `mark`.
    ///
    /// A mark past the end of the recording, such as one taken before a
    /// [`JacobianTape::reset_to`] to an earlier point, evaluates nothing.
    pub fn evaluate_to(&mut self, mark: Position) {
        self.ensure_storage();
        let mark = if mark.statements > self.statements.len() {
            self.position()
        } else {
            mark
        };
        let statements = &self.statements[mark.statements..];
        log::debug!("reverse sweep over {} statements", statements.len());

        let mut access = AdjointVectorAccess::new(&mut self.adjoints);
        let mut end = self.jacobians.len();
        for statement in statements.iter().rev() {
            let start = end - statement.arguments;
            let mut lhs = access.begin_adjoint(statement.lhs);
            if !lhs.is_zero() {
                for &(jacobian, identifier) in &self.jacobians[start..end] {
                    lhs.distribute(identifier, jacobian);
                }
            }
            end = start;
        }
        debug_assert_eq!(end, mark.jacobians);
    }

    /// Forward sweep over the whole recording, propagating the seeded
    /// tangents of the inputs to every statement output.
    pub fn evaluate_forward(&mut self) {
        self.ensure_storage();
        log::debug!("forward sweep over {} statements", self.statements.len());

        let mut access = AdjointVectorAccess::new(&mut self.adjoints);
        let mut start = 0;
        for statement in &self.statements {
            let end = start + statement.arguments;
            let mut lhs = access.begin_tangent(statement.lhs);
            for &(jacobian, identifier) in &self.jacobians[start..end] {
                lhs.accumulate(identifier, jacobian);
            }
            lhs.commit();
            start = end;
        }
    }

    /// Sets every adjoint to zero.
    pub fn clear_adjoints(&mut self) {
        let count = self.adjoints.len() as u32;
        let mut access = AdjointVectorAccess::new(&mut self.adjoints);
        for raw in 0..count {
            access.reset_adjoint_vec(Identifier::new(raw));
        }
    }

    /// Drops everything recorded after `mark`. Identifiers stay issued.
    pub fn reset_to(&mut self, mark: Position) {
        self.statements.truncate(mark.statements);
        self.jacobians.truncate(mark.jacobians);
    }

    /// Drops the whole recording and all adjoints.
    ///
    /// Under [`IdentifierPolicy::Linear`] identifier issuance restarts, so
    /// values from before the reset must not be used with this tape again.
    pub fn reset(&mut self) {
        self.reset_to(Position::default());
        self.clear_adjoints();
        if self.config.identifiers == IdentifierPolicy::Linear {
            self.largest = 0;
            self.adjoints.clear();
            self.primals.clear();
        }
        log::debug!("tape reset");
    }
}

impl<G: Gradient> TapeSizing for JacobianTape<G> {
    fn has_parameter(&self, parameter: TapeParameter) -> bool {
        match parameter {
            TapeParameter::AdjointSize
            | TapeParameter::JacobianSize
            | TapeParameter::LargestIdentifier
            | TapeParameter::StatementSize => true,
            TapeParameter::PrimalSize => self.config.track_primals,
            _ => false,
        }
    }

    fn parameter(&self, parameter: TapeParameter) -> usize {
        match parameter {
            TapeParameter::AdjointSize => self.adjoints.len(),
            TapeParameter::JacobianSize => self.jacobians.len(),
            TapeParameter::LargestIdentifier => self.largest as usize,
            TapeParameter::StatementSize => self.statements.len(),
            TapeParameter::PrimalSize => self.primals.len(),
            _ => 0,
        }
    }

    fn set_parameter(&mut self, parameter: TapeParameter, value: usize) -> Result<()> {
        match parameter {
            TapeParameter::AdjointSize => self.adjoints.resize(value, G::default()),
            TapeParameter::JacobianSize => {
                let additional = value.saturating_sub(self.jacobians.len());
                self.jacobians.reserve(additional);
            }
            TapeParameter::StatementSize => {
                let additional = value.saturating_sub(self.statements.len());
                self.statements.reserve(additional);
            }
            TapeParameter::PrimalSize if self.config.track_primals => {
                self.primals.resize(value, G::Real::zero());
            }
            TapeParameter::LargestIdentifier => {
                return Err(ADError::ReadOnlyParameter(parameter));
            }
            _ => return Err(ADError::UnsupportedParameter(parameter)),
        }
        Ok(())
    }
}

impl<G: Gradient> fmt::Display for JacobianTape<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.active { "recording" } else { "passive" };
        writeln!(f, "JacobianTape ({state})")?;
        for (parameter, value) in sizing_report(self) {
            writeln!(f, "  {parameter}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ConstantExpression;
    use crate::expressions::{exp, sin};
    use crate::gradient::Direction;

    fn recording<G: Gradient>() -> JacobianTape<G> {
        let mut tape = JacobianTape::new();
        tape.set_active();
        tape
    }

    #[test]
    fn reverse_sum_and_product() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(2.0);
        let b = tape.register_input(5.0);
        let s = tape.record(&(a + b));
        let p = tape.record(&(a * b));
        assert_eq!(tape.statement_count(), 2);

        tape.seed(s.identifier(), 1.0).unwrap();
        tape.evaluate();
        assert_eq!(tape.gradient_of(&a).unwrap(), 1.0);
        assert_eq!(tape.gradient_of(&b).unwrap(), 1.0);

        tape.clear_adjoints();
        tape.seed(p.identifier(), 1.0).unwrap();
        tape.evaluate();
        assert_eq!(tape.gradient_of(&a).unwrap(), 5.0);
        assert_eq!(tape.gradient_of(&b).unwrap(), 2.0);
    }

    #[test]
    fn chain_over_several_statements() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(0.5);
        let b = tape.register_input(3.0);
        let t = tape.record(&(a * b));
        let y = tape.record(&(exp(t) + sin(a)));

        tape.seed(y.identifier(), 1.0).unwrap();
        tape.evaluate();
        let e = 1.5f64.exp();
        assert!((tape.gradient_of(&a).unwrap() - (3.0 * e + 0.5f64.cos())).abs() < 1e-12);
        assert!((tape.gradient_of(&b).unwrap() - 0.5 * e).abs() < 1e-12);
        // intermediate adjoints are consumed by the sweep
        assert_eq!(tape.gradient_of(&t).unwrap(), 0.0);
    }

    #[test]
    fn reused_identifiers_alias_output_and_input() {
        let config = TapeConfig::new().identifiers(IdentifierPolicy::Reuse);
        let mut tape = JacobianTape::<f64>::with_config(config).unwrap();
        tape.set_active();
        let mut x = tape.register_input(3.0);
        let y = tape.register_input(4.0);
        let x0 = x.identifier();
        for _ in 0..2 {
            let rhs = x * y;
            tape.store(&mut x, &rhs);
        }
        assert_eq!(x.identifier(), x0);
        assert_eq!(x.value(), 48.0);

        tape.seed(x.identifier(), 1.0).unwrap();
        tape.evaluate();
        assert_eq!(tape.gradient(x0).unwrap(), 16.0);
        assert_eq!(tape.gradient_of(&y).unwrap(), 24.0);
    }

    #[test]
    fn forward_sweep_with_reused_identifiers() {
        let config = TapeConfig::new().identifiers(IdentifierPolicy::Reuse);
        let mut tape = JacobianTape::<f64>::with_config(config).unwrap();
        tape.set_active();
        let mut x = tape.register_input(3.0);
        let y = tape.register_input(4.0);
        let x0 = x.identifier();
        for _ in 0..2 {
            let rhs = x * y;
            tape.store(&mut x, &rhs);
        }

        tape.seed(x0, 1.0).unwrap();
        tape.evaluate_forward();
        assert_eq!(tape.gradient_of(&x).unwrap(), 16.0);

        tape.clear_adjoints();
        tape.seed(y.identifier(), 1.0).unwrap();
        tape.evaluate_forward();
        assert_eq!(tape.gradient_of(&x).unwrap(), 24.0);
    }

    #[test]
    fn constant_statements_record_nothing() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(1.0);
        let c = tape.record(&(ConstantExpression::new(2.0f64) * 3.0));
        assert!(!c.is_active());
        assert_eq!(c.value(), 6.0);
        assert_eq!(tape.statement_count(), 0);

        tape.seed(a.identifier(), 2.0).unwrap();
        tape.evaluate();
        assert_eq!(tape.gradient_of(&a).unwrap(), 2.0);
    }

    #[test]
    fn passive_tape_records_nothing() {
        let mut tape = JacobianTape::<f64>::new();
        let a = tape.register_input(1.0);
        let b = tape.record(&(a * 2.0));
        assert!(!a.is_active());
        assert!(!b.is_active());
        assert_eq!(b.value(), 2.0);
        assert_eq!(tape.statement_count(), 0);
    }

    #[test]
    fn zero_jacobians_can_be_skipped() {
        let config = TapeConfig::new().skip_zero_jacobians(true);
        let mut tape = JacobianTape::<f64>::with_config(config).unwrap();
        tape.set_active();
        let a = tape.register_input(0.0);
        let b = tape.register_input(2.0);
        let y = tape.record(&(a * b));
        // d(a*b)/db = a = 0 is dropped
        assert_eq!(tape.parameter(TapeParameter::JacobianSize), 1);
        assert!(y.is_active());
    }

    #[test]
    fn outputs_get_their_own_identifier() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(2.0);
        let mut y = a;
        tape.register_output(&mut y);
        assert_ne!(y.identifier(), a.identifier());
        tape.seed(y.identifier(), 1.0).unwrap();
        tape.evaluate();
        assert_eq!(tape.gradient_of(&a).unwrap(), 1.0);
    }

    #[test]
    fn gradient_errors() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(1.0);
        assert_eq!(
            tape.gradient(Identifier::PASSIVE),
            Err(ADError::PassiveIdentifier)
        );
        let unknown = Identifier::new(a.identifier().raw() + 1);
        assert_eq!(
            tape.seed(unknown, 1.0),
            Err(ADError::UnknownIdentifier(unknown))
        );
        assert_eq!(tape.gradient_of(&a).unwrap(), 0.0);
    }

    #[test]
    fn evaluate_down_to_a_mark() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(2.0);
        let t = tape.record(&(a * a));
        let mark = tape.position();
        let y = tape.record(&(t * 3.0));

        tape.seed(y.identifier(), 1.0).unwrap();
        tape.evaluate_to(mark);
        assert_eq!(tape.gradient_of(&t).unwrap(), 3.0);
        assert_eq!(tape.gradient_of(&a).unwrap(), 0.0);

        tape.reset_to(mark);
        assert_eq!(tape.statement_count(), 1);
        tape.evaluate();
        assert_eq!(tape.gradient_of(&a).unwrap(), 12.0);
    }

    #[test]
    fn stale_mark_after_reset_evaluates_nothing() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(2.0);
        let y = tape.record(&(a * 3.0));
        let mark = tape.position();
        tape.reset_to(Position::default());

        tape.seed(y.identifier(), 1.0).unwrap();
        tape.evaluate_to(mark);
        assert_eq!(tape.gradient_of(&y).unwrap(), 1.0);
        assert_eq!(tape.gradient_of(&a).unwrap(), 0.0);
    }

    #[test]
    fn vector_mode_reverse() {
        let mut tape = recording::<Direction<f64, 2>>();
        let a = tape.register_input(2.0);
        let b = tape.register_input(5.0);
        let s = tape.record(&(a + b));
        let p = tape.record(&(a * b));
        tape.seed(s.identifier(), Direction::unit(0)).unwrap();
        tape.seed(p.identifier(), Direction::unit(1)).unwrap();
        tape.evaluate();
        assert_eq!(tape.gradient_of(&a).unwrap(), Direction::new([1.0, 5.0]));
        assert_eq!(tape.gradient_of(&b).unwrap(), Direction::new([1.0, 2.0]));
    }

    #[test]
    fn sizing_reflects_the_recording() {
        let config = TapeConfig::new()
            .capacity(TapeParameter::JacobianSize, 64)
            .capacity(TapeParameter::StatementSize, 16);
        let mut tape = JacobianTape::<f64>::with_config(config).unwrap();
        assert!(tape.jacobians.capacity() >= 64);
        assert!(tape.statements.capacity() >= 16);

        tape.set_active();
        let a = tape.register_input(1.0);
        let b = tape.register_input(2.0);
        let _ = tape.record(&(a * b + a));
        assert_eq!(tape.parameter(TapeParameter::JacobianSize), 3);
        assert_eq!(tape.parameter(TapeParameter::StatementSize), 1);
        assert_eq!(tape.parameter(TapeParameter::LargestIdentifier), 3);
        assert!(!tape.has_parameter(TapeParameter::PrimalSize));
        assert_eq!(
            tape.set_parameter(TapeParameter::LargestIdentifier, 10),
            Err(ADError::ReadOnlyParameter(TapeParameter::LargestIdentifier))
        );
        assert_eq!(
            tape.set_parameter(TapeParameter::ExternalFunctionsSize, 1),
            Err(ADError::UnsupportedParameter(
                TapeParameter::ExternalFunctionsSize
            ))
        );
        let text = tape.to_string();
        assert!(text.starts_with("JacobianTape (recording)"));
        assert!(text.contains("jacobian entries: 3"));
    }

    #[test]
    fn unsupported_capacity_fails_construction() {
        let config = TapeConfig::new().capacity(TapeParameter::PassiveValuesSize, 8);
        assert_eq!(
            JacobianTape::<f64>::with_config(config).err(),
            Some(ADError::UnsupportedParameter(
                TapeParameter::PassiveValuesSize
            ))
        );
    }

    #[test]
    fn primal_tracking_is_exposed_through_access() {
        let config = TapeConfig::new().track_primals(true);
        let mut tape = JacobianTape::<f64>::with_config(config).unwrap();
        tape.set_active();
        let a = tape.register_input(2.0);
        let y = tape.record(&(a * a));
        assert_eq!(tape.parameter(TapeParameter::PrimalSize), 3);

        let access = tape.access();
        assert!(access.has_primals());
        assert_eq!(access.get_primal(a.identifier()), 2.0);
        assert_eq!(access.get_primal(y.identifier()), 4.0);
    }

    #[test]
    fn reset_restarts_linear_identifiers() {
        let mut tape = recording::<f64>();
        let a = tape.register_input(1.0);
        let _ = tape.record(&(a * 2.0));
        tape.reset();
        assert_eq!(tape.statement_count(), 0);
        assert_eq!(tape.largest_identifier(), Identifier::PASSIVE);
        let b = tape.register_input(1.0);
        assert_eq!(b.identifier(), Identifier::new(1));
    }
}
