//! examples of usage of RustedFracCalc
/// Fractional derivative examples
pub mod fractional_examples;
