use core::fmt;
use core::ops::Range;

use hashbrown::HashMap;
use thiserror::Error;

use super::{Operation, Param, Signature};
use crate::notation::{Declaration, DeclaredParam, SyntaxError, parse_declarations};
use crate::values::Tag;

/// Name → operation table, iterated in registration order.
pub struct Registry<H: ?Sized + 'static> {
    by_name: HashMap<&'static str, usize>,
    operations: Vec<&'static dyn Operation<H>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("operation `{0}` is already registered")]
    Duplicate(&'static str),
}

impl<H: ?Sized + 'static> Registry<H> {
    pub fn new() -> Self {
        Registry {
            by_name: HashMap::new(),
            operations: Vec::new(),
        }
    }

    pub fn register(&mut self, operation: &'static dyn Operation<H>) -> Result<(), RegistryError> {
        let name = operation.signature().name;
        if self.by_name.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.by_name.insert(name, self.operations.len());
        self.operations.push(operation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&'static dyn Operation<H>> {
        self.by_name.get(name).map(|&index| self.operations[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static dyn Operation<H>> + '_ {
        self.operations.iter().copied()
    }

    pub fn signatures(&self) -> impl Iterator<Item = &'static Signature> + '_ {
        self.iter().map(|operation| operation.signature())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Checks a file of stack-effect declarations, as a compiler of the host
    /// language would see them, against the registered signatures.
    ///
    /// Parameter names are documentation only; arity and tags must agree.
    pub fn check_declarations(&self, source: &str) -> Result<Vec<DeclarationIssue>, SyntaxError> {
        let declarations = parse_declarations(source)?;
        let mut issues = Vec::new();
        for declaration in &declarations {
            match self.get(&declaration.name) {
                Some(operation) => {
                    compare(declaration, operation.signature(), &mut issues);
                }
                None => issues.push(DeclarationIssue::UnknownOperation {
                    name: declaration.name.clone(),
                    span: declaration.name_span.clone(),
                }),
            }
        }
        Ok(issues)
    }
}

impl<H: ?Sized + 'static> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized + 'static> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.signatures().map(|signature| signature.name))
            .finish()
    }
}

fn compare(declaration: &Declaration, signature: &Signature, issues: &mut Vec<DeclarationIssue>) {
    compare_side(
        declaration,
        Direction::Inputs,
        &declaration.inputs,
        signature.inputs,
        issues,
    );
    compare_side(
        declaration,
        Direction::Outputs,
        &declaration.outputs,
        signature.outputs,
        issues,
    );
}

fn compare_side(
    declaration: &Declaration,
    direction: Direction,
    declared: &[DeclaredParam],
    expected: &[Param],
    issues: &mut Vec<DeclarationIssue>,
) {
    if declared.len() != expected.len() {
        issues.push(DeclarationIssue::ArityMismatch {
            name: declaration.name.clone(),
            span: declaration.span.clone(),
            direction,
            declared: declared.len(),
            expected: expected.len(),
        });
        return;
    }
    for (position, (ours, theirs)) in declared.iter().zip(expected).enumerate() {
        if ours.tag != theirs.tag {
            issues.push(DeclarationIssue::TypeMismatch {
                name: declaration.name.clone(),
                span: ours.span.clone(),
                direction,
                position,
                declared: ours.tag,
                expected: theirs.tag,
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inputs,
    Outputs,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inputs => f.write_str("input"),
            Direction::Outputs => f.write_str("output"),
        }
    }
}

/// Disagreement between a declaration and the registered signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationIssue {
    #[error("`{name}` is not a registered operation")]
    UnknownOperation { name: String, span: Range<usize> },

    #[error("`{name}` declares {declared} {direction}(s) but the operation has {expected}")]
    ArityMismatch {
        name: String,
        span: Range<usize>,
        direction: Direction,
        declared: usize,
        expected: usize,
    },

    #[error("`{name}` {direction} {position} is declared {declared} but the operation uses {expected}")]
    TypeMismatch {
        name: String,
        span: Range<usize>,
        direction: Direction,
        position: usize,
        declared: Tag,
        expected: Tag,
    },
}

impl DeclarationIssue {
    /// Byte range in the checked source that the issue points at.
    pub fn span(&self) -> Range<usize> {
        match self {
            DeclarationIssue::UnknownOperation { span, .. }
            | DeclarationIssue::ArityMismatch { span, .. }
            | DeclarationIssue::TypeMismatch { span, .. } => span.clone(),
        }
    }
}
