use core::ops::Range;

use thiserror::Error;
use tracing::debug;

use super::code::Script;
use super::instruction_set::Instruction;
use crate::adaptor::AdaptorError;
use crate::vm::Context;

/// A convention violation, located in the script that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct RuntimeError {
    pub error: AdaptorError,
    pub span: Range<usize>,
}

/// Executes a [`Script`] instruction by instruction against one context.
pub struct VM<'s, H: ?Sized + 'static> {
    script: &'s Script<H>,
    ip: usize,
}

impl<'s, H: ?Sized + 'static> VM<'s, H> {
    pub fn new(script: &'s Script<H>) -> Self {
        VM { script, ip: 0 }
    }

    /// Runs to completion. Violations are fatal, as with [`Context::call`].
    pub fn run(&mut self, ctx: &mut Context, host: &mut H) {
        while let Some(instruction) = self.fetch() {
            match instruction {
                Instruction::Push(index) => ctx.push(self.script.constants[index as usize].clone()),
                Instruction::Call(index) => ctx.call(host, self.script.operations[index as usize]),
            }
        }
    }

    /// Runs until the first violation and reports where it happened.
    ///
    /// The failing word has not touched the stack; `ip` is left pointing at
    /// it.
    pub fn try_run(&mut self, ctx: &mut Context, host: &mut H) -> Result<(), RuntimeError> {
        while let Some(instruction) = self.fetch() {
            match instruction {
                Instruction::Push(index) => ctx.push(self.script.constants[index as usize].clone()),
                Instruction::Call(index) => {
                    let operation = self.script.operations[index as usize];
                    if let Err(error) = ctx.try_call(host, operation) {
                        self.ip -= 1;
                        debug!(ip = self.ip, %error, "script stopped");
                        return Err(RuntimeError {
                            error,
                            span: self.script.spans[self.ip].clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    fn fetch(&mut self) -> Option<Instruction> {
        let instruction = self.script.instructions.get(self.ip).copied()?;
        self.ip += 1;
        Some(instruction)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adaptor::{Args, NativeOperation, Outputs, Param, Registry, Signature};
    use crate::values::{StackElement, Tag, Text};
    use crate::vm::ScriptError;

    /// Accumulates every string it is given.
    #[derive(Default)]
    struct Log(Vec<String>);

    static APPEND: Signature = Signature::new(
        "Append",
        &[Param::new("line", Tag::Str)],
        &[Param::new("count", Tag::Int)],
    );

    fn append(host: &mut Log, args: &mut Args) -> Outputs {
        let line: Text = args.take();
        host.0.push(line.as_str().to_string());
        Outputs::from_iter([(host.0.len() as i64).into()])
    }

    static SCALE: Signature = Signature::new(
        "Scale",
        &[Param::new("value", Tag::Int), Param::new("factor", Tag::Float)],
        &[Param::new("scaled", Tag::Float)],
    );

    fn scale(_host: &mut Log, args: &mut Args) -> Outputs {
        let value: i64 = args.take();
        let factor: f64 = args.take();
        Outputs::from_iter([(value as f64 * factor).into()])
    }

    static APPEND_OP: NativeOperation<Log> = NativeOperation::new(&APPEND, append);
    static SCALE_OP: NativeOperation<Log> = NativeOperation::new(&SCALE, scale);

    fn registry() -> Registry<Log> {
        let mut registry = Registry::new();
        registry.register(&APPEND_OP).unwrap();
        registry.register(&SCALE_OP).unwrap();
        registry
    }

    fn constants(name: &str) -> Option<i64> {
        (name == "TEN").then_some(10)
    }

    #[test]
    fn test_runs_script() {
        crate::test_utils::init_test_logging();
        let script = Script::parse(
            r#""first" Append "second" Append TEN 0.5 Scale"#,
            &registry(),
            constants,
        )
        .unwrap();
        assert_eq!(script.operations.len(), 2);

        let mut log = Log::default();
        let mut ctx = Context::default();
        VM::new(&script).run(&mut ctx, &mut log);

        assert_eq!(log.0, vec!["first", "second"]);
        assert_eq!(
            ctx.stack().as_slice(),
            &[StackElement::Int(1), StackElement::Int(2), StackElement::Float(5.0)]
        );
    }

    #[test]
    fn test_unknown_word() {
        let err = Script::parse("1 Frobnicate", &registry(), constants).unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownWord {
                name: "Frobnicate".into(),
                span: 2..12,
            }
        );
    }

    #[test]
    fn test_try_run_reports_span() {
        let source = "1 Append";
        let script = Script::parse(source, &registry(), constants).unwrap();
        let mut ctx = Context::default();
        let mut log = Log::default();
        let mut vm = VM::new(&script);

        let err = vm.try_run(&mut ctx, &mut log).unwrap_err();
        assert!(err.error.is_type_mismatch());
        assert_eq!(&source[err.span], "Append");
        assert_eq!(vm.ip(), 1);
        assert_eq!(ctx.stack().as_slice(), &[StackElement::Int(1)]);
        assert!(log.0.is_empty());
    }

    #[test]
    #[should_panic(expected = "Fatal error in Scale: Stack underflow")]
    fn test_run_applies_violation_policy() {
        let script = Script::parse("1 Scale", &registry(), constants).unwrap();
        let mut ctx = Context::new(crate::api::ContextOptions {
            violation_policy: crate::api::ViolationPolicy::Panic,
            ..Default::default()
        });
        VM::new(&script).run(&mut ctx, &mut Log::default());
    }
}
