use core::fmt;
use core::ops::Range;

use hashbrown::HashMap;
use thiserror::Error;

use crate::adaptor::{Operation, Registry};
use crate::notation::{SyntaxError, WordKind, parse_script};
use crate::values::{StackElement, Text};
use crate::vm::Instruction;

/// A word script compiled against one operation registry.
///
/// Literals become constants; every other word must name either a
/// registered operation or a named integer constant.
pub struct Script<H: ?Sized + 'static> {
    pub constants: Vec<StackElement>,
    pub operations: Vec<&'static dyn Operation<H>>,
    pub instructions: Vec<Instruction>,
    /// Source span of each instruction.
    pub spans: Vec<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("unknown word `{name}`")]
    UnknownWord { name: String, span: Range<usize> },
}

impl ScriptError {
    pub fn span(&self) -> Range<usize> {
        match self {
            ScriptError::Syntax(err) => err.span.clone(),
            ScriptError::UnknownWord { span, .. } => span.clone(),
        }
    }
}

impl<H: ?Sized + 'static> Script<H> {
    /// Parses `source` and resolves its names.
    ///
    /// Operation names take precedence over constants returned by
    /// `constant`.
    pub fn parse(
        source: &str,
        registry: &Registry<H>,
        constant: impl Fn(&str) -> Option<i64>,
    ) -> Result<Self, ScriptError> {
        let words = parse_script(source)?;

        let mut script = Script {
            constants: Vec::new(),
            operations: Vec::new(),
            instructions: Vec::with_capacity(words.len()),
            spans: Vec::with_capacity(words.len()),
        };
        let mut operation_slots: HashMap<&'static str, u32> = HashMap::new();

        for word in words {
            let instruction = match word.kind {
                WordKind::Int(value) => script.push_constant(value.into()),
                WordKind::Float(value) => script.push_constant(value.into()),
                WordKind::Str(value) => script.push_constant(Text::from(value).into()),
                WordKind::Name(name) => {
                    if let Some(operation) = registry.get(&name) {
                        let slot = *operation_slots
                            .entry(operation.signature().name)
                            .or_insert_with(|| {
                                script.operations.push(operation);
                                (script.operations.len() - 1) as u32
                            });
                        Instruction::Call(slot)
                    } else if let Some(value) = constant(&name) {
                        script.push_constant(value.into())
                    } else {
                        return Err(ScriptError::UnknownWord {
                            name,
                            span: word.span,
                        });
                    }
                }
            };
            script.instructions.push(instruction);
            script.spans.push(word.span);
        }
        Ok(script)
    }

    fn push_constant(&mut self, element: StackElement) -> Instruction {
        self.constants.push(element);
        Instruction::Push((self.constants.len() - 1) as u32)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<H: ?Sized + 'static> fmt::Debug for Script<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Script {{")?;
        if self.constants.is_empty() {
            writeln!(f, "  constants: []")?;
        } else {
            writeln!(f, "  constants: [")?;
            for (i, constant) in self.constants.iter().enumerate() {
                writeln!(f, "    [{}] = {:?}", i, constant)?;
            }
            writeln!(f, "  ]")?;
        }

        writeln!(f, "  instructions:")?;
        for (addr, instr) in self.instructions.iter().enumerate() {
            match instr {
                Instruction::Call(index) => {
                    let name = self
                        .operations
                        .get(*index as usize)
                        .map(|operation| operation.signature().name)
                        .unwrap_or("?");
                    writeln!(f, "    {:4}  {:?} ({})", addr, instr, name)?;
                }
                Instruction::Push(_) => writeln!(f, "    {:4}  {:?}", addr, instr)?,
            }
        }
        write!(f, "}}")
    }
}
