//! The [`Qasm`] trait and helpers for lowering program items to OpenQASM 3.0 text.

/// A trait to wrap items which represent some construct within an OpenQASM 3.0 program.
pub trait Qasm {
    /// Return a string in valid OpenQASM syntax or an error if the item cannot be
    /// represented with valid OpenQASM.
    fn to_qasm(&self) -> Result<String, SerializationError> {
        let mut buffer = String::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Write the OpenQASM representation of the item to the given writer.
    fn write(&self, writer: &mut impl std::fmt::Write) -> Result<(), SerializationError>;
}

pub type ToQasmResult<T> = Result<T, SerializationError>;

/// Errors which can occur when lowering an item to OpenQASM text.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum SerializationError {
    #[error("Failed to write OpenQASM: {0}")]
    FormatError(#[from] std::fmt::Error),

    #[error("definition `{name}` is part of a call cycle and cannot be emitted")]
    CyclicDefinition { name: String },
}

pub(crate) const INDENT: &str = "    ";

/// Write a sequence of items to the given writer, joined with the provided `joiner`.
pub(crate) fn write_join_qasm<'i, I, T>(
    writer: &mut impl std::fmt::Write,
    values: I,
    joiner: &str,
) -> Result<(), SerializationError>
where
    I: IntoIterator<Item = &'i T>,
    T: Qasm + 'i,
{
    let mut iter = values.into_iter();
    if let Some(first) = iter.next() {
        first.write(writer)?;

        for value in iter {
            write!(writer, "{joiner}")?;
            value.write(writer)?;
        }
    }
    Ok(())
}

/// Write a block of already-lowered statements, indenting each line by one level.
///
/// Nested blocks arrive here with their own indentation applied, so each line is
/// shifted uniformly.
pub(crate) fn write_indented_block(
    writer: &mut impl std::fmt::Write,
    block: &str,
) -> Result<(), SerializationError> {
    for line in block.lines() {
        writeln!(writer, "{INDENT}{line}")?;
    }
    Ok(())
}
