use super::BuildMode;

/// Bookkeeping for the single global qubit register a program may declare.
///
/// Physical qubit literals bypass this entirely; only virtual (register-relative)
/// references resolve here.
#[derive(Clone, Debug, Default)]
pub struct QubitRegister {
    size: Option<u64>,
}

impl QubitRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the register length. May be called at most once per program, before
    /// any register-relative reference is resolved.
    pub fn declare(&mut self, size: u64) -> Result<(), QubitScopeError> {
        if self.size.is_some() {
            return Err(QubitScopeError::AlreadyDeclared);
        }
        self.size = Some(size);
        Ok(())
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn is_declared(&self) -> bool {
        self.size.is_some()
    }

    /// Resolve a virtual index against the declared register.
    pub fn resolve(&self, index: u64) -> Result<u64, QubitScopeError> {
        let size = self.size.ok_or(QubitScopeError::NoRegisterDeclared)?;
        if index >= size {
            return Err(QubitScopeError::OutOfRange { index, size });
        }
        Ok(index)
    }
}

/// A qubit reference failed to resolve to a declared register slot or an
/// inherited parameter.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum QubitScopeError {
    #[error("the qubit register has already been declared")]
    AlreadyDeclared,

    #[error("a register qubit was referenced, but no qubit register was declared")]
    NoRegisterDeclared,

    #[error("qubit index {index} is out of range for the register of size {size}")]
    OutOfRange { index: u64, size: u64 },

    #[error("register qubits cannot be referenced in {mode} mode")]
    RegisterAccessNotAllowed { mode: BuildMode },

    #[error("physical qubit ${index} cannot be referenced in a gate definition body")]
    PhysicalNotAllowed { index: u64 },

    #[error("`{name}` is not a qubit parameter of the enclosing definition")]
    UndefinedFormal { name: String },

    #[error("qubit index variable `{name}` is not in scope")]
    UndefinedIndex { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_once() {
        let mut register = QubitRegister::new();
        register.declare(4).unwrap();
        assert_eq!(register.declare(8), Err(QubitScopeError::AlreadyDeclared));
        assert_eq!(register.size(), Some(4));
    }

    #[test]
    fn test_resolve() {
        let mut register = QubitRegister::new();
        assert_eq!(register.resolve(0), Err(QubitScopeError::NoRegisterDeclared));
        register.declare(2).unwrap();
        assert_eq!(register.resolve(1), Ok(1));
        assert_eq!(
            register.resolve(2),
            Err(QubitScopeError::OutOfRange { index: 2, size: 2 })
        );
    }
}
