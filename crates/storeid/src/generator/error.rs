use crate::SnowflakeId;

/// Errors raised while configuring an ID generator.
///
/// Generation itself is infallible: once a generator is constructed,
/// [`IdGenerator::generate`](crate::IdGenerator::generate) always returns an
/// ID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum GeneratorError {
    /// The machine tag does not fit the 10-bit machine tag field.
    #[error("machine tag {machine_tag} is out of range (must be 0..={max})", max = SnowflakeId::MAX_MACHINE_TAG)]
    InvalidMachineTag {
        /// The rejected machine tag.
        machine_tag: u16,
    },
}

pub(crate) fn check_machine_tag(machine_tag: u16) -> Result<u16, GeneratorError> {
    if machine_tag > SnowflakeId::MAX_MACHINE_TAG {
        return Err(GeneratorError::InvalidMachineTag { machine_tag });
    }
    Ok(machine_tag)
}
