use thiserror::Error;

/// Errors related to VM initialization and execution
#[derive(Debug, Error)]
pub enum VMError {
    /// not enough bytes available to complete instruction parse
    #[error("partial instruction at pc:{0:x}")]
    PartialInstruction(u32),

    /// Invalid instruction size found during parse
    #[error("invalid instruction size, {1}, at pc:{0:x}")]
    InvalidSize(u32, u32),

    /// Invalid instruction format, could not parse
    #[error("invalid instruction {1:x} at pc:{0:x}")]
    InvalidInstruction(u32, u32),

    /// Unknown ECALL number
    #[error("unknown ecall {1:x} at pc:{0:x}")]
    UnknownECall(u32, u32),

    /// Misaligned memory access or jump target
    #[error("misaligned address {1:x} at pc:{0:x}")]
    MisalignedAccess(u32, u32),

    /// A single log call asked for more bytes than allowed
    #[error("log write of {1} bytes at pc:{0:x} is too long")]
    LogTooLong(u32, u32),

    /// The program did not exit within the step budget
    #[error("program did not exit within {0} steps")]
    StepLimit(u64),

    /// Execution reached an `unimp` instruction
    #[error("unimp reached at pc:{0:x} before exit")]
    UnexpectedUnimp(u32),

    /// Neither an ELF file nor a test machine was given
    #[error("no ELF file or machine given")]
    NoInput,

    /// Unknown test machine
    #[error("unknown machine {0}")]
    UnknownMachine(String),

    /// The ELF file has no program headers
    #[error("ELF file has no segments")]
    NoSegments,

    /// The ELF file is not a 32-bit little-endian RISC-V executable
    #[error("unsupported ELF file: {0}")]
    UnsupportedELF(String),

    /// A loadable segment lies outside the ELF file
    #[error("segment at vaddr:{0:x} extends past end of file")]
    TruncatedSegment(u32),

    /// An error occurred reading file system
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// An error occurred while parsing the ELF headers
    #[error(transparent)]
    ELFError(#[from] elf::ParseError),

    /// Invalid configuration
    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),

    /// Unreadable `.config.env` file
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

/// Result type for VM functions that can produce errors
pub type Result<T, E = VMError> = std::result::Result<T, E>;
