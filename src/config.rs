use std::path::PathBuf;

use crate::replacement::ReplacementPolicy;
use crate::translation::TlbMode;

/// What to do with a trace line that is not a valid logical address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Abort the run on the first bad record
    #[default]
    Fail,
    /// Log a warning and leave the record out of every counter
    Skip,
}

/// Everything needed for one simulation run
#[derive(Debug, Clone)]
pub struct Config {
    pub backing_store: PathBuf,
    pub trace: PathBuf,
    pub policy: ReplacementPolicy,
    pub tlb_mode: TlbMode,
    pub on_malformed: MalformedPolicy,
    /// Print one line per translated address
    pub print_translations: bool,
}

impl Config {
    pub fn new(backing_store: impl Into<PathBuf>, trace: impl Into<PathBuf>) -> Self {
        Config {
            backing_store: backing_store.into(),
            trace: trace.into(),
            policy: ReplacementPolicy::default(),
            tlb_mode: TlbMode::default(),
            on_malformed: MalformedPolicy::default(),
            print_translations: false,
        }
    }

    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tlb_mode(mut self, tlb_mode: TlbMode) -> Self {
        self.tlb_mode = tlb_mode;
        self
    }

    pub fn with_malformed_policy(mut self, on_malformed: MalformedPolicy) -> Self {
        self.on_malformed = on_malformed;
        self
    }
}
