//! Whole-run driver: opens the inputs named by a `Config`, feeds the trace
//! through a fresh `Translator` and hands back the final counters.

use log::{info, warn};

use crate::config::{Config, MalformedPolicy};
use crate::error::Result;
use crate::io::AddressTrace;
use crate::memory::MappedBackingStore;
use crate::stats::Statistics;
use crate::translation::{Translation, Translator};

pub struct VmManager {
    config: Config,
}

impl VmManager {
    pub fn new(config: Config) -> Self {
        VmManager { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the simulation, ignoring individual translations
    pub fn run(&self) -> Result<Statistics> {
        self.run_with(|_| {})
    }

    /// Run the simulation, passing every translation to `on_translation`.
    ///
    /// Both input files are opened before the first address is translated,
    /// so a configuration error never leaves a half-finished run behind.
    pub fn run_with<F>(&self, on_translation: F) -> Result<Statistics>
    where
        F: FnMut(&Translation),
    {
        let store = MappedBackingStore::open(&self.config.backing_store)?;
        let trace = AddressTrace::open(&self.config.trace)?;

        info!("Backing store: {}", store.path().display());
        info!("Address trace: {}", self.config.trace.display());
        info!(
            "Policy: {}, TLB mode: {:?}",
            self.config.policy, self.config.tlb_mode
        );

        let mut translator = Translator::new(&store, self.config.policy, self.config.tlb_mode);
        simulate(&mut translator, trace, self.config.on_malformed, on_translation)?;

        let stats = translator.stats();
        info!(
            "Translated {} addresses: {} faults, {} TLB hits, {} evictions",
            stats.total,
            stats.page_faults,
            stats.tlb_hits,
            translator.allocator().evictions()
        );
        info!(
            "{} frames never used, {} TLB inserts",
            translator.allocator().free_frames(),
            translator.tlb().inserts()
        );
        Ok(stats)
    }
}

/// Feed a sequence of trace records through `translator`
pub fn simulate<I, F>(
    translator: &mut Translator<'_>,
    records: I,
    on_malformed: MalformedPolicy,
    mut on_translation: F,
) -> Result<()>
where
    I: IntoIterator<Item = Result<u32>>,
    F: FnMut(&Translation),
{
    for record in records {
        let address = match record {
            Ok(address) => address,
            Err(e) if e.is_record_error() && on_malformed == MalformedPolicy::Skip => {
                warn!("Skipping record: {}", e);
                continue;
            }
            Err(e) => return Err(e),
        };
        let translation = translator.translate(address);
        on_translation(&translation);
    }
    Ok(())
}
