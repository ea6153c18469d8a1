//! virtmem - paged MMU simulator
//!
//! Usage: virtmem [OPTIONS] <BACKING_STORE> <ADDRESSES>
//!
//! Translates every logical address in ADDRESSES through a 16-entry TLB and
//! a 256-entry page table backed by 64 physical frames, then prints fault
//! and TLB hit statistics.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use virtmem::config::{Config, MalformedPolicy};
use virtmem::logger;
use virtmem::{ReplacementPolicy, TlbMode, VmManager};

#[derive(Parser)]
#[command(name = "virtmem")]
#[command(about = "Translate logical addresses through a simulated TLB and page table")]
#[command(version)]
struct Cli {
    /// Backing store file covering the whole logical address space
    backing_store: PathBuf,

    /// Address trace, one logical address per line
    addresses: PathBuf,

    /// Page replacement policy: 0 or fifo, 1 or lru
    #[arg(short, long, default_value = "0", value_parser = parse_policy)]
    policy: ReplacementPolicy,

    /// Never invalidate TLB entries of evicted pages
    #[arg(long)]
    legacy_tlb: bool,

    /// Skip malformed address lines instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Print the physical address and value of every translation
    #[arg(long)]
    print_translations: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_policy(s: &str) -> Result<ReplacementPolicy, String> {
    s.parse().map_err(|e: virtmem::VmError| e.to_string())
}

impl Cli {
    fn log_level(&self) -> log::LevelFilter {
        logger::level_for_verbosity(self.verbose)
    }

    fn into_config(self) -> Config {
        let mut config = Config::new(self.backing_store, self.addresses)
            .with_policy(self.policy)
            .with_tlb_mode(if self.legacy_tlb {
                TlbMode::Legacy
            } else {
                TlbMode::Coherent
            })
            .with_malformed_policy(if self.skip_malformed {
                MalformedPolicy::Skip
            } else {
                MalformedPolicy::Fail
            });
        config.print_translations = self.print_translations;
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.log_level());

    let manager = VmManager::new(cli.into_config());
    let print_translations = manager.config().print_translations;

    let result = manager.run_with(|t| {
        if print_translations {
            println!(
                "Virtual address: {} Physical address: {} Value: {}",
                t.virtual_address.va, t.physical_address, t.value
            );
        }
    });

    match result {
        Ok(stats) => {
            println!("{}", stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}
