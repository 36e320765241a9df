//! Reward-Sim: Block Reward Simulator
//!
//! Drives the qc-18 block reward engine through a run of staking epochs
//! using the in-memory collaborators, then prints a JSON report of what
//! each epoch distributed and minted.
//!
//! Validators author blocks round-robin. A bridge pays a fee every epoch and
//! optionally queues extra receivers, so the report exercises both the epoch
//! distribution and the extra receiver drain.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use qc_18_block_reward::{
    BlockRewardApi, BlockRewardConfig, BlockRewardEvent, BlockRewardService, InMemoryStaking,
    InMemoryValidatorSet, RecordingRandomness, SnapshotStakeInflation,
};
use shared_types::{Address, BlockNumber, CallContext, PoolId, StakingEpoch, U256};

const VALIDATOR_SET_ADDRESS: Address = [0x05; 20];
const BRIDGE_ADDRESS: Address = [0xbb; 20];

type Engine = BlockRewardService<InMemoryValidatorSet, InMemoryStaking, RecordingRandomness>;

/// Reward-Sim: run the block reward engine over simulated epochs
#[derive(Parser, Debug)]
#[command(name = "reward-sim")]
#[command(about = "Simulate block reward distribution over staking epochs")]
struct Args {
    /// Number of validator pools
    #[arg(short, long, default_value = "4")]
    validators: u8,

    /// Number of staking epochs to run, including the bootstrap epoch
    #[arg(short, long, default_value = "3")]
    epochs: u64,

    /// Blocks per staking epoch
    #[arg(short = 'l', long, default_value = "20")]
    epoch_length: u64,

    /// Blocks after the epoch start before the validator set is finalized
    #[arg(long, default_value = "0")]
    finalize_delay: u64,

    /// Bridge fee paid once per epoch
    #[arg(long, default_value = "1000")]
    bridge_fee: u128,

    /// Extra receivers queued by the bridge per epoch
    #[arg(long, default_value = "0")]
    extra_receivers: u8,

    /// Inflation per epoch in basis points of the snapshotted stake
    #[arg(long, default_value = "0")]
    inflation_bps: u64,

    /// JSON engine configuration (defaults apply to missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct EpochReport {
    epoch: StakingEpoch,
    first_block: BlockNumber,
    last_block: BlockNumber,
    blocks_created: BTreeMap<PoolId, u64>,
    distributed: String,
    undistributed: String,
    pool_rewards: BTreeMap<PoolId, String>,
    extra_mints: usize,
    engine_mint: String,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    validators: u8,
    epochs: Vec<EpochReport>,
    minted_totally: String,
    minted_by_bridge: String,
    extra_receivers_queued: u64,
    randomness_rounds: u64,
}

fn address(prefix: u8, index: u8) -> Address {
    let mut address = [prefix; 20];
    address[19] = index;
    address
}

fn load_config(path: Option<&PathBuf>) -> Result<BlockRewardConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BlockRewardConfig::from_json_str(&json).context("parsing engine config")?
        }
        None => BlockRewardConfig::default(),
    };
    config.apply_env_overrides();
    config.validate().context("validating engine config")?;
    Ok(config)
}

struct Simulation {
    args: Args,
    engine: Engine,
    validator_set: Arc<InMemoryValidatorSet>,
    staking: Arc<InMemoryStaking>,
    randomness: Arc<RecordingRandomness>,
    system: Address,
    engine_address: Address,
}

impl Simulation {
    fn new(args: Args, config: BlockRewardConfig) -> Result<Self> {
        let pools: Vec<PoolId> = (1..=u64::from(args.validators)).collect();
        let validator_set = Arc::new(InMemoryValidatorSet::new(pools.len() as u64));
        let staking = Arc::new(InMemoryStaking::new(0, 1, args.epoch_length));
        for index in 1..=args.validators {
            let pool = PoolId::from(index);
            validator_set.add_pool(pool, address(0x10, index), address(0x20, index));
            // self stake grows with the pool index so both split modes show up
            staking.set_stake(
                pool,
                U256::from(1_000u64),
                U256::from(100u64 * u64::from(index)),
            );
        }
        validator_set.set_validators(pools);

        let randomness = Arc::new(RecordingRandomness::new());
        let system = config.system_address;
        let owner = config.owner_address;
        let engine_address = config.engine_address;

        let mut engine = BlockRewardService::new(
            config,
            validator_set.clone(),
            staking.clone(),
            randomness.clone(),
        )
        .context("creating reward engine")?;
        if args.inflation_bps > 0 {
            let inflation = SnapshotStakeInflation::from_basis_points(args.inflation_bps);
            engine = engine.with_inflation_policy(Arc::new(inflation));
        }

        let owner = CallContext::new(owner, 0);
        engine.set_bridges_allowed(&owner, &[BRIDGE_ADDRESS])?;
        engine.initialize(&owner, VALIDATOR_SET_ADDRESS, None)?;

        Ok(Self {
            args,
            engine,
            validator_set,
            staking,
            randomness,
            system,
            engine_address,
        })
    }

    fn run(&self) -> Result<SimulationReport> {
        let mut epochs = Vec::new();
        for _ in 0..self.args.epochs {
            epochs.push(self.run_epoch()?);
            self.staking.advance_epoch(self.args.epoch_length);
        }

        Ok(SimulationReport {
            validators: self.args.validators,
            epochs,
            minted_totally: self.engine.minted_totally().to_string(),
            minted_by_bridge: self.engine.minted_totally_by_bridge(&BRIDGE_ADDRESS).to_string(),
            extra_receivers_queued: self.engine.extra_receivers_queue_size(),
            randomness_rounds: self.randomness.rounds(),
        })
    }

    fn run_epoch(&self) -> Result<EpochReport> {
        let epoch = self.staking.epoch();
        let first_block = self.staking.start_block();
        let last_block = self.staking.end_block();
        let finalize_at = first_block.saturating_add(self.args.finalize_delay);
        let mut report = EpochReport {
            epoch,
            first_block,
            last_block,
            ..Default::default()
        };

        for block in first_block..=last_block {
            if epoch > 0 && block == finalize_at {
                self.validator_set.finalize(block);
                debug!("Validator set finalized at block {}", block);
            }

            let author = self.author(block);
            let outcome = self.engine.on_block_close(
                &CallContext::new(self.system, block),
                &[address(0x10, author)],
                &[0],
            )?;
            for mint in &outcome.mints {
                if mint.receiver == self.engine_address {
                    report.engine_mint = mint.amount.to_string();
                } else {
                    report.extra_mints += 1;
                }
            }

            if block == first_block {
                self.bridge_activity(block)?;
            }
        }

        for pool in 1..=u64::from(self.args.validators) {
            report
                .blocks_created
                .insert(pool, self.engine.blocks_created(epoch, pool));
        }
        for event in self.engine.take_events() {
            if let BlockRewardEvent::EpochRewardsDistributed {
                epoch: closed,
                distributed,
                undistributed,
                rewarded_pools,
            } = event
            {
                report.distributed = distributed.to_string();
                report.undistributed = undistributed.to_string();
                for pool in rewarded_pools {
                    report.pool_rewards.insert(
                        pool,
                        self.engine.epoch_pool_native_reward(closed, pool).to_string(),
                    );
                }
            }
        }

        info!(
            "Epoch {} closed: blocks {}..={}, distributed {}",
            epoch,
            first_block,
            last_block,
            if report.distributed.is_empty() { "0" } else { report.distributed.as_str() }
        );
        Ok(report)
    }

    fn bridge_activity(&self, block: BlockNumber) -> Result<()> {
        let bridge = CallContext::new(BRIDGE_ADDRESS, block);
        if self.args.bridge_fee > 0 {
            self.engine
                .add_bridge_native_fee_receivers(&bridge, U256::from(self.args.bridge_fee))?;
        }
        for index in 1..=self.args.extra_receivers {
            let amount = U256::from(u64::from(index) * 10);
            match self
                .engine
                .add_extra_receiver(&bridge, amount, address(0x30, index))
            {
                Ok(()) => {}
                Err(err) if err.is_rejected_input() => {
                    warn!("Extra receiver {} skipped: {}", index, err);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn author(&self, block: BlockNumber) -> u8 {
        let validators = u64::from(self.args.validators);
        // block % validators < validators <= u8::MAX
        (block % validators) as u8 + 1
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("QC_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    if args.validators == 0 {
        bail!("at least one validator is required");
    }
    if args.epoch_length == 0 {
        bail!("epoch length must be at least one block");
    }

    let config = load_config(args.config.as_ref())?;
    info!(
        "Simulating {} epochs of {} blocks with {} validators",
        args.epochs, args.epoch_length, args.validators
    );

    let simulation = Simulation::new(args, config)?;
    let report = simulation.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
