use std::error::Error;

use clap::Args as ClapArgs;
use serde_json::json;

#[derive(ClapArgs, Debug)]
pub struct PlanArgs {
    /// Memory budget in bytes.
    #[arg(long)]
    pub mem_bytes: u64,
    /// Number of spins in the system.
    #[arg(short = 'n', long = "spins")]
    pub spins: u32,
    /// Number of lowest-energy states that would be requested.
    #[arg(long, default_value_t = 10)]
    pub num_states: usize,
    /// Fixed chunk exponent, bypassing the memory-derived choice.
    #[arg(long)]
    pub chunk_exponent: Option<u32>,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let plan = iks_core::plan(
        args.mem_bytes,
        args.spins,
        args.num_states,
        args.chunk_exponent,
    )?;
    let payload = json!({
        "chunk_exp": plan.chunk_exp,
        "chunk_len": plan.chunk_len(),
        "num_chunks": plan.num_chunks(args.spins),
        "num_states": plan.num_states,
        "requested_states": plan.requested_states,
        "states_clamped": plan.states_clamped(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
