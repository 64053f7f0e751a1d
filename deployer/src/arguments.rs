//! Command line arguments of the deployer binary.

use crate::account::Account;
use crate::config::{DeployConfig, DEFAULT_CONTRACT};
use crate::secret::PrivateKey;
use crate::toolkit::{ConfirmPolicy, DEFAULT_BLOCK_TIMEOUT};
use clap::Parser;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use url::Url;
use web3::types::{Address, U256};

/// Deploys a compiled contract and prints its address.
#[derive(clap::Parser, Debug)]
pub struct Arguments {
    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://127.0.0.1:8545")]
    pub node_url: Url,

    /// The bare or fully qualified name of the contract to deploy.
    #[clap(long, env, default_value = DEFAULT_CONTRACT)]
    pub contract: String,

    /// Directory containing the compiled Hardhat artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Private key to sign the deployment with. When neither this nor
    /// `--from` is set, the node signs with its first account.
    #[clap(long, env, conflicts_with = "from")]
    pub private_key: Option<PrivateKey>,

    /// Unlocked node account to deploy from.
    #[clap(long, env, value_parser = parse_address)]
    pub from: Option<Address>,

    /// Chain ID used when signing with a private key. Queried from the node
    /// when not set.
    #[clap(long, env, requires = "private_key")]
    pub chain_id: Option<u64>,

    /// Number of blocks to wait for on top of the block the deployment was
    /// mined in.
    #[clap(long, env, default_value = "0")]
    pub confirmations: usize,

    /// Number of blocks to wait for the deployment to be confirmed before
    /// giving up. 0 waits forever.
    #[clap(long, env, default_value_t = DEFAULT_BLOCK_TIMEOUT)]
    pub block_timeout: usize,

    /// Gas limit for the deployment. Estimated by the node when not set.
    #[clap(long, env, value_parser = parse_u256)]
    pub gas: Option<U256>,

    /// Gas price for the deployment, in wei. Uses the node's gas price when
    /// not set.
    #[clap(long, env, value_parser = parse_u256)]
    pub gas_price: Option<U256>,

    /// Log filter directives, in `EnvFilter` syntax.
    #[clap(long, env, default_value = "warn,deployer=info")]
    pub log_filter: String,
}

// Arguments get logged on start up, so secrets must not be printed.
impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self {
            node_url,
            contract,
            artifacts,
            private_key,
            from,
            chain_id,
            confirmations,
            block_timeout,
            gas,
            gas_price,
            log_filter,
        } = self;

        writeln!(f, "node_url: {}", node_url)?;
        writeln!(f, "contract: {}", contract)?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        display_secret_option(f, "private_key", private_key)?;
        display_option(f, "from", &from.map(|from| format!("{from:?}")))?;
        display_option(f, "chain_id", chain_id)?;
        writeln!(f, "confirmations: {}", confirmations)?;
        writeln!(f, "block_timeout: {}", block_timeout)?;
        display_option(f, "gas", gas)?;
        display_option(f, "gas_price", gas_price)?;
        writeln!(f, "log_filter: {}", log_filter)?;
        Ok(())
    }
}

impl From<Arguments> for DeployConfig {
    fn from(args: Arguments) -> Self {
        let account = match (args.private_key, args.from) {
            (Some(key), _) => Some(Account::Offline(key, args.chain_id)),
            (None, Some(from)) => Some(Account::Local(from)),
            (None, None) => None,
        };
        let block_timeout = match args.block_timeout {
            0 => None,
            blocks => Some(blocks),
        };

        DeployConfig {
            contract: args.contract,
            account,
            confirm: ConfirmPolicy::with_confirmations(args.confirmations)
                .block_timeout(block_timeout),
            gas: args.gas,
            gas_price: args.gas_price,
            ..DeployConfig::new(args.node_url, args.artifacts)
        }
    }
}

impl Arguments {
    /// Parses `args`, the first being the program name. On failure the clap
    /// message is printed and the exit code to stop with is returned:
    /// success for `--help` and `--version`, failure for usage errors.
    pub fn parse_or_exit<I, T>(args: I) -> Result<Self, ExitCode>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Arguments::try_parse_from(args).map_err(|err| {
            let _ = err.print();
            if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        })
    }
}

fn display_secret_option<T>(f: &mut Formatter, name: &str, option: &Option<T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

fn display_option(f: &mut Formatter, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

/// Parses an address with an optional `0x` prefix.
fn parse_address(s: &str) -> Result<Address, String> {
    s.strip_prefix("0x")
        .unwrap_or(s)
        .parse()
        .map_err(|err| format!("invalid address {s:?}: {err}"))
}

/// Parses a 256-bit integer, either decimal or `0x` prefixed hex.
fn parse_u256(s: &str) -> Result<U256, String> {
    match s.strip_prefix("0x") {
        Some(hex) => {
            U256::from_str_radix(hex, 16).map_err(|err| format!("invalid number {s:?}: {err:?}"))
        }
        None => U256::from_dec_str(s).map_err(|err| format!("invalid number {s:?}: {err:?}")),
    }
}
