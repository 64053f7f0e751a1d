//! Sequences a single contract deployment against a [`Toolkit`] and maps its
//! outcome to a process exit code.

use crate::contract::{Confirmed, Deployment};
use crate::errors::DeployError;
use crate::toolkit::Toolkit;
use std::io::Write;
use std::process::ExitCode;
#[cfg(feature = "http")]
use crate::{config::DeployConfig, toolkit::Web3Toolkit};
#[cfg(feature = "http")]
use anyhow::Context as _;
#[cfg(feature = "http")]
use deployer_common::artifact::hardhat;
#[cfg(feature = "http")]
use web3::{transports::Http, Web3};

/// Deploys one named contract through a toolkit.
#[derive(Debug)]
pub struct DeploymentRunner<K> {
    toolkit: K,
    contract: String,
}

impl<K: Toolkit> DeploymentRunner<K> {
    /// Creates a runner deploying `contract` through `toolkit`.
    pub fn new(toolkit: K, contract: impl Into<String>) -> Self {
        DeploymentRunner {
            toolkit,
            contract: contract.into(),
        }
    }

    /// The name of the contract this runner deploys.
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Resolves the contract, deploys it without constructor arguments and
    /// waits for the deployment to be confirmed. Errors from any step are
    /// returned as is; nothing is retried and the wait is only bounded by the
    /// toolkit.
    pub async fn run(&self) -> Result<Deployment<Confirmed>, DeployError> {
        let factory = self.toolkit.contract_factory(&self.contract).await?;
        let pending = self.toolkit.deploy(factory, Vec::new()).await?;
        tracing::info!(
            contract = %pending.contract(),
            transaction_hash = ?pending.transaction_hash(),
            "waiting for deployment to be confirmed"
        );

        self.toolkit.deployed(pending).await
    }
}

/// Runs the deployment, printing the report line to `stdout` on success and
/// the error to `stderr` on failure.
pub async fn execute<K: Toolkit>(
    runner: &DeploymentRunner<K>,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> ExitCode {
    let result = runner.run().await;
    let report = match &result {
        Ok(deployment) => writeln!(stdout, "{deployment}"),
        Err(err) => {
            tracing::error!(contract = %runner.contract(), "deployment failed");
            writeln!(stderr, "Error: {err}")
        }
    };

    match (result, report) {
        (Ok(_), Ok(())) => ExitCode::SUCCESS,
        (Ok(_), Err(err)) => {
            let _ = writeln!(stderr, "Error: could not write deployment report: {err}");
            ExitCode::FAILURE
        }
        (Err(_), _) => ExitCode::FAILURE,
    }
}

/// Loads the artifacts and prepares the HTTP connection described by
/// `config`. The node is not contacted yet.
#[cfg(feature = "http")]
pub fn setup(config: &DeployConfig) -> anyhow::Result<DeploymentRunner<Web3Toolkit<Http>>> {
    let artifact = hardhat::load_from_directory(&config.artifacts).with_context(|| {
        format!(
            "failed to load artifacts from {}",
            config.artifacts.display()
        )
    })?;
    if artifact.is_empty() {
        tracing::warn!(origin = %artifact.origin(), "no contract artifacts found");
    } else {
        tracing::debug!(contracts = artifact.len(), "loaded artifacts");
    }

    let transport = Http::new(config.node_url.as_str())
        .with_context(|| format!("failed to connect to node at {}", config.node_url))?;
    let toolkit = config.toolkit(Web3::new(transport), artifact);

    Ok(DeploymentRunner::new(toolkit, config.contract.clone()))
}

/// Sets up and executes a deployment. Setup errors are reported on `stderr`
/// with their context chain and fail the run like deployment errors do.
#[cfg(feature = "http")]
pub async fn run(
    config: &DeployConfig,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> ExitCode {
    match setup(config) {
        Ok(runner) => execute(&runner, stdout, stderr).await,
        Err(err) => {
            tracing::error!("deployment setup failed");
            let _ = writeln!(stderr, "Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractFactory, Pending};
    use crate::test::prelude::*;
    use deployer_common::abi::Token;
    use deployer_common::{Bytecode, Contract};
    use futures::FutureExt;
    use std::cell::RefCell;
    use std::time::Duration;
    use web3::error::Error as Web3Error;
    use web3::types::{Address, H256};

    /// How the in-memory toolkit behaves.
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    enum Outcome {
        #[default]
        Deployed,
        NotFound,
        NetworkError,
        /// Confirmation gives up after the given time.
        Timeout(Duration),
        /// Confirmation never completes.
        Hang,
    }

    #[derive(Debug, Default)]
    struct FakeToolkit {
        outcome: Outcome,
        calls: RefCell<Vec<&'static str>>,
    }

    const HASH: H256 = H256::repeat_byte(0x42);
    const REPORT: &str = "Implementation deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aa3\n";

    fn address() -> Address {
        addr!("0x5FbDB2315678afecb367f032d93F642f64180aa3")
    }

    impl FakeToolkit {
        fn new(outcome: Outcome) -> Self {
            FakeToolkit {
                outcome,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl Toolkit for FakeToolkit {
        async fn contract_factory(&self, name: &str) -> Result<ContractFactory, DeployError> {
            self.calls.borrow_mut().push("contract_factory");
            if self.outcome == Outcome::NotFound {
                return Err(DeployError::NotFound(name.to_owned()));
            }

            Ok(ContractFactory::new(Contract {
                bytecode: Bytecode::from_hex_str("0x6080").unwrap(),
                ..Contract::with_name(name)
            }))
        }

        async fn deploy(
            &self,
            factory: ContractFactory,
            params: Vec<Token>,
        ) -> Result<Deployment<Pending>, DeployError> {
            self.calls.borrow_mut().push("deploy");
            assert!(params.is_empty());
            if self.outcome == Outcome::NetworkError {
                return Err(Web3Error::Unreachable.into());
            }

            Ok(Deployment::pending(factory.name(), HASH))
        }

        async fn deployed(
            &self,
            deployment: Deployment<Pending>,
        ) -> Result<Deployment<Confirmed>, DeployError> {
            self.calls.borrow_mut().push("deployed");
            match self.outcome {
                Outcome::Timeout(after) => {
                    tokio::time::sleep(after).await;
                    Err(DeployError::ConfirmTimeout(deployment.transaction_hash()))
                }
                Outcome::Hang => futures::future::pending().await,
                _ => Ok(deployment.confirm(address(), Some(1.into()))),
            }
        }
    }

    fn execute_with(toolkit: FakeToolkit) -> (ExitCode, String, String, Vec<&'static str>) {
        let runner = DeploymentRunner::new(toolkit, "Implementation");
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        let code = execute(&runner, &mut stdout, &mut stderr).wait();

        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr).unwrap(),
            runner.toolkit.calls(),
        )
    }

    #[test]
    fn successful_deployment_prints_address() {
        let (code, stdout, stderr, calls) = execute_with(FakeToolkit::new(Outcome::Deployed));

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(stdout.lines().count(), 1);
        assert_eq!(stdout, REPORT);
        assert!(stderr.is_empty());
        assert_eq!(calls, ["contract_factory", "deploy", "deployed"]);
    }

    #[test]
    fn reported_address_comes_from_confirmed_deployment() {
        let runner = DeploymentRunner::new(FakeToolkit::new(Outcome::Deployed), "Implementation");

        let deployment = runner.run().wait().expect("deployment failed");

        assert_eq!(deployment.contract(), "Implementation");
        assert_eq!(deployment.transaction_hash(), HASH);
        assert_eq!(deployment.address(), address());
        assert_eq!(format!("{deployment}\n"), REPORT);
    }

    #[test]
    fn missing_artifact_fails() {
        let (code, stdout, stderr, calls) = execute_with(FakeToolkit::new(Outcome::NotFound));

        assert_eq!(code, ExitCode::FAILURE);
        assert!(stdout.is_empty());
        assert!(stderr.contains("no artifact found for Implementation"));
        assert_eq!(calls, ["contract_factory"]);
    }

    #[test]
    fn network_error_fails_without_report() {
        let (code, stdout, stderr, calls) = execute_with(FakeToolkit::new(Outcome::NetworkError));

        assert_eq!(code, ExitCode::FAILURE);
        assert!(stdout.is_empty());
        assert!(stderr.contains("error executing contract deployment transaction"));
        assert_eq!(calls, ["contract_factory", "deploy"]);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_timeout_is_left_to_toolkit() {
        let timeout = Duration::from_secs(300);
        let runner = DeploymentRunner::new(
            FakeToolkit::new(Outcome::Timeout(timeout)),
            "Implementation",
        );
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());

        let start = tokio::time::Instant::now();
        let code = execute(&runner, &mut stdout, &mut stderr).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(start.elapsed() >= timeout);
        assert!(stdout.is_empty());
        assert!(String::from_utf8(stderr)
            .unwrap()
            .contains("was not confirmed in time"));
    }

    #[test]
    fn pending_confirmation_never_resolves_on_its_own() {
        let runner = DeploymentRunner::new(FakeToolkit::new(Outcome::Hang), "Implementation");
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());

        let result = execute(&runner, &mut stdout, &mut stderr).now_or_never();

        assert!(result.is_none());
        assert!(stdout.is_empty());
        assert!(stderr.is_empty());
        assert_eq!(
            runner.toolkit.calls(),
            ["contract_factory", "deploy", "deployed"]
        );
    }

    /// A writer whose output was closed, like a broken pipe.
    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_report_fails() {
        let runner = DeploymentRunner::new(FakeToolkit::new(Outcome::Deployed), "Implementation");
        let mut stderr = Vec::new();

        let code = execute(&runner, &mut ClosedOutput, &mut stderr).wait();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(String::from_utf8(stderr)
            .unwrap()
            .starts_with("Error: could not write deployment report"));
    }

    #[cfg(feature = "http")]
    fn config(artifacts: &std::path::Path) -> DeployConfig {
        DeployConfig::new("http://127.0.0.1:8545".parse().unwrap(), artifacts)
    }

    #[cfg(feature = "http")]
    #[test]
    fn missing_artifacts_directory_fails_before_deploying() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("artifacts");
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());

        let code = run(&config(&missing), &mut stdout, &mut stderr).wait();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(stdout.is_empty());
        let stderr = String::from_utf8(stderr).unwrap();
        assert!(
            stderr.starts_with(&format!(
                "Error: failed to load artifacts from {}",
                missing.display()
            )),
            "unexpected error output {stderr}"
        );
    }

    #[cfg(feature = "http")]
    #[test]
    fn setup_does_not_contact_node() {
        let dir = tempfile::tempdir().unwrap();

        let runner = setup(&config(dir.path())).unwrap();

        assert_eq!(runner.contract(), "Implementation");
    }
}
