//! QuantSafe - post-quantum KEM and signature bridge
//!
//! Usage:
//!   quantsafe serve                          - Run the HTTP API
//!   quantsafe generate-kyber-keypair         - Print a KEM keypair
//!   quantsafe dilithium-sign <SK> <MESSAGE>  - Print a signature
//!   quantsafe help                           - Every one-shot operation

mod oneshot;
mod server;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use quantsafe_core::{CryptoPool, PqcService};
use quantsafe_crypto::{KemAlgorithm, PqcryptoGateway, SignatureAlgorithm};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oneshot::Operation;
use server::{AppState, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "quantsafe")]
#[command(version)]
#[command(about = "Post-quantum KEM and signature bridge", long_about = None)]
struct Cli {
    /// KEM variant for every Kyber operation
    #[arg(long, global = true, default_value = "Kyber512", env = "PQC_KEM_ALGORITHM")]
    kem_algorithm: KemAlgorithm,

    /// Signature variant for every Dilithium operation
    #[arg(long, global = true, default_value = "Dilithium2", env = "PQC_SIGNATURE_ALGORITHM")]
    signature_algorithm: SignatureAlgorithm,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),

    #[command(flatten)]
    Run(Operation),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = server::DEFAULT_HOST, env = "PQC_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = server::DEFAULT_PORT, env = "PQC_PORT")]
    port: u16,

    /// Concurrent crypto operations (defaults to CPU count)
    #[arg(long, env = "PQC_WORKERS")]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout is reserved for one-shot JSON output
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quantsafe=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let service = PqcService::new(
        Arc::new(PqcryptoGateway),
        cli.kem_algorithm,
        cli.signature_algorithm,
    );

    match cli.command {
        Command::Serve(args) => {
            let pool = args.workers.map(CryptoPool::new).unwrap_or_default();
            let config = ServerConfig {
                host: args.host,
                port: args.port,
            };
            server::serve(config, AppState::new(service, pool)).await?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Run(op) => match oneshot::execute(&service, &op) {
            Ok(output) => {
                println!("{}", output);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Operation failed");
                println!("{}", oneshot::failure(&e));
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["quantsafe", "generate-kyber-keypair"]).unwrap();
        assert_eq!(cli.kem_algorithm, KemAlgorithm::Kyber512);
        assert_eq!(cli.signature_algorithm, SignatureAlgorithm::Dilithium2);
        assert!(matches!(cli.command, Command::Run(Operation::GenerateKyberKeypair)));
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::try_parse_from([
            "quantsafe",
            "--kem-algorithm",
            "Kyber1024",
            "serve",
            "--port",
            "9000",
            "--workers",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.kem_algorithm, KemAlgorithm::Kyber1024);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, 9000);
                assert_eq!(args.workers, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["quantsafe", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.host, server::DEFAULT_HOST);
                assert_eq!(args.port, server::DEFAULT_PORT);
                assert_eq!(args.workers, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_positional_operation() {
        let cli = Cli::try_parse_from(["quantsafe", "dilithium-sign", "c2s=", "hello world"]).unwrap();
        assert_eq!(
            cli.command_operation(),
            Some(&Operation::DilithiumSign {
                private_key: "c2s=".into(),
                message: "hello world".into(),
            })
        );
    }

    #[test]
    fn test_unknown_algorithm_rejected_at_load() {
        let err = Cli::try_parse_from([
            "quantsafe",
            "--signature-algorithm",
            "Falcon512",
            "create-challenge",
            "alice",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Falcon512"));
    }

    impl Cli {
        fn command_operation(&self) -> Option<&Operation> {
            match &self.command {
                Command::Run(op) => Some(op),
                Command::Serve(_) => None,
            }
        }
    }
}
