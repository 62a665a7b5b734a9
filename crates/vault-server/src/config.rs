//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use zkvault_circuits::Address;
use zkvault_ledger::Amount;

/// 0.1 in an 18-decimal unit of account
pub const DEFAULT_DENOMINATION: Amount = 100_000_000_000_000_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "zkvault-server", about = "HTTP node hosting a ZK vault")]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "VAULT_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "VAULT_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory holding withdraw.pk, withdraw.vk and manifest.json
    #[arg(long, env = "VAULT_KEYS_DIR", default_value = "keys")]
    pub keys_dir: PathBuf,

    #[arg(long, env = "VAULT_DEPLOYMENTS_DIR", default_value = "deployments")]
    pub deployments_dir: PathBuf,

    #[arg(long, env = "VAULT_NETWORK", default_value = "localhost")]
    pub network: String,

    /// Fixed deposit/withdrawal amount in the smallest unit
    #[arg(long, env = "VAULT_DENOMINATION", default_value_t = DEFAULT_DENOMINATION)]
    pub denomination: Amount,

    /// Deployer recorded in the deployment metadata
    #[arg(long, env = "VAULT_DEPLOYER")]
    pub deployer: Option<Address>,
}

impl Args {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["zkvault-server"]);
        assert_eq!(args.port, 3000);
        assert_eq!(args.denomination, DEFAULT_DENOMINATION);
        assert_eq!(args.socket_addr().to_string(), "0.0.0.0:3000");
        assert!(args.deployer.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "zkvault-server",
            "--port",
            "8080",
            "--network",
            "sepolia",
            "--denomination",
            "1000",
            "--deployer",
            "0x000000000000000000000000000000000000162e",
        ]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.network, "sepolia");
        assert_eq!(args.denomination, 1000);
        assert_eq!(args.deployer, Some(Address::from_u64(5678)));
    }
}
