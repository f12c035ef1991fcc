//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ccdroutes")]
#[command(author, version, about = "Generate OpenVPN CCD push routes from hostnames and ASNs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run (default: hosts)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// CCD file to write (overrides HOSTSUPDATE_CCD_FILEPATH)
    #[arg(long, global = true)]
    pub ccd_path: Option<PathBuf>,

    /// Print the directives instead of writing the CCD file
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a host list and write squashed routes
    Hosts(HostsArgs),

    /// Fetch the prefixes announced by ASNs and write collapsed routes
    Asn {
        /// ASNs to look up (AS15169 or 15169)
        asns: Vec<String>,

        /// Attempts per ASN
        #[arg(long, default_value_t = crate::fetcher::DEFAULT_RETRIES)]
        retries: u32,
    },

    /// Collapse a file of addresses and CIDR blocks into minimal routes
    Collapse {
        /// File with one address or CIDR block per line
        input: PathBuf,
    },

    /// Show version
    Version,
}

/// Options of the `hosts` command
#[derive(Args, Debug, Default, Clone)]
pub struct HostsArgs {
    /// Host list file (overrides HOSTSUPDATE_HOSTS_PATH)
    #[arg(long = "hosts")]
    pub hosts_path: Option<PathBuf>,

    /// Nameservers to query, comma separated
    #[arg(long, value_delimiter = ',')]
    pub nameservers: Vec<IpAddr>,

    /// Use the system resolver instead of the nameserver list
    #[arg(long, conflicts_with = "nameservers")]
    pub system_resolver: bool,

    /// Attempts per hostname
    #[arg(long)]
    pub tries: Option<u32>,

    /// Do not resolve the www. variant of each host
    #[arg(long)]
    pub no_www: bool,

    /// Also route IPv6 addresses
    #[arg(long)]
    pub ipv6: bool,

    /// Squash a bucket holding more than this many addresses
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Prefix length of a squashed bucket
    #[arg(long)]
    pub bucket_prefix: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["ccdroutes", "--dry-run"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.dry_run);
    }

    #[test]
    fn test_hosts_args() {
        let cli = Cli::try_parse_from([
            "ccdroutes",
            "hosts",
            "--hosts",
            "/etc/hostsupdate/hosts",
            "--nameservers",
            "1.1.1.1,9.9.9.9",
            "--threshold",
            "3",
            "--ccd-path",
            "/tmp/client",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Hosts(args)) => {
                assert_eq!(args.nameservers.len(), 2);
                assert_eq!(args.threshold, Some(3));
                assert!(!args.no_www);
            }
            _ => panic!("expected hosts command"),
        }
        assert_eq!(cli.ccd_path, Some(PathBuf::from("/tmp/client")));
    }

    #[test]
    fn test_hosts_rejects_bad_nameserver() {
        assert!(Cli::try_parse_from(["ccdroutes", "hosts", "--nameservers", "dns.google"]).is_err());
    }

    #[test]
    fn test_system_resolver_conflicts_with_nameservers() {
        assert!(Cli::try_parse_from([
            "ccdroutes",
            "hosts",
            "--system-resolver",
            "--nameservers",
            "1.1.1.1"
        ])
        .is_err());
    }

    #[test]
    fn test_asn_args() {
        let cli = Cli::try_parse_from(["ccdroutes", "asn", "AS15169", "13335"]).unwrap();
        match cli.command {
            Some(Commands::Asn { asns, retries }) => {
                assert_eq!(asns, vec!["AS15169", "13335"]);
                assert_eq!(retries, crate::fetcher::DEFAULT_RETRIES);
            }
            _ => panic!("expected asn command"),
        }
    }
}
