use clap::Parser;
use installer_client::ClientSettings;
use installer_core::{Credentials, LaunchConfig};

use crate::logging::LogDestination;

/// Cluster sizes the installer supports; two nodes cannot form a quorum.
const ALLOWED_INSTANCE_COUNTS: [u32; 4] = [1, 3, 4, 5];

#[derive(Debug, Parser)]
#[command(name = "installer", about = "Launch a cluster install and follow it to completion")]
pub struct Args {
    /// Base URL of the installer API.
    #[arg(long, env = "INSTALLER_URL", default_value = "http://localhost:4000")]
    pub url: String,

    /// Leave empty to use the credentials configured on the installer host.
    #[arg(long, env = "AWS_ACCESS_KEY_ID", default_value = "")]
    pub access_key_id: String,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub secret_access_key: String,

    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    #[arg(long, default_value = "m3.medium")]
    pub instance_type: String,

    #[arg(long, default_value_t = 1, value_parser = parse_instance_count)]
    pub num_instances: u32,

    /// Consecutive event-stream reconnects before giving up.
    #[arg(long, default_value_t = 3)]
    pub max_reconnects: u32,

    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            max_reconnects: self.max_reconnects,
            ..ClientSettings::with_base_url(self.url.clone())
        }
    }

    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            credentials: Credentials {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            },
            region: self.region.clone(),
            instance_type: self.instance_type.clone(),
            num_instances: self.num_instances,
        }
    }
}

fn parse_instance_count(raw: &str) -> Result<u32, String> {
    let count: u32 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not a number"))?;
    if ALLOWED_INSTANCE_COUNTS.contains(&count) {
        Ok(count)
    } else {
        Err(format!(
            "instance count must be one of {:?}",
            ALLOWED_INSTANCE_COUNTS
        ))
    }
}
