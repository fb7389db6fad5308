use std::{fs::File, io, path::Path, time::Duration};

use super::error::{ProvisionError, Result};

pub const INSTALLER_FILE_NAME: &str = "setup_drake_colab.py";

/// `{base}/drake/{build}/drake-{version}/setup_drake_colab.py`
pub fn installer_url(base: &str, version: &str, build: &str) -> String {
    format!(
        "{}/drake/{}/drake-{}/{}",
        base.trim_end_matches('/'),
        build,
        version,
        INSTALLER_FILE_NAME
    )
}

pub trait Fetcher {
    /// Download `url` into the file `dest`, replacing it if present.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(60))
            .build();
        HttpFetcher { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("downloading {}", url);

        let resp = self.agent.get(url).call().map_err(|e| {
            let reason = match &e {
                ureq::Error::Status(code, _) => format!("server returned HTTP {}", code),
                ureq::Error::Transport(t) => t.to_string(),
            };
            ProvisionError::Download {
                url: url.to_string(),
                reason,
            }
        })?;

        let mut file = File::create(dest)
            .map_err(|e| ProvisionError::io(format!("cannot create '{}'", dest.display()), e))?;
        let bytes = io::copy(&mut resp.into_reader(), &mut file).map_err(|e| {
            ProvisionError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!("saved {} bytes to '{}'", bytes, dest.display());
        Ok(())
    }
}
