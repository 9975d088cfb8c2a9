use anyhow::{Context, Result};
use log::info;
use std::collections::HashMap;
use std::path::Path;

use crate::config::TenantRecord;

pub const DIRECTORY_ID_VAR: &str = "M365_DIRECTORY_ID";
pub const CLIENT_ID_VAR: &str = "M365_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "M365_CLIENT_SECRET";

/// Tenant application credentials gathered from the user
pub struct Credentials {
    pub directory_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("directory_id", &self.directory_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Credentials> {
        info!("Importing from environment variables");

        let lookup = |var: &str| {
            std::env::var(var).with_context(|| format!("{} environment variable not set", var))
        };

        Ok(Credentials {
            directory_id: lookup(DIRECTORY_ID_VAR)?,
            client_id: lookup(CLIENT_ID_VAR)?,
            client_secret: lookup(CLIENT_SECRET_VAR)?,
        })
    }

    /// Read the credential variables from a `.env` file without touching the
    /// process environment
    pub fn from_env_file(path: &str) -> Result<Credentials> {
        info!("Importing from .env file: {}", path);

        if !Path::new(path).exists() {
            anyhow::bail!("Environment file not found: {}", path);
        }

        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to load .env file '{}'", path))?
        {
            let (key, value) =
                item.with_context(|| format!("Failed to parse .env file '{}'", path))?;
            values.insert(key, value);
        }

        let mut take = |var: &str| {
            values
                .remove(var)
                .with_context(|| format!("{} not found in .env file: {}", var, path))
        };

        Ok(Credentials {
            directory_id: take(DIRECTORY_ID_VAR)?,
            client_id: take(CLIENT_ID_VAR)?,
            client_secret: take(CLIENT_SECRET_VAR)?,
        })
    }

    pub fn from_command_line(
        directory_id: String,
        client_id: String,
        client_secret: String,
    ) -> Credentials {
        info!("Using command line parameters");

        Credentials {
            directory_id,
            client_id,
            client_secret,
        }
    }

    pub fn into_record(self, remarks: Option<String>) -> TenantRecord {
        let mut record = TenantRecord::new(self.directory_id, self.client_id, self.client_secret);
        record.remarks = remarks;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_env_file_reads_all_values() {
        let dir = std::env::temp_dir().join(format!("m365-admin-env-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        fs::write(
            &path,
            "M365_DIRECTORY_ID=dir-1\nM365_CLIENT_ID=app-1\nM365_CLIENT_SECRET=s3cret\n",
        )
        .unwrap();

        let creds = Credentials::from_env_file(path.to_str().unwrap()).unwrap();
        assert_eq!(creds.directory_id, "dir-1");
        assert_eq!(creds.client_id, "app-1");
        assert_eq!(creds.client_secret, "s3cret");
        assert!(!format!("{:?}", creds).contains("s3cret"));
    }

    #[test]
    fn test_from_env_file_reports_missing_variable() {
        let dir = std::env::temp_dir().join(format!("m365-admin-env-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        fs::write(&path, "M365_DIRECTORY_ID=dir-1\n").unwrap();

        let err = Credentials::from_env_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains(CLIENT_ID_VAR));
    }

    #[test]
    fn test_into_record_keeps_remarks() {
        let record = Credentials::from_command_line("d".into(), "c".into(), "s".into())
            .into_record(Some("pilot".into()));
        assert_eq!(record.remarks.as_deref(), Some("pilot"));
        assert!(record.is_active);
    }
}
