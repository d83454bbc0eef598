use std::fmt;

use async_trait::async_trait;
use lambda_runtime::tracing;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::DatabaseConfig;
use crate::error::Result;

const INSERT_UPLOAD: &str =
    "INSERT INTO uploads (name, surname, original_url, grayscale_url) VALUES (?, ?, ?, ?)";

/// One row of the `uploads` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub name: String,
    pub surname: String,
    pub original_url: String,
    pub grayscale_url: String,
}

impl UploadRecord {
    /// Missing name fields are stored as empty strings.
    pub fn new(
        name: Option<&str>,
        surname: Option<&str>,
        original_url: String,
        grayscale_url: String,
    ) -> Self {
        Self {
            name: name.map(title_case).unwrap_or_default(),
            surname: surname.map(title_case).unwrap_or_default(),
            original_url,
            grayscale_url,
        }
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest, so "mary-ANN o'neil" becomes "Mary-Ann O'Neil".
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

#[async_trait]
pub trait UploadRecorder: Send + Sync {
    async fn record(&self, record: &UploadRecord) -> Result<()>;
}

/// Writes each record over its own connection. The connection is closed
/// before returning, whether or not the insert succeeded.
#[derive(Clone)]
pub struct MySqlRecorder {
    options: MySqlConnectOptions,
}

impl MySqlRecorder {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose_secret())
            .database(&config.name);
        Self { options }
    }
}

// The connect options carry the plaintext password.
impl fmt::Debug for MySqlRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlRecorder").finish_non_exhaustive()
    }
}

#[async_trait]
impl UploadRecorder for MySqlRecorder {
    async fn record(&self, record: &UploadRecord) -> Result<()> {
        let mut conn = self.options.connect().await?;
        let inserted = insert_upload(&mut conn, record).await;
        let closed = conn.close().await;
        inserted?;
        closed?;
        tracing::debug!("Recorded upload {}", record.original_url);
        Ok(())
    }
}

async fn insert_upload(conn: &mut MySqlConnection, record: &UploadRecord) -> sqlx::Result<()> {
    let mut tx = conn.begin().await?;
    sqlx::query(INSERT_UPLOAD)
        .bind(&record.name)
        .bind(&record.surname)
        .bind(&record.original_url)
        .bind(&record.grayscale_url)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Keeps records in memory instead of writing them to MySQL.
    #[derive(Default)]
    pub(crate) struct MemoryRecorder {
        pub(crate) records: Mutex<Vec<UploadRecord>>,
    }

    #[async_trait]
    impl UploadRecorder for MemoryRecorder {
        async fn record(&self, record: &UploadRecord) -> Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("jane"), "Jane");
        assert_eq!(title_case("DOE"), "Doe");
        assert_eq!(title_case("mary-ann"), "Mary-Ann");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("van der berg"), "Van Der Berg");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_record_from_metadata() {
        let record = UploadRecord::new(
            Some("jane"),
            Some("doe"),
            "https://s3.amazonaws.com/src/photo.png".to_string(),
            "https://s3.amazonaws.com/dst/grayscale-photo.png".to_string(),
        );
        assert_eq!(record.name, "Jane");
        assert_eq!(record.surname, "Doe");
    }

    #[test]
    fn test_recorder_debug_hides_password() {
        let recorder = MySqlRecorder::new(&DatabaseConfig {
            host: "db.internal".to_string(),
            port: 3306,
            user: "lambda".to_string(),
            password: "hunter2".to_string().into(),
            name: "images".to_string(),
        });
        assert!(!format!("{recorder:?}").contains("hunter2"));
    }

    #[test]
    fn test_record_without_metadata() {
        let record = UploadRecord::new(None, None, "a".to_string(), "b".to_string());
        assert_eq!(record.name, "");
        assert_eq!(record.surname, "");
    }
}
